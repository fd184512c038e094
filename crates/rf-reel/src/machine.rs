//! SlotMachine — bank, presenter and event routing in one place
//!
//! The bank never calls the presenter. Column wins travel over the bank's
//! event channel and are routed here on the tick that resolves the spin.

use std::sync::Arc;

use crossbeam_channel::Receiver;
use rf_slot::{SessionStats, SpinResult, SymbolCatalog};

use crate::assets::AssetCatalog;
use crate::bank::{ReelBank, SpinTicket};
use crate::bonus::{BonusPresenter, SkeletonRenderer};
use crate::config::MachineConfig;
use crate::error::ReelResult;
use crate::event::{BankEvent, BankEventKind};

/// The playable machine
pub struct SlotMachine {
    config: MachineConfig,
    catalog: Arc<SymbolCatalog>,
    bank: ReelBank,
    presenter: BonusPresenter,
    events: Receiver<BankEvent>,
}

impl SlotMachine {
    pub fn new(
        config: MachineConfig,
        assets: Arc<dyn AssetCatalog>,
        renderer: Box<dyn SkeletonRenderer>,
    ) -> ReelResult<Self> {
        Self::build(config, assets, renderer, None)
    }

    /// Reproducible machine: same seed, same outcomes and reel motion
    pub fn with_seed(
        config: MachineConfig,
        assets: Arc<dyn AssetCatalog>,
        renderer: Box<dyn SkeletonRenderer>,
        seed: u64,
    ) -> ReelResult<Self> {
        Self::build(config, assets, renderer, Some(seed))
    }

    fn build(
        config: MachineConfig,
        assets: Arc<dyn AssetCatalog>,
        renderer: Box<dyn SkeletonRenderer>,
        seed: Option<u64>,
    ) -> ReelResult<Self> {
        config.validate()?;
        let catalog = Arc::new(config.slot.build_catalog()?);

        let mut bank = match seed {
            Some(seed) => ReelBank::with_seed(&config, Arc::clone(&catalog), assets.as_ref(), seed)?,
            None => ReelBank::new(&config, Arc::clone(&catalog), assets.as_ref())?,
        };
        let events = bank.subscribe();

        let presenter = BonusPresenter::new(
            assets,
            renderer,
            config.bonus.clone(),
            config.layout.clone(),
            bank.rows(),
        )?;

        Ok(Self {
            config,
            catalog,
            bank,
            presenter,
            events,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<SymbolCatalog> {
        &self.catalog
    }

    pub fn bank(&self) -> &ReelBank {
        &self.bank
    }

    pub fn bank_mut(&mut self) -> &mut ReelBank {
        &mut self.bank
    }

    pub fn presenter(&self) -> &BonusPresenter {
        &self.presenter
    }

    pub fn is_spinning(&self) -> bool {
        self.bank.is_spinning()
    }

    pub fn stats(&self) -> &SessionStats {
        self.bank.outcome_stats()
    }

    /// Additional event feed for the caller
    pub fn subscribe(&mut self) -> Receiver<BankEvent> {
        self.bank.subscribe()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PLAY
    // ═══════════════════════════════════════════════════════════════════════════

    /// Start a spin, clearing any bonus left over from the previous one
    pub fn spin(&mut self) -> SpinTicket {
        if !self.bank.is_spinning() {
            self.presenter.reset(&mut self.bank);
        }
        self.bank.spin()
    }

    /// Advance one frame of `delta_ms`
    pub fn tick(&mut self, delta_ms: f64) -> Option<SpinResult> {
        let result = self.bank.tick(delta_ms);

        while let Ok(event) = self.events.try_recv() {
            if let BankEventKind::ColumnWin {
                reel_index,
                character_id,
            } = &event.kind
            {
                self.presenter
                    .handle_column_win(&mut self.bank, *reel_index as usize, character_id);
            }
        }

        result
    }
}
