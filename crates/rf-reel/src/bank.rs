//! Reel Bank — N reels driven through one coordinated spin
//!
//! A spin is a timeline on the bank's millisecond clock:
//!
//! ```text
//! t=0            Start(0)      grid drawn, directions picked
//! t=1·start      Start(1)
//! ...
//! t=D            Stop(0, grid[0])
//! t=D+1·stop     Stop(1, grid[1])
//! ...
//! all reels Idle → evaluate(grid) → ColumnWin… → SpinResolved → ticket
//! ```
//!
//! `D` is drawn from the timing config's spin duration range. The clock only
//! moves when [`ReelBank::tick`] is called, so nothing ever blocks.

use std::collections::VecDeque;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rf_slot::{Grid, GridSpec, OutcomeEngine, SessionStats, SpinResult, SymbolCatalog, SymbolId};

use crate::assets::{AssetCatalog, SymbolTextures};
use crate::bonus::ReelVisibility;
use crate::config::MachineConfig;
use crate::error::{ReelError, ReelResult};
use crate::event::{BankEvent, BankEventKind};
use crate::motion::{Direction, FRAME_MS};
use crate::reel::Reel;
use crate::timing::TimingConfig;

// ═══════════════════════════════════════════════════════════════════════════════
// SPIN TICKET
// ═══════════════════════════════════════════════════════════════════════════════

/// Handle to the outcome of one `spin()` call
///
/// Resolves once every reel has come to rest. A rejected spin hands back a
/// ticket that is already resolved with [`SpinResult::empty`].
#[derive(Debug)]
pub struct SpinTicket {
    spin_id: Option<u64>,
    receiver: Receiver<SpinResult>,
}

impl SpinTicket {
    fn pending(spin_id: u64) -> (Self, Sender<SpinResult>) {
        let (tx, rx) = bounded(1);
        (
            Self {
                spin_id: Some(spin_id),
                receiver: rx,
            },
            tx,
        )
    }

    fn rejected() -> Self {
        let (tx, rx) = bounded(1);
        // Capacity 1 and receiver alive: cannot fail
        let _ = tx.send(SpinResult::empty());
        Self {
            spin_id: None,
            receiver: rx,
        }
    }

    /// Spin this ticket belongs to (`None` if rejected)
    pub fn spin_id(&self) -> Option<u64> {
        self.spin_id
    }

    pub fn is_rejected(&self) -> bool {
        self.spin_id.is_none()
    }

    /// Take the result if the spin has resolved
    pub fn try_result(&self) -> Option<SpinResult> {
        self.receiver.try_recv().ok()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCHEDULE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
enum ReelCommand {
    Start(Direction),
    Stop(Vec<SymbolId>),
}

#[derive(Debug, Clone)]
struct ScheduledCommand {
    at_ms: f64,
    reel_index: usize,
    command: ReelCommand,
}

/// State of the spin in flight
struct SpinFlight {
    spin_id: u64,
    grid: Grid,
    schedule: VecDeque<ScheduledCommand>,
    /// Reel received its stop command
    stopping: Vec<bool>,
    /// Reel came to rest after its stop command
    stopped: Vec<bool>,
    resolver: Sender<SpinResult>,
}

impl SpinFlight {
    fn all_stopped(&self) -> bool {
        self.schedule.is_empty() && self.stopped.iter().all(|&s| s)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REEL BANK
// ═══════════════════════════════════════════════════════════════════════════════

/// Owns the reels and runs spins end to end
pub struct ReelBank {
    reels: Vec<Reel>,
    outcome: OutcomeEngine,
    grid: GridSpec,
    timing: TimingConfig,
    rng: StdRng,
    clock_ms: f64,
    flight: Option<SpinFlight>,
    next_spin_id: u64,
    subscribers: Vec<Sender<BankEvent>>,
}

impl ReelBank {
    /// Build a bank seeded from the OS
    pub fn new(
        config: &MachineConfig,
        catalog: Arc<SymbolCatalog>,
        assets: &dyn AssetCatalog,
    ) -> ReelResult<Self> {
        Self::from_rng(config, catalog, assets, StdRng::from_os_rng())
    }

    /// Build a bank whose every random draw derives from `seed`
    pub fn with_seed(
        config: &MachineConfig,
        catalog: Arc<SymbolCatalog>,
        assets: &dyn AssetCatalog,
        seed: u64,
    ) -> ReelResult<Self> {
        Self::from_rng(config, catalog, assets, StdRng::seed_from_u64(seed))
    }

    fn from_rng(
        config: &MachineConfig,
        catalog: Arc<SymbolCatalog>,
        assets: &dyn AssetCatalog,
        mut rng: StdRng,
    ) -> ReelResult<Self> {
        let grid = config.slot.grid;
        grid.validate()?;
        config.timing.validate()?;

        let textures = Arc::new(SymbolTextures::resolve(
            assets,
            &config.symbol_sheet,
            &catalog,
        )?);

        let mut reels = Vec::with_capacity(grid.reels as usize);
        for index in 0..grid.reels {
            reels.push(Reel::new(
                index,
                grid.rows as usize,
                config.motion.clone(),
                Arc::clone(&catalog),
                Arc::clone(&textures),
                rng.random(),
            )?);
        }

        let outcome = OutcomeEngine::with_seed(catalog, rng.random());

        log::info!(
            "ReelBank: {} reels × {} rows, {:?} timing",
            grid.reels,
            grid.rows,
            config.timing.profile
        );

        Ok(Self {
            reels,
            outcome,
            grid,
            timing: config.timing.clone(),
            rng,
            clock_ms: 0.0,
            flight: None,
            next_spin_id: 1,
            subscribers: Vec::new(),
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn reels(&self) -> &[Reel] {
        &self.reels
    }

    pub fn reel(&self, index: usize) -> Option<&Reel> {
        self.reels.get(index)
    }

    pub fn reel_count(&self) -> usize {
        self.reels.len()
    }

    pub fn rows(&self) -> usize {
        self.grid.rows as usize
    }

    pub fn grid_spec(&self) -> GridSpec {
        self.grid
    }

    /// Bank clock (ms since construction)
    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    /// A spin is in flight
    pub fn is_spinning(&self) -> bool {
        self.flight.is_some()
    }

    /// Id of the spin in flight
    pub fn current_spin_id(&self) -> Option<u64> {
        self.flight.as_ref().map(|f| f.spin_id)
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Takes effect from the next spin
    pub fn set_timing(&mut self, timing: TimingConfig) -> ReelResult<()> {
        timing.validate()?;
        self.timing = timing;
        Ok(())
    }

    pub fn outcome_stats(&self) -> &SessionStats {
        self.outcome.stats()
    }

    pub fn set_reel_visible(&mut self, index: usize, visible: bool) -> ReelResult<()> {
        let reel = self
            .reels
            .get_mut(index)
            .ok_or(ReelError::ReelOutOfRange(index))?;
        reel.set_visible(visible);
        Ok(())
    }

    /// Receive every event published from now on
    pub fn subscribe(&mut self) -> Receiver<BankEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    fn publish(&mut self, spin_id: u64, kind: BankEventKind) {
        let event = BankEvent::new(self.clock_ms, spin_id, kind);
        self.subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SPIN
    // ═══════════════════════════════════════════════════════════════════════════

    /// Start a coordinated spin
    ///
    /// Rejected while another spin is in flight: the returned ticket already
    /// holds an empty result and nothing about the running spin changes.
    pub fn spin(&mut self) -> SpinTicket {
        if let Some(flight) = &self.flight {
            log::warn!(
                "ReelBank: spin rejected, spin {} still in flight",
                flight.spin_id
            );
            return SpinTicket::rejected();
        }

        let spin_id = self.next_spin_id;
        self.next_spin_id += 1;

        let grid = self
            .outcome
            .generate_grid(self.grid.rows as usize, self.grid.reels as usize);
        let duration = self.timing.sample_spin_duration(&mut self.rng);
        let now = self.clock_ms;

        let mut schedule = Vec::with_capacity(self.reels.len() * 2);
        for index in 0..self.reels.len() {
            let direction = Direction::random(&mut self.rng);
            let start_at = now + index as f64 * self.timing.reel_start_interval_ms;
            let stop_at =
                (now + duration + index as f64 * self.timing.reel_stop_interval_ms).max(start_at);
            schedule.push(ScheduledCommand {
                at_ms: start_at,
                reel_index: index,
                command: ReelCommand::Start(direction),
            });
            schedule.push(ScheduledCommand {
                at_ms: stop_at,
                reel_index: index,
                command: ReelCommand::Stop(grid[index].clone()),
            });
        }
        // Stable: a reel's start stays ahead of its stop at equal times
        schedule.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));

        let (ticket, resolver) = SpinTicket::pending(spin_id);
        let reel_count = self.reels.len();
        self.flight = Some(SpinFlight {
            spin_id,
            grid,
            schedule: schedule.into(),
            stopping: vec![false; reel_count],
            stopped: vec![false; reel_count],
            resolver,
        });

        log::debug!("ReelBank: spin {} started, duration {:.0}ms", spin_id, duration);
        self.publish(spin_id, BankEventKind::SpinStarted);
        self.dispatch_due();
        ticket
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // FRAME UPDATE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Advance the bank clock by `delta_ms` and every reel with it
    ///
    /// Returns the spin result on the tick that resolves a spin.
    pub fn tick(&mut self, delta_ms: f64) -> Option<SpinResult> {
        if !delta_ms.is_finite() || delta_ms < 0.0 {
            log::warn!("ReelBank: ignoring tick of {}ms", delta_ms);
            return None;
        }
        self.clock_ms += delta_ms;
        self.dispatch_due();

        let frames = delta_ms / FRAME_MS;
        for reel in &mut self.reels {
            reel.tick(frames);
        }

        self.collect_stopped();
        self.try_resolve()
    }

    fn dispatch_due(&mut self) {
        let Some(flight) = self.flight.as_mut() else {
            return;
        };
        let spin_id = flight.spin_id;

        let mut due = Vec::new();
        while flight
            .schedule
            .front()
            .is_some_and(|c| c.at_ms <= self.clock_ms)
        {
            if let Some(command) = flight.schedule.pop_front() {
                if matches!(command.command, ReelCommand::Stop(_)) {
                    flight.stopping[command.reel_index] = true;
                }
                due.push(command);
            }
        }

        for scheduled in due {
            let index = scheduled.reel_index;
            let reel_index = index as u8;
            let Some(reel) = self.reels.get_mut(index) else {
                continue;
            };
            match scheduled.command {
                ReelCommand::Start(direction) => match reel.spin(direction) {
                    Ok(()) => self.publish(
                        spin_id,
                        BankEventKind::ReelStarted {
                            reel_index,
                            direction,
                        },
                    ),
                    Err(e) => log::error!("ReelBank: start failed: {}", e),
                },
                ReelCommand::Stop(targets) => match reel.set_target_symbols(&targets) {
                    Ok(()) => self.publish(spin_id, BankEventKind::ReelStopping { reel_index }),
                    Err(e) => log::error!("ReelBank: stop failed: {}", e),
                },
            }
        }
    }

    fn collect_stopped(&mut self) {
        let Some(flight) = self.flight.as_mut() else {
            return;
        };
        let spin_id = flight.spin_id;

        let mut newly_stopped = Vec::new();
        for (index, reel) in self.reels.iter().enumerate() {
            if flight.stopping[index] && !flight.stopped[index] && reel.is_idle() {
                flight.stopped[index] = true;
                newly_stopped.push((reel.index(), reel.visible_symbols()));
            }
        }

        for (reel_index, symbols) in newly_stopped {
            self.publish(spin_id, BankEventKind::ReelStopped { reel_index, symbols });
        }
    }

    fn try_resolve(&mut self) -> Option<SpinResult> {
        if !self.flight.as_ref().is_some_and(SpinFlight::all_stopped) {
            return None;
        }
        let flight = self.flight.take()?;

        for (index, reel) in self.reels.iter().enumerate() {
            let shown = reel.visible_symbols();
            if flight.grid.get(index) != Some(&shown) {
                log::error!(
                    "ReelBank: reel {} shows {:?}, outcome says {:?}",
                    index,
                    shown,
                    flight.grid.get(index)
                );
            }
        }

        let result = match self.outcome.resolve(flight.spin_id, flight.grid) {
            Ok(result) => result,
            Err(e) => {
                log::error!("ReelBank: evaluation of spin {} failed: {}", flight.spin_id, e);
                SpinResult::empty()
            }
        };

        for win in &result.column_wins {
            self.publish(
                flight.spin_id,
                BankEventKind::ColumnWin {
                    reel_index: win.reel_index,
                    character_id: win.character_id.clone(),
                },
            );
        }
        self.publish(
            flight.spin_id,
            BankEventKind::SpinResolved {
                total_payout: result.total_payout,
            },
        );

        log::info!(
            "ReelBank: spin {} resolved, payout {}, {} line wins, {} column wins",
            flight.spin_id,
            result.total_payout,
            result.winning_lines.len(),
            result.column_wins.len()
        );

        // The caller may have dropped the ticket
        let _ = flight.resolver.send(result.clone());
        Some(result)
    }
}

impl ReelVisibility for ReelBank {
    fn reel_count(&self) -> usize {
        self.reels.len()
    }

    fn set_reel_visible(&mut self, index: usize, visible: bool) -> ReelResult<()> {
        ReelBank::set_reel_visible(self, index, visible)
    }
}
