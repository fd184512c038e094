//! Machine configuration — everything needed to build a [`SlotMachine`]
//!
//! [`SlotMachine`]: crate::machine::SlotMachine

use rf_slot::{SlotConfig, SymbolCatalog};
use serde::{Deserialize, Serialize};

use crate::bonus::BonusConfig;
use crate::error::{ReelError, ReelResult};
use crate::layout::ReelLayout;
use crate::motion::MotionConfig;
use crate::timing::TimingConfig;

/// Default spritesheet holding the symbol frames
pub const DEFAULT_SYMBOL_SHEET: &str = "symbols";

/// Complete machine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Grid shape and symbol definitions
    #[serde(default)]
    pub slot: SlotConfig,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub layout: ReelLayout,
    #[serde(default)]
    pub bonus: BonusConfig,
    /// Spritesheet the symbol textures come from; empty means standalone
    /// textures only
    #[serde(default = "default_symbol_sheet")]
    pub symbol_sheet: String,
}

fn default_symbol_sheet() -> String {
    DEFAULT_SYMBOL_SHEET.to_string()
}

impl MachineConfig {
    /// Parse from JSON and validate
    pub fn from_json(json: &str) -> ReelResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from YAML and validate
    pub fn from_yaml(yaml: &str) -> ReelResult<Self> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> ReelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ReelResult<()> {
        self.slot.validate()?;
        self.motion.validate()?;
        self.timing.validate()?;
        self.bonus.validate()?;

        if (self.layout.symbol_height - self.motion.symbol_height).abs() > f64::EPSILON {
            log::warn!(
                "Layout symbol height {} differs from motion symbol height {}",
                self.layout.symbol_height,
                self.motion.symbol_height
            );
        }

        let catalog = self.slot.build_catalog()?;
        self.check_characters(&catalog)
    }

    /// Every character a symbol links to needs a bonus binding
    fn check_characters(&self, catalog: &SymbolCatalog) -> ReelResult<()> {
        for entry in catalog.entries() {
            if let Some(character) = entry.character_id() {
                if self.bonus.character(character).is_none() {
                    return Err(ReelError::InvalidConfig(format!(
                        "symbol {} links to character '{}' with no bonus binding",
                        entry.name, character
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            slot: SlotConfig::default(),
            motion: MotionConfig::default(),
            timing: TimingConfig::default(),
            layout: ReelLayout::default(),
            bonus: BonusConfig::default(),
            symbol_sheet: default_symbol_sheet(),
        }
    }
}
