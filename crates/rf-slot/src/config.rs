//! Outcome configuration — grid shape and symbol definitions

use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogEntry, SymbolCatalog, reference_entries};
use crate::error::{SlotError, SlotResult};

/// Grid specification (reels × rows)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of reels (columns)
    pub reels: u8,
    /// Number of visible rows per reel
    pub rows: u8,
}

impl GridSpec {
    /// Reference 5×3 layout
    pub fn standard_5x3() -> Self {
        Self { reels: 5, rows: 3 }
    }

    /// Total grid positions
    pub fn total_positions(&self) -> usize {
        self.reels as usize * self.rows as usize
    }

    pub fn validate(&self) -> SlotResult<()> {
        if self.reels == 0 || self.rows == 0 {
            log::error!("Grid rejected: {}×{}", self.reels, self.rows);
            return Err(SlotError::InvalidConfig(format!(
                "grid must have at least one reel and one row, got {}×{}",
                self.reels, self.rows
            )));
        }
        Ok(())
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::standard_5x3()
    }
}

/// Outcome-side configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotConfig {
    /// Grid shape
    #[serde(default)]
    pub grid: GridSpec,
    /// Symbol definitions, in sampling order
    #[serde(default = "reference_entries")]
    pub symbols: Vec<CatalogEntry>,
}

impl SlotConfig {
    /// Parse from JSON and validate
    pub fn from_json(json: &str) -> SlotResult<Self> {
        let config: Self = serde_json::from_str(json)
            .inspect_err(|e| log::error!("Failed to parse slot config JSON: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from YAML and validate
    pub fn from_yaml(yaml: &str) -> SlotResult<Self> {
        let config: Self = serde_yml::from_str(yaml)
            .inspect_err(|e| log::error!("Failed to parse slot config YAML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate grid and symbol definitions
    pub fn validate(&self) -> SlotResult<()> {
        self.grid.validate()?;
        SymbolCatalog::new(self.symbols.clone()).map(|_| ())
    }

    /// Build the validated catalog
    pub fn build_catalog(&self) -> SlotResult<SymbolCatalog> {
        SymbolCatalog::new(self.symbols.clone())
    }
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            grid: GridSpec::default(),
            symbols: reference_entries(),
        }
    }
}
