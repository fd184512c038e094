//! Outcome Engine — grid generation and evaluation
//!
//! Generation is weighted-random per cell with no correlation between cells
//! or reels. Evaluation is a pure function of the catalog and the grid.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::catalog::{SymbolCatalog, SymbolId};
use crate::error::{SlotError, SlotResult};
use crate::spin::{ColumnWin, Evaluation, Grid, LineWin, SpinResult};

/// Minimum run length for a winning line
pub const MIN_LINE_RUN: u8 = 3;

/// Session statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_spins: u64,
    pub winning_spins: u64,
    pub total_payout: f64,
    pub column_wins: u64,
    pub max_payout: f64,
}

impl SessionStats {
    /// Percentage of spins that paid something
    pub fn hit_rate(&self) -> f64 {
        if self.total_spins > 0 {
            (self.winning_spins as f64 / self.total_spins as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Average payout per spin
    pub fn average_payout(&self) -> f64 {
        if self.total_spins > 0 {
            self.total_payout / self.total_spins as f64
        } else {
            0.0
        }
    }

    fn record(&mut self, result: &SpinResult) {
        self.total_spins += 1;
        if result.is_win() {
            self.winning_spins += 1;
        }
        self.total_payout += result.total_payout;
        self.column_wins += result.column_wins.len() as u64;
        self.max_payout = self.max_payout.max(result.total_payout);
    }
}

/// Weighted grid generator and evaluator
pub struct OutcomeEngine {
    catalog: Arc<SymbolCatalog>,
    rng: StdRng,
    stats: SessionStats,
}

impl OutcomeEngine {
    /// Create an engine seeded from the OS
    pub fn new(catalog: Arc<SymbolCatalog>) -> Self {
        Self::with_rng(catalog, StdRng::from_os_rng())
    }

    /// Create an engine with a fixed seed
    pub fn with_seed(catalog: Arc<SymbolCatalog>, seed: u64) -> Self {
        Self::with_rng(catalog, StdRng::seed_from_u64(seed))
    }

    fn with_rng(catalog: Arc<SymbolCatalog>, rng: StdRng) -> Self {
        Self {
            catalog,
            rng,
            stats: SessionStats::default(),
        }
    }

    /// Reseed for reproducible results
    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn catalog(&self) -> &Arc<SymbolCatalog> {
        &self.catalog
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = SessionStats::default();
    }

    /// Sample every cell independently
    pub fn generate_grid(&mut self, rows: usize, reels: usize) -> Grid {
        (0..reels)
            .map(|_| {
                (0..rows)
                    .map(|_| self.catalog.weighted_sample(&mut self.rng))
                    .collect()
            })
            .collect()
    }

    /// Evaluate a grid against this engine's catalog
    pub fn evaluate(&self, grid: &[Vec<SymbolId>]) -> SlotResult<Evaluation> {
        evaluate(&self.catalog, grid)
    }

    /// Evaluate a grid into a spin result and record it in the session stats
    pub fn resolve(&mut self, spin_id: u64, grid: Grid) -> SlotResult<SpinResult> {
        let evaluation = self.evaluate(&grid)?;
        let result = SpinResult::new(spin_id, grid, evaluation);
        self.stats.record(&result);
        Ok(result)
    }
}

/// Evaluate horizontal paylines and column-win triggers
///
/// Fails if the grid is ragged or references a symbol the catalog lacks.
pub fn evaluate(catalog: &SymbolCatalog, grid: &[Vec<SymbolId>]) -> SlotResult<Evaluation> {
    let Some(first_column) = grid.first() else {
        return Ok(Evaluation::default());
    };
    let rows = first_column.len();

    for (reel, column) in grid.iter().enumerate() {
        if column.len() != rows {
            return Err(SlotError::MalformedGrid(format!(
                "reel {} has {} rows, expected {}",
                reel,
                column.len(),
                rows
            )));
        }
        for &id in column {
            catalog.lookup(id)?;
        }
    }

    let column_wins = scan_columns(catalog, grid);

    let mut winning_lines = Vec::new();
    for row in 0..rows {
        if let Some(line) = scan_row(catalog, grid, row)? {
            winning_lines.push(line);
        }
    }

    let total_payout = winning_lines.iter().map(|l| l.payout).sum();

    Ok(Evaluation {
        winning_lines,
        column_wins,
        total_payout,
    })
}

fn scan_columns(catalog: &SymbolCatalog, grid: &[Vec<SymbolId>]) -> Vec<ColumnWin> {
    grid.iter()
        .enumerate()
        .filter_map(|(reel, column)| {
            let &first = column.first()?;
            if catalog.is_wild(first) || column.iter().any(|&id| id != first) {
                return None;
            }
            let character_id = catalog.character_of(first)?;
            Some(ColumnWin {
                reel_index: reel as u8,
                symbol_id: first,
                character_id: character_id.to_string(),
            })
        })
        .collect()
}

// The row's first symbol is the match key, wild or not. An all-wild row
// therefore pays as WILD at the wild's own value.
fn scan_row(
    catalog: &SymbolCatalog,
    grid: &[Vec<SymbolId>],
    row: usize,
) -> SlotResult<Option<LineWin>> {
    let key = grid[0][row];

    let mut run_length = 0u8;
    let mut wild_reels = Vec::new();
    for (reel, column) in grid.iter().enumerate() {
        let symbol = column[row];
        if symbol == key || catalog.is_wild(symbol) {
            if symbol != key {
                wild_reels.push(reel as u8);
            }
            run_length += 1;
        } else {
            break;
        }
    }

    if run_length < MIN_LINE_RUN {
        return Ok(None);
    }

    let entry = catalog.lookup(key)?;
    Ok(Some(LineWin {
        row: row as u8,
        symbol_id: key,
        symbol_name: entry.name.clone(),
        run_length,
        payout: entry.value * run_length as f64,
        symbols: vec![key; run_length as usize],
        wild_reels,
    }))
}
