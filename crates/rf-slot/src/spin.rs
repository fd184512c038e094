//! Spin result types

use serde::{Deserialize, Serialize};

use crate::catalog::SymbolId;

/// Symbol grid, indexed `grid[reel][row]` (rows top to bottom)
pub type Grid = Vec<Vec<SymbolId>>;

/// A win on a single horizontal payline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineWin {
    /// Row index (0 = top)
    pub row: u8,
    /// Matched symbol (the row's first symbol)
    pub symbol_id: SymbolId,
    /// Symbol name
    pub symbol_name: String,
    /// Number of consecutive matching reels from the left
    pub run_length: u8,
    /// value(symbol) × run length
    pub payout: f64,
    /// Symbols in the run, wilds reported as the matched symbol
    pub symbols: Vec<SymbolId>,
    /// Reels within the run that held a wild
    pub wild_reels: Vec<u8>,
}

/// A reel whose whole visible column is one character symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnWin {
    pub reel_index: u8,
    pub symbol_id: SymbolId,
    pub character_id: String,
}

/// Result of evaluating a grid
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Winning lines, ordered by row
    pub winning_lines: Vec<LineWin>,
    /// Column-win triggers, ordered by reel
    pub column_wins: Vec<ColumnWin>,
    /// Sum of line payouts (column wins pay nothing)
    pub total_payout: f64,
}

/// Complete, immutable spin outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinResult {
    /// Spin ID (0 for a rejected spin)
    pub spin_id: u64,
    /// Final grid (reels × rows)
    pub grid: Grid,
    /// Winning lines
    pub winning_lines: Vec<LineWin>,
    /// Column-win triggers
    pub column_wins: Vec<ColumnWin>,
    /// Total payout
    pub total_payout: f64,
}

impl SpinResult {
    /// Create a result from a grid and its evaluation
    pub fn new(spin_id: u64, grid: Grid, evaluation: Evaluation) -> Self {
        Self {
            spin_id,
            grid,
            winning_lines: evaluation.winning_lines,
            column_wins: evaluation.column_wins,
            total_payout: evaluation.total_payout,
        }
    }

    /// The zero result returned for a rejected spin
    pub fn empty() -> Self {
        Self {
            spin_id: 0,
            grid: Vec::new(),
            winning_lines: Vec::new(),
            column_wins: Vec::new(),
            total_payout: 0.0,
        }
    }

    /// True for the zero result of a rejected spin
    pub fn is_empty(&self) -> bool {
        self.spin_id == 0 && self.grid.is_empty()
    }

    pub fn is_win(&self) -> bool {
        self.total_payout > 0.0
    }

    /// Line wins plus column wins
    pub fn win_count(&self) -> usize {
        self.winning_lines.len() + self.column_wins.len()
    }

    /// Winning line on a row, if any
    pub fn line_for_row(&self, row: u8) -> Option<&LineWin> {
        self.winning_lines.iter().find(|l| l.row == row)
    }

    /// Symbols of one reel (top to bottom)
    pub fn column(&self, reel: usize) -> Option<&[SymbolId]> {
        self.grid.get(reel).map(|c| c.as_slice())
    }
}
