//! BankEvent — a spin lifecycle occurrence with bank timestamp
//!
//! Published by the reel bank on every subscribed channel, in the order they
//! happen. A spin's events always end with `SpinResolved`.

use rf_slot::SymbolId;
use serde::{Deserialize, Serialize};

use crate::motion::Direction;

/// A bank event with metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankEvent {
    /// Bank clock when the event fired (ms)
    pub timestamp_ms: f64,

    /// Spin this event belongs to
    pub spin_id: u64,

    pub kind: BankEventKind,
}

impl BankEvent {
    pub fn new(timestamp_ms: f64, spin_id: u64, kind: BankEventKind) -> Self {
        Self {
            timestamp_ms,
            spin_id,
            kind,
        }
    }

    /// Reel the event refers to, if any
    pub fn reel_index(&self) -> Option<u8> {
        match &self.kind {
            BankEventKind::ReelStarted { reel_index, .. }
            | BankEventKind::ReelStopping { reel_index }
            | BankEventKind::ReelStopped { reel_index, .. }
            | BankEventKind::ColumnWin { reel_index, .. } => Some(*reel_index),
            BankEventKind::SpinStarted | BankEventKind::SpinResolved { .. } => None,
        }
    }

    /// Short name for logging
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

/// What happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BankEventKind {
    /// Grid drawn, reel commands scheduled
    SpinStarted,
    /// A reel left rest
    ReelStarted { reel_index: u8, direction: Direction },
    /// A reel received its target symbols
    ReelStopping { reel_index: u8 },
    /// A reel came to rest
    ReelStopped {
        reel_index: u8,
        symbols: Vec<SymbolId>,
    },
    /// A reel's whole column shows one character symbol
    ColumnWin { reel_index: u8, character_id: String },
    /// All reels idle, grid evaluated
    SpinResolved { total_payout: f64 },
}

impl BankEventKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            BankEventKind::SpinStarted => "SPIN_STARTED",
            BankEventKind::ReelStarted { .. } => "REEL_STARTED",
            BankEventKind::ReelStopping { .. } => "REEL_STOPPING",
            BankEventKind::ReelStopped { .. } => "REEL_STOPPED",
            BankEventKind::ColumnWin { .. } => "COLUMN_WIN",
            BankEventKind::SpinResolved { .. } => "SPIN_RESOLVED",
        }
    }
}
