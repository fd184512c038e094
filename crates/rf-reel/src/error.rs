//! Error types for the reel side

use rf_slot::SlotError;
use thiserror::Error;

use crate::motion::MotionState;

/// Reel / bank / presenter error type
#[derive(Error, Debug)]
pub enum ReelError {
    #[error(transparent)]
    Slot(#[from] SlotError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Missing spritesheet: {0}")]
    MissingSpritesheet(String),

    #[error("Missing texture for symbol {symbol}: {display_ref}")]
    MissingTexture { symbol: String, display_ref: String },

    #[error("Missing skeleton: {0}")]
    MissingSkeleton(String),

    #[error("Unknown character: {0}")]
    UnknownCharacter(String),

    #[error("Reel {reel}: expected {expected} target symbols, got {actual}")]
    TargetLength {
        reel: u8,
        expected: usize,
        actual: usize,
    },

    #[error("Reel {reel}: cannot {action} while {state:?}")]
    InvalidTransition {
        reel: u8,
        action: &'static str,
        state: MotionState,
    },

    #[error("Reel index out of range: {0}")]
    ReelOutOfRange(usize),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),
}

/// Failure reported by the external skeletal-animation renderer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Failed to instantiate {character}: {reason}")]
    Instantiation { character: String, reason: String },

    #[error("Unknown animation {animation} for {character}")]
    UnknownAnimation { character: String, animation: String },
}

/// Result type alias
pub type ReelResult<T> = Result<T, ReelError>;
