//! Error types for the outcome side

use thiserror::Error;

use crate::catalog::SymbolId;

/// Catalog / outcome error type
#[derive(Error, Debug)]
pub enum SlotError {
    #[error("Symbol not found: {0}")]
    SymbolNotFound(SymbolId),

    #[error("Unknown symbol name: {0}")]
    UnknownSymbolName(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Malformed grid: {0}")]
    MalformedGrid(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),
}

/// Result type alias
pub type SlotResult<T> = Result<T, SlotError>;
