//! Error types for the I/O and configuration boundary.
//!
//! Derivations and aggregation are total; only reading inputs, loading
//! tables/config and writing outputs can fail.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FleetError>;

#[derive(Debug, Error)]
pub enum FleetError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input header lacks columns the core cannot do without.
    #[error("missing required columns {missing:?} (available: {available:?})")]
    MissingColumns {
        missing: Vec<String>,
        available: Vec<String>,
    },

    #[error("invalid rule at line {line}: {reason}")]
    InvalidRule { line: u64, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
