use std::result::Result as StdResult;

use thiserror::Error;

/// Error type that captures ledger, storage and configuration failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Unknown {kind} value `{value}`")]
    UnknownVariant { kind: &'static str, value: String },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Asset limit of {0} reached")]
    AssetLimitReached(usize),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = StdResult<T, LedgerError>;
