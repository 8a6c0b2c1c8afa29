// ABOUTME: Parameter store error types.
// ABOUTME: Distinguishes a missing parameter from backend I/O and format failures.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::ParameterName;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("parameter not found: {0}")]
    NotFound(ParameterName),

    #[error("parameter store {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode parameter store: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
