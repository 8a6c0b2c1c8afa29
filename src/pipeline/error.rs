// ABOUTME: Pipeline error types.
// ABOUTME: Covers inconsistent stage declarations and artifact rendering failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid pipeline: {0}")]
    InvalidPipeline(String),

    #[error("failed to encode artifact {name}: {source}")]
    Encode {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write artifact {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        PipelineError::InvalidPipeline(reason.into())
    }
}
