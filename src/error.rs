// ABOUTME: Application-wide error types for stackplan.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

use crate::apply::ApplyError;
use crate::graph::GraphError;
use crate::pipeline::PipelineError;
use crate::store::StoreError;
use crate::topology::TopologyError;
use crate::types::ParameterNameError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("unknown environment: {0}")]
    UnknownEnvironment(String),

    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid parameter '{key}': {source}")]
    InvalidParameter {
        key: String,
        #[source]
        source: ParameterNameError,
    },

    #[error("manifest declares no {0}")]
    NotDeclared(&'static str),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Apply(#[from] ApplyError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
