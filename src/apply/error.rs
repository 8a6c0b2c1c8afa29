// ABOUTME: Error types for plan execution.
// ABOUTME: An apply error names the failed stack, the cause and the stacks left unapplied.

use std::time::Duration;
use thiserror::Error;

use crate::store::StoreError;
use crate::types::{ParameterName, StackName};

/// Failures of the external provisioning command.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("provisioner command is empty")]
    EmptyCommand,

    #[error("failed to start provisioner: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("provisioner timed out after {0:?}")]
    Timeout(Duration),

    #[error("provisioner exited with code {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },

    #[error("invalid provisioner output: {0}")]
    InvalidOutput(String),
}

/// Why a single stack could not be applied.
#[derive(Debug, Error)]
pub enum ApplyFailure {
    #[error("failed to read input: {0}")]
    Input(#[source] StoreError),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error("declared output {0} was not produced")]
    MissingOutput(ParameterName),

    #[error("produced output {0} is not declared in writes")]
    UndeclaredOutput(ParameterName),

    /// Outputs are published one at a time; `published` lists the ones
    /// already in the store when `output` failed.
    #[error("failed to publish output {output}: {source}{}", format_published(.published))]
    Publish {
        output: ParameterName,
        #[source]
        source: StoreError,
        published: Vec<ParameterName>,
    },
}

/// The first failure of an apply run. Everything after `stack` was skipped.
#[derive(Debug, Error)]
#[error("stack '{stack}' failed: {cause}{}", format_remaining(.remaining))]
pub struct ApplyError {
    pub stack: StackName,
    #[source]
    pub cause: ApplyFailure,
    /// Stacks applied before the failure, in order.
    pub applied: Vec<StackName>,
    /// Stacks never attempted, in order.
    pub remaining: Vec<StackName>,
}

impl ApplyError {
    /// True when the failure was a parameter store miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self.cause, ApplyFailure::Input(StoreError::NotFound(_)))
    }
}

fn format_remaining(remaining: &[StackName]) -> String {
    if remaining.is_empty() {
        return String::new();
    }
    let names: Vec<&str> = remaining.iter().map(StackName::as_str).collect();
    format!(" (not applied: {})", names.join(", "))
}

fn format_published(published: &[ParameterName]) -> String {
    if published.is_empty() {
        return String::new();
    }
    let names: Vec<&str> = published.iter().map(ParameterName::as_str).collect();
    format!(" (already published: {})", names.join(", "))
}
