// ABOUTME: Error types for dependency graph construction.
// ABOUTME: Every variant is a planning-time configuration error; none are retried.

use crate::types::{ParameterName, StackName};

/// Errors raised while deriving the stack dependency graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Two stacks share a name.
    #[error("stack '{0}' is declared more than once")]
    DuplicateStack(StackName),

    /// More than one producer publishes the same parameter.
    #[error("parameter {parameter} has more than one producer: {}", format_producers(.producers))]
    AmbiguousProducer {
        parameter: ParameterName,
        producers: Vec<String>,
    },

    /// A stack reads a parameter nobody publishes.
    #[error("parameter {parameter} read by stack '{consumer}' has no producer")]
    UnresolvedDependency {
        parameter: ParameterName,
        consumer: StackName,
    },

    /// Stacks depend on each other in a loop. The path repeats its first stack at the end.
    #[error("cyclic dependency: {}", format_cycle(.path))]
    CyclicDependency { path: Vec<StackName> },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphErrorKind {
    DuplicateStack,
    AmbiguousProducer,
    UnresolvedDependency,
    CyclicDependency,
}

impl GraphError {
    pub fn kind(&self) -> GraphErrorKind {
        match self {
            GraphError::DuplicateStack(_) => GraphErrorKind::DuplicateStack,
            GraphError::AmbiguousProducer { .. } => GraphErrorKind::AmbiguousProducer,
            GraphError::UnresolvedDependency { .. } => GraphErrorKind::UnresolvedDependency,
            GraphError::CyclicDependency { .. } => GraphErrorKind::CyclicDependency,
        }
    }

    /// The parameter at fault, for errors tied to one.
    pub fn parameter(&self) -> Option<&ParameterName> {
        match self {
            GraphError::AmbiguousProducer { parameter, .. }
            | GraphError::UnresolvedDependency { parameter, .. } => Some(parameter),
            _ => None,
        }
    }
}

fn format_producers(producers: &[String]) -> String {
    producers.join(", ")
}

fn format_cycle(path: &[StackName]) -> String {
    path.iter()
        .map(StackName::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}
