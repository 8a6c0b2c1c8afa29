// ABOUTME: Diagnostics accumulator for non-fatal findings during validation and planning.
// ABOUTME: Collects warnings that shouldn't fail a plan but should be shown to users.

use serde::Serialize;
use std::fmt::Display;

/// Collects non-fatal warnings while a configuration is checked.
#[derive(Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning. Output prints it; tracing only sees it at debug level.
    pub fn warn(&mut self, warning: Warning) {
        tracing::debug!(kind = ?warning.kind, "{}", warning.message);
        self.warnings.push(warning);
    }

    pub fn extend(&mut self, warnings: impl IntoIterator<Item = Warning>) {
        for warning in warnings {
            self.warn(warning);
        }
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A non-fatal finding.
#[derive(Debug, Clone, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// A stack publishes a parameter nothing reads.
    pub fn unconsumed_output(stack: impl Display, parameter: impl Display) -> Self {
        Self {
            kind: WarningKind::UnconsumedOutput,
            message: format!("stack '{stack}' writes {parameter} but no stack reads it"),
        }
    }

    /// An external parameter is declared but never read.
    pub fn unused_external(parameter: impl Display) -> Self {
        Self {
            kind: WarningKind::UnusedExternal,
            message: format!("external parameter {parameter} is not read by any stack"),
        }
    }

    /// An external parameter some stack reads has no value in the store yet.
    pub fn missing_external(parameter: impl Display) -> Self {
        Self {
            kind: WarningKind::MissingExternal,
            message: format!("external parameter {parameter} has no value in the store"),
        }
    }

    /// The service is driven by the ECS controller instead of CodeDeploy.
    pub fn ecs_controller(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::EcsController,
            message: message.into(),
        }
    }

    /// Every capacity provider of the service is spot capacity.
    pub fn spot_only_capacity(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::SpotOnlyCapacity,
            message: message.into(),
        }
    }
}

/// Categories of warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A written parameter has no reader.
    UnconsumedOutput,
    /// A declared external parameter has no reader.
    UnusedExternal,
    MissingExternal,
    EcsController,
    SpotOnlyCapacity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_starts_empty() {
        let diag = Diagnostics::default();
        assert!(!diag.has_warnings());
        assert!(diag.warnings().is_empty());
    }

    #[test]
    fn diagnostics_collects_warnings() {
        let mut diag = Diagnostics::default();

        diag.warn(Warning::unconsumed_output("ecr", "/api/ecrRepositoryArn"));
        diag.extend([Warning::unused_external("/api/hostedZoneId")]);

        assert!(diag.has_warnings());
        assert_eq!(diag.warnings().len(), 2);
    }

    #[test]
    fn warning_constructors_set_correct_kind() {
        assert_eq!(Warning::unconsumed_output("a", "/p").kind, WarningKind::UnconsumedOutput);
        assert_eq!(Warning::unused_external("/p").kind, WarningKind::UnusedExternal);
        assert_eq!(Warning::missing_external("/p").kind, WarningKind::MissingExternal);
        assert_eq!(Warning::ecs_controller("svc").kind, WarningKind::EcsController);
        assert_eq!(Warning::spot_only_capacity("svc").kind, WarningKind::SpotOnlyCapacity);
    }

    #[test]
    fn warning_message_names_stack_and_parameter() {
        let warning = Warning::unconsumed_output("ecr", "/api/ecrRepositoryArn");
        assert!(warning.message.contains("'ecr'"));
        assert!(warning.message.contains("/api/ecrRepositoryArn"));
    }
}
