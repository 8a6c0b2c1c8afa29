// ABOUTME: Topology error types with SNAFU pattern.
// ABOUTME: Every failed check surfaces as InvalidTopology carrying the specific violation.

use snafu::Snafu;
use thiserror::Error;

use crate::types::{ListenerRef, LoadBalancerRef, ServiceRef, TargetGroupRef};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum TopologyError {
    #[snafu(display("invalid topology: {reason}"))]
    InvalidTopology { reason: Violation },

    #[snafu(display("invalid traffic shift '{policy}': {reason}"))]
    InvalidTrafficShift { policy: String, reason: String },
}

impl TopologyError {
    /// The violated topology rule, if this is a topology failure.
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            TopologyError::InvalidTopology { reason } => Some(reason),
            TopologyError::InvalidTrafficShift { .. } => None,
        }
    }
}

/// A specific reason a blue/green topology is inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("service '{0}' is not declared")]
    UnknownService(ServiceRef),

    #[error("listener '{0}' is not declared")]
    UnknownListener(ListenerRef),

    #[error("target group '{0}' is not declared")]
    UnknownTargetGroup(TargetGroupRef),

    #[error("production and test traffic both use listener '{0}'")]
    SameListener(ListenerRef),

    #[error("blue and green both use target group '{0}'")]
    SameTargetGroup(TargetGroupRef),

    #[error("HTTPS listener '{0}' has no certificate")]
    MissingCertificate(ListenerRef),

    #[error("{resource} is on load balancer '{found}', expected '{expected}'")]
    LoadBalancerMismatch {
        resource: String,
        expected: LoadBalancerRef,
        found: LoadBalancerRef,
    },

    #[error("production and test listeners both use port {0}")]
    SamePort(u16),

    #[error("target group '{target_group}' does not register service '{service}'")]
    ServiceNotRegistered {
        target_group: TargetGroupRef,
        service: ServiceRef,
    },

    #[error("service '{0}' declares no deployment controller")]
    NoDeploymentController(ServiceRef),

    #[error("service '{0}' declares more than one deployment controller type")]
    MultipleDeploymentControllers(ServiceRef),

    #[error("service '{0}' has no capacity provider with a positive weight")]
    NoCapacity(ServiceRef),
}
