// ABOUTME: Blue/green deployment topology: resource records, traffic shifting and validation.
// ABOUTME: Checks that listeners, target groups and the service form a consistent pair of routes.

mod error;
mod model;
mod traffic;
mod validate;

pub use error::{InvalidTopologySnafu, InvalidTrafficShiftSnafu, TopologyError, Violation};
pub use model::{
    BlueGreenTopology, CapacityProviderStrategy, DeploymentControllerType, HealthCheck,
    ListenerProtocol, ListenerRecord, ServiceRecord, TargetGroupRecord, TopologyResources,
};
pub use traffic::{ShiftStep, TrafficShift};
pub use validate::{ValidatedTopology, validate_topology};
