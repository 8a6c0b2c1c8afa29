// ABOUTME: Cross-stack dependency graph derived from parameter reads and writes.
// ABOUTME: Exports stack descriptors, the validated graph and the apply plan emitter.

mod builder;
mod descriptor;
mod error;
mod plan;

pub use builder::{DependencyEdge, DependencyGraph};
pub use descriptor::StackDescriptor;
pub use error::{GraphError, GraphErrorKind};
pub use plan::{ApplyPlan, PlanStep};
