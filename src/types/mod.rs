// ABOUTME: Validated domain types for stack planning.
// ABOUTME: Uses phantom types to keep references to different resources apart.

mod id;
mod parameter_name;
mod stack_name;

pub use id::{ListenerRef, LoadBalancerRef, ResourceRef, ServiceRef, TargetGroupRef};
pub use parameter_name::{MAX_PARAMETER_NAME_LEN, ParameterName, ParameterNameError};
pub use stack_name::{StackName, StackNameError};
