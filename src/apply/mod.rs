// ABOUTME: Serial execution of an apply plan against a parameter store.
// ABOUTME: Exposes the provisioner seam, the command provisioner and the executor.

mod error;
mod executor;
mod provisioner;

pub use error::{ApplyError, ApplyFailure, ProvisionError};
pub use executor::{AppliedStack, ApplyContext, ApplyReport, Executor, missing_externals};
pub use provisioner::{CommandProvisioner, Outputs, ProvisionRequest, Provisioner};
