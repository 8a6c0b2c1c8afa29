// ABOUTME: Parameter store adapter: publish and read named values across stacks.
// ABOUTME: Exposes the ParameterStore trait with in-memory and file-backed implementations.

mod error;
mod file;
mod memory;

pub use error::{Result, StoreError};
pub use file::{DEFAULT_STORE_PATH, FileStore, StoredParameter};
pub use memory::MemoryStore;

use crate::types::ParameterName;

/// Key-value backend shared by every stack in a deployment namespace.
///
/// Calls are blocking. Failures propagate to the caller; there are no retries
/// at this layer.
pub trait ParameterStore: Send + Sync {
    /// Publish a value, replacing any previous one.
    fn put(&self, name: &ParameterName, value: &str) -> Result<()>;

    /// Read a value, failing with [`StoreError::NotFound`] if it was never published.
    fn get(&self, name: &ParameterName) -> Result<String>;

    /// All published names in sorted order.
    fn list(&self) -> Result<Vec<ParameterName>>;

    fn contains(&self, name: &ParameterName) -> Result<bool> {
        match self.get(name) {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
