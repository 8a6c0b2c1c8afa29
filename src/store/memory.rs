// ABOUTME: In-memory parameter store.
// ABOUTME: Used for dry runs and tests; contents vanish with the process.

use parking_lot::RwLock;
use std::collections::BTreeMap;

use super::{ParameterStore, Result, StoreError};
use crate::types::ParameterName;

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<BTreeMap<ParameterName, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with the given values.
    pub fn with_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = (ParameterName, String)>,
    {
        Self {
            values: RwLock::new(values.into_iter().collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl ParameterStore for MemoryStore {
    fn put(&self, name: &ParameterName, value: &str) -> Result<()> {
        tracing::debug!("put {} (memory)", name);
        self.values.write().insert(name.clone(), value.to_string());
        Ok(())
    }

    fn get(&self, name: &ParameterName) -> Result<String> {
        self.values
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.clone()))
    }

    fn list(&self) -> Result<Vec<ParameterName>> {
        Ok(self.values.read().keys().cloned().collect())
    }
}
