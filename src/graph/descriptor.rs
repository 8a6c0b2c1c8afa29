// ABOUTME: Stack descriptor: a named unit of infrastructure and the parameters it exchanges.
// ABOUTME: Reads and writes are sets of fully qualified parameter names.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::types::{ParameterName, StackName};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackDescriptor {
    pub name: StackName,
    /// Parameters this stack consumes, owned by other stacks or seeded externally.
    pub reads: BTreeSet<ParameterName>,
    /// Parameters this stack publishes exactly once per apply.
    pub writes: BTreeSet<ParameterName>,
}

impl StackDescriptor {
    pub fn new(name: StackName) -> Self {
        Self {
            name,
            reads: BTreeSet::new(),
            writes: BTreeSet::new(),
        }
    }

    pub fn reads<I>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = ParameterName>,
    {
        self.reads.extend(names);
        self
    }

    pub fn writes<I>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = ParameterName>,
    {
        self.writes.extend(names);
        self
    }
}
