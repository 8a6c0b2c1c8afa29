// ABOUTME: Test support utilities.
// ABOUTME: Provides tracing setup and stack descriptor builders for integration tests.

use stackplan::graph::StackDescriptor;
use stackplan::types::{ParameterName, StackName};
use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("stackplan=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Parameter under the `/api` namespace.
#[allow(dead_code)]
pub fn param(key: &str) -> ParameterName {
    ParameterName::in_namespace("/api", key).unwrap()
}

/// Stack reading and writing `/api/<key>` parameters.
#[allow(dead_code)]
pub fn stack(name: &str, reads: &[&str], writes: &[&str]) -> StackDescriptor {
    StackDescriptor::new(StackName::new(name).unwrap())
        .reads(reads.iter().map(|k| param(k)))
        .writes(writes.iter().map(|k| param(k)))
}
