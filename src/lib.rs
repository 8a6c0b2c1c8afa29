// ABOUTME: Library root for stackplan - exposes the resolver, validators and executor.
// ABOUTME: The main binary is in main.rs.

pub mod apply;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod graph;
pub mod output;
pub mod pipeline;
pub mod store;
pub mod topology;
pub mod types;
