//! Common test utilities for integration tests.

#![allow(dead_code)]

pub mod fixtures;

/// Install a fmt subscriber that writes through the test harness.
///
/// Set RUST_LOG to see engine logs, e.g. `RUST_LOG=assessment_core=debug`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
