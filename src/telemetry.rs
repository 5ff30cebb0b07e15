//! Ambient `tracing` bootstrap for anything embedding this crate as a binary.
//!
//! The library itself never installs a global subscriber on its own initiative —
//! only a binary's `main` should do that — but it ships the same
//! `tracing-subscriber` `EnvFilter`-driven init the crate this workspace was built
//! from installs at its own entry point, so an embedder doesn't have to hand-roll it.

use tracing_subscriber::EnvFilter;

/// Installs a global `tracing` subscriber filtered by `RUST_LOG`, falling back to
/// `taskctl=info`. Call once from a binary's `main`; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "taskctl=info".into()))
        .try_init();
}

/// Test-only variant that writes through the test harness's captured output rather
/// than stdout, so supervisor/driver logs show up inline with `cargo test --
/// --nocapture` failures instead of being swallowed.
#[cfg(test)]
pub(crate) fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
