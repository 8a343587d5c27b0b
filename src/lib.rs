pub mod config;
pub mod engine;
pub mod memory;
pub mod models;
pub mod triage;

use tracing_subscriber::EnvFilter;

pub use engine::TriageEngine;

/// Initialize tracing for binaries embedding the engine.
///
/// Honors RUST_LOG when set, otherwise uses the crate default. Safe to call
/// more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();
}
