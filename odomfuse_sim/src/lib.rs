// odomfuse_sim/src/lib.rs

// This prelude is for convenience for other files WITHIN the odomfuse_sim crate.
pub mod prelude;

pub mod cli;
pub mod error;
pub mod simulation;

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,odomfuse_core=info,odomfuse_sim=debug";

/// Installs the global `tracing` subscriber. `quiet` raises the default filter to
/// warnings; `RUST_LOG` still wins when set.
pub fn init_logging(quiet: bool) {
    let default_filter = if quiet { "warn" } else { DEFAULT_LOG_FILTER };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // A second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
