//! Tracing and logging setup shared by the venuity binaries.

use tracing_subscriber::EnvFilter;

use venuity_core::Environment;

/// Initialize process-wide tracing/logging.
///
/// Development gets human-readable output on stderr; every other environment
/// emits JSON lines suitable for log shipping. The filter is configurable via
/// `RUST_LOG` and defaults to `info`.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init(environment: Environment) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if environment.is_development() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .with_target(false)
            .try_init();
    }
}
