// Logging setup for the server binary
// The library only emits `tracing` events; installing a subscriber is left to binaries

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.
///
/// The level filter comes from `RUST_LOG` and defaults to `info`,
/// e.g. `RUST_LOG=shiftopt=debug` to see model sizes per constraint family.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .init();
}
