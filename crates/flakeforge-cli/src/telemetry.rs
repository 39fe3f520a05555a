//! Structured logging for the `flakeforge` binary.
//!
//! Logs go to stderr so stdout carries nothing but generated output.
//! Filtering comes from `RUST_LOG`, falling back to `info`.

use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global `tracing` subscriber.
pub fn init_tracing() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
