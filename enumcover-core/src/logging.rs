//! Structured logging using **tracing**.
//!
//! The library only emits events; binaries decide where they go by calling
//! [`init_structured_logging`] once at startup. Events are JSON lines on
//! stderr so stdout stays reserved for diagnostics output.

use tracing::{error, info, warn};

/// Initializes the global tracing subscriber.
///
/// # Environment Variables
/// - `RUST_LOG`: Controls log filtering (e.g., `RUST_LOG=enumcover_core=debug`)
pub fn init_structured_logging() {
    // May run more than once per process (LSP restarts, tests).
    let _ = tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_current_span(true)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Logs a warning event.
pub fn log_warn(message: &str) {
    warn!(detail = %message);
}

/// Logs an info event.
pub fn log_info(message: &str) {
    info!(detail = %message);
}

/// Logs an error event.
pub fn log_error(message: &str) {
    error!(detail = %message);
}
