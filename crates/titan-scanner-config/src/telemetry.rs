//! # Telemetry
//!
//! tracing subscriber setup for hosts embedding the scanner.
//!
//! ## Log Levels
//! - `RUST_LOG=debug` - Show debug messages (rule registration, dropped bursts)
//! - `RUST_LOG=titan_scanner=trace` - Also show stale-buffer replacement
//! - Default: INFO, with debug for the scanner crates

use tracing_subscriber::EnvFilter;

use crate::error::{ConfigError, ConfigResult};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,titan_scanner=debug,titan_scanner_config=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global fmt subscriber.
///
/// Panics if a global subscriber is already set; use [`try_init_tracing`]
/// where that can happen (tests, plugins).
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .init();
}

/// Installs the global fmt subscriber, reporting instead of panicking if one
/// is already set.
pub fn try_init_tracing() -> ConfigResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .try_init()
        .map_err(|e| ConfigError::TracingInit(e.to_string()))
}
