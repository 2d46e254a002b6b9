//! # titan-scanner-config: Scanner Configuration
//!
//! Everything in the scanner stack that touches the file system or the
//! process environment lives here, keeping `titan-scanner` free of I/O.
//!
//! ## Modules
//!
//! - [`config`] - `ScannerConfig`: TOML file + environment overrides
//! - [`error`] - Configuration error types
//! - [`telemetry`] - tracing subscriber setup
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use titan_scanner_config::{telemetry, ScannerConfig};
//!
//! telemetry::init_tracing();
//!
//! let config = ScannerConfig::load_or_default(None);
//! let session = config.build_session().expect("validated config");
//! assert!(session.is_attached());
//! ```

pub mod config;
pub mod error;
pub mod telemetry;

pub use config::{RuleConfig, ScannerConfig, ScannerSection};
pub use error::{ConfigError, ConfigResult};
