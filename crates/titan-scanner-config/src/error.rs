//! # Configuration Error Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Config Error Categories                              │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │      File       │  │     Format      │  │      Semantics          │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Io             │  │  Parse          │  │  Invalid                │ │
//! │  │  NoConfigPath   │  │  Serialize      │  │  Validation             │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐                                                   │
//! │  │    Telemetry    │                                                   │
//! │  │  TracingInit    │                                                   │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use titan_scanner::ValidationError;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    // =========================================================================
    // File Errors
    // =========================================================================
    /// Reading or writing the config file failed.
    #[error("Config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// No explicit path and no platform config directory.
    #[error("No config path available")]
    NoConfigPath,

    // =========================================================================
    // Format Errors
    // =========================================================================
    /// The TOML file is malformed or has wrong types.
    #[error("Failed to parse scanner config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be written as TOML.
    #[error("Failed to serialize scanner config: {0}")]
    Serialize(#[from] toml::ser::Error),

    // =========================================================================
    // Semantic Errors
    // =========================================================================
    /// The config is well-formed but inconsistent.
    #[error("Invalid scanner configuration: {0}")]
    Invalid(String),

    /// A value was rejected by the scanner's own validation.
    #[error("Invalid scanner configuration: {0}")]
    Validation(#[from] ValidationError),

    // =========================================================================
    // Telemetry Errors
    // =========================================================================
    /// A global tracing subscriber is already installed.
    #[error("Failed to initialise tracing: {0}")]
    TracingInit(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_converts_to_config_error() {
        let err: ConfigError = ValidationError::OutOfRange {
            field: "inter-key timeout".to_string(),
            min: 1,
            max: 999,
        }
        .into();

        assert!(matches!(err, ConfigError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "Invalid scanner configuration: inter-key timeout must be between 1 and 999"
        );
    }
}
