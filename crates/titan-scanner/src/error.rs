//! # Error Types
//!
//! Error types for titan-scanner.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  titan-scanner errors (this file)                                      │
//! │  ├── ValidationError  - Rejected configuration calls                   │
//! │  └── ListenerError    - Returned by a failing scan listener            │
//! │                                                                         │
//! │  titan-scanner-config errors (separate crate)                          │
//! │  └── ConfigError      - File / environment / TOML failures             │
//! │                                                                         │
//! │  Unclassifiable text is NOT an error: it yields BarcodeType::Unknown.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. A rejected call commits nothing
//! 3. Listener failures are reported, never propagated

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Configuration API validation errors.
///
/// Returned by setters and rule registration. When one of these comes back the
/// session is exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: u64, max: u64 },

    /// Invalid format (e.g., a pattern that does not compile).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is reserved for a built-in barcode type.
    ///
    /// ## When This Occurs
    /// Registering a custom rule under `ean`, `UPC`, `FNSKU`, `unknown`, ...
    #[error("{field} '{value}' is reserved for a built-in barcode type")]
    Reserved { field: String, value: String },
}

// =============================================================================
// Listener Error
// =============================================================================

/// Error a [`ScanListener`](crate::ScanListener) returns when it could not
/// handle a scan.
///
/// The session logs it, records it in the
/// [`DispatchReport`](crate::DispatchReport) and carries on with the next
/// listener.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenerError {
    /// The listener rejected the scan.
    #[error("{0}")]
    Failed(String),

    /// The listener panicked while handling the scan.
    #[error("listener panicked: {0}")]
    Panicked(String),
}

impl ListenerError {
    /// Creates a [`ListenerError::Failed`] from any displayable message.
    pub fn failed(message: impl Into<String>) -> Self {
        ListenerError::Failed(message.into())
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for listener results.
pub type ListenerResult = Result<(), ListenerError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "rule key".to_string(),
        };
        assert_eq!(err.to_string(), "rule key is required");

        let err = ValidationError::OutOfRange {
            field: "inter-key timeout".to_string(),
            min: 1,
            max: 999,
        };
        assert_eq!(err.to_string(), "inter-key timeout must be between 1 and 999");
    }

    #[test]
    fn test_reserved_error_message() {
        let err = ValidationError::Reserved {
            field: "rule key".to_string(),
            value: "EAN".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "rule key 'EAN' is reserved for a built-in barcode type"
        );
    }

    #[test]
    fn test_listener_error_messages() {
        assert_eq!(ListenerError::failed("printer offline").to_string(), "printer offline");
        assert_eq!(
            ListenerError::Panicked("boom".to_string()).to_string(),
            "listener panicked: boom"
        );
    }
}
