//! # Validation Module
//!
//! Input validation for the scanner configuration API.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: titan-scanner-config                                         │
//! │  ├── TOML / env parsing (types, syntax)                                │
//! │  └── Duplicate rule keys inside one file                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Timeout range, ending keys, rule keys, display names, patterns    │
//! │  └── Called by every setter BEFORE anything is mutated                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use titan_scanner::validation::{validate_inter_key_timeout, validate_rule_key};
//!
//! assert!(validate_inter_key_timeout(100).is_ok());
//! assert!(validate_inter_key_timeout(1000).is_err());
//! assert!(validate_rule_key("EAN").is_err()); // built-in
//! ```

use crate::error::ValidationError;
use crate::types::BarcodeType;
use crate::{MAX_DISPLAY_NAME_LEN, MAX_INTER_KEY_TIMEOUT_MS, MAX_RULE_KEY_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Rule Validators
// =============================================================================

/// Validates a custom rule key.
///
/// ## Rules
/// - Must not be empty or blank
/// - At most 64 characters
/// - No leading or trailing whitespace (`" isbn"` would be a second `isbn`)
/// - Must not name a built-in type (`ean`, `UPC`, `FNSKU`, `unknown`, ...)
pub fn validate_rule_key(key: &str) -> ValidationResult<()> {
    let trimmed = key.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::Required {
            field: "rule key".to_string(),
        });
    }

    if trimmed.len() != key.len() {
        return Err(ValidationError::InvalidFormat {
            field: "rule key".to_string(),
            reason: "must not start or end with whitespace".to_string(),
        });
    }

    if key.chars().count() > MAX_RULE_KEY_LEN {
        return Err(ValidationError::TooLong {
            field: "rule key".to_string(),
            max: MAX_RULE_KEY_LEN,
        });
    }

    if BarcodeType::builtin_for_key(trimmed).is_some() {
        return Err(ValidationError::Reserved {
            field: "rule key".to_string(),
            value: key.to_string(),
        });
    }

    Ok(())
}

/// Validates a rule display name.
///
/// ## Rules
/// - Must not be empty or blank
/// - At most 100 characters
pub fn validate_display_name(name: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "display name".to_string(),
        });
    }

    if name.chars().count() > MAX_DISPLAY_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "display name".to_string(),
            max: MAX_DISPLAY_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a regular expression source string and compiles it.
///
/// An empty pattern would match every input, which is never what a caller
/// registering a symbology means, so it is rejected like a missing matcher.
pub fn validate_pattern(pattern: &str) -> ValidationResult<regex::Regex> {
    if pattern.is_empty() {
        return Err(ValidationError::Required {
            field: "pattern".to_string(),
        });
    }

    regex::Regex::new(pattern).map_err(|e| ValidationError::InvalidFormat {
        field: "pattern".to_string(),
        reason: e.to_string(),
    })
}

// =============================================================================
// Settings Validators
// =============================================================================

/// Validates the inter-key timeout in milliseconds.
///
/// ## Rules
/// - Strictly between 0 and 1000 (so 1..=999)
///
/// ## Why Bounded?
/// ```text
///   0 ms  → nothing is ever "within the window", no scan can complete
///   ≥1 s  → ordinary typing starts to look like a scanner burst
/// ```
pub fn validate_inter_key_timeout(ms: u64) -> ValidationResult<()> {
    if ms == 0 || ms > MAX_INTER_KEY_TIMEOUT_MS {
        return Err(ValidationError::OutOfRange {
            field: "inter-key timeout".to_string(),
            min: 1,
            max: MAX_INTER_KEY_TIMEOUT_MS,
        });
    }

    Ok(())
}

/// Validates a set of ending key codes.
///
/// ## Rules
/// - At least one key (otherwise no scan could ever complete)
/// - No blank key codes
pub fn validate_ending_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> ValidationResult<()> {
    let mut count = 0;

    for key in keys {
        if key.trim().is_empty() {
            return Err(ValidationError::InvalidFormat {
                field: "ending keys".to_string(),
                reason: "key codes must not be blank".to_string(),
            });
        }
        count += 1;
    }

    if count == 0 {
        return Err(ValidationError::Required {
            field: "ending keys".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
