//! # Rule Registry
//!
//! Ordered registry of caller-defined rules, and the classifier that consults
//! it before the built-in table.
//!
//! ## Classification Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  classify("9780306406157")                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  custom rules, insertion order ──► first match wins ──► Custom(key)    │
//! │       │ no match                                                        │
//! │       ▼                                                                 │
//! │  built-ins: EAN ► UPC ► FNSKU  ──► first match wins ──► Ean/Upc/...    │
//! │       │ no match                                                        │
//! │       ▼                                                                 │
//! │  (Unknown, "Unknown")                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rules are tested linearly and only the FIRST match counts. Register the
//! most restrictive rules first.

use tracing::debug;

use crate::rules::{builtin_rules, Matcher, PatternRule};
use crate::types::{BarcodeType, Classification};
use crate::validation::{validate_display_name, validate_rule_key, ValidationResult};

/// Custom rules in registration order.
///
/// ## Invariants
/// - Every rule's type is `BarcodeType::Custom(key)` with a unique key
/// - No key collides with a built-in type
/// - Re-registering a key replaces the rule but keeps its position
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<PatternRule>,
}

impl RuleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule from a regular expression source.
    ///
    /// ## Example
    /// ```rust
    /// use titan_scanner::{BarcodeType, RuleRegistry};
    ///
    /// let mut registry = RuleRegistry::new();
    /// registry.register_rule("isbn", "ISBN", r"^97[89]\d{10}$").unwrap();
    ///
    /// let hit = registry.classify("9780306406157");
    /// assert_eq!(hit.barcode_type, BarcodeType::Custom("isbn".into()));
    /// ```
    pub fn register_rule(&mut self, key: &str, display_name: &str, pattern: &str) -> ValidationResult<()> {
        validate_rule_key(key)?;
        validate_display_name(display_name)?;
        let matcher = Matcher::pattern(pattern)?;

        self.insert(key, display_name, matcher);
        Ok(())
    }

    /// Registers a rule with an already-built matcher.
    pub fn register_matcher(
        &mut self,
        key: &str,
        display_name: &str,
        matcher: Matcher,
    ) -> ValidationResult<()> {
        validate_rule_key(key)?;
        validate_display_name(display_name)?;

        self.insert(key, display_name, matcher);
        Ok(())
    }

    fn insert(&mut self, key: &str, display_name: &str, matcher: Matcher) {
        let rule = PatternRule::new(BarcodeType::Custom(key.to_string()), display_name, matcher);

        match self.position(key) {
            Some(index) => {
                debug!(key, index, "Replacing custom barcode rule");
                self.rules[index] = rule;
            }
            None => {
                debug!(key, index = self.rules.len(), "Registering custom barcode rule");
                self.rules.push(rule);
            }
        }
    }

    /// Removes a rule. Returns `true` if one was registered under `key`.
    pub fn unregister_rule(&mut self, key: &str) -> bool {
        match self.position(key) {
            Some(index) => {
                self.rules.remove(index);
                debug!(key, "Removed custom barcode rule");
                true
            }
            None => false,
        }
    }

    /// Checks whether a rule is registered under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Returns registered keys in classification order.
    pub fn keys(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.barcode_type.code()).collect()
    }

    /// Returns the number of custom rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Checks if no custom rules are registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Classifies `raw`: custom rules first, then built-ins, else Unknown.
    ///
    /// Never fails; empty or garbage input is simply `Unknown`.
    pub fn classify(&self, raw: &str) -> Classification {
        self.rules
            .iter()
            .chain(builtin_rules())
            .find(|rule| rule.matches(raw))
            .map(PatternRule::classification)
            .unwrap_or_else(Classification::unknown)
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.rules.iter().position(|rule| rule.barcode_type.code() == key)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
