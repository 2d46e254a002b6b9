//! # Pattern Rules
//!
//! Matchers and the built-in symbology table.
//!
//! ## Built-in Rules (priority order)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  #   Type          Name     Pattern                                     │
//! │  ─   ────────────  ───────  ─────────────────────────                   │
//! │  1   Ean           EAN      \b[0-9]{13}\b                               │
//! │  2   Upc           UPC      \b[0-9]{12}\b                               │
//! │  3   AmazonFnsku   FNSKU    \bcX[0-9A-Z]{9}\b                           │
//! │                                                                         │
//! │  EAN is tested before UPC: the more restrictive rule must shadow the    │
//! │  looser one. All three are anchored on word boundaries so a longer      │
//! │  digit run never matches a shorter rule.                                │
//! │                                                                         │
//! │  Digits and boundaries are ASCII-only (`(?-u:\b)`): Arabic-Indic        │
//! │  digits are not a barcode, and `é4006381333931` still holds an EAN.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::types::{BarcodeType, Classification};
use crate::validation::{validate_pattern, ValidationResult};

/// EAN-13 pattern.
pub const EAN_PATTERN: &str = r"(?-u:\b)[0-9]{13}(?-u:\b)";

/// UPC-A pattern.
pub const UPC_PATTERN: &str = r"(?-u:\b)[0-9]{12}(?-u:\b)";

/// Amazon FNSKU pattern: `cX` marker followed by 9 uppercase alphanumerics.
pub const AMAZON_FNSKU_PATTERN: &str = r"(?-u:\b)cX[0-9A-Z]{9}(?-u:\b)";

// =============================================================================
// Matcher
// =============================================================================

/// A predicate over scanned text.
///
/// Regex matchers use "contains a match" semantics (anchor with `^...$` or
/// `\b` for whole-token matching).
#[derive(Clone)]
pub enum Matcher {
    /// Compiled regular expression.
    Pattern(Regex),
    /// Arbitrary predicate.
    Predicate(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl Matcher {
    /// Compiles a regular expression matcher.
    ///
    /// ## Errors
    /// - `Required` if the pattern is empty
    /// - `InvalidFormat` if it does not compile
    pub fn pattern(pattern: &str) -> ValidationResult<Self> {
        validate_pattern(pattern).map(Matcher::Pattern)
    }

    /// Wraps a closure as a matcher.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Matcher::Predicate(Arc::new(f))
    }

    /// Tests the matcher against `text`.
    #[inline]
    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Matcher::Pattern(re) => re.is_match(text),
            Matcher::Predicate(f) => f(text),
        }
    }
}

impl From<Regex> for Matcher {
    fn from(re: Regex) -> Self {
        Matcher::Pattern(re)
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            Matcher::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

// =============================================================================
// Pattern Rule
// =============================================================================

/// A type, its display name and the matcher that recognises it.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub barcode_type: BarcodeType,
    pub display_name: String,
    pub matcher: Matcher,
}

impl PatternRule {
    /// Creates a rule.
    pub fn new(barcode_type: BarcodeType, display_name: impl Into<String>, matcher: Matcher) -> Self {
        PatternRule {
            barcode_type,
            display_name: display_name.into(),
            matcher,
        }
    }

    /// Tests the rule against `text`.
    #[inline]
    pub fn matches(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }

    /// Returns the classification this rule assigns.
    pub fn classification(&self) -> Classification {
        Classification {
            barcode_type: self.barcode_type.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

// =============================================================================
// Built-in Table
// =============================================================================

static BUILTIN_RULES: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    [
        (BarcodeType::Ean, EAN_PATTERN),
        (BarcodeType::Upc, UPC_PATTERN),
        (BarcodeType::AmazonFnsku, AMAZON_FNSKU_PATTERN),
    ]
    .into_iter()
    .map(|(barcode_type, pattern)| {
        let re = Regex::new(pattern).expect("built-in barcode pattern must compile");
        let name = barcode_type.builtin_name().unwrap_or("Unknown");
        PatternRule::new(barcode_type, name, Matcher::Pattern(re))
    })
    .collect()
});

/// Returns the built-in rules in priority order: EAN, UPC, AmazonFNSKU.
pub fn builtin_rules() -> &'static [PatternRule] {
    &BUILTIN_RULES
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn first_builtin(text: &str) -> Option<BarcodeType> {
        builtin_rules()
            .iter()
            .find(|rule| rule.matches(text))
            .map(|rule| rule.barcode_type.clone())
    }

    #[test]
    fn test_builtin_order() {
        let order: Vec<_> = builtin_rules().iter().map(|r| r.barcode_type.clone()).collect();
        assert_eq!(
            order,
            vec![BarcodeType::Ean, BarcodeType::Upc, BarcodeType::AmazonFnsku]
        );
        assert_eq!(builtin_rules()[2].display_name, "FNSKU");
    }

    #[test]
    fn test_ean_and_upc_shapes() {
        assert_eq!(first_builtin("4006381333931"), Some(BarcodeType::Ean));
        assert_eq!(first_builtin("012345678905"), Some(BarcodeType::Upc));

        // Word boundaries: 14 digits is neither.
        assert_eq!(first_builtin("40063813339310"), None);
        assert_eq!(first_builtin("12345"), None);
    }

    #[test]
    fn test_builtins_are_ascii_only() {
        // Thirteen Arabic-Indic digits are not an EAN.
        let arabic = "\u{0664}\u{0660}\u{0660}\u{0666}\u{0663}\u{0668}\u{0661}\u{0663}\u{0663}\u{0663}\u{0669}\u{0663}\u{0661}";
        assert_eq!(arabic.chars().count(), 13);
        assert_eq!(first_builtin(arabic), None);

        // A non-ASCII letter is not a word character, so the code is still
        // delimited.
        assert_eq!(first_builtin("é4006381333931"), Some(BarcodeType::Ean));
        assert_eq!(first_builtin("012345678905ü"), Some(BarcodeType::Upc));
        assert_eq!(first_builtin("ßcX001ABC123"), Some(BarcodeType::AmazonFnsku));
    }

    #[test]
    fn test_fnsku_shape() {
        assert_eq!(first_builtin("cX001ABC123"), Some(BarcodeType::AmazonFnsku));

        // Marker is case-sensitive and required.
        assert_eq!(first_builtin("CX001ABC123"), None);
        assert_eq!(first_builtin("X001ABC123"), None);
        // Lowercase body is rejected.
        assert_eq!(first_builtin("cX001abc123"), None);
    }

    #[test]
    fn test_matcher_pattern_and_predicate() {
        let m = Matcher::pattern(r"^ISBN").unwrap();
        assert!(m.is_match("ISBN9780306406157"));
        assert!(!m.is_match("9780306406157"));

        let m = Matcher::predicate(|s| s.len() == 3);
        assert!(m.is_match("abc"));
        assert!(!m.is_match("ab"));

        assert!(Matcher::pattern("[").is_err());
    }

    #[test]
    fn test_matcher_debug() {
        let m = Matcher::pattern(r"^\d+$").unwrap();
        assert_eq!(format!("{m:?}"), r#"Pattern("^\\d+$")"#);
        assert_eq!(format!("{:?}", Matcher::predicate(|_| true)), "Predicate(..)");
    }
}
