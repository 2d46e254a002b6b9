//! # Domain Types
//!
//! Types that flow through the scan pipeline.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Scan Types                                      │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    KeyEvent     │   │  BarcodeType    │   │   ScanResult    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  key  ("7")     │   │  Unknown        │   │  raw            │       │
//! │  │  code ("Digit7")│   │  Ean / Upc      │   │  barcode_type   │       │
//! │  └─────────────────┘   │  AmazonFnsku    │   │  display_name   │       │
//! │                        │  Custom(key)    │   │  scanned_at     │       │
//! │                        └─────────────────┘   │  source         │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::SHIFT_KEY;

// =============================================================================
// Barcode Type
// =============================================================================

/// The symbology a scan was classified as.
///
/// Built-in variants have a stable machine code (`ean`, `upc`, ...) and a
/// display name (`EAN`, `UPC`, ...). Custom variants carry the key they were
/// registered under; that key can never equal a built-in code or name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum BarcodeType {
    /// Nothing matched.
    Unknown,
    /// EAN-13: exactly 13 digits.
    Ean,
    /// UPC-A: exactly 12 digits.
    Upc,
    /// Amazon fulfilment network SKU.
    AmazonFnsku,
    /// Caller-registered symbology.
    Custom(String),
}

impl BarcodeType {
    /// All built-in variants, in classification priority order.
    pub const BUILTINS: [BarcodeType; 4] = [
        BarcodeType::Ean,
        BarcodeType::Upc,
        BarcodeType::AmazonFnsku,
        BarcodeType::Unknown,
    ];

    /// Returns the machine code (`ean`, `upc`, ...) or the custom key.
    pub fn code(&self) -> &str {
        match self {
            BarcodeType::Unknown => "unknown",
            BarcodeType::Ean => "ean",
            BarcodeType::Upc => "upc",
            BarcodeType::AmazonFnsku => "amazon_fnsku",
            BarcodeType::Custom(key) => key,
        }
    }

    /// Returns the human-readable name of a built-in type.
    ///
    /// Custom types get their display name from the rule that matched.
    pub fn builtin_name(&self) -> Option<&'static str> {
        match self {
            BarcodeType::Unknown => Some("Unknown"),
            BarcodeType::Ean => Some("EAN"),
            BarcodeType::Upc => Some("UPC"),
            BarcodeType::AmazonFnsku => Some("FNSKU"),
            BarcodeType::Custom(_) => None,
        }
    }

    /// Checks whether this is a caller-registered type.
    pub fn is_custom(&self) -> bool {
        matches!(self, BarcodeType::Custom(_))
    }

    /// Resolves a key to the built-in type it would shadow, if any.
    ///
    /// Both codes and display names count, case-insensitively, so `"Ean"`,
    /// `"EAN"` and `"fnsku"` are all taken.
    pub fn builtin_for_key(key: &str) -> Option<BarcodeType> {
        let key = key.trim();
        Self::BUILTINS.into_iter().find(|builtin| {
            key.eq_ignore_ascii_case(builtin.code())
                || builtin
                    .builtin_name()
                    .is_some_and(|name| key.eq_ignore_ascii_case(name))
        })
    }
}

impl fmt::Display for BarcodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// =============================================================================
// Classification
// =============================================================================

/// What the classifier decided for a piece of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub barcode_type: BarcodeType,
    pub display_name: String,
}

impl Classification {
    /// The `(Unknown, "Unknown")` fallback.
    pub fn unknown() -> Self {
        Classification {
            barcode_type: BarcodeType::Unknown,
            display_name: "Unknown".to_string(),
        }
    }
}

// =============================================================================
// Key Event
// =============================================================================

/// A single key press delivered by the host.
///
/// Mirrors the DOM `KeyboardEvent` fields the engine needs:
/// - `key`: the produced character or logical key name (`"7"`, `"X"`, `"Shift"`)
/// - `code`: the physical key (`"Digit7"`, `"KeyX"`, `"Enter"`)
///
/// Ending keys are matched against `code`; the buffer is built from `key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct KeyEvent {
    pub key: String,
    pub code: String,
}

impl KeyEvent {
    /// Creates a key event from raw `key` / `code` values.
    pub fn new(key: impl Into<String>, code: impl Into<String>) -> Self {
        KeyEvent {
            key: key.into(),
            code: code.into(),
        }
    }

    /// Creates the event a US keyboard layout produces for a character.
    ///
    /// ```rust
    /// use titan_scanner::KeyEvent;
    ///
    /// assert_eq!(KeyEvent::character('7').code, "Digit7");
    /// assert_eq!(KeyEvent::character('x').code, "KeyX");
    /// ```
    pub fn character(c: char) -> Self {
        let code = if c.is_ascii_digit() {
            format!("Digit{c}")
        } else if c.is_ascii_alphabetic() {
            format!("Key{}", c.to_ascii_uppercase())
        } else {
            c.to_string()
        };

        KeyEvent {
            key: c.to_string(),
            code,
        }
    }

    /// Creates an event for a named key whose `key` and `code` agree
    /// (`Enter`, `Tab`, `Shift`, ...).
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        KeyEvent {
            key: name.clone(),
            code: name,
        }
    }

    /// Checks whether this is the Shift modifier.
    #[inline]
    pub fn is_shift(&self) -> bool {
        self.key == SHIFT_KEY
    }
}

// =============================================================================
// Scan Result
// =============================================================================

/// How the scanned text reached the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ScanSource {
    /// Assembled from a keystroke burst.
    Keyboard,
    /// Delivered whole by a paste event.
    Paste,
}

/// A completed, classified scan.
///
/// This is what the primary callback and every listener receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// The text exactly as assembled (may be empty).
    pub raw: String,

    /// Detected symbology.
    pub barcode_type: BarcodeType,

    /// Human-readable symbology name.
    pub display_name: String,

    /// Timestamp of the event that completed the scan.
    #[ts(as = "String")]
    pub scanned_at: DateTime<Utc>,

    /// Keyboard burst or paste.
    pub source: ScanSource,
}

impl ScanResult {
    /// Builds a result from raw text and its classification.
    pub fn new(
        raw: impl Into<String>,
        classification: Classification,
        scanned_at: DateTime<Utc>,
        source: ScanSource,
    ) -> Self {
        ScanResult {
            raw: raw.into(),
            barcode_type: classification.barcode_type,
            display_name: classification.display_name,
            scanned_at,
            source,
        }
    }

    /// Checks whether nothing matched.
    pub fn is_unknown(&self) -> bool {
        self.barcode_type == BarcodeType::Unknown
    }
}

impl fmt::Display for ScanResult {
    /// Formats as `<display name>:<raw>`, the scan log line format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.display_name, self.raw)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
