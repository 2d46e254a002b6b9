//! # Scanner Settings
//!
//! The knobs the burst accumulator reads on every event.
//!
//! ## Fields
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Setting               Default          Valid                          │
//! │  ───────────────────   ──────────────   ─────────────────────────      │
//! │  ending_keys           {Enter, Tab}     non-empty, no blank codes      │
//! │  inter_key_timeout_ms  100              1..=999                        │
//! │  paste_enabled         false            any                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Fields are private: every change goes through a validated setter, so a
//! `ScannerSettings` value is always usable.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::warn;

use crate::validation::{validate_ending_keys, validate_inter_key_timeout, ValidationResult};
use crate::{DEFAULT_ENDING_KEYS, DEFAULT_INTER_KEY_TIMEOUT_MS};

/// Validated scanner settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannerSettings {
    ending_keys: BTreeSet<String>,
    inter_key_timeout_ms: u64,
    paste_enabled: bool,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        ScannerSettings {
            ending_keys: DEFAULT_ENDING_KEYS.iter().map(|k| k.to_string()).collect(),
            inter_key_timeout_ms: DEFAULT_INTER_KEY_TIMEOUT_MS,
            paste_enabled: false,
        }
    }
}

impl ScannerSettings {
    /// Creates the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Key codes that flush the buffer.
    pub fn ending_keys(&self) -> &BTreeSet<String> {
        &self.ending_keys
    }

    /// Checks whether `code` is a configured ending key.
    #[inline]
    pub fn is_ending_key(&self, code: &str) -> bool {
        self.ending_keys.contains(code)
    }

    /// Maximum gap between two keys of the same burst.
    #[inline]
    pub fn inter_key_timeout_ms(&self) -> u64 {
        self.inter_key_timeout_ms
    }

    /// Whether paste events are classified.
    #[inline]
    pub fn paste_enabled(&self) -> bool {
        self.paste_enabled
    }

    // =========================================================================
    // Setters
    // =========================================================================

    /// Replaces the ending key set.
    ///
    /// ## Errors
    /// Empty set or blank key code. The previous set stays in effect.
    pub fn set_ending_keys<I, S>(&mut self, keys: I) -> ValidationResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: BTreeSet<String> = keys.into_iter().map(Into::into).collect();

        if let Err(e) = validate_ending_keys(keys.iter().map(String::as_str)) {
            warn!(error = %e, "Rejected ending keys");
            return Err(e);
        }

        self.ending_keys = keys;
        Ok(())
    }

    /// Sets the inter-key timeout.
    ///
    /// ## Errors
    /// `0` or `>= 1000`. The previous timeout stays in effect.
    pub fn set_inter_key_timeout(&mut self, ms: u64) -> ValidationResult<()> {
        if let Err(e) = validate_inter_key_timeout(ms) {
            warn!(requested = ms, current = self.inter_key_timeout_ms, "Rejected inter-key timeout");
            return Err(e);
        }

        self.inter_key_timeout_ms = ms;
        Ok(())
    }

    /// Enables or disables paste handling.
    pub fn set_paste_enabled(&mut self, enabled: bool) {
        self.paste_enabled = enabled;
    }
}
