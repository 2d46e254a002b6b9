//! # Scan Session
//!
//! The single owned context holding settings, accumulator, rule registry,
//! listeners, the primary callback and the clock.
//!
//! ## Event Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       ScanSession                                       │
//! │                                                                         │
//! │  handle_key(event) ──► attached? ──no──► None                          │
//! │        │                  │yes                                          │
//! │        │                  ▼                                             │
//! │        │        BurstAccumulator::push_key                              │
//! │        │                  │ Completed(raw)                              │
//! │        │                  ▼                                             │
//! │  handle_paste(text) ─► RuleRegistry::classify(raw)                      │
//! │   (paste_enabled only)    │                                             │
//! │                           ▼                                             │
//! │                    ScanResult ──► on_scan ──► listeners                 │
//! │                           │                                             │
//! │                           ▼                                             │
//! │                 Some(ScanOutcome { scan, report })                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Attachment
//! A session is attached to its event source when built. `attach` on an
//! attached session is a no-op, so hosts can call it on every mount. While
//! detached, events are dropped without touching any state.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::accumulator::{BurstAccumulator, KeyOutcome};
use crate::clock::{Clock, SystemClock};
use crate::listeners::{DispatchReport, ListenerTable, LogScan, ScanListener};
use crate::registry::RuleRegistry;
use crate::rules::Matcher;
use crate::settings::ScannerSettings;
use crate::types::{Classification, KeyEvent, ScanResult, ScanSource};
use crate::validation::ValidationResult;

/// A completed scan and how its delivery went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    pub scan: ScanResult,
    pub report: DispatchReport,
}

// =============================================================================
// Builder
// =============================================================================

/// Builds a [`ScanSession`].
///
/// ## Usage
/// ```rust
/// use titan_scanner::{ListenerResult, ScanResult, ScanSession, ScannerSettings};
///
/// let mut settings = ScannerSettings::default();
/// settings.set_paste_enabled(true);
///
/// let session = ScanSession::builder()
///     .settings(settings)
///     .on_scan(|scan: &ScanResult| -> ListenerResult {
///         println!("scanned {}", scan.raw);
///         Ok(())
///     })
///     .build();
/// assert!(session.is_attached());
/// ```
pub struct ScanSessionBuilder {
    settings: ScannerSettings,
    registry: RuleRegistry,
    on_scan: Arc<dyn ScanListener>,
    clock: Arc<dyn Clock>,
}

impl Default for ScanSessionBuilder {
    fn default() -> Self {
        ScanSessionBuilder {
            settings: ScannerSettings::default(),
            registry: RuleRegistry::default(),
            on_scan: Arc::new(LogScan),
            clock: Arc::new(SystemClock),
        }
    }
}

impl ScanSessionBuilder {
    /// Uses the given settings instead of the defaults.
    pub fn settings(mut self, settings: ScannerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Starts with a pre-populated rule registry.
    pub fn registry(mut self, registry: RuleRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Sets the primary callback (default: [`LogScan`]).
    pub fn on_scan<L>(mut self, listener: L) -> Self
    where
        L: ScanListener + 'static,
    {
        self.on_scan = Arc::new(listener);
        self
    }

    /// Sets the time source (default: [`SystemClock`]).
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Builds an attached session.
    pub fn build(self) -> ScanSession {
        ScanSession {
            settings: self.settings,
            accumulator: BurstAccumulator::new(),
            registry: self.registry,
            listeners: ListenerTable::new(),
            on_scan: self.on_scan,
            clock: self.clock,
            attached: true,
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// Owned scanner context. Create one per event source.
pub struct ScanSession {
    settings: ScannerSettings,
    accumulator: BurstAccumulator,
    registry: RuleRegistry,
    listeners: ListenerTable,
    on_scan: Arc<dyn ScanListener>,
    clock: Arc<dyn Clock>,
    attached: bool,
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ScanSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanSession")
            .field("settings", &self.settings)
            .field("accumulator", &self.accumulator)
            .field("registry", &self.registry)
            .field("listeners", &self.listeners)
            .field("attached", &self.attached)
            .finish_non_exhaustive()
    }
}

impl ScanSession {
    /// Creates a session with default settings, the log callback and the
    /// system clock.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Returns a builder.
    pub fn builder() -> ScanSessionBuilder {
        ScanSessionBuilder::default()
    }

    // =========================================================================
    // Attachment
    // =========================================================================

    /// Attaches to the event source. Returns `false` if already attached.
    pub fn attach(&mut self) -> bool {
        if self.attached {
            return false;
        }
        debug!("Scanner attached");
        self.attached = true;
        true
    }

    /// Detaches from the event source and drops any half-read burst.
    /// Returns `false` if already detached.
    pub fn detach(&mut self) -> bool {
        if !self.attached {
            return false;
        }
        debug!(pending = %self.accumulator.pending(), "Scanner detached");
        self.attached = false;
        self.accumulator.reset();
        true
    }

    /// Checks whether events are being processed.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    // =========================================================================
    // Event Entry Points
    // =========================================================================

    /// Handles a key press timestamped by the session clock.
    pub fn handle_key(&mut self, event: KeyEvent) -> Option<ScanOutcome> {
        let at = self.clock.now();
        self.handle_key_at(event, at)
    }

    /// Handles a key press observed at `at`.
    ///
    /// Returns `Some` only when the key completed a scan.
    pub fn handle_key_at(&mut self, event: KeyEvent, at: DateTime<Utc>) -> Option<ScanOutcome> {
        if !self.attached {
            return None;
        }

        match self.accumulator.push_key(&event, at, &self.settings) {
            KeyOutcome::Completed(raw) => Some(self.complete(raw, at, ScanSource::Keyboard)),
            _ => None,
        }
    }

    /// Handles a paste event timestamped by the session clock.
    pub fn handle_paste(&mut self, text: &str) -> Option<ScanOutcome> {
        let at = self.clock.now();
        self.handle_paste_at(text, at)
    }

    /// Handles a paste event observed at `at`.
    ///
    /// Pasted text is one complete scan: no buffering, no timing, and the
    /// keyboard buffer is left alone. Ignored unless paste is enabled.
    pub fn handle_paste_at(&mut self, text: &str, at: DateTime<Utc>) -> Option<ScanOutcome> {
        if !self.attached {
            return None;
        }

        if !self.settings.paste_enabled() {
            debug!(len = text.len(), "Paste ignored, paste support disabled");
            return None;
        }

        Some(self.complete(text.to_string(), at, ScanSource::Paste))
    }

    fn complete(&self, raw: String, at: DateTime<Utc>, source: ScanSource) -> ScanOutcome {
        let classification = self.registry.classify(&raw);
        let scan = ScanResult::new(raw, classification, at, source);
        let report = self.listeners.dispatch(self.on_scan.as_ref(), &scan);

        ScanOutcome { scan, report }
    }

    /// Classifies text without touching any state or notifying anyone.
    pub fn classify(&self, raw: &str) -> Classification {
        self.registry.classify(raw)
    }

    /// Returns the text buffered so far.
    pub fn pending(&self) -> &str {
        self.accumulator.pending()
    }

    /// Drops the buffered burst and timing baseline.
    pub fn reset(&mut self) {
        self.accumulator.reset();
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// Returns the current settings.
    pub fn settings(&self) -> &ScannerSettings {
        &self.settings
    }

    /// Replaces all settings at once.
    pub fn set_settings(&mut self, settings: ScannerSettings) {
        self.settings = settings;
    }

    /// See [`ScannerSettings::set_ending_keys`].
    pub fn set_ending_keys<I, S>(&mut self, keys: I) -> ValidationResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.settings.set_ending_keys(keys)
    }

    /// See [`ScannerSettings::set_inter_key_timeout`].
    pub fn set_inter_key_timeout(&mut self, ms: u64) -> ValidationResult<()> {
        self.settings.set_inter_key_timeout(ms)
    }

    /// See [`ScannerSettings::set_paste_enabled`].
    pub fn set_paste_enabled(&mut self, enabled: bool) {
        self.settings.set_paste_enabled(enabled);
    }

    // =========================================================================
    // Rules
    // =========================================================================

    /// Registers a custom rule from a regex. Rules are tried in registration
    /// order, before the built-ins; register the most restrictive first.
    pub fn register_rule(&mut self, key: &str, display_name: &str, pattern: &str) -> ValidationResult<()> {
        self.registry.register_rule(key, display_name, pattern)
    }

    /// Registers a custom rule with an arbitrary matcher.
    pub fn register_matcher(&mut self, key: &str, display_name: &str, matcher: Matcher) -> ValidationResult<()> {
        self.registry.register_matcher(key, display_name, matcher)
    }

    /// Removes a custom rule.
    pub fn unregister_rule(&mut self, key: &str) -> bool {
        self.registry.unregister_rule(key)
    }

    /// Returns the rule registry.
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Adds a listener, replacing any listener with the same name.
    pub fn add_listener<L>(&mut self, name: impl Into<String>, listener: L)
    where
        L: ScanListener + 'static,
    {
        self.listeners.add(name, Arc::new(listener));
    }

    /// Removes a listener. Returns `true` if one existed.
    pub fn remove_listener(&mut self, name: &str) -> bool {
        self.listeners.remove(name)
    }

    /// Checks whether a listener is registered.
    pub fn has_listener(&self, name: &str) -> bool {
        self.listeners.contains(name)
    }

    /// Returns the number of listeners (primary callback excluded).
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::types::BarcodeType;

    fn session_with_clock() -> (ScanSession, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let session = ScanSession::builder().clock(clock.clone()).build();
        (session, clock)
    }

    fn scan_burst(session: &mut ScanSession, clock: &ManualClock, text: &str) -> Option<ScanOutcome> {
        for c in text.chars() {
            clock.advance_ms(8);
            session.handle_key(KeyEvent::character(c));
        }
        clock.advance_ms(8);
        session.handle_key(KeyEvent::named("Enter"))
    }

    #[test]
    fn test_keyboard_scan_classified() {
        let (mut session, clock) = session_with_clock();
        clock.advance_ms(1_000);

        let outcome = scan_burst(&mut session, &clock, "012345678905").unwrap();
        assert_eq!(outcome.scan.raw, "012345678905");
        assert_eq!(outcome.scan.barcode_type, BarcodeType::Upc);
        assert_eq!(outcome.scan.source, ScanSource::Keyboard);
        assert_eq!(outcome.scan.scanned_at, clock.now());
        assert!(outcome.report.is_clean());
    }

    #[test]
    fn test_only_the_ending_key_returns_outcome() {
        let (mut session, clock) = session_with_clock();
        clock.advance_ms(5);
        assert!(session.handle_key(KeyEvent::character('1')).is_none());
        assert_eq!(session.pending(), "1");
    }

    #[test]
    fn test_paste_disabled_by_default() {
        let (mut session, _clock) = session_with_clock();
        assert!(session.handle_paste("4006381333931").is_none());
    }

    #[test]
    fn test_paste_is_atomic_and_leaves_buffer() {
        let (mut session, clock) = session_with_clock();
        session.set_paste_enabled(true);

        clock.advance_ms(5);
        session.handle_key(KeyEvent::character('9'));

        let outcome = session.handle_paste("4006381333931").unwrap();
        assert_eq!(outcome.scan.barcode_type, BarcodeType::Ean);
        assert_eq!(outcome.scan.source, ScanSource::Paste);
        assert_eq!(session.pending(), "9");
    }

    #[test]
    fn test_attach_is_idempotent() {
        let (mut session, clock) = session_with_clock();
        assert!(session.is_attached());
        assert!(!session.attach());

        assert!(session.detach());
        assert!(!session.detach());
        assert!(scan_burst(&mut session, &clock, "4006381333931").is_none());
        assert_eq!(session.pending(), "");

        assert!(session.attach());
        assert!(scan_burst(&mut session, &clock, "4006381333931").is_some());
    }

    #[test]
    fn test_rejected_timeout_keeps_previous() {
        let mut session = ScanSession::new();
        session.set_inter_key_timeout(40).unwrap();
        assert!(session.set_inter_key_timeout(0).is_err());
        assert!(session.set_inter_key_timeout(1000).is_err());
        assert_eq!(session.settings().inter_key_timeout_ms(), 40);
    }

    #[test]
    fn test_classify_does_not_dispatch() {
        let mut session = ScanSession::new();
        session
            .register_rule("bin", "Warehouse Bin", r"^BIN-\d{4}$")
            .unwrap();
        let hit = session.classify("BIN-0042");
        assert_eq!(hit.barcode_type, BarcodeType::Custom("bin".into()));
        assert_eq!(hit.display_name, "Warehouse Bin");
        assert_eq!(session.pending(), "");
    }
}
