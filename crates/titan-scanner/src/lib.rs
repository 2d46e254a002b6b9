//! # titan-scanner: Keyboard-Wedge Scan Engine for Titan POS
//!
//! Handheld barcode scanners usually emulate a keyboard: a scan arrives as a
//! burst of key presses a few milliseconds apart, followed by `Enter` or
//! `Tab`. This crate segments that stream into complete scans and classifies
//! each one (EAN, UPC, Amazon FNSKU or a caller-registered symbology).
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Scan Pipeline                                    │
//! │                                                                         │
//! │  Host UI (keydown / paste events)                                      │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               ★ titan-scanner (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ScanSession                                                   │   │
//! │  │     │                                                           │   │
//! │  │     ├──► BurstAccumulator  (timing only, knows no patterns)    │   │
//! │  │     │         │ completed buffer                                │   │
//! │  │     │         ▼                                                 │   │
//! │  │     ├──► RuleRegistry      (patterns only, knows no timing)    │   │
//! │  │     │         │ Classification                                  │   │
//! │  │     │         ▼                                                 │   │
//! │  │     └──► on_scan callback ──► ListenerTable fan-out            │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • INJECTED CLOCK • SYNCHRONOUS                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ScanResult { raw, barcode_type, display_name, ... }                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Scan domain types (BarcodeType, KeyEvent, ScanResult)
//! - [`rules`] - Matchers and the built-in symbology rules
//! - [`registry`] - Ordered custom rule registry and classification
//! - [`accumulator`] - Keystroke burst segmentation
//! - [`listeners`] - Named listener fan-out with failure isolation
//! - [`settings`] - Ending keys, inter-key timeout, paste toggle
//! - [`session`] - The owned context tying everything together
//! - [`state`] - Thread-safe wrapper for multi-threaded hosts
//! - [`clock`] - Time source abstraction
//! - [`error`] - Error types
//! - [`validation`] - Input validation for the configuration API
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use titan_scanner::{BarcodeType, KeyEvent, ManualClock, ScanSession};
//!
//! let clock = Arc::new(ManualClock::default());
//! let mut session = ScanSession::builder().clock(clock.clone()).build();
//!
//! for digit in "4006381333931".chars() {
//!     session.handle_key(KeyEvent::character(digit));
//!     clock.advance_ms(5);
//! }
//! let outcome = session.handle_key(KeyEvent::named("Enter")).unwrap();
//!
//! assert_eq!(outcome.scan.raw, "4006381333931");
//! assert_eq!(outcome.scan.barcode_type, BarcodeType::Ean);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod accumulator;
pub mod clock;
pub mod error;
pub mod listeners;
pub mod registry;
pub mod rules;
pub mod session;
pub mod settings;
pub mod state;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use accumulator::{BurstAccumulator, KeyOutcome};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ListenerError, ListenerResult, ValidationError};
pub use listeners::{
    DispatchReport, ListenerFailure, ListenerTable, LogScan, ScanListener, PRIMARY_LISTENER,
};
pub use registry::RuleRegistry;
pub use rules::{Matcher, PatternRule};
pub use session::{ScanOutcome, ScanSession, ScanSessionBuilder};
pub use settings::ScannerSettings;
pub use state::ScannerState;
pub use types::*;
pub use validation::ValidationResult;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default inter-key timeout in milliseconds.
///
/// Scanners emit a payload within single-digit to low double-digit
/// milliseconds per key; people type an order of magnitude slower.
pub const DEFAULT_INTER_KEY_TIMEOUT_MS: u64 = 100;

/// Largest accepted inter-key timeout (the valid range is 1..=999 ms).
pub const MAX_INTER_KEY_TIMEOUT_MS: u64 = 999;

/// Key codes that flush the buffer by default.
pub const DEFAULT_ENDING_KEYS: [&str; 2] = ["Enter", "Tab"];

/// Modifier key that never reaches the buffer.
pub const SHIFT_KEY: &str = "Shift";

/// Maximum length of a custom rule key.
pub const MAX_RULE_KEY_LEN: usize = 64;

/// Maximum length of a display name.
pub const MAX_DISPLAY_NAME_LEN: usize = 100;
