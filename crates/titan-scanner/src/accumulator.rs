//! # Burst Accumulator
//!
//! Segments a chronological stream of key presses into scans using nothing but
//! inter-key timing and the ending key set.
//!
//! ## Per-Key Decision
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  key event @ t                                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  within = (t - last) < timeout ;  last = t                             │
//! │       │                                                                 │
//! │       ├── key == "Shift" ────────────────────────► Ignored             │
//! │       │                                                                 │
//! │       ├── code ∈ ending keys ──┬── within ──► Completed(buffer)        │
//! │       │                        └── !within ─► Discarded(buffer)        │
//! │       │                        (buffer cleared either way)             │
//! │       │                                                                 │
//! │       └── character ───────────┬── within ──► Appended   (buf += key)  │
//! │                                └── !within ─► Restarted  (buf  = key)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no background timer. A burst whose ending key never arrives sits
//! in the buffer until the next slow keystroke replaces it.

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use crate::settings::ScannerSettings;
use crate::types::KeyEvent;

/// What a single key press did to the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Shift: buffer untouched, only the timestamp moved.
    Ignored,
    /// Fast key: appended to the current burst.
    Appended,
    /// Slow key: started a new burst with just this key.
    Restarted,
    /// Fast ending key: the burst is a complete scan.
    Completed(String),
    /// Slow ending key: whatever was buffered is dropped.
    Discarded(String),
}

/// Buffer and last-event timestamp for one keyboard stream.
#[derive(Debug, Clone, Default)]
pub struct BurstAccumulator {
    buffer: String,
    last_event_at: Option<DateTime<Utc>>,
}

impl BurstAccumulator {
    /// Creates an empty accumulator. The first key is always "slow".
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one key press observed at `at`.
    pub fn push_key(&mut self, event: &KeyEvent, at: DateTime<Utc>, settings: &ScannerSettings) -> KeyOutcome {
        let within = self.within_window(at, settings.inter_key_timeout_ms());
        self.last_event_at = Some(at);

        if event.is_shift() {
            return KeyOutcome::Ignored;
        }

        if settings.is_ending_key(&event.code) {
            let buffer = std::mem::take(&mut self.buffer);
            if within {
                return KeyOutcome::Completed(buffer);
            }
            if !buffer.is_empty() {
                debug!(discarded = %buffer, code = %event.code, "Ending key outside timing window");
            }
            return KeyOutcome::Discarded(buffer);
        }

        if within {
            self.buffer.push_str(&event.key);
            KeyOutcome::Appended
        } else {
            if !self.buffer.is_empty() {
                trace!(stale = %self.buffer, "Slow keystroke replaced stale buffer");
            }
            self.buffer.clear();
            self.buffer.push_str(&event.key);
            KeyOutcome::Restarted
        }
    }

    /// Returns the text buffered so far.
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// Returns the timestamp of the last key seen.
    pub fn last_event_at(&self) -> Option<DateTime<Utc>> {
        self.last_event_at
    }

    /// Forgets the buffer and the timing baseline.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.last_event_at = None;
    }

    fn within_window(&self, at: DateTime<Utc>, timeout_ms: u64) -> bool {
        match self.last_event_at {
            Some(last) => (at - last).num_milliseconds() < timeout_ms as i64,
            None => false,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    struct Feed {
        acc: BurstAccumulator,
        settings: ScannerSettings,
        now: DateTime<Utc>,
    }

    impl Feed {
        fn new() -> Self {
            Feed {
                acc: BurstAccumulator::new(),
                settings: ScannerSettings::default(),
                now: DateTime::<Utc>::UNIX_EPOCH,
            }
        }

        fn after(&mut self, ms: i64, event: KeyEvent) -> KeyOutcome {
            self.now += Duration::milliseconds(ms);
            self.acc.push_key(&event, self.now, &self.settings)
        }

        fn type_fast(&mut self, text: &str) {
            for c in text.chars() {
                self.after(10, KeyEvent::character(c));
            }
        }
    }

    #[test]
    fn test_fast_burst_completes() {
        let mut feed = Feed::new();
        assert_eq!(feed.after(0, KeyEvent::character('1')), KeyOutcome::Restarted);
        assert_eq!(feed.after(10, KeyEvent::character('2')), KeyOutcome::Appended);
        assert_eq!(feed.after(10, KeyEvent::character('3')), KeyOutcome::Appended);
        assert_eq!(
            feed.after(10, KeyEvent::named("Enter")),
            KeyOutcome::Completed("123".to_string())
        );
        assert_eq!(feed.acc.pending(), "");
    }

    #[test]
    fn test_slow_gap_discards_stale_text() {
        let mut feed = Feed::new();
        feed.after(0, KeyEvent::character('1'));
        assert_eq!(feed.after(500, KeyEvent::character('2')), KeyOutcome::Restarted);
        assert_eq!(
            feed.after(10, KeyEvent::named("Enter")),
            KeyOutcome::Completed("2".to_string())
        );
    }

    #[test]
    fn test_slow_ending_key_discards_and_clears() {
        let mut feed = Feed::new();
        feed.type_fast("abc");
        assert_eq!(
            feed.after(100, KeyEvent::named("Tab")),
            KeyOutcome::Discarded("abc".to_string())
        );
        assert_eq!(feed.acc.pending(), "");
    }

    #[test]
    fn test_lone_ending_key_produces_nothing() {
        let mut feed = Feed::new();
        assert_eq!(
            feed.after(0, KeyEvent::named("Enter")),
            KeyOutcome::Discarded(String::new())
        );
    }

    #[test]
    fn test_fast_ending_key_with_empty_buffer_completes_empty() {
        let mut feed = Feed::new();
        feed.after(0, KeyEvent::named("Enter"));
        assert_eq!(
            feed.after(5, KeyEvent::named("Enter")),
            KeyOutcome::Completed(String::new())
        );
    }

    #[test]
    fn test_shift_is_ignored_but_moves_timestamp() {
        let mut feed = Feed::new();
        feed.type_fast("c");
        assert_eq!(feed.after(60, KeyEvent::named("Shift")), KeyOutcome::Ignored);
        // 60ms after Shift but 120ms after 'c': still within the window.
        assert_eq!(feed.after(60, KeyEvent::new("X", "KeyX")), KeyOutcome::Appended);
        assert_eq!(feed.acc.pending(), "cX");
    }

    #[test]
    fn test_gap_equal_to_timeout_is_slow() {
        let mut feed = Feed::new();
        feed.after(0, KeyEvent::character('1'));
        assert_eq!(feed.after(100, KeyEvent::character('2')), KeyOutcome::Restarted);
        assert_eq!(feed.after(99, KeyEvent::character('3')), KeyOutcome::Appended);
    }

    #[test]
    fn test_ending_key_matches_code_not_key() {
        let mut feed = Feed::new();
        feed.type_fast("42");
        // A key labelled "Enter" on a non-ending code is just text.
        assert_eq!(feed.after(5, KeyEvent::new("Enter", "NumpadEnter")), KeyOutcome::Appended);
        assert_eq!(feed.acc.pending(), "42Enter");
    }

    #[test]
    fn test_reset() {
        let mut feed = Feed::new();
        feed.type_fast("99");
        feed.acc.reset();
        assert_eq!(feed.acc.pending(), "");
        assert!(feed.acc.last_event_at().is_none());
        assert_eq!(feed.after(1, KeyEvent::character('1')), KeyOutcome::Restarted);
    }
}
