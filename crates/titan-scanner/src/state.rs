//! # Shared Scanner State
//!
//! `ScanSession` has no internal locking; it expects serialized event
//! delivery. Hosts that deliver events from several threads (Tauri commands
//! can run concurrently) share one session through [`ScannerState`].
//!
//! ## Thread Safety
//! Uses `Arc<Mutex<ScanSession>>`: accumulator, registry, listeners and
//! settings live in one mutual-exclusion domain because classification and
//! fan-out run synchronously inside the same event-handling step.

use std::sync::{Arc, Mutex};

use crate::session::ScanSession;

/// Thread-safe handle to a [`ScanSession`].
#[derive(Debug, Clone, Default)]
pub struct ScannerState {
    session: Arc<Mutex<ScanSession>>,
}

impl ScannerState {
    /// Wraps an existing session.
    pub fn new(session: ScanSession) -> Self {
        ScannerState {
            session: Arc::new(Mutex::new(session)),
        }
    }

    /// Executes a function with read access to the session.
    ///
    /// ## Usage
    /// ```rust
    /// use titan_scanner::ScannerState;
    ///
    /// let state = ScannerState::default();
    /// let pending = state.with_session(|s| s.pending().to_string());
    /// assert!(pending.is_empty());
    /// ```
    pub fn with_session<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ScanSession) -> R,
    {
        let session = self.session.lock().expect("Scanner mutex poisoned");
        f(&session)
    }

    /// Executes a function with write access to the session.
    ///
    /// Listeners run while the lock is held; they must not call back into
    /// the same `ScannerState`.
    pub fn with_session_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut ScanSession) -> R,
    {
        let mut session = self.session.lock().expect("Scanner mutex poisoned");
        f(&mut session)
    }
}

impl From<ScanSession> for ScannerState {
    fn from(session: ScanSession) -> Self {
        ScannerState::new(session)
    }
}
