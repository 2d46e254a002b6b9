//! # Listener Fan-out
//!
//! Named callbacks notified after the primary `on_scan` callback.
//!
//! ## Delivery
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ScanResult                                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  primary on_scan ──► Ok / Err / panic ──┐                              │
//! │       │                                 │  each failure is logged and  │
//! │       ▼                                 ├─ recorded in DispatchReport; │
//! │  listener "cart"  ──► Ok / Err / panic ─┤  delivery always continues   │
//! │  listener "sound" ──► Ok / Err / panic ─┘                              │
//! │  (listener order is unspecified)                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{ListenerError, ListenerResult};
use crate::types::ScanResult;

/// Name the primary callback is logged under. Its failures are reported in
/// [`DispatchReport::primary_failure`], never in the named-listener list.
pub const PRIMARY_LISTENER: &str = "<primary>";

// =============================================================================
// Listener Trait
// =============================================================================

/// Receives completed scans.
///
/// Implemented for every `Fn(&ScanResult) -> ListenerResult + Send + Sync`.
pub trait ScanListener: Send + Sync {
    fn on_scan(&self, scan: &ScanResult) -> ListenerResult;
}

impl<F> ScanListener for F
where
    F: Fn(&ScanResult) -> ListenerResult + Send + Sync,
{
    fn on_scan(&self, scan: &ScanResult) -> ListenerResult {
        self(scan)
    }
}

/// Default primary callback: one `info` line formatted `<name>:<raw>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogScan;

impl ScanListener for LogScan {
    fn on_scan(&self, scan: &ScanResult) -> ListenerResult {
        info!(barcode_type = %scan.barcode_type, source = ?scan.source, "{}", scan);
        Ok(())
    }
}

// =============================================================================
// Dispatch Report
// =============================================================================

/// One listener that did not handle a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerFailure {
    pub listener: String,
    pub reason: String,
}

/// Non-fatal summary of a fan-out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReport {
    /// Number of callbacks invoked, primary included.
    pub delivered: usize,
    /// Why the primary callback failed, if it did.
    pub primary_failure: Option<String>,
    /// Named listeners that failed.
    pub failures: Vec<ListenerFailure>,
}

impl DispatchReport {
    /// True when every callback returned `Ok`.
    pub fn is_clean(&self) -> bool {
        self.primary_failure.is_none() && self.failures.is_empty()
    }

    /// Checks whether the primary callback failed.
    pub fn primary_failed(&self) -> bool {
        self.primary_failure.is_some()
    }

    /// Checks whether a named listener failed. A listener that happens to be
    /// registered as `"<primary>"` is still looked up among named listeners.
    pub fn failed(&self, listener: &str) -> bool {
        self.failures.iter().any(|f| f.listener == listener)
    }
}

// =============================================================================
// Listener Table
// =============================================================================

/// Named listeners.
#[derive(Clone, Default)]
pub struct ListenerTable {
    listeners: HashMap<String, Arc<dyn ScanListener>>,
}

impl ListenerTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener, replacing any listener already under `name`.
    pub fn add(&mut self, name: impl Into<String>, listener: Arc<dyn ScanListener>) {
        self.listeners.insert(name.into(), listener);
    }

    /// Removes a listener. Returns `true` if one existed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.listeners.remove(name).is_some()
    }

    /// Checks whether a listener is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.listeners.contains_key(name)
    }

    /// Returns the number of listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Checks if no listeners are registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Delivers `scan` to `primary` first, then to every listener.
    pub fn dispatch(&self, primary: &dyn ScanListener, scan: &ScanResult) -> DispatchReport {
        let mut report = DispatchReport::default();

        report.delivered += 1;
        report.primary_failure = deliver(PRIMARY_LISTENER, primary, scan);

        for (name, listener) in &self.listeners {
            report.delivered += 1;
            if let Some(reason) = deliver(name, listener.as_ref(), scan) {
                report.failures.push(ListenerFailure {
                    listener: name.clone(),
                    reason,
                });
            }
        }

        report
    }
}

impl fmt::Debug for ListenerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.listeners.keys()).finish()
    }
}

/// Runs one callback, returning the failure reason if it errored or panicked.
fn deliver(name: &str, listener: &dyn ScanListener, scan: &ScanResult) -> Option<String> {
    let result = catch_unwind(AssertUnwindSafe(|| listener.on_scan(scan)))
        .unwrap_or_else(|panic| Err(ListenerError::Panicked(panic_message(&*panic))));

    match result {
        Ok(()) => None,
        Err(e) => {
            warn!(listener = name, raw = %scan.raw, error = %e, "Scan listener failed");
            Some(e.to_string())
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
