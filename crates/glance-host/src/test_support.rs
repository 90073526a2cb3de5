//! Test support: a recording [`HostSurface`] double.
//!
//! Public so downstream crates can drive their integration tests against a
//! host that records navigation calls instead of touching a platform.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use glance_protocol::LaunchSignal;
use parking_lot::Mutex;

use crate::{Error, HostSurface, Result};

/// [`HostSurface`] implementation that records every call.
///
/// With `fail_navigation(true)` every method returns
/// [`Error::Navigation`], for exercising the caught-and-logged paths.
/// Counters include failed attempts.
#[derive(Default)]
pub struct RecordingHost {
    fail: AtomicBool,
    retargets: AtomicUsize,
    finishes: AtomicUsize,
    full_app_opens: AtomicUsize,
    assistant_settings_opens: AtomicUsize,
    last_signal: Mutex<Option<LaunchSignal>>,
}

impl RecordingHost {
    /// Create a host that succeeds on every call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent navigation calls fail (or succeed again).
    pub fn fail_navigation(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Number of `retarget` attempts observed.
    pub fn retargets(&self) -> usize {
        self.retargets.load(Ordering::SeqCst)
    }

    /// Number of `finish` attempts observed.
    pub fn finishes(&self) -> usize {
        self.finishes.load(Ordering::SeqCst)
    }

    /// Number of `open_full_app` attempts observed.
    pub fn full_app_opens(&self) -> usize {
        self.full_app_opens.load(Ordering::SeqCst)
    }

    /// Number of `open_assistant_settings` attempts observed.
    pub fn assistant_settings_opens(&self) -> usize {
        self.assistant_settings_opens.load(Ordering::SeqCst)
    }

    /// The most recently retargeted signal, if any.
    pub fn last_signal(&self) -> Option<LaunchSignal> {
        self.last_signal.lock().clone()
    }

    fn outcome(&self, op: &str) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            Err(Error::Navigation(format!("{op}: simulated failure")))
        } else {
            Ok(())
        }
    }
}

impl HostSurface for RecordingHost {
    fn retarget(&self, signal: &LaunchSignal) -> Result<()> {
        self.retargets.fetch_add(1, Ordering::SeqCst);
        let outcome = self.outcome("retarget");
        if outcome.is_ok() {
            *self.last_signal.lock() = Some(signal.clone());
        }
        outcome
    }

    fn finish(&self) -> Result<()> {
        self.finishes.fetch_add(1, Ordering::SeqCst);
        self.outcome("finish")
    }

    fn open_full_app(&self) -> Result<()> {
        self.full_app_opens.fetch_add(1, Ordering::SeqCst);
        self.outcome("open_full_app")
    }

    fn open_assistant_settings(&self) -> Result<()> {
        self.assistant_settings_opens.fetch_add(1, Ordering::SeqCst);
        self.outcome("open_assistant_settings")
    }
}
