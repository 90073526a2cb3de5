//! Launch-signal registry: bundle creation, attachment and consume-once.
//!
//! A bundle is created once per host entry-point (re)target and is immutable
//! afterwards. Consumption is keyed on `(BundleId, key)` so a warm retarget
//! with a fresh bundle is honored while a stale or duplicate delivery of an
//! already-consumed pair can never re-trigger a transition.

use std::{
    collections::HashSet,
    sync::atomic::{AtomicU64, Ordering},
};

use glance_protocol::{BundleId, LaunchSignal, LaunchValues};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::{HostSurface, Result};

/// Process-scoped launch-signal registry.
///
/// Holds the monotonic id source, the append-only consumed set, and the
/// bundle currently attached to the host surface (if any). One registry per
/// process; pass it explicitly to every component that needs it.
pub struct SignalRegistry {
    /// Next bundle id to issue.
    next_id: AtomicU64,
    /// Append-only `(bundle, key)` pairs that have been delivered.
    consumed: Mutex<HashSet<(BundleId, String)>>,
    /// Bundle attached to the current host entry-point invocation.
    active: Mutex<Option<LaunchSignal>>,
}

impl Default for SignalRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            consumed: Mutex::new(HashSet::new()),
            active: Mutex::new(None),
        }
    }

    /// Create a bundle carrying `values`, issuing a fresh [`BundleId`].
    pub fn create_bundle(&self, values: LaunchValues) -> LaunchSignal {
        let id = BundleId(self.next_id.fetch_add(1, Ordering::Relaxed));
        trace!(%id, "bundle_created");
        LaunchSignal::new(id, values)
    }

    /// Attach `signal` to the host entry point, replacing any previous
    /// bundle (warm retarget).
    pub fn attach(&self, signal: LaunchSignal) {
        debug!(id = %signal.id(), "bundle_attached");
        *self.active.lock() = Some(signal);
    }

    /// Drop the attached bundle (the hosting surface was finished).
    pub fn detach(&self) {
        if self.active.lock().take().is_some() {
            debug!("bundle_detached");
        }
    }

    /// Consume `key` from the bundle identified by `id`.
    ///
    /// Under the registry's critical section: once `(id, key)` has been
    /// consumed, every later call returns `false` regardless of the stored
    /// value. Absent keys read as `false` but still mark the pair, so a
    /// duplicate poll cannot observe a later retarget's value by accident.
    pub fn consume(&self, id: BundleId, key: &str) -> bool {
        let mut consumed = self.consumed.lock();
        if consumed.contains(&(id, key.to_string())) {
            return false;
        }
        let value = {
            let active = self.active.lock();
            match active.as_ref() {
                Some(signal) if signal.id() == id => signal.values().get(key),
                _ => false,
            }
        };
        consumed.insert((id, key.to_string()));
        trace!(%id, key, value, "bundle_key_consumed");
        value
    }

    /// Consume `key` from the currently attached bundle.
    ///
    /// Returns `false` when no host surface / bundle is present; that is the
    /// expected cold-start condition, not an error.
    pub fn consume_active(&self, key: &str) -> bool {
        let id = match self.active.lock().as_ref() {
            Some(signal) => signal.id(),
            None => return false,
        };
        self.consume(id, key)
    }

    /// The id of the currently attached bundle, if any.
    pub fn active_id(&self) -> Option<BundleId> {
        self.active.lock().as_ref().map(LaunchSignal::id)
    }

    /// The single "request overlay" capability all trigger adapters converge
    /// on: create a bundle from `values`, retarget the host surface with it,
    /// and attach it on success.
    ///
    /// On navigation failure the bundle is not attached; the error is
    /// returned for the caller to log.
    pub fn launch(&self, host: &dyn HostSurface, values: LaunchValues) -> Result<BundleId> {
        let signal = self.create_bundle(values);
        host.retarget(&signal)?;
        let id = signal.id();
        self.attach(signal);
        Ok(id)
    }
}
