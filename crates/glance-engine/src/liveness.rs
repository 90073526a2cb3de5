//! Local liveness record for runtimes without UI connectivity.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Instant,
};

use parking_lot::Mutex;

/// Tick bookkeeping local to this process.
///
/// When the runtime heartbeats in an isolated worker process, no UI event can
/// be produced; ticks are recorded here instead so operators retain a
/// liveness signal. There is no cross-process propagation: a reader in
/// another process sees its own record, not this one.
#[derive(Default)]
pub struct LivenessRecord {
    ticks: AtomicU64,
    last_tick: Mutex<Option<Instant>>,
}

impl LivenessRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one tick.
    pub fn mark(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        *self.last_tick.lock() = Some(Instant::now());
    }

    /// Total ticks recorded so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Instant of the most recent tick, if any.
    pub fn last_tick(&self) -> Option<Instant> {
        *self.last_tick.lock()
    }
}
