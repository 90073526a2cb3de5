//! Heartbeat scheduler: a single repeating liveness timer.
//!
//! At most one timer is active per scheduler at any time; `schedule` always
//! cancels the previous instance before arming a new one, and cancellation
//! is observed before the next tick closure runs. Ticks are driven by a
//! spawned tokio task, so scheduling must happen inside a runtime.

use std::{
    sync::{
        Arc,
        mpsc::{Receiver, channel},
    },
    thread,
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Upper bound on the blocking wait for a cancelled timer task to wind down.
const STOP_WAIT_TIMEOUT_MS: u64 = 250;

/// Poll interval used while waiting for the timer task to finish.
const STOP_POLL_INTERVAL_MS: u64 = 2;

/// One armed timer instance.
struct Entry {
    token: CancellationToken,
    handle: tokio::task::JoinHandle<()>,
    done_rx: Receiver<()>,
}

/// Single-instance repeating timer with cancel-before-reschedule discipline.
///
/// Cheap to clone; clones share the active timer slot.
#[derive(Clone)]
pub struct Heartbeat {
    slot: Arc<Mutex<Option<Entry>>>,
}

impl Default for Heartbeat {
    fn default() -> Self {
        Self::new()
    }
}

impl Heartbeat {
    /// Create a scheduler with no timer armed.
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// True while a timer instance is armed.
    pub fn is_active(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Arm a timer that runs `on_tick` every `interval`, replacing any
    /// existing instance first.
    ///
    /// The first tick fires one full `interval` after scheduling. Missed
    /// ticks are skipped, never bunched.
    pub fn schedule<F>(&self, interval: Duration, mut on_tick: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.cancel();

        let token = CancellationToken::new();
        let cancel = token.clone();
        let (done_tx, done_rx) = channel::<()>();

        let fut = async move {
            trace!(interval_ms = interval.as_millis(), "heartbeat_armed");
            let mut ticker = time::interval_at(time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        trace!("heartbeat_cancelled");
                        let _ = done_tx.send(());
                        return;
                    }
                    _ = ticker.tick() => {
                        // A cancel racing the tick wins; the closure of a
                        // cancelled instance must not run.
                        if cancel.is_cancelled() {
                            continue;
                        }
                        on_tick();
                    }
                }
            }
        };

        let handle = tokio::spawn(fut);
        *self.slot.lock() = Some(Entry {
            token,
            handle,
            done_rx,
        });
    }

    /// Cancel the armed timer, if any (non-blocking, idempotent).
    ///
    /// The token is cancelled synchronously, so the tick closure of the old
    /// instance cannot run after this returns; the task itself winds down
    /// asynchronously.
    pub fn cancel(&self) {
        if let Some(entry) = self.slot.lock().take() {
            entry.token.cancel();
            trace!("heartbeat_stop");
        }
    }

    /// Cancel the armed timer and wait briefly for the task to finish.
    ///
    /// Blocks the calling thread up to a small bound; use from teardown
    /// paths where "no tick may fire after this returns" must also cover
    /// the task's final wind-down.
    pub fn cancel_sync(&self) {
        if let Some(entry) = self.slot.lock().take() {
            entry.token.cancel();
            let deadline = Duration::from_millis(STOP_WAIT_TIMEOUT_MS);
            let _ = entry.done_rx.recv_timeout(deadline);
            // Backstop: if the completion signal was lost, poll the handle.
            let handle = entry.handle;
            let start = Instant::now();
            while !handle.is_finished() && start.elapsed() < deadline {
                thread::sleep(Duration::from_millis(STOP_POLL_INTERVAL_MS));
            }
            trace!("heartbeat_stop_sync");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn schedule_twice_leaves_one_active_timer() {
        let hb = Heartbeat::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let c = first.clone();
        hb.schedule(Duration::from_millis(10), move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        let c = second.clone();
        hb.schedule(Duration::from_millis(10), move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(55)).await;
        hb.cancel_sync();

        assert_eq!(first.load(Ordering::SeqCst), 0, "replaced timer must not tick");
        assert!(second.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn cancel_is_idempotent_and_stops_ticks() {
        let hb = Heartbeat::new();
        let ticks = Arc::new(AtomicUsize::new(0));
        let c = ticks.clone();
        hb.schedule(Duration::from_millis(10), move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(35)).await;
        hb.cancel_sync();
        hb.cancel();
        assert!(!hb.is_active());

        let after_cancel = ticks.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), after_cancel);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn first_tick_waits_a_full_interval() {
        let hb = Heartbeat::new();
        let ticks = Arc::new(AtomicUsize::new(0));
        let c = ticks.clone();
        hb.schedule(Duration::from_millis(80), move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
        hb.cancel_sync();
    }
}
