//! Process-scoped runtime state flags.

use std::sync::atomic::{AtomicBool, Ordering};

use glance_protocol::{AppState, Event, EventBridge};
use tracing::debug;

/// Process-wide runtime flags: is-foreground and is-running.
///
/// Each flag is individually safe under concurrent access from the UI
/// thread and the scheduler thread; no invariant spans both, so no combined
/// ordering is guaranteed. `set_foreground` detects edges and fires the
/// matching transition event through the bridge; a same-value re-set fires
/// nothing. Reads are pure. This component cannot fail.
pub struct StateStore {
    foreground: AtomicBool,
    running: AtomicBool,
    bridge: EventBridge,
}

impl StateStore {
    /// Create a store with both flags cleared.
    pub fn new(bridge: EventBridge) -> Self {
        Self {
            foreground: AtomicBool::new(false),
            running: AtomicBool::new(false),
            bridge,
        }
    }

    /// Set the foreground flag, emitting `Foreground`/`Background` only on
    /// an actual change.
    pub fn set_foreground(&self, value: bool) {
        let prev = self.foreground.swap(value, Ordering::SeqCst);
        if prev == value {
            return;
        }
        debug!(foreground = value, "foreground_changed");
        let event = if value {
            Event::Foreground
        } else {
            Event::Background
        };
        self.bridge.emit(event);
    }

    /// Whether the primary UI currently holds user focus.
    pub fn is_foreground(&self) -> bool {
        self.foreground.load(Ordering::SeqCst)
    }

    /// Set the running flag. No event is attached to this flag.
    pub fn set_running(&self, value: bool) {
        let prev = self.running.swap(value, Ordering::SeqCst);
        if prev != value {
            debug!(running = value, "running_changed");
        }
    }

    /// Whether the background execution context is running, as far as this
    /// process knows.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Current focus state in reporting form.
    pub fn app_state(&self) -> AppState {
        if self.is_foreground() {
            AppState::Foreground
        } else {
            AppState::Background
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    fn store_with_counters() -> (StateStore, Arc<AtomicUsize>, Arc<AtomicUsize>, EventBridge) {
        let bridge = EventBridge::new();
        let fg = Arc::new(AtomicUsize::new(0));
        let bg = Arc::new(AtomicUsize::new(0));
        let fg_in = fg.clone();
        let bg_in = bg.clone();
        // Leak the subscriptions for the duration of the test.
        std::mem::forget(bridge.subscribe(Event::Foreground, move || {
            fg_in.fetch_add(1, Ordering::SeqCst);
        }));
        std::mem::forget(bridge.subscribe(Event::Background, move || {
            bg_in.fetch_add(1, Ordering::SeqCst);
        }));
        (StateStore::new(bridge.clone()), fg, bg, bridge)
    }

    #[test]
    fn transition_fires_only_on_edges() {
        let (store, fg, bg, _bridge) = store_with_counters();

        store.set_foreground(true);
        store.set_foreground(true);
        store.set_foreground(false);
        store.set_foreground(false);
        store.set_foreground(true);

        assert_eq!(fg.load(Ordering::SeqCst), 2);
        assert_eq!(bg.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn initial_same_value_set_is_silent() {
        let (store, fg, bg, _bridge) = store_with_counters();
        store.set_foreground(false);
        assert_eq!(fg.load(Ordering::SeqCst), 0);
        assert_eq!(bg.load(Ordering::SeqCst), 0);
        assert_eq!(store.app_state(), AppState::Background);
    }

    #[test]
    fn running_flag_is_independent() {
        let (store, fg, bg, _bridge) = store_with_counters();
        store.set_running(true);
        assert!(store.is_running());
        store.set_running(false);
        assert!(!store.is_running());
        assert_eq!(fg.load(Ordering::SeqCst), 0);
        assert_eq!(bg.load(Ordering::SeqCst), 0);
    }
}
