//! Gated event bridge between the runtime side and UI listeners.
//!
//! Emission is fire-and-forget: an event is delivered to the handlers
//! registered at the instant of the emit and to nobody else. There is no
//! buffering or replay; a listener attached after a transition never
//! observes it. With zero listeners, or after [`EventBridge::detach`],
//! emission is a silent no-op rather than an error, since teardown races
//! between the two sides are expected.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::trace;

use crate::Event;

/// Handler invoked on event delivery.
type Handler = Arc<dyn Fn() + Send + Sync>;

/// One registered listener.
struct Listener {
    id: u64,
    event: Event,
    handler: Handler,
}

/// Listener registry shared between the bridge and its subscriptions.
struct Registry {
    next_id: u64,
    detached: bool,
    listeners: Vec<Listener>,
}

/// Gated, payload-less event fan-out to currently attached listeners.
///
/// Cheap to clone; clones share the listener registry.
#[derive(Clone)]
pub struct EventBridge {
    inner: Arc<Mutex<Registry>>,
}

impl Default for EventBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBridge {
    /// Create an empty, attached bridge.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Registry {
                next_id: 0,
                detached: false,
                listeners: Vec::new(),
            })),
        }
    }

    /// Register `handler` for `event`.
    ///
    /// Delivery stops when the returned [`Subscription`] is dropped.
    /// Subscribing on a detached bridge still registers the listener; it
    /// simply never fires until the bridge would be re-created.
    pub fn subscribe<F>(&self, event: Event, handler: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut reg = self.inner.lock();
        let id = reg.next_id;
        reg.next_id += 1;
        reg.listeners.push(Listener {
            id,
            event,
            handler: Arc::new(handler),
        });
        Subscription {
            registry: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Emit `event` to every listener registered for it right now.
    ///
    /// Returns `true` when at least one handler ran. Handlers are invoked
    /// outside the registry lock, so a handler may re-enter the bridge.
    pub fn emit(&self, event: Event) -> bool {
        let handlers: Vec<Handler> = {
            let reg = self.inner.lock();
            if reg.detached || reg.listeners.is_empty() {
                trace!(event = event.as_str(), "bridge_emit_suppressed");
                return false;
            }
            reg.listeners
                .iter()
                .filter(|l| l.event == event)
                .map(|l| Arc::clone(&l.handler))
                .collect()
        };
        for handler in &handlers {
            handler();
        }
        !handlers.is_empty()
    }

    /// Number of currently registered listeners, across all events.
    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }

    /// True until [`EventBridge::detach`] has been called.
    pub fn is_attached(&self) -> bool {
        !self.inner.lock().detached
    }

    /// Tear the UI side down: all subsequent emits become silent no-ops.
    ///
    /// Idempotent. Registered listeners are kept so late unsubscribes stay
    /// harmless.
    pub fn detach(&self) {
        self.inner.lock().detached = true;
    }
}

/// RAII unsubscribe handle returned by [`EventBridge::subscribe`].
///
/// Dropping the subscription removes the listener. Outliving the bridge is
/// fine; removal is then a no-op.
pub struct Subscription {
    registry: Weak<Mutex<Registry>>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.registry.upgrade() {
            inner.lock().listeners.retain(|l| l.id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counting(bridge: &EventBridge, event: Event) -> (Subscription, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_in = hits.clone();
        let sub = bridge.subscribe(event, move || {
            hits_in.fetch_add(1, Ordering::SeqCst);
        });
        (sub, hits)
    }

    #[test]
    fn emit_without_listeners_is_a_noop() {
        let bridge = EventBridge::new();
        assert!(!bridge.emit(Event::Heartbeat));
    }

    #[test]
    fn emit_reaches_only_matching_listeners() {
        let bridge = EventBridge::new();
        let (_fg, fg_hits) = counting(&bridge, Event::Foreground);
        let (_hb, hb_hits) = counting(&bridge, Event::Heartbeat);

        assert!(bridge.emit(Event::Foreground));
        assert_eq!(fg_hits.load(Ordering::SeqCst), 1);
        assert_eq!(hb_hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn no_replay_for_late_subscribers() {
        let bridge = EventBridge::new();
        {
            let (_early, _) = counting(&bridge, Event::Background);
            bridge.emit(Event::Background);
        }
        let (_late, hits) = counting(&bridge, Event::Background);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn dropped_subscription_stops_delivery() {
        let bridge = EventBridge::new();
        let (sub, hits) = counting(&bridge, Event::Heartbeat);
        assert!(bridge.emit(Event::Heartbeat));
        drop(sub);
        assert!(!bridge.emit(Event::Heartbeat));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(bridge.listener_count(), 0);
    }

    #[test]
    fn detach_silences_emission() {
        let bridge = EventBridge::new();
        let (_sub, hits) = counting(&bridge, Event::CloseOverlayRequested);
        bridge.detach();
        assert!(!bridge.is_attached());
        assert!(!bridge.emit(Event::CloseOverlayRequested));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn handlers_may_reenter_the_bridge() {
        let bridge = EventBridge::new();
        let inner = bridge.clone();
        let _sub = bridge.subscribe(Event::Foreground, move || {
            // Re-entrant listener count must not deadlock.
            let _ = inner.listener_count();
        });
        assert!(bridge.emit(Event::Foreground));
    }
}
