//! Transient overlay orchestration.
//!
//! This crate is the embedding surface of the glance core: one
//! [`Coordinator`] per UI process wires together the runtime state store,
//! the launch-signal registry, the heartbeat-driven runtime service, the
//! overlay state machine and the event bridge, and exposes the command
//! surface the UI layer calls.
//!
//! Conventions
//! - Nothing here surfaces an error to the caller: policy refusal shows up
//!   only as the absence of the running state, navigation failures are
//!   logged no-ops, and events emitted during teardown are silently
//!   dropped. The user-visible failure mode is "the overlay did not
//!   appear", never a crash.
//! - All state is process-scoped and owned by the coordinator; a runtime in
//!   a separate worker process holds its own independent copies
//!   (`ProcessRole::Worker` keeps liveness local instead of emitting UI
//!   events).
//! - Platform lifecycle callbacks are adapted to the two-event
//!   [`LifecycleEvents`] source; the active edge doubles as the
//!   launch-signal poll point, which covers warm retargeting without a
//!   remount.
//!
//! Trigger adapters (quick-toggle tile, accessibility shortcut, voice
//! assistant session, background service) are thin external shims; each one
//! just calls [`Coordinator::trigger_overlay_from_background`]-equivalent
//! with no payload beyond "show overlay now".

use std::{sync::Arc, time::Duration};

use glance_engine::{RuntimeService, StateStore};
use tracing::warn;

pub use glance_engine::{
    AlwaysAllow, Denial, ForegroundStartPolicy, LivenessRecord, ProcessRole, RunState, StartPolicy,
};
pub use glance_host::{Error as HostError, HostSurface, LifecycleEvents, SignalRegistry};
pub use glance_overlay::{AppApi, OverlayContent, OverlayController};
pub use glance_protocol::{
    Action, AppState, BundleId, Event, EventBridge, LaunchSignal, LaunchValues, OPEN_OVERLAY,
    OPEN_OVERLAY_ONLY, OverlayMode, Subscription,
};

/// Configures and builds a [`Coordinator`].
pub struct CoordinatorBuilder {
    host: Arc<dyn HostSurface>,
    policy: Arc<dyn StartPolicy>,
    role: ProcessRole,
    heartbeat_interval: Duration,
}

impl CoordinatorBuilder {
    /// Start from a host surface, with the foreground start policy,
    /// primary-UI role and the default heartbeat cadence.
    pub fn new(host: Arc<dyn HostSurface>) -> Self {
        Self {
            host,
            policy: Arc::new(ForegroundStartPolicy),
            role: ProcessRole::PrimaryUi,
            heartbeat_interval: RuntimeService::DEFAULT_HEARTBEAT_INTERVAL,
        }
    }

    /// Replace the start policy.
    pub fn with_policy(mut self, policy: Arc<dyn StartPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Set the process role.
    pub fn with_role(mut self, role: ProcessRole) -> Self {
        self.role = role;
        self
    }

    /// Set the heartbeat interval.
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Wire everything up.
    pub fn build(self) -> Coordinator {
        let bridge = EventBridge::new();
        let state = Arc::new(StateStore::new(bridge.clone()));
        let registry = Arc::new(SignalRegistry::new());
        let overlay = Arc::new(OverlayController::new(
            Arc::clone(&registry),
            Arc::clone(&self.host),
        ));
        let runtime = RuntimeService::new(
            Arc::clone(&state),
            Arc::clone(&registry),
            Arc::clone(&self.host),
            bridge.clone(),
            self.policy,
            self.role,
            self.heartbeat_interval,
        );

        // The native close request drives the same transition as a user
        // close; the subscription lives as long as the coordinator.
        let overlay_for_close = Arc::clone(&overlay);
        let close_sub = bridge.subscribe(Event::CloseOverlayRequested, move || {
            overlay_for_close.close();
        });

        Coordinator {
            bridge,
            state,
            registry,
            host: self.host,
            runtime,
            overlay,
            _close_sub: close_sub,
        }
    }
}

/// Process-wide orchestrator handle exposed to the UI layer.
///
/// Construct via [`Coordinator::builder`]. Dispatching runtime actions and
/// the heartbeat require a tokio runtime context.
pub struct Coordinator {
    bridge: EventBridge,
    state: Arc<StateStore>,
    registry: Arc<SignalRegistry>,
    host: Arc<dyn HostSurface>,
    runtime: RuntimeService,
    overlay: Arc<OverlayController>,
    _close_sub: Subscription,
}

impl Coordinator {
    /// Begin building a coordinator around `host`.
    pub fn builder(host: Arc<dyn HostSurface>) -> CoordinatorBuilder {
        CoordinatorBuilder::new(host)
    }

    /// Provider-mount hook: seed the foreground flag from the current
    /// bridge attachment and run the mount-time launch-signal poll.
    ///
    /// Call once after construction, before lifecycle events start flowing.
    /// Subsequent polls happen on every active edge.
    pub fn init(&self) {
        self.state.set_foreground(self.bridge.is_attached());
        self.overlay.poll_launch_signals();
    }

    /// Attempt to start the background execution context.
    ///
    /// Policy refusal is quiet: the context ends up stopped and no error
    /// reaches the caller.
    pub fn start_runtime(&self) {
        self.runtime.dispatch(Action::Start);
    }

    /// Stop the background execution context and its heartbeat.
    pub fn stop_runtime(&self) {
        self.runtime.dispatch(Action::Stop);
    }

    /// Background-origin trigger: retarget the host entry point with an
    /// `openOverlay` launch signal. Works whether or not the runtime is
    /// running.
    pub fn trigger_overlay_from_background(&self) {
        self.runtime.dispatch(Action::TriggerOverlay);
    }

    /// Open the overlay and bring the application to front.
    pub fn open_overlay(&self) {
        self.overlay.open_and_bring_to_front();
    }

    /// Ask the UI to close the overlay.
    ///
    /// Emits [`Event::CloseOverlayRequested`]; the coordinator's own
    /// subscription performs the state transition, and any UI listeners see
    /// the same event.
    pub fn close_overlay(&self) {
        self.bridge.emit(Event::CloseOverlayRequested);
    }

    /// Leave overlay-only mode for the full application chrome.
    pub fn open_full_app(&self) {
        self.overlay.request_full_app();
        if let Err(e) = self.host.open_full_app() {
            warn!(error = %e, "open_full_app_failed");
        }
    }

    /// Tear the current hosting surface down.
    pub fn finish_surface(&self) {
        self.registry.detach();
        if let Err(e) = self.host.finish() {
            warn!(error = %e, "finish_surface_failed");
        }
    }

    /// Open the platform's default-assistant settings screen.
    pub fn open_assistant_settings(&self) {
        if let Err(e) = self.host.open_assistant_settings() {
            warn!(error = %e, "open_assistant_settings_failed");
        }
    }

    /// Consume a launch extra from the currently attached bundle.
    ///
    /// Returns `false` with no host surface present, and `false` for every
    /// repeated read of the same `(bundle, key)` pair.
    pub fn get_and_clear_launch_extra(&self, key: &str) -> bool {
        self.registry.consume_active(key)
    }

    /// Current focus state.
    pub fn current_state(&self) -> AppState {
        self.state.app_state()
    }

    /// Register a payload-less event listener.
    pub fn subscribe<F>(&self, event: Event, handler: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.bridge.subscribe(event, handler)
    }

    /// The overlay state machine, for mode queries and app-api / content
    /// registration.
    pub fn overlay(&self) -> &OverlayController {
        &self.overlay
    }

    /// The launch-signal registry. Trigger adapters that need values beyond
    /// plain `openOverlay` (e.g. an assistant session requesting
    /// overlay-only chrome) retarget through
    /// [`SignalRegistry::launch`] with their own [`LaunchValues`].
    pub fn signals(&self) -> &SignalRegistry {
        &self.registry
    }

    /// Current execution-context state.
    pub fn run_state(&self) -> RunState {
        self.runtime.run_state()
    }

    /// Local liveness record of this process's runtime.
    pub fn liveness(&self) -> Arc<LivenessRecord> {
        self.runtime.liveness()
    }

    /// Tear the UI side of the bridge down; all later emits become silent
    /// no-ops. Part of process shutdown, not normal operation.
    pub fn detach_bridge(&self) {
        self.bridge.detach();
    }
}

impl LifecycleEvents for Coordinator {
    fn on_active(&self) {
        self.state.set_foreground(true);
        // Active edges double as the launch-signal poll point so a warm
        // retarget is honored without a remount.
        self.overlay.poll_launch_signals();
    }

    fn on_inactive(&self) {
        self.state.set_foreground(false);
    }
}
