//! Action router for the background execution context.

use std::{sync::Arc, time::Duration};

use glance_host::{HostSurface, SignalRegistry};
use glance_protocol::{Action, Event, EventBridge, LaunchValues};
use tracing::{debug, trace, warn};

use crate::{Heartbeat, LivenessRecord, StartPolicy, StateStore};

/// Which process this runtime instance lives in.
///
/// Only the primary UI process has bridge listeners; a worker-role runtime
/// records heartbeats locally instead of emitting events that nothing could
/// receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessRole {
    /// The process hosting the primary UI and its event bridge.
    PrimaryUi,
    /// An isolated worker process with no UI connectivity.
    Worker,
}

/// Execution-context state as tracked by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// The background execution context is not running.
    Stopped,
    /// The background execution context holds its privileged running mode.
    Running,
}

/// Routes `{Start, Stop, TriggerOverlay}` onto the state store, heartbeat
/// scheduler and host surface.
///
/// `dispatch` never surfaces an error: policy refusal and navigation
/// failures are logged and absorbed, per the best-effort contract of this
/// layer. Must be driven from within a tokio runtime.
pub struct RuntimeService {
    state: Arc<StateStore>,
    registry: Arc<SignalRegistry>,
    host: Arc<dyn HostSurface>,
    bridge: EventBridge,
    policy: Arc<dyn StartPolicy>,
    heartbeat: Heartbeat,
    liveness: Arc<LivenessRecord>,
    role: ProcessRole,
    interval: Duration,
}

impl RuntimeService {
    /// Liveness tick cadence used when none is configured.
    pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_millis(3000);

    /// Create a router over the given context objects.
    pub fn new(
        state: Arc<StateStore>,
        registry: Arc<SignalRegistry>,
        host: Arc<dyn HostSurface>,
        bridge: EventBridge,
        policy: Arc<dyn StartPolicy>,
        role: ProcessRole,
        interval: Duration,
    ) -> Self {
        Self {
            state,
            registry,
            host,
            bridge,
            policy,
            heartbeat: Heartbeat::new(),
            liveness: Arc::new(LivenessRecord::new()),
            role,
            interval,
        }
    }

    /// Route one action.
    pub fn dispatch(&self, action: Action) {
        trace!(?action, "dispatch");
        match action {
            Action::Start => self.start(),
            Action::Stop => self.stop(),
            Action::TriggerOverlay => self.trigger_overlay(),
        }
    }

    /// Attempt to elevate to running mode and arm the heartbeat.
    ///
    /// Refusal by policy is not an error: it is logged and causes an
    /// immediate transition back to [`RunState::Stopped`]. Starting while
    /// already running just reschedules the heartbeat.
    fn start(&self) {
        if let Err(denial) = self.policy.authorize_start(&self.state) {
            warn!(%denial, "runtime_start_refused");
            self.stop();
            return;
        }

        if self.state.is_running() {
            debug!("runtime_already_running");
        }
        self.state.set_running(true);

        let bridge = self.bridge.clone();
        let liveness = Arc::clone(&self.liveness);
        let role = self.role;
        self.heartbeat.schedule(self.interval, move || {
            liveness.mark();
            match role {
                ProcessRole::PrimaryUi => {
                    bridge.emit(Event::Heartbeat);
                }
                ProcessRole::Worker => {
                    // No UI connectivity here; the local record is the
                    // liveness signal.
                    trace!("is_live");
                }
            }
        });
        debug!("runtime_started");
    }

    /// Stopped-entry: cancel the heartbeat, then clear the running flag.
    /// Runs the same way whether triggered by an explicit Stop or an
    /// external teardown.
    fn stop(&self) {
        self.heartbeat.cancel_sync();
        self.state.set_running(false);
        debug!("runtime_stopped");
    }

    /// Retarget the host entry point with an `openOverlay` signal.
    /// Independent of the running state.
    fn trigger_overlay(&self) {
        match self.registry.launch(self.host.as_ref(), LaunchValues::overlay()) {
            Ok(id) => debug!(%id, "overlay_triggered"),
            Err(e) => warn!(error = %e, "trigger_overlay_failed"),
        }
    }

    /// Current execution-context state.
    pub fn run_state(&self) -> RunState {
        if self.state.is_running() {
            RunState::Running
        } else {
            RunState::Stopped
        }
    }

    /// True while a heartbeat timer is armed.
    pub fn heartbeat_active(&self) -> bool {
        self.heartbeat.is_active()
    }

    /// Local liveness record for this process.
    pub fn liveness(&self) -> Arc<LivenessRecord> {
        Arc::clone(&self.liveness)
    }
}
