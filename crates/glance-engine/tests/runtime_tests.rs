//! Integration tests for the runtime action router.

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use glance_engine::{
    AlwaysAllow, ForegroundStartPolicy, ProcessRole, RunState, RuntimeService, StartPolicy,
    StateStore,
};
use glance_host::{SignalRegistry, test_support::RecordingHost};
use glance_protocol::{Action, Event, EventBridge, OPEN_OVERLAY, Subscription};

const TICK: Duration = Duration::from_millis(10);

struct Harness {
    service: RuntimeService,
    state: Arc<StateStore>,
    registry: Arc<SignalRegistry>,
    host: Arc<RecordingHost>,
    bridge: EventBridge,
}

fn harness(policy: Arc<dyn StartPolicy>, role: ProcessRole) -> Harness {
    let bridge = EventBridge::new();
    let state = Arc::new(StateStore::new(bridge.clone()));
    let registry = Arc::new(SignalRegistry::new());
    let host = Arc::new(RecordingHost::new());
    let service = RuntimeService::new(
        state.clone(),
        registry.clone(),
        host.clone(),
        bridge.clone(),
        policy,
        role,
        TICK,
    );
    Harness {
        service,
        state,
        registry,
        host,
        bridge,
    }
}

fn count_heartbeats(bridge: &EventBridge) -> (Subscription, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_in = hits.clone();
    let sub = bridge.subscribe(Event::Heartbeat, move || {
        hits_in.fetch_add(1, Ordering::SeqCst);
    });
    (sub, hits)
}

#[tokio::test(flavor = "multi_thread")]
async fn start_schedules_heartbeat_and_sets_running() {
    let h = harness(Arc::new(AlwaysAllow), ProcessRole::PrimaryUi);
    let (_sub, beats) = count_heartbeats(&h.bridge);

    h.service.dispatch(Action::Start);
    assert_eq!(h.service.run_state(), RunState::Running);
    assert!(h.service.heartbeat_active());

    tokio::time::sleep(Duration::from_millis(45)).await;
    assert!(beats.load(Ordering::SeqCst) >= 2);

    h.service.dispatch(Action::Stop);
    assert_eq!(h.service.run_state(), RunState::Stopped);
    assert!(!h.service.heartbeat_active());
    assert!(!h.state.is_running());

    let after_stop = beats.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(beats.load(Ordering::SeqCst), after_stop, "no tick after stop");
}

#[tokio::test(flavor = "multi_thread")]
async fn start_while_running_is_idempotent() {
    let h = harness(Arc::new(AlwaysAllow), ProcessRole::PrimaryUi);

    h.service.dispatch(Action::Start);
    let liveness = h.service.liveness();
    tokio::time::sleep(Duration::from_millis(25)).await;

    h.service.dispatch(Action::Start);
    assert_eq!(h.service.run_state(), RunState::Running);
    assert!(h.service.heartbeat_active());

    // Rescheduled, not doubled: in a window of ~4 intervals we must not see
    // more ticks than a single timer could produce.
    let before = liveness.ticks();
    tokio::time::sleep(Duration::from_millis(42)).await;
    let produced = liveness.ticks() - before;
    assert!(produced <= 5, "single timer expected, saw {produced} ticks");

    h.service.dispatch(Action::Stop);
}

#[tokio::test(flavor = "multi_thread")]
async fn refused_start_stops_quietly() {
    // Foreground policy with the UI in the background: refusal path.
    let h = harness(Arc::new(ForegroundStartPolicy), ProcessRole::PrimaryUi);
    assert!(!h.state.is_foreground());

    h.service.dispatch(Action::Start);

    // Reported only through the absence of the running state.
    assert_eq!(h.service.run_state(), RunState::Stopped);
    assert!(!h.service.heartbeat_active());
    assert_eq!(h.service.liveness().ticks(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn foreground_policy_allows_focused_start() {
    let h = harness(Arc::new(ForegroundStartPolicy), ProcessRole::PrimaryUi);
    h.state.set_foreground(true);

    h.service.dispatch(Action::Start);
    assert_eq!(h.service.run_state(), RunState::Running);
    h.service.dispatch(Action::Stop);
}

#[tokio::test(flavor = "multi_thread")]
async fn stop_while_stopped_is_harmless() {
    let h = harness(Arc::new(AlwaysAllow), ProcessRole::PrimaryUi);
    h.service.dispatch(Action::Stop);
    assert_eq!(h.service.run_state(), RunState::Stopped);
    assert!(!h.service.heartbeat_active());
}

#[tokio::test(flavor = "multi_thread")]
async fn trigger_overlay_works_while_stopped() {
    let h = harness(Arc::new(AlwaysAllow), ProcessRole::PrimaryUi);
    assert_eq!(h.service.run_state(), RunState::Stopped);

    h.service.dispatch(Action::TriggerOverlay);

    assert_eq!(h.host.retargets(), 1);
    let signal = h.host.last_signal().expect("signal delivered");
    assert!(signal.values().get(OPEN_OVERLAY));
    assert!(h.registry.consume_active(OPEN_OVERLAY));
    assert!(!h.registry.consume_active(OPEN_OVERLAY));
}

#[tokio::test(flavor = "multi_thread")]
async fn trigger_overlay_navigation_failure_is_absorbed() {
    let h = harness(Arc::new(AlwaysAllow), ProcessRole::PrimaryUi);
    h.host.fail_navigation(true);

    h.service.dispatch(Action::TriggerOverlay);

    assert_eq!(h.host.retargets(), 1);
    assert!(h.registry.active_id().is_none());
    assert!(!h.registry.consume_active(OPEN_OVERLAY));
}

#[tokio::test(flavor = "multi_thread")]
async fn worker_role_records_liveness_without_events() {
    let h = harness(Arc::new(AlwaysAllow), ProcessRole::Worker);
    let (_sub, beats) = count_heartbeats(&h.bridge);

    h.service.dispatch(Action::Start);
    let liveness = h.service.liveness();
    tokio::time::sleep(Duration::from_millis(45)).await;
    h.service.dispatch(Action::Stop);

    assert!(liveness.ticks() >= 2);
    assert!(liveness.last_tick().is_some());
    assert_eq!(beats.load(Ordering::SeqCst), 0, "worker ticks stay local");
}
