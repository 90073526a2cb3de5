//! Binary entrypoint for the glance demo CLI.
//!
//! Drives a [`Coordinator`] through the flows the orchestrator exists for:
//! a background-origin overlay trigger, an assistant-style overlay-only
//! session, and a heartbeat watch. The host surface is a logging stand-in;
//! on a real platform it would adapt these calls to the native entry point.

use std::{sync::Arc, time::Duration};

use clap::{Parser, Subcommand};
use glance::{
    AlwaysAllow, Coordinator, Event, HostSurface, LaunchSignal, LaunchValues, LifecycleEvents,
    OverlayMode, RunState,
};
use logging as logshared;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(name = "glance", about = "Transient overlay orchestration demo", version)]
/// Command-line interface for the `glance` binary.
struct Cli {
    /// Scenario to run.
    #[command(subcommand)]
    command: Command,

    /// Heartbeat interval in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 3000)]
    heartbeat_ms: u64,

    /// Logging controls
    #[command(flatten)]
    log: logshared::LogArgs,
}

#[derive(Subcommand, Debug)]
/// Top-level CLI subcommands.
enum Command {
    /// Background trigger flow: tile tap while the app is backgrounded.
    Trigger,
    /// Assistant flow: overlay-only session, then swap to the full app.
    Assistant,
    /// Start the runtime and watch heartbeats for a few seconds.
    Watch {
        /// How long to watch, in seconds
        #[arg(long, default_value_t = 10)]
        seconds: u64,
    },
}

/// Host surface that logs navigation instead of touching a platform.
struct LoggingHost;

impl HostSurface for LoggingHost {
    fn retarget(&self, signal: &LaunchSignal) -> glance_host::Result<()> {
        info!(id = %signal.id(), "host: retarget entry point");
        Ok(())
    }

    fn finish(&self) -> glance_host::Result<()> {
        info!("host: finish surface");
        Ok(())
    }

    fn open_full_app(&self) -> glance_host::Result<()> {
        info!("host: open full app");
        Ok(())
    }

    fn open_assistant_settings(&self) -> glance_host::Result<()> {
        info!("host: open assistant settings");
        Ok(())
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = Cli::parse();

    let final_spec = logshared::compute_spec(
        cli.log.trace,
        cli.log.debug,
        cli.log.log_level.as_deref(),
        cli.log.log_filter.as_deref(),
    );
    tracing_subscriber::registry()
        .with(logshared::env_filter_from_spec(&final_spec))
        .with(fmt::layer().without_time())
        .init();

    let coordinator = Coordinator::builder(Arc::new(LoggingHost))
        .with_policy(Arc::new(AlwaysAllow))
        .with_heartbeat_interval(Duration::from_millis(cli.heartbeat_ms))
        .build();

    let _subs = [
        coordinator.subscribe(Event::Foreground, || info!("event: foreground")),
        coordinator.subscribe(Event::Background, || info!("event: background")),
        coordinator.subscribe(Event::Heartbeat, || info!("event: heartbeat")),
        coordinator.subscribe(Event::CloseOverlayRequested, || {
            info!("event: close overlay requested")
        }),
    ];

    coordinator.init();

    match cli.command {
        Command::Trigger => trigger_flow(&coordinator).await,
        Command::Assistant => assistant_flow(&coordinator),
        Command::Watch { seconds } => watch_flow(&coordinator, seconds).await,
    }
}

/// Tile tap while backgrounded: trigger, come to front, poll, close.
async fn trigger_flow(coordinator: &Coordinator) {
    coordinator.on_inactive();
    info!(state = coordinator.current_state().as_str(), "app backgrounded");

    coordinator.trigger_overlay_from_background();
    info!("tile tapped: overlay trigger dispatched");

    coordinator.on_active();
    let mode = coordinator.overlay().mode();
    info!(?mode, visible = mode.is_visible(), "entry point active");

    tokio::time::sleep(Duration::from_millis(300)).await;
    coordinator.close_overlay();
    info!(mode = ?coordinator.overlay().mode(), "overlay closed");
}

/// Assistant invocation: overlay-only session, then the full app.
fn assistant_flow(coordinator: &Coordinator) {
    coordinator
        .signals()
        .launch(&LoggingHost, LaunchValues::overlay_only())
        .ok();
    coordinator.on_active();
    info!(mode = ?coordinator.overlay().mode(), "assistant session up");

    if coordinator.overlay().mode() == OverlayMode::VisibleOnly {
        coordinator.open_full_app();
        info!(mode = ?coordinator.overlay().mode(), "swapped to full app");
    }

    coordinator.close_overlay();
    info!(mode = ?coordinator.overlay().mode(), "session closed");
}

/// Start the runtime and let heartbeats flow for a while.
async fn watch_flow(coordinator: &Coordinator, seconds: u64) {
    coordinator.on_active();
    coordinator.start_runtime();
    let running = coordinator.run_state() == RunState::Running;
    info!(running, "runtime started");

    tokio::time::sleep(Duration::from_secs(seconds)).await;

    coordinator.stop_runtime();
    info!(
        ticks = coordinator.liveness().ticks(),
        "runtime stopped"
    );
}
