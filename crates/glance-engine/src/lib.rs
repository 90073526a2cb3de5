//! Glance runtime engine.
//!
//! The engine coordinates the runtime side of the overlay orchestrator:
//! - tracks process-scoped runtime flags (foreground, running)
//! - drives the heartbeat/liveness timer
//! - routes `{Start, Stop, TriggerOverlay}` actions, honoring platform
//!   policy refusal without surfacing errors to callers
//!
//! Everything here is an explicit context object with process lifetime;
//! there are no ambient statics. The flags are **per-process**: when the
//! background execution context runs in a separate process, that process's
//! [`StateStore`] is an independent copy and nothing here pretends
//! otherwise. A [`ProcessRole::Worker`] runtime keeps its liveness signal in
//! a local [`LivenessRecord`] instead of emitting UI events.
//!
//! [`RuntimeService::dispatch`] and heartbeat scheduling must run inside a
//! tokio runtime; ticks are driven by a spawned task.

mod heartbeat;
mod liveness;
mod policy;
mod service;
mod state;

pub use heartbeat::Heartbeat;
pub use liveness::LivenessRecord;
pub use policy::{AlwaysAllow, Denial, ForegroundStartPolicy, StartPolicy};
pub use service::{ProcessRole, RunState, RuntimeService};
pub use state::StateStore;
