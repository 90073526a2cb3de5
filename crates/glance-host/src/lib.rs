//! Host entry-point abstraction for the overlay orchestrator.
//!
//! The "host surface" is the UI-facing entry point an external trigger can
//! (re)target with a launch signal: bring it to front, tear it down, swap it
//! for the full application chrome. This crate holds:
//! - [`HostSurface`]: the trait seam the platform side implements
//! - [`SignalRegistry`]: bundle creation, attachment and the consume-once
//!   protocol
//! - [`LifecycleEvents`]: the minimal active/inactive lifecycle source
//! - [`test_support`]: a recording [`HostSurface`] double for tests
//!
//! Navigation failures are non-fatal by design: callers catch, log and move
//! on. The user-visible outcome of a failed retarget is "the overlay did not
//! appear", never a crash.

use std::result::Result as StdResult;

use glance_protocol::LaunchSignal;
use thiserror::Error;

mod registry;
pub mod test_support;

pub use registry::SignalRegistry;

/// Convenient result type for host operations.
pub type Result<T> = StdResult<T, Error>;

/// Errors from host surface navigation.
#[derive(Debug, Error)]
pub enum Error {
    /// A (re)target/finish/launch attempt failed on the platform side.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// No host surface is currently present to operate on.
    #[error("no active host surface")]
    NoSurface,
}

/// Platform seam for the UI-facing host entry point.
///
/// Implementations are expected to be thin adapters over whatever the
/// platform uses to start, finish and re-front its surfaces. All methods are
/// fallible; callers treat failures as logged no-ops.
pub trait HostSurface: Send + Sync {
    /// (Re)target the host entry point with `signal`, bringing it to front.
    ///
    /// A warm retarget (surface already active) must deliver the new signal
    /// without a remount.
    fn retarget(&self, signal: &LaunchSignal) -> Result<()>;

    /// Tear the hosting surface down entirely (not merely hide it).
    fn finish(&self) -> Result<()>;

    /// Swap the overlay-only surface for the full application chrome.
    fn open_full_app(&self) -> Result<()>;

    /// Open the platform settings screen where the user selects the default
    /// assistant application.
    fn open_assistant_settings(&self) -> Result<()>;
}

/// Minimal lifecycle event source.
///
/// The only lifecycle facts this core consumes are "the surface became
/// active" and "the surface became inactive"; platform lifecycle callbacks
/// are adapted to these two by the embedding layer.
pub trait LifecycleEvents {
    /// The host surface gained an active/foregrounded condition.
    fn on_active(&self);

    /// The host surface left the active condition.
    fn on_inactive(&self);
}
