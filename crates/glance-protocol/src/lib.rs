//! Shared protocol types for the glance workspace.
//!
//! This crate defines the vocabulary spoken between the runtime side and the
//! UI side of the overlay orchestrator:
//! - [`Event`]: the payload-less event catalog relayed to UI listeners
//! - [`AppState`]: foreground/background as reported to callers
//! - [`OverlayMode`]: the overlay visibility states
//! - [`Action`]: inputs accepted by the runtime action router
//! - [`LaunchSignal`] / [`LaunchValues`] / [`BundleId`]: one-shot launch
//!   signal bundles attached to a (re)targeted host entry point
//! - [`bridge`]: the gated event bridge carrying events to attached listeners

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

pub mod bridge;

pub use bridge::{EventBridge, Subscription};

/// Launch-signal key requesting that the overlay be shown on (re)activation.
pub const OPEN_OVERLAY: &str = "openOverlay";

/// Launch-signal key requesting overlay-only chrome (no surrounding app UI).
///
/// Only honored when [`OPEN_OVERLAY`] was consumed `true` from the same
/// bundle first.
pub const OPEN_OVERLAY_ONLY: &str = "openOverlayOnly";

/// Events relayed to UI listeners through the [`EventBridge`].
///
/// All events are payload-less notifications; delivery is fire-and-forget
/// with no buffering or replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Event {
    /// The primary UI gained user focus.
    Foreground,
    /// The primary UI lost user focus.
    Background,
    /// Periodic liveness tick from the running background context.
    Heartbeat,
    /// The native side asked the UI to close the overlay.
    CloseOverlayRequested,
}

impl Event {
    /// Stable string name for the event channel.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Foreground => "foreground",
            Self::Background => "background",
            Self::Heartbeat => "heartbeat",
            Self::CloseOverlayRequested => "closeOverlayRequested",
        }
    }

    /// Parse an event channel name.
    pub fn try_from_str(s: &str) -> Option<Self> {
        match s {
            "foreground" => Some(Self::Foreground),
            "background" => Some(Self::Background),
            "heartbeat" => Some(Self::Heartbeat),
            "closeOverlayRequested" => Some(Self::CloseOverlayRequested),
            _ => None,
        }
    }
}

/// Whether the primary UI currently holds user focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppState {
    /// The primary UI is focused.
    Foreground,
    /// The primary UI is not focused.
    Background,
}

impl AppState {
    /// Stable string form (`"foreground"` / `"background"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Foreground => "foreground",
            Self::Background => "background",
        }
    }
}

/// Overlay visibility states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayMode {
    /// No overlay surface is shown.
    Hidden,
    /// Overlay shown over the full application chrome.
    Visible,
    /// Overlay shown with no surrounding application chrome (assistant-style
    /// invocation). Closing from this mode tears the hosting surface down.
    VisibleOnly,
}

impl OverlayMode {
    /// True when any overlay surface is shown.
    pub fn is_visible(&self) -> bool {
        !matches!(self, Self::Hidden)
    }
}

/// Inputs accepted by the runtime action router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Elevate the background execution context to its running mode.
    Start,
    /// Tear the background execution context down.
    Stop,
    /// Retarget the host entry point with an `openOverlay` launch signal.
    /// Independent of the running state.
    TriggerOverlay,
}

/// Identity of a launch-signal bundle.
///
/// Issued from a monotonic counter at bundle creation; a retargeted host
/// entry point always carries a fresh id, so stale deliveries can never be
/// confused with the current bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BundleId(pub u64);

impl fmt::Display for BundleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bundle#{}", self.0)
    }
}

/// Flat `string -> bool` mapping carried by a launch signal.
///
/// Absent keys read as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchValues(BTreeMap<String, bool>);

impl LaunchValues {
    /// Empty value set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Values requesting the overlay (`openOverlay=true`).
    pub fn overlay() -> Self {
        Self::new().with(OPEN_OVERLAY, true)
    }

    /// Values requesting overlay-only chrome (`openOverlay=true,
    /// openOverlayOnly=true`).
    pub fn overlay_only() -> Self {
        Self::overlay().with(OPEN_OVERLAY_ONLY, true)
    }

    /// Set `key` to `value`, returning the updated set.
    pub fn with(mut self, key: &str, value: bool) -> Self {
        self.0.insert(key.to_string(), value);
        self
    }

    /// Read `key`; absent keys are `false`.
    pub fn get(&self, key: &str) -> bool {
        self.0.get(key).copied().unwrap_or(false)
    }
}

/// A one-shot launch signal attached to a host entry-point invocation.
///
/// Immutable after creation; consumption bookkeeping lives in the signal
/// registry, keyed on [`BundleId`], not in the bundle itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchSignal {
    id: BundleId,
    values: LaunchValues,
}

impl LaunchSignal {
    /// Construct a signal from parts. Prefer the registry's `create_bundle`,
    /// which issues the id.
    pub fn new(id: BundleId, values: LaunchValues) -> Self {
        Self { id, values }
    }

    /// The bundle identity.
    pub fn id(&self) -> BundleId {
        self.id
    }

    /// The stored flag values.
    pub fn values(&self) -> &LaunchValues {
        &self.values
    }
}
