//! Overlay visibility state machine.
//!
//! Owns the UI-layer view of the overlay: the visibility mode
//! (hidden / visible / visible-only), the app-provided API surface overlay
//! content runs against, and the registered content itself. Transitions are
//! driven by user actions and by consumed launch signals; the launch-signal
//! poll runs at provider mount and again on every "became active" lifecycle
//! edge, which covers warm retargeting without a remount.
//!
//! Leaving visible-only mode via close tears the hosting surface down
//! entirely (a finish, not a hide), so the next assistant-style invocation
//! starts from a fresh surface.

use std::sync::Arc;

use glance_host::{HostSurface, SignalRegistry};
use glance_protocol::{LaunchValues, OPEN_OVERLAY, OPEN_OVERLAY_ONLY, OverlayMode};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

/// Opaque app-provided API surface (API client handles, endpoints, etc.)
/// made available to overlay content.
pub type AppApi = serde_json::Map<String, serde_json::Value>;

/// Overlay content registered by the application.
///
/// Rendering is not this crate's concern; the controller only holds the
/// reference and reports which content is registered.
pub trait OverlayContent: Send + Sync {
    /// Human-readable content identifier, used in logs.
    fn name(&self) -> &str;
}

/// Mutable overlay state behind the controller's lock.
struct Inner {
    mode: OverlayMode,
    app_api: Option<AppApi>,
    content: Option<Arc<dyn OverlayContent>>,
}

/// Drives the overlay visibility state machine.
///
/// One controller per mounted provider; state is transient and
/// re-initialized on mount. `app_api` and `content` are plain
/// last-writer-wins setters.
pub struct OverlayController {
    inner: Mutex<Inner>,
    registry: Arc<SignalRegistry>,
    host: Arc<dyn HostSurface>,
}

impl OverlayController {
    /// Create a controller in [`OverlayMode::Hidden`].
    pub fn new(registry: Arc<SignalRegistry>, host: Arc<dyn HostSurface>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                mode: OverlayMode::Hidden,
                app_api: None,
                content: None,
            }),
            registry,
            host,
        }
    }

    /// Current visibility mode.
    pub fn mode(&self) -> OverlayMode {
        self.inner.lock().mode
    }

    /// User-initiated open: show the overlay over the current chrome.
    pub fn open(&self) {
        let mut inner = self.inner.lock();
        if inner.mode == OverlayMode::Hidden {
            inner.mode = OverlayMode::Visible;
            debug!("overlay_opened");
        }
    }

    /// Open the overlay and bring the application to front by retargeting
    /// the host entry point with an `openOverlay` signal.
    ///
    /// Navigation failure is logged; the local open still happens.
    pub fn open_and_bring_to_front(&self) {
        self.open();
        if let Err(e) = self.registry.launch(self.host.as_ref(), LaunchValues::overlay()) {
            warn!(error = %e, "bring_to_front_failed");
        }
    }

    /// Close the overlay, from user action or a native close request.
    ///
    /// From visible-only mode this also finishes the hosting surface and
    /// detaches the active bundle; from plain visible mode no finish is
    /// issued. Closing while hidden is a no-op.
    pub fn close(&self) {
        let was = {
            let mut inner = self.inner.lock();
            let was = inner.mode;
            inner.mode = OverlayMode::Hidden;
            was
        };
        match was {
            OverlayMode::Hidden => {}
            OverlayMode::Visible => debug!("overlay_closed"),
            OverlayMode::VisibleOnly => {
                debug!("overlay_closed_finishing_surface");
                self.registry.detach();
                if let Err(e) = self.host.finish() {
                    warn!(error = %e, "finish_surface_failed");
                }
            }
        }
    }

    /// Swap visible-only mode for the full-chrome visible mode. The chrome
    /// swap itself is the host's concern; this only records the mode.
    pub fn request_full_app(&self) {
        let mut inner = self.inner.lock();
        if inner.mode == OverlayMode::VisibleOnly {
            inner.mode = OverlayMode::Visible;
            debug!("overlay_full_app_requested");
        }
    }

    /// Poll the launch-signal registry and apply any consumed signal.
    ///
    /// Run once at provider mount and again on every active edge. The
    /// `openOverlayOnly` flag is read only after `openOverlay` was consumed
    /// `true`, in that order, against the same bundle; a bundle without a
    /// confirmed open flag changes nothing.
    pub fn poll_launch_signals(&self) {
        let Some(id) = self.registry.active_id() else {
            trace!("launch_poll_no_surface");
            return;
        };
        if !self.registry.consume(id, OPEN_OVERLAY) {
            return;
        }
        let only = self.registry.consume(id, OPEN_OVERLAY_ONLY);

        let mut inner = self.inner.lock();
        if only {
            inner.mode = OverlayMode::VisibleOnly;
        } else if inner.mode == OverlayMode::Hidden {
            inner.mode = OverlayMode::Visible;
        }
        debug!(mode = ?inner.mode, %id, "overlay_opened_from_signal");
    }

    /// Replace the app-provided API surface (last writer wins).
    pub fn set_app_api(&self, api: Option<AppApi>) {
        self.inner.lock().app_api = api;
    }

    /// The app-provided API surface, if registered.
    pub fn app_api(&self) -> Option<AppApi> {
        self.inner.lock().app_api.clone()
    }

    /// Register the overlay content (last writer wins).
    pub fn register_content(&self, content: Arc<dyn OverlayContent>) {
        debug!(content = content.name(), "overlay_content_registered");
        self.inner.lock().content = Some(content);
    }

    /// The registered overlay content, if any.
    pub fn content(&self) -> Option<Arc<dyn OverlayContent>> {
        self.inner.lock().content.clone()
    }
}
