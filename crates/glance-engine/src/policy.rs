//! Platform-policy seam for elevating the runtime to running mode.

use thiserror::Error;

use crate::StateStore;

/// A refusal to elevate the execution context.
///
/// Not an error to be retried: the router reacts with an immediate quiet
/// self-stop, and callers of `start` observe only the absence of the running
/// state.
#[derive(Debug, Error)]
#[error("start refused: {0}")]
pub struct Denial(pub String);

/// Decides whether the execution context may enter its privileged running
/// mode right now.
pub trait StartPolicy: Send + Sync {
    /// Authorize a start attempt against the current runtime state.
    fn authorize_start(&self, state: &StateStore) -> Result<(), Denial>;
}

/// Default policy: starting is refused while the primary UI is not focused.
///
/// Models platforms that disallow promoting a background context unless the
/// application currently holds user focus.
pub struct ForegroundStartPolicy;

impl StartPolicy for ForegroundStartPolicy {
    fn authorize_start(&self, state: &StateStore) -> Result<(), Denial> {
        if state.is_foreground() {
            Ok(())
        } else {
            Err(Denial("primary UI is not in the foreground".into()))
        }
    }
}

/// Policy that authorizes every start. Useful for worker-role runtimes and
/// tests.
pub struct AlwaysAllow;

impl StartPolicy for AlwaysAllow {
    fn authorize_start(&self, _state: &StateStore) -> Result<(), Denial> {
        Ok(())
    }
}
