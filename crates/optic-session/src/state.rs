use std::fmt;

/// Lifecycle of a capture session.
///
/// `Idle → RequestingHandle → Capturing → Stopping → Idle`; any state may
/// move to `Failed` on unrecoverable error, which is exited only by an
/// explicit `reset()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    RequestingHandle,
    Capturing,
    Stopping,
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::RequestingHandle => write!(f, "requesting-handle"),
            SessionState::Capturing => write!(f, "capturing"),
            SessionState::Stopping => write!(f, "stopping"),
            SessionState::Failed => write!(f, "failed"),
        }
    }
}
