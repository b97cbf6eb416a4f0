use std::fmt;

use optic_capture::CaptureError;
use optic_com::ComError;

#[derive(Debug)]
pub enum SessionError {
    /// Capture handle denied or unavailable. Fatal, no retry.
    Acquisition(CaptureError),
    /// Rasterize/compress failed past the repeated-failure threshold.
    Encode(String),
    /// The outbound connection failed. Fatal in this baseline.
    Transport(ComError),
    /// An operation was called from a state that does not allow it.
    InvalidState(&'static str),
    /// Rejected configuration value.
    Config(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Acquisition(err) => write!(f, "acquisition error: {err}"),
            SessionError::Encode(msg) => write!(f, "encode error: {msg}"),
            SessionError::Transport(err) => write!(f, "transport error: {err}"),
            SessionError::InvalidState(msg) => write!(f, "invalid state: {msg}"),
            SessionError::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<CaptureError> for SessionError {
    fn from(err: CaptureError) -> Self {
        SessionError::Acquisition(err)
    }
}

impl From<ComError> for SessionError {
    fn from(err: ComError) -> Self {
        SessionError::Transport(err)
    }
}
