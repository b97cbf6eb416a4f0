use std::fmt;

#[derive(Debug)]
pub enum CaptureError {
    /// The source refused to grant a capture handle for the target.
    Denied(String),
    /// The acquisition grace period expired before the source was ready.
    Timeout,
    /// The source failed while producing a frame.
    Source(String),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::Denied(msg) => write!(f, "capture denied: {msg}"),
            CaptureError::Timeout => write!(f, "capture handle acquisition timed out"),
            CaptureError::Source(msg) => write!(f, "source error: {msg}"),
        }
    }
}

impl std::error::Error for CaptureError {}
