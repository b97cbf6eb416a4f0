use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    InvalidKey(String),
    /// Backend refused the write; used by failure-injecting test stores and
    /// remote backends alike.
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(err) => write!(f, "io error: {err}"),
            StoreError::InvalidKey(key) => write!(f, "invalid object key: {key:?}"),
            StoreError::Backend(msg) => write!(f, "backend error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}
