//! Key-addressed object sink for ingested frames.
//!
//! The ingest service shares one store across all connections; writes are
//! independently keyed, so the trait requires no cross-connection locking.
//! Keys are slash-separated paths like `frames/1714000000123.jpg`; the store
//! is append-only in spirit but a duplicate key overwrites (last write wins).

pub mod error;
pub mod fs;
pub mod mem;

pub use error::StoreError;
pub use fs::FsStore;
pub use mem::MemStore;

/// Durable, key-addressed blob store.
///
/// Alternative backends (in-memory for tests, remote object storage) plug in
/// behind this trait.
pub trait ObjectStore: Send + Sync {
    /// Write `bytes` under `key`. Overwrites an existing object at the same
    /// key. The content type is advisory; backends may encode it only in
    /// the key's extension.
    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError>;

    /// Read the object at `key`, or `Ok(None)` if absent.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Number of stored objects.
    fn len(&self) -> Result<usize, StoreError>;

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

/// Validate an object key: relative, slash-separated, no empty or `..`
/// segments.
pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    if key.is_empty() || key.starts_with('/') || key.ends_with('/') {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    for segment in key.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
    }
    Ok(())
}
