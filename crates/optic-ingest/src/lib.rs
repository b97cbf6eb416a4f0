//! Ingest service: accepts frame streams and persists each frame as an
//! object.
//!
//! Every inbound binary message becomes one object under
//! `<namespace>/<unixMillis>.jpg`. Connections are served independently; a
//! storage failure is confined to the frame that hit it, and a misbehaving
//! connection never stalls the others.

pub mod config;
pub mod service;

pub use config::IngestConfig;
pub use service::{IngestService, IngestStats};
