//! WebSocket wire layer for the optic pipeline.
//!
//! Frames travel client→server as raw binary messages, one compressed image
//! per message, with no in-band length or content-type framing beyond the
//! WebSocket message boundary.

pub mod client;
pub mod error;
pub mod listener;

pub use client::WsClient;
pub use error::ComError;
pub use listener::{WsConnection, WsListener};

/// Upper bound on a single frame payload. A sampled, compressed frame is a
/// few hundred kilobytes; anything near this limit is a protocol violation.
pub const MAX_FRAME_SIZE: usize = 64 * 1024 * 1024; // 64 MB
