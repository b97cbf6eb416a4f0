//! Capture session orchestration: acquire a surface, sample and compress it
//! at a fixed cadence, and stream the frames to an ingest endpoint.
//!
//! The `SessionController` owns the lifecycle; an encoder task and a
//! transport task do the work, joined by a bounded frame queue that drops
//! the newest frame when the connection falls behind.

pub mod config;
pub mod controller;
pub mod error;
pub mod frame;
pub mod state;
pub mod worker;

pub use config::{EncoderConfig, SessionConfig};
pub use controller::SessionController;
pub use error::SessionError;
pub use frame::Frame;
pub use state::SessionState;
pub use worker::{ENCODE_FAILURE_THRESHOLD, FRAME_QUEUE_CAPACITY, SessionStats, WorkerEvent};
