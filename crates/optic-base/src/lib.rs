//! Shared foundations for the optic pipeline: logging backends and
//! wall-clock helpers.

pub mod clock;
pub mod logging;

pub use clock::{format_timestamp, format_today, unix_millis};
pub use logging::{FileLogger, StdoutLogger, init_file_logger, init_stdout_logger};

// Re-export log so downstream crates share one facade version.
pub use log;
