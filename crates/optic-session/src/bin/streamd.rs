//! Capture daemon: streams a surface to an ingest endpoint until Ctrl-C.
//!
//! Configured through the environment:
//!   OPTIC_INGEST_ADDR  ingest endpoint (default 127.0.0.1:9460)
//!   OPTIC_TARGET       capture target descriptor (default "pattern")
//!   OPTIC_FPS          frames per second (default 10)
//!   OPTIC_QUALITY      JPEG quality 0.0 to 1.0 (default 0.7)
//!   OPTIC_LOG_DIR      write day-rolling log files there instead of stdout

use std::net::SocketAddr;
use std::sync::Arc;

use optic_base::log;
use optic_capture::{TargetDescriptor, TestPatternConfig, TestPatternSource};
use optic_session::{EncoderConfig, SessionConfig, SessionController, SessionError};

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T, SessionError> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| SessionError::Config(format!("unparseable {}: {:?}", name, value))),
        Err(_) => Ok(default),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match std::env::var("OPTIC_LOG_DIR") {
        Ok(dir) => optic_base::init_file_logger(dir)?,
        Err(_) => optic_base::init_stdout_logger(),
    }

    let ingest_addr: SocketAddr = env_or("OPTIC_INGEST_ADDR", "127.0.0.1:9460".parse()?)?;
    let fps = env_or("OPTIC_FPS", 10u32)?;
    let quality = env_or("OPTIC_QUALITY", 0.7f32)?;
    let target = std::env::var("OPTIC_TARGET").unwrap_or_else(|_| "pattern".to_string());

    let config = SessionConfig::new(ingest_addr)
        .with_encoder(EncoderConfig::default().with_fps(fps).with_quality(quality));
    let source = Arc::new(TestPatternSource::new(TestPatternConfig::default()));

    let mut controller = SessionController::new(config, source);
    controller.start(&TargetDescriptor::new(target)).await?;
    let stats = controller.stats();

    let interrupted = tokio::select! {
        _ = tokio::signal::ctrl_c() => true,
        result = controller.wait() => {
            result?;
            false
        }
    };
    if interrupted {
        log::info!("interrupted, stopping session");
        controller.stop().await?;
    }

    log::info!(
        "done: {} frames sent, {} dropped, {} encode failures",
        stats.frames_sent(),
        stats.frames_dropped(),
        stats.encode_failures()
    );
    Ok(())
}
