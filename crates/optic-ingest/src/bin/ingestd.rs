//! Ingest daemon: accepts frame streams and persists them to disk until
//! Ctrl-C.
//!
//! Configured through the environment:
//!   OPTIC_BIND_ADDR   listen address (default 0.0.0.0:9460)
//!   OPTIC_NAMESPACE   key prefix for stored frames (default "frames")
//!   OPTIC_STORE_ROOT  store directory (default "./frames-store")
//!   OPTIC_LOG_DIR     write day-rolling log files there instead of stdout

use std::net::SocketAddr;
use std::sync::Arc;

use optic_base::log;
use optic_ingest::{IngestConfig, IngestService};
use optic_store::FsStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match std::env::var("OPTIC_LOG_DIR") {
        Ok(dir) => optic_base::init_file_logger(dir)?,
        Err(_) => optic_base::init_stdout_logger(),
    }

    let bind_addr: SocketAddr = std::env::var("OPTIC_BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:9460".to_string())
        .parse()?;
    let namespace =
        std::env::var("OPTIC_NAMESPACE").unwrap_or_else(|_| "frames".to_string());
    let store_root =
        std::env::var("OPTIC_STORE_ROOT").unwrap_or_else(|_| "./frames-store".to_string());

    let store = Arc::new(FsStore::new(&store_root)?);
    let config = IngestConfig::default()
        .with_bind_addr(bind_addr)
        .with_namespace(namespace);

    let service = IngestService::start(config, store).await?;
    let stats = service.stats();

    tokio::signal::ctrl_c().await?;
    log::info!(
        "interrupted: {} connections, {} frames stored, {} store failures",
        stats.connections(),
        stats.frames_stored(),
        stats.store_failures()
    );
    Ok(())
}
