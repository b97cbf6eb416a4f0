use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::task::JoinHandle;

use optic_base::clock::unix_millis;
use optic_com::{ComError, WsConnection, WsListener};
use optic_store::ObjectStore;

use crate::IngestConfig;

/// Service counters, readable while the service runs.
#[derive(Debug, Default)]
pub struct IngestStats {
    connections: AtomicU64,
    frames_stored: AtomicU64,
    store_failures: AtomicU64,
}

impl IngestStats {
    /// Connections accepted since startup.
    pub fn connections(&self) -> u64 {
        self.connections.load(Ordering::Relaxed)
    }

    /// Frames persisted successfully.
    pub fn frames_stored(&self) -> u64 {
        self.frames_stored.load(Ordering::Relaxed)
    }

    /// Frames lost to storage errors.
    pub fn store_failures(&self) -> u64 {
        self.store_failures.load(Ordering::Relaxed)
    }
}

/// Accepts frame streams and writes each frame into the shared store.
///
/// Each accepted connection runs on its own task; the accept loop itself
/// never does storage work. Dropping the service stops accepting; already
/// accepted connections run until their peer disconnects.
pub struct IngestService {
    local_addr: SocketAddr,
    accept_task: JoinHandle<()>,
    stats: Arc<IngestStats>,
}

impl IngestService {
    /// Bind the listener and start accepting connections.
    ///
    /// # Errors
    ///
    /// `ComError::Io` if the bind address is unavailable.
    pub async fn start(
        config: IngestConfig,
        store: Arc<dyn ObjectStore>,
    ) -> Result<Self, ComError> {
        let listener = WsListener::bind(config.bind_addr()).await?;
        let local_addr = listener.local_addr();
        let stats = Arc::new(IngestStats::default());
        log::info!(
            "ingest: listening on {} (namespace {:?})",
            local_addr,
            config.namespace()
        );

        let accept_task = tokio::spawn(accept_loop(listener, config, store, stats.clone()));

        Ok(Self {
            local_addr,
            accept_task,
            stats,
        })
    }

    /// The address the listener actually bound, for port-0 binds.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn stats(&self) -> Arc<IngestStats> {
        self.stats.clone()
    }
}

impl Drop for IngestService {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}

async fn accept_loop(
    listener: WsListener,
    config: IngestConfig,
    store: Arc<dyn ObjectStore>,
    stats: Arc<IngestStats>,
) {
    loop {
        match listener.accept().await {
            Ok((conn, peer)) => {
                stats.connections.fetch_add(1, Ordering::Relaxed);
                log::info!("ingest: connection from {}", peer);
                tokio::spawn(serve_connection(
                    conn,
                    store.clone(),
                    config.namespace().to_string(),
                    stats.clone(),
                ));
            }
            Err(e) => {
                // A failed handshake is that peer's problem, keep accepting.
                log::warn!("ingest: accept failed: {}", e);
            }
        }
    }
}

async fn serve_connection(
    mut conn: WsConnection,
    store: Arc<dyn ObjectStore>,
    namespace: String,
    stats: Arc<IngestStats>,
) {
    let peer = conn.peer();
    loop {
        match conn.recv_frame().await {
            Ok(Some(payload)) => {
                let key = format!("{}/{}.jpg", namespace, unix_millis());
                let bytes = payload.len();
                // The store is synchronous; its I/O runs on the blocking
                // pool so a stalled write suspends only this connection.
                let write = {
                    let store = store.clone();
                    let key = key.clone();
                    tokio::task::spawn_blocking(move || store.put(&key, &payload, "image/jpeg"))
                };
                match write.await {
                    Ok(Ok(())) => {
                        stats.frames_stored.fetch_add(1, Ordering::Relaxed);
                        log::debug!("ingest: stored {} ({} bytes)", key, bytes);
                    }
                    Ok(Err(e)) => {
                        // The frame is lost; the connection is not.
                        stats.store_failures.fetch_add(1, Ordering::Relaxed);
                        log::error!("ingest: store of {} failed: {}", key, e);
                    }
                    Err(e) => {
                        stats.store_failures.fetch_add(1, Ordering::Relaxed);
                        log::error!("ingest: store task for {} failed: {}", key, e);
                    }
                }
            }
            Ok(None) => {
                log::info!("ingest: {} disconnected", peer);
                return;
            }
            Err(e) => {
                log::warn!("ingest: connection to {} failed: {}", peer, e);
                return;
            }
        }
    }
}
