//! Encoder and transport tasks backing a capture session.
//!
//! The encoder owns the capture handle and samples it at a fixed cadence;
//! the transport owns the WebSocket client and drains the frame queue. The
//! two are joined by a bounded channel so a stalled connection sheds the
//! oldest work instead of growing an unbounded backlog.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::MissedTickBehavior;

use optic_base::clock::unix_millis;
use optic_capture::{RasterBuffer, SurfaceHandle};
use optic_com::{ComError, WsClient};

use crate::config::EncoderConfig;
use crate::frame::Frame;

/// Depth of the encoder-to-transport frame queue. Bounds how stale a frame
/// can be when the transport falls behind.
pub const FRAME_QUEUE_CAPACITY: usize = 4;

/// Consecutive sample/encode failures before the session fails. Isolated
/// failures (a source mid-resize, a transient read error) are skipped.
pub const ENCODE_FAILURE_THRESHOLD: u32 = 30;

/// Out-of-band notifications from the worker tasks to the controller.
#[derive(Debug)]
pub enum WorkerEvent {
    /// The transport connected and is ready to forward frames.
    Connected,
    /// The transport lost its connection; no frames flow after this.
    Disconnected(ComError),
    /// The encoder gave up after `ENCODE_FAILURE_THRESHOLD` consecutive
    /// failures.
    EncodeFailed(String),
}

/// Shared session counters, updated by the workers and read by callers.
#[derive(Debug, Default)]
pub struct SessionStats {
    frames_sent: AtomicU64,
    frames_dropped: AtomicU64,
    encode_failures: AtomicU64,
}

impl SessionStats {
    /// Frames handed to the WebSocket successfully.
    pub fn frames_sent(&self) -> u64 {
        self.frames_sent.load(Ordering::Relaxed)
    }

    /// Frames discarded because the transport queue was full.
    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped.load(Ordering::Relaxed)
    }

    /// Total sample/encode failures, consecutive or not.
    pub fn encode_failures(&self) -> u64 {
        self.encode_failures.load(Ordering::Relaxed)
    }
}

/// Transport worker: connect, acknowledge readiness, then drain the frame
/// queue into the WebSocket until the queue closes or the connection fails.
///
/// Emits `Connected` once the handshake completes, so the controller never
/// starts the encoder against a connection that does not exist yet. On
/// send failure the remaining queued frames are dropped with the channel.
pub async fn run_transport(
    addr: SocketAddr,
    mut frames: mpsc::Receiver<Frame>,
    events: mpsc::Sender<WorkerEvent>,
    stats: Arc<SessionStats>,
) {
    let mut client = match WsClient::connect(addr).await {
        Ok(client) => client,
        Err(e) => {
            log::error!("transport: connect to {} failed: {}", addr, e);
            let _ = events.send(WorkerEvent::Disconnected(e)).await;
            return;
        }
    };
    log::info!("transport: connected to {}", addr);
    if events.send(WorkerEvent::Connected).await.is_err() {
        return;
    }

    while let Some(frame) = frames.recv().await {
        let seq = frame.seq;
        if let Err(e) = client.send_frame(frame.payload).await {
            log::error!("transport: send of frame {} failed: {}", seq, e);
            let _ = events.send(WorkerEvent::Disconnected(e)).await;
            return;
        }
        stats.frames_sent.fetch_add(1, Ordering::Relaxed);
    }

    if let Err(e) = client.close().await {
        log::debug!("transport: close handshake failed: {}", e);
    }
    log::info!("transport: closed after {} frames", stats.frames_sent());
}

/// Encoder worker: sample the surface at the configured cadence, compress
/// each sample, and queue the result for the transport.
///
/// The task owns the capture handle, so the handle is released exactly when
/// this function returns, on every exit path. Ticks that land while a
/// previous sample is still in flight are skipped rather than bursted.
pub async fn run_encoder(
    mut handle: SurfaceHandle,
    config: EncoderConfig,
    session_id: u64,
    frames: mpsc::Sender<Frame>,
    events: mpsc::Sender<WorkerEvent>,
    cancel: Arc<AtomicBool>,
    stats: Arc<SessionStats>,
) {
    let mut interval = tokio::time::interval(config.period());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut buffer = RasterBuffer::new();
    let mut seq: u64 = 0;
    let mut consecutive_failures: u32 = 0;

    loop {
        interval.tick().await;
        if cancel.load(Ordering::SeqCst) {
            break;
        }

        let payload = match sample(&mut handle, &mut buffer, config.quality()).await {
            Ok(payload) => payload,
            Err(msg) => {
                stats.encode_failures.fetch_add(1, Ordering::Relaxed);
                consecutive_failures += 1;
                log::warn!(
                    "encoder: sample failed ({} consecutive): {}",
                    consecutive_failures,
                    msg
                );
                if consecutive_failures >= ENCODE_FAILURE_THRESHOLD {
                    let _ = events.send(WorkerEvent::EncodeFailed(msg)).await;
                    break;
                }
                continue;
            }
        };
        consecutive_failures = 0;

        seq += 1;
        let frame = Frame {
            session_id,
            seq,
            payload,
            captured_at_ms: unix_millis(),
        };
        match frames.try_send(frame) {
            Ok(()) => {}
            Err(TrySendError::Full(frame)) => {
                stats.frames_dropped.fetch_add(1, Ordering::Relaxed);
                log::debug!("encoder: queue full, dropping frame {}", frame.seq);
            }
            Err(TrySendError::Closed(_)) => break,
        }
    }

    log::info!(
        "encoder: exiting after {} frames ({} dropped)",
        seq,
        stats.frames_dropped()
    );
}

/// Rasterize one sample and compress it. A zero-dimension surface (source
/// still warming up) surfaces as a sample failure and counts toward the
/// threshold like any other.
async fn sample(
    handle: &mut SurfaceHandle,
    buffer: &mut RasterBuffer,
    quality: f32,
) -> Result<Vec<u8>, String> {
    let surface = handle.surface_mut();
    let (width, height) = surface.dimensions();
    buffer.resize(width, height);
    surface.rasterize(buffer).map_err(|e| e.to_string())?;

    optic_image::encode_rgb_jpeg(width, height, buffer.to_vec(), quality)
        .await
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use optic_capture::{acquire, TargetDescriptor, TestPatternConfig, TestPatternSource};

    async fn test_handle(config: TestPatternConfig) -> SurfaceHandle {
        let source = Arc::new(TestPatternSource::new(config));
        acquire(source, &TargetDescriptor::new("test"), Duration::from_secs(1))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn seq_starts_at_one_and_increases() {
        let handle = test_handle(TestPatternConfig::default().with_width(32).with_height(24)).await;
        let (frame_tx, mut frame_rx) = mpsc::channel(FRAME_QUEUE_CAPACITY);
        let (event_tx, _event_rx) = mpsc::channel(8);
        let cancel = Arc::new(AtomicBool::new(false));
        let stats = Arc::new(SessionStats::default());

        let encoder = tokio::spawn(run_encoder(
            handle,
            EncoderConfig::default().with_fps(60),
            7,
            frame_tx,
            event_tx,
            cancel.clone(),
            stats,
        ));

        let mut expected = 1u64;
        while expected <= 5 {
            let frame = frame_rx.recv().await.unwrap();
            assert_eq!(frame.seq, expected);
            assert_eq!(frame.session_id, 7);
            assert!(!frame.payload.is_empty());
            expected += 1;
        }

        cancel.store(true, Ordering::SeqCst);
        encoder.await.unwrap();
    }

    #[tokio::test]
    async fn saturated_queue_drops_frames_but_keeps_seq() {
        let handle = test_handle(TestPatternConfig::default().with_width(32).with_height(24)).await;
        let (frame_tx, mut frame_rx) = mpsc::channel(FRAME_QUEUE_CAPACITY);
        let (event_tx, _event_rx) = mpsc::channel(8);
        let cancel = Arc::new(AtomicBool::new(false));
        let stats = Arc::new(SessionStats::default());

        let encoder = tokio::spawn(run_encoder(
            handle,
            EncoderConfig::default().with_fps(60),
            1,
            frame_tx,
            event_tx,
            cancel.clone(),
            stats.clone(),
        ));

        // Leave the queue undrained long enough to overflow it.
        tokio::time::sleep(Duration::from_millis(500)).await;
        cancel.store(true, Ordering::SeqCst);
        encoder.await.unwrap();

        assert!(stats.frames_dropped() > 0);

        // Delivered seq numbers stay strictly increasing; drops leave gaps
        // rather than reusing numbers.
        let mut last = 0u64;
        let mut delivered = 0u64;
        while let Some(frame) = frame_rx.recv().await {
            assert!(frame.seq > last);
            last = frame.seq;
            delivered += 1;
        }
        assert_eq!(delivered, FRAME_QUEUE_CAPACITY as u64);
        assert!(last > delivered);
    }

    #[tokio::test]
    async fn repeated_failures_hit_threshold() {
        // A warm-up longer than the threshold makes every sample fail.
        let config = TestPatternConfig::default()
            .with_warmup_ticks(ENCODE_FAILURE_THRESHOLD * 2);
        let handle = test_handle(config).await;
        let (frame_tx, _frame_rx) = mpsc::channel(FRAME_QUEUE_CAPACITY);
        let (event_tx, mut event_rx) = mpsc::channel(8);
        let cancel = Arc::new(AtomicBool::new(false));
        let stats = Arc::new(SessionStats::default());

        let encoder = tokio::spawn(run_encoder(
            handle,
            EncoderConfig::default().with_fps(60),
            1,
            frame_tx,
            event_tx,
            cancel,
            stats.clone(),
        ));

        let event = tokio::time::timeout(Duration::from_secs(5), event_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(event, WorkerEvent::EncodeFailed(_)));
        assert_eq!(stats.encode_failures(), ENCODE_FAILURE_THRESHOLD as u64);
        encoder.await.unwrap();
    }

    #[tokio::test]
    async fn isolated_failures_recover() {
        // Warm-up shorter than the threshold: failures, then frames.
        let config = TestPatternConfig::default()
            .with_width(32)
            .with_height(24)
            .with_warmup_ticks(3);
        let handle = test_handle(config).await;
        let (frame_tx, mut frame_rx) = mpsc::channel(FRAME_QUEUE_CAPACITY);
        let (event_tx, _event_rx) = mpsc::channel(8);
        let cancel = Arc::new(AtomicBool::new(false));
        let stats = Arc::new(SessionStats::default());

        let encoder = tokio::spawn(run_encoder(
            handle,
            EncoderConfig::default().with_fps(60),
            1,
            frame_tx,
            event_tx,
            cancel.clone(),
            stats.clone(),
        ));

        let frame = tokio::time::timeout(Duration::from_secs(5), frame_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(frame.seq, 1);
        assert_eq!(stats.encode_failures(), 3);

        cancel.store(true, Ordering::SeqCst);
        encoder.await.unwrap();
    }
}
