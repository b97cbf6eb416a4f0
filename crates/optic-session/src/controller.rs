use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use optic_capture::{SurfaceSource, TargetDescriptor, acquire};
use optic_com::ComError;

use crate::config::SessionConfig;
use crate::state::SessionState;
use crate::worker::{self, FRAME_QUEUE_CAPACITY, SessionStats, WorkerEvent};
use crate::SessionError;

struct ActiveSession {
    cancel: Arc<AtomicBool>,
    encoder: JoinHandle<()>,
    transport: JoinHandle<()>,
    events: mpsc::Receiver<WorkerEvent>,
    started_at: std::time::Instant,
}

/// Owns a capture session's lifecycle and its two worker tasks.
///
/// One controller drives one session at a time. `start` acquires the capture
/// handle, brings up the transport, waits for its readiness acknowledgement
/// and only then starts the encoder, so no frame is ever produced without a
/// connection to send it on. `Failed` is sticky; only `reset` leaves it.
pub struct SessionController {
    config: SessionConfig,
    source: Arc<dyn SurfaceSource>,
    state: SessionState,
    next_session_id: u64,
    stats: Arc<SessionStats>,
    active: Option<ActiveSession>,
}

impl SessionController {
    pub fn new(config: SessionConfig, source: Arc<dyn SurfaceSource>) -> Self {
        Self {
            config,
            source,
            state: SessionState::Idle,
            next_session_id: 1,
            stats: Arc::new(SessionStats::default()),
            active: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Counters for the current (or most recent) session.
    pub fn stats(&self) -> Arc<SessionStats> {
        self.stats.clone()
    }

    /// Start capturing `target`. Valid from `Idle` only.
    ///
    /// # Errors
    ///
    /// `InvalidState` if not idle, `Config` for a rejected configuration,
    /// `Acquisition` if the capture handle is denied or times out, and
    /// `Transport` if the connection cannot be established within the
    /// connect timeout. Invalid-state and configuration rejections leave
    /// the session where it was; every later failure lands in `Failed`
    /// with the handle released.
    pub async fn start(&mut self, target: &TargetDescriptor) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            return Err(SessionError::InvalidState("start requires an idle session"));
        }
        self.config.encoder().validate()?;

        self.state = SessionState::RequestingHandle;
        let handle = match acquire(
            self.source.clone(),
            target,
            self.config.acquire_grace(),
        )
        .await
        {
            Ok(handle) => handle,
            Err(e) => {
                self.state = SessionState::Failed;
                return Err(SessionError::Acquisition(e));
            }
        };

        let session_id = self.next_session_id;
        self.next_session_id += 1;
        self.stats = Arc::new(SessionStats::default());

        let (frame_tx, frame_rx) = mpsc::channel(FRAME_QUEUE_CAPACITY);
        let (event_tx, mut event_rx) = mpsc::channel(8);

        let transport = tokio::spawn(worker::run_transport(
            self.config.ingest_addr(),
            frame_rx,
            event_tx.clone(),
            self.stats.clone(),
        ));

        // The handle is held here until the transport acknowledges; if the
        // connection never comes up it is dropped, and released, before any
        // frame is produced.
        match tokio::time::timeout(self.config.connect_timeout(), event_rx.recv()).await {
            Ok(Some(WorkerEvent::Connected)) => {}
            Ok(Some(WorkerEvent::Disconnected(e))) => {
                let _ = transport.await;
                self.state = SessionState::Failed;
                return Err(SessionError::Transport(e));
            }
            Ok(Some(WorkerEvent::EncodeFailed(msg))) => {
                transport.abort();
                self.state = SessionState::Failed;
                return Err(SessionError::Encode(msg));
            }
            Ok(None) | Err(_) => {
                transport.abort();
                self.state = SessionState::Failed;
                return Err(SessionError::Transport(ComError::Io(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "transport readiness timed out",
                ))));
            }
        }

        let cancel = Arc::new(AtomicBool::new(false));
        let encoder = tokio::spawn(worker::run_encoder(
            handle,
            *self.config.encoder(),
            session_id,
            frame_tx,
            event_tx,
            cancel.clone(),
            self.stats.clone(),
        ));

        self.active = Some(ActiveSession {
            cancel,
            encoder,
            transport,
            events: event_rx,
            started_at: std::time::Instant::now(),
        });
        self.state = SessionState::Capturing;
        log::info!(
            "session {}: capturing {:?} at {} fps",
            session_id,
            target.as_str(),
            self.config.encoder().fps()
        );
        Ok(())
    }

    /// Stop a running session cleanly. A no-op from `Idle`; also valid
    /// while the handle is still being acquired, before workers exist.
    ///
    /// The encoder exits at the next tick boundary, the transport drains
    /// whatever the queue still holds, then both join and the handle is
    /// released.
    ///
    /// # Errors
    ///
    /// `InvalidState` from `Failed`; a failed session is left via `reset`.
    pub async fn stop(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Idle => return Ok(()),
            SessionState::RequestingHandle | SessionState::Capturing => {}
            _ => return Err(SessionError::InvalidState("stop requires a running session")),
        }

        self.state = SessionState::Stopping;
        let elapsed = self.teardown().await;
        self.state = SessionState::Idle;
        log::info!(
            "session stopped after {:.1?}: {} frames sent, {} dropped",
            elapsed,
            self.stats.frames_sent(),
            self.stats.frames_dropped()
        );
        Ok(())
    }

    /// Block until the running session fails, reporting why.
    ///
    /// Returns when a worker signals a fatal condition; the session is torn
    /// down and left in `Failed`. Use `stop` for a clean shutdown instead.
    ///
    /// # Errors
    ///
    /// `InvalidState` if nothing is capturing; otherwise the fatal
    /// `Transport` or `Encode` error that ended the session.
    pub async fn wait(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Capturing {
            return Err(SessionError::InvalidState("wait requires a capturing session"));
        }
        let active = self.active.as_mut().ok_or(SessionError::InvalidState(
            "no active session",
        ))?;

        let error = loop {
            match active.events.recv().await {
                Some(WorkerEvent::Disconnected(e)) => break SessionError::Transport(e),
                Some(WorkerEvent::EncodeFailed(msg)) => break SessionError::Encode(msg),
                Some(WorkerEvent::Connected) => continue,
                None => break SessionError::InvalidState("workers exited without an event"),
            }
        };

        self.teardown().await;
        self.state = SessionState::Failed;
        log::error!("session failed: {}", error);
        Err(error)
    }

    /// Return a failed controller to `Idle`. A no-op from `Idle`.
    ///
    /// # Errors
    ///
    /// `InvalidState` while a session is running.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Idle => Ok(()),
            SessionState::Failed => {
                self.state = SessionState::Idle;
                Ok(())
            }
            _ => Err(SessionError::InvalidState("reset requires a failed session")),
        }
    }

    async fn teardown(&mut self) -> std::time::Duration {
        let Some(active) = self.active.take() else {
            return std::time::Duration::ZERO;
        };
        active.cancel.store(true, Ordering::SeqCst);
        // Encoder first: its exit closes the frame queue, which lets the
        // transport drain and close instead of being cut off mid-send.
        let _ = active.encoder.await;
        let _ = active.transport.await;
        active.started_at.elapsed()
    }
}
