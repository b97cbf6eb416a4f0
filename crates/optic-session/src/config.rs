use std::net::SocketAddr;
use std::time::Duration;

use crate::SessionError;

/// Fixed-cadence sampling parameters for the encoder loop.
#[derive(Clone, Copy, Debug)]
pub struct EncoderConfig {
    fps: u32,
    quality: f32,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            fps: 10,
            quality: 0.7,
        }
    }
}

impl EncoderConfig {
    /// Set frames per second (1 to 60).
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Set JPEG quality on the 0.0–1.0 scale.
    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = quality;
        self
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    /// Tick period: 1000 / fps milliseconds.
    pub fn period(&self) -> Duration {
        Duration::from_millis(1000 / self.fps.max(1) as u64)
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        if self.fps == 0 || self.fps > 60 {
            return Err(SessionError::Config(format!(
                "fps {} out of range (expected 1 to 60)",
                self.fps
            )));
        }
        if !(0.0..=1.0).contains(&self.quality) {
            return Err(SessionError::Config(format!(
                "quality {} out of range (expected 0.0 to 1.0)",
                self.quality
            )));
        }
        Ok(())
    }
}

/// Process-wide session configuration, fixed at startup.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    encoder: EncoderConfig,
    ingest_addr: SocketAddr,
    acquire_grace: Duration,
    connect_timeout: Duration,
}

impl SessionConfig {
    pub fn new(ingest_addr: SocketAddr) -> Self {
        Self {
            encoder: EncoderConfig::default(),
            ingest_addr,
            acquire_grace: Duration::from_secs(3),
            connect_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_encoder(mut self, encoder: EncoderConfig) -> Self {
        self.encoder = encoder;
        self
    }

    /// Bound on capture handle acquisition, covering the source's secondary
    /// context initialization. Expiry is an acquisition failure.
    pub fn with_acquire_grace(mut self, grace: Duration) -> Self {
        self.acquire_grace = grace;
        self
    }

    /// Bound on the transport worker's readiness acknowledgement.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn encoder(&self) -> &EncoderConfig {
        &self.encoder
    }

    pub fn ingest_addr(&self) -> SocketAddr {
        self.ingest_addr
    }

    pub fn acquire_grace(&self) -> Duration {
        self.acquire_grace
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}
