//! Deterministic synthetic surface for demos and tests.
//!
//! Renders a moving gradient so consecutive frames differ and compress
//! realistically. A configurable warm-up phase reports zero dimensions
//! first, mimicking a real source before its metadata arrives.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::raster::RasterBuffer;
use crate::traits::{Surface, SurfaceSource, TargetDescriptor};
use crate::CaptureError;

/// Configuration for the synthetic test pattern.
#[derive(Clone, Debug)]
pub struct TestPatternConfig {
    width: u32,
    height: u32,
    warmup_ticks: u32,
}

impl Default for TestPatternConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            warmup_ticks: 0,
        }
    }
}

impl TestPatternConfig {
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    /// Number of initial rasterize attempts that report a zero-dimension
    /// surface before frames start flowing.
    pub fn with_warmup_ticks(mut self, warmup_ticks: u32) -> Self {
        self.warmup_ticks = warmup_ticks;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn warmup_ticks(&self) -> u32 {
        self.warmup_ticks
    }
}

/// `SurfaceSource` handing out independent `TestPattern` surfaces.
///
/// Counts opens and releases so tests can assert the acquire/release balance.
pub struct TestPatternSource {
    config: TestPatternConfig,
    deny: bool,
    opened: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
}

impl TestPatternSource {
    pub fn new(config: TestPatternConfig) -> Self {
        Self {
            config,
            deny: false,
            opened: Arc::new(AtomicUsize::new(0)),
            released: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make `open` refuse every request, for exercising the denial path.
    pub fn denying(mut self) -> Self {
        self.deny = true;
        self
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl SurfaceSource for TestPatternSource {
    fn open(&self, target: &TargetDescriptor) -> Result<Box<dyn Surface>, CaptureError> {
        if self.deny {
            return Err(CaptureError::Denied(format!(
                "test source refuses target {:?}",
                target.as_str()
            )));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(TestPattern {
            config: self.config.clone(),
            phase: 0,
            remaining_warmup: self.config.warmup_ticks(),
            released: self.released.clone(),
        }))
    }
}

/// Synthetic surface rendering a phase-shifted gradient.
pub struct TestPattern {
    config: TestPatternConfig,
    phase: u32,
    remaining_warmup: u32,
    released: Arc<AtomicUsize>,
}

impl Surface for TestPattern {
    fn dimensions(&self) -> (u32, u32) {
        if self.remaining_warmup > 0 {
            (0, 0)
        } else {
            (self.config.width(), self.config.height())
        }
    }

    fn rasterize(&mut self, target: &mut RasterBuffer) -> Result<(), CaptureError> {
        if self.remaining_warmup > 0 {
            self.remaining_warmup -= 1;
            return Err(CaptureError::Source(
                "surface has zero dimensions".to_string(),
            ));
        }

        let (width, height) = (self.config.width(), self.config.height());
        let phase = self.phase;
        self.phase = self.phase.wrapping_add(1);

        let data = target.data_mut();
        for y in 0..height {
            for x in 0..width {
                let idx = (y as usize * width as usize + x as usize) * 3;
                data[idx] = ((x + phase) % 256) as u8;
                data[idx + 1] = ((y + phase) % 256) as u8;
                data[idx + 2] = (phase % 256) as u8;
            }
        }
        Ok(())
    }
}

impl Drop for TestPattern {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}
