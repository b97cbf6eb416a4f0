use crate::CaptureError;
use crate::raster::RasterBuffer;

/// Identifies the live surface a session wants to capture.
///
/// For the browser-tab origin of this pipeline this would be a tab id; for a
/// device source a device path. The capture layer only passes it through to
/// the `SurfaceSource`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDescriptor(pub String);

impl TargetDescriptor {
    pub fn new(target: impl Into<String>) -> Self {
        TargetDescriptor(target.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A live video surface that can draw its current frame into a raster target.
///
/// Implementations are exclusively owned by one encoder loop at a time; the
/// trait is deliberately `&mut self` so that exclusivity is enforced by
/// ownership rather than locking.
pub trait Surface: Send {
    /// Current source resolution in pixels.
    ///
    /// May be `(0, 0)` before the source has produced its metadata; callers
    /// treat that as a transient condition, not an error.
    fn dimensions(&self) -> (u32, u32);

    /// Draw the current frame into `target` as packed RGB.
    ///
    /// The target is resized to the source resolution by the caller before
    /// each call. A transient failure (source not ready, mid-resize) returns
    /// `CaptureError::Source`; the caller skips the tick.
    fn rasterize(&mut self, target: &mut RasterBuffer) -> Result<(), CaptureError>;
}

/// Factory granting exclusive capture handles for targets.
///
/// `open` may block while the underlying source initializes; `acquire` in
/// this crate bounds that wait with a grace period.
pub trait SurfaceSource: Send + Sync {
    fn open(&self, target: &TargetDescriptor) -> Result<Box<dyn Surface>, CaptureError>;
}
