//! Frame source abstraction for the optic pipeline.
//!
//! A `SurfaceSource` grants exclusive `SurfaceHandle`s for capture targets;
//! the handle's `Surface` draws its current frame into a reusable
//! `RasterBuffer`. Acquisition is bounded by a grace period and release is
//! tied to handle drop, so a handle is released exactly once per grant on
//! every exit path.

pub mod error;
pub mod handle;
pub mod raster;
pub mod testpattern;
pub mod traits;

pub use error::CaptureError;
pub use handle::{SurfaceHandle, acquire};
pub use raster::RasterBuffer;
pub use testpattern::{TestPattern, TestPatternConfig, TestPatternSource};
pub use traits::{Surface, SurfaceSource, TargetDescriptor};
