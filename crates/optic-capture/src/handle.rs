use std::sync::Arc;
use std::time::Duration;

use crate::traits::{Surface, SurfaceSource, TargetDescriptor};
use crate::CaptureError;

/// Exclusive grant to read frames from a live surface.
///
/// Dropping the handle releases the grant; the encoder task owns the handle
/// for the lifetime of a session, so release happens exactly once on every
/// exit path, normal or not.
pub struct SurfaceHandle {
    target: TargetDescriptor,
    surface: Box<dyn Surface>,
}

impl SurfaceHandle {
    pub fn target(&self) -> &TargetDescriptor {
        &self.target
    }

    pub fn surface_mut(&mut self) -> &mut dyn Surface {
        self.surface.as_mut()
    }
}

impl Drop for SurfaceHandle {
    fn drop(&mut self) {
        log::debug!("capture handle released for target {:?}", self.target.as_str());
    }
}

impl std::fmt::Debug for SurfaceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceHandle")
            .field("target", &self.target)
            .finish()
    }
}

/// Acquire a capture handle for `target`, bounding the source's
/// initialization time by `grace`.
///
/// The open call runs on the blocking pool because sources may block while a
/// secondary context (device, renderer) comes up. Expiry of the grace period
/// is an acquisition failure, not a retryable condition.
///
/// # Errors
///
/// `CaptureError::Timeout` if the grace period expires, or whatever the
/// source reports (`Denied`, `Source`).
pub async fn acquire(
    source: Arc<dyn SurfaceSource>,
    target: &TargetDescriptor,
    grace: Duration,
) -> Result<SurfaceHandle, CaptureError> {
    let open_target = target.clone();
    let open = tokio::task::spawn_blocking(move || source.open(&open_target));

    match tokio::time::timeout(grace, open).await {
        Ok(Ok(Ok(surface))) => {
            log::debug!("capture handle acquired for target {:?}", target.as_str());
            Ok(SurfaceHandle {
                target: target.clone(),
                surface,
            })
        }
        Ok(Ok(Err(e))) => Err(e),
        Ok(Err(join)) => Err(CaptureError::Source(format!("open task failed: {join}"))),
        Err(_) => Err(CaptureError::Timeout),
    }
}
