/// Reusable offscreen raster target for frame sampling.
///
/// Packed RGB in HWC layout `[height, width, 3]`. One buffer is owned by the
/// encoder loop and resized to the source resolution before each rasterize
/// call, so steady-state ticks do not allocate.
#[derive(Debug, Clone, Default)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RasterBuffer {
    pub fn new() -> Self {
        RasterBuffer::default()
    }

    /// Resize to `width` x `height`, zeroing only when the size changes.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.width == width && self.height == height {
            return;
        }
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize(width as usize * height as usize * 3, 0);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Copy the pixel data out for handoff to the encoder.
    pub fn to_vec(&self) -> Vec<u8> {
        self.data.clone()
    }
}
