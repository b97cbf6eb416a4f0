//! JPEG compression for captured rasters.
//!
//! The encoder loop hands each sampled frame here as a packed RGB buffer in
//! HWC layout `[height, width, 3]` and gets back a bounded-size JPEG.
//! Quality is expressed on the 0.0–1.0 scale the capture configuration uses
//! and mapped onto the JPEG encoder's 1–100 scale internally.

pub mod error;

pub use error::ImageError;

use crates_image::ImageEncoder;

/// Map a 0.0–1.0 quality setting to the JPEG encoder's 1–100 scale.
///
/// # Errors
///
/// Returns `ImageError::InvalidQuality` if `quality` is NaN or outside
/// 0.0–1.0.
pub fn jpeg_quality(quality: f32) -> Result<u8, ImageError> {
    if !(0.0..=1.0).contains(&quality) {
        return Err(ImageError::InvalidQuality(quality));
    }
    Ok(((quality * 100.0).round() as u8).max(1))
}

fn encode_rgb_jpeg_inner(
    width: u32,
    height: u32,
    data: &[u8],
    quality: f32,
) -> Result<Vec<u8>, ImageError> {
    let quality = jpeg_quality(quality)?;

    let expected = width as usize * height as usize * 3;
    if width == 0 || height == 0 || data.len() != expected {
        return Err(ImageError::Encode(format!(
            "RGB buffer size mismatch: {}x{} needs {} bytes, got {}",
            width,
            height,
            expected,
            data.len()
        )));
    }

    let mut buffer = Vec::new();
    let encoder =
        crates_image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
    encoder.write_image(data, width, height, crates_image::ExtendedColorType::Rgb8)?;

    Ok(buffer)
}

/// Encode a packed RGB buffer (HWC, `[height, width, 3]`) as JPEG bytes.
///
/// The CPU-bound encoding work runs on tokio's blocking thread pool.
///
/// # Errors
///
/// Returns `ImageError::InvalidQuality` for quality outside 0.0–1.0 and
/// `ImageError::Encode` if the buffer size does not match the dimensions or
/// encoding fails.
pub async fn encode_rgb_jpeg(
    width: u32,
    height: u32,
    data: Vec<u8>,
    quality: f32,
) -> Result<Vec<u8>, ImageError> {
    tokio::task::spawn_blocking(move || encode_rgb_jpeg_inner(width, height, &data, quality))
        .await
        .map_err(|e| ImageError::Encode(e.to_string()))?
}
