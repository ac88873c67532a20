//! 3x3 kernel correlation applied independently to each channel.

use image::Rgb;
use imageproc::definitions::Image;
use imageproc::filter::filter3x3;

use super::{to_rgb, TransformError};
use crate::decode::PixelBuffer;

/// Emboss kernel (row-major).
pub const EMBOSS_KERNEL: [f32; 9] = [0.0, -1.0, -1.0, 1.0, 0.0, -1.0, 1.0, 1.0, 0.0];

/// Sepia-tone kernel (row-major).
///
/// Applied spatially like any other kernel, so the result is a warm, bright
/// smear rather than a color-matrix sepia.
pub const SEPIA_KERNEL: [f32; 9] = [
    0.272, 0.534, 0.131, //
    0.349, 0.686, 0.168, //
    0.393, 0.769, 0.189,
];

/// Emboss filter.
pub fn emboss(image: &PixelBuffer) -> Result<PixelBuffer, TransformError> {
    correlate3x3(image, &EMBOSS_KERNEL)
}

/// Sepia filter.
pub fn sepia(image: &PixelBuffer) -> Result<PixelBuffer, TransformError> {
    correlate3x3(image, &SEPIA_KERNEL)
}

/// Correlate each channel with a row-major 3x3 kernel.
///
/// The kernel is not flipped. Border pixels are extended by replication.
/// Results are rounded and saturated to `u8`.
///
/// # Errors
///
/// Returns `TransformError::InvalidParameter` for non-finite kernel values
/// and `TransformError::InvalidBuffer` for a malformed or empty buffer.
pub fn correlate3x3(image: &PixelBuffer, kernel: &[f32; 9]) -> Result<PixelBuffer, TransformError> {
    if kernel.iter().any(|k| !k.is_finite()) {
        return Err(TransformError::InvalidParameter(
            "kernel contains non-finite values".to_string(),
        ));
    }
    let rgb = to_rgb(image)?;

    // Keep the sums in f32 so they can be rounded rather than truncated.
    let sums: Image<Rgb<f32>> = filter3x3::<_, f32, f32>(&rgb, kernel);
    let pixels = sums
        .into_raw()
        .into_iter()
        .map(|v| v.round().clamp(0.0, 255.0) as u8)
        .collect();

    Ok(PixelBuffer::new(image.width, image.height, pixels))
}
