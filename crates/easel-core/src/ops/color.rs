//! Per-pixel color operations.
//!
//! These operate directly on the interleaved RGB bytes; none of them look at
//! neighbouring pixels.

use super::TransformError;
use crate::decode::PixelBuffer;

/// Luma coefficients (ITU-R BT.601), matching the usual RGB to gray conversion.
const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// Binary threshold level; channels strictly above it become 255.
pub const THRESHOLD_LEVEL: u8 = 127;

/// Invert every channel.
pub fn negate(image: &PixelBuffer) -> PixelBuffer {
    map_channels(image, |v| 255 - v)
}

/// Convert to gray and replicate the gray value into all three channels.
pub fn grayscale(image: &PixelBuffer) -> PixelBuffer {
    let mut output = image.clone();
    for chunk in output.pixels.chunks_exact_mut(3) {
        let gray = luma(chunk[0], chunk[1], chunk[2]);
        chunk.fill(gray);
    }
    output
}

/// Per-channel binary threshold at [`THRESHOLD_LEVEL`].
pub fn threshold(image: &PixelBuffer) -> PixelBuffer {
    map_channels(image, |v| if v > THRESHOLD_LEVEL { 255 } else { 0 })
}

/// Scale, offset, take the absolute value and saturate to `u8`.
///
/// Formula: `output = saturate(|input * alpha + beta|)`
pub fn convert_scale_abs(image: &PixelBuffer, alpha: f32, beta: f32) -> PixelBuffer {
    map_channels(image, |v| {
        (v as f32 * alpha + beta).abs().round().clamp(0.0, 255.0) as u8
    })
}

/// Multiply brightness by `alpha` (0.0 to 2.0).
pub fn brightness_scale(image: &PixelBuffer, alpha: f32) -> Result<PixelBuffer, TransformError> {
    if !(0.0..=2.0).contains(&alpha) {
        return Err(TransformError::InvalidParameter(format!(
            "brightness scale {alpha} outside 0.0..=2.0"
        )));
    }
    Ok(convert_scale_abs(image, alpha, 0.0))
}

/// Add `beta` (-200 to 200) to every channel.
pub fn brightness_offset(image: &PixelBuffer, beta: f32) -> Result<PixelBuffer, TransformError> {
    if !(-200.0..=200.0).contains(&beta) {
        return Err(TransformError::InvalidParameter(format!(
            "brightness offset {beta} outside -200..=200"
        )));
    }
    Ok(convert_scale_abs(image, 1.0, beta))
}

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let lum = LUMA_R * r as f32 + LUMA_G * g as f32 + LUMA_B * b as f32;
    lum.round().clamp(0.0, 255.0) as u8
}

fn map_channels(image: &PixelBuffer, f: impl Fn(u8) -> u8) -> PixelBuffer {
    PixelBuffer {
        width: image.width,
        height: image.height,
        pixels: image.pixels.iter().map(|&v| f(v)).collect(),
    }
}
