//! Non-photorealistic effects: cartoon-like stylization and pencil sketch.

use image::{GrayImage, Luma, Rgb, RgbImage};

use super::{to_rgb, TransformError};
use crate::decode::PixelBuffer;

/// Sobel magnitude treated as a full-strength edge when `sigma_r` is 1.
const SOBEL_FULL_EDGE: f32 = 1020.0;

/// Parameters for [`stylize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StylizeParams {
    /// Spatial extent of the smoothing (larger = flatter regions).
    pub sigma_s: f32,
    /// Edge sensitivity in 0.0..=1.0 (smaller = more edges drawn).
    pub sigma_r: f32,
}

impl Default for StylizeParams {
    fn default() -> Self {
        Self {
            sigma_s: 150.0,
            sigma_r: 0.25,
        }
    }
}

/// Parameters for [`pencil_sketch`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SketchParams {
    /// Spatial extent of the dodge blur.
    pub sigma_s: f32,
    /// Fraction of brightness removed from the finished sketch (0.0..=0.1).
    pub shade_factor: f32,
}

impl Default for SketchParams {
    fn default() -> Self {
        Self {
            sigma_s: 60.0,
            shade_factor: 0.02,
        }
    }
}

/// Flatten color regions with a median filter and darken strong edges.
pub fn stylize(image: &PixelBuffer, params: StylizeParams) -> Result<PixelBuffer, TransformError> {
    if !(params.sigma_s > 0.0 && params.sigma_r > 0.0 && params.sigma_r <= 1.0) {
        return Err(TransformError::InvalidParameter(format!(
            "stylize expects sigma_s > 0 and 0 < sigma_r <= 1, got {params:?}"
        )));
    }
    let rgb = to_rgb(image)?;

    let radius = ((params.sigma_s / 50.0).round() as u32).clamp(1, 5);
    let smoothed = imageproc::filter::median_filter(&rgb, radius, radius);
    let gray = image::imageops::grayscale(&smoothed);
    let gradients = imageproc::gradients::sobel_gradients(&gray);

    let scale = SOBEL_FULL_EDGE * params.sigma_r;
    let output = RgbImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let edge = (gradients.get_pixel(x, y)[0] as f32 / scale).min(1.0);
        let keep = 1.0 - edge;
        let p = smoothed.get_pixel(x, y);
        Rgb([0, 1, 2].map(|c| (p[c] as f32 * keep).round() as u8))
    });

    Ok(PixelBuffer::from_rgb_image(output))
}

/// Color pencil sketch.
///
/// A gray "color dodge" sketch is computed from the luminance and its
/// blurred negative, then used to modulate the original colors.
pub fn pencil_sketch(image: &PixelBuffer, params: SketchParams) -> Result<PixelBuffer, TransformError> {
    if !(params.sigma_s > 0.0 && (0.0..=0.1).contains(&params.shade_factor)) {
        return Err(TransformError::InvalidParameter(format!(
            "pencil sketch expects sigma_s > 0 and 0 <= shade_factor <= 0.1, got {params:?}"
        )));
    }
    let rgb = to_rgb(image)?;

    let gray = image::imageops::grayscale(&rgb);
    let mut inverted = gray.clone();
    image::imageops::invert(&mut inverted);
    let blurred = imageproc::filter::gaussian_blur_f32(&inverted, params.sigma_s / 10.0);

    let shade = 1.0 - params.shade_factor * 10.0;
    let sketch = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let base = gray.get_pixel(x, y)[0] as f32;
        let blend = blurred.get_pixel(x, y)[0] as f32;
        let dodge = (base * 256.0 / (256.0 - blend)).min(255.0);
        Luma([(dodge * shade).round() as u8])
    });

    let output = RgbImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let s = sketch.get_pixel(x, y)[0] as f32 / 255.0;
        let p = rgb.get_pixel(x, y);
        Rgb([0, 1, 2].map(|c| (p[c] as f32 * s).round() as u8))
    });

    Ok(PixelBuffer::from_rgb_image(output))
}
