//! Box, Gaussian and median smoothing driven by a kernel-size slider.

use image::Rgb;
use imageproc::definitions::Image;
use imageproc::filter;
use serde::{Deserialize, Serialize};

use super::{merge_channels, split_channels, to_rgb, TransformError};
use crate::decode::PixelBuffer;

/// Largest kernel the slider can produce (slider range 0..=256, made odd).
pub const MAX_KERNEL_SIZE: u32 = 257;

/// Smoothing algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlurKind {
    /// Unweighted mean over a square window.
    Box,
    /// Gaussian-weighted mean, sigma derived from the kernel size.
    Gaussian,
    /// Per-channel median over a square window.
    Median,
}

/// Kernel size actually used for a slider value: even values are bumped to
/// the next odd number.
#[inline]
pub fn effective_kernel_size(slider: u32) -> u32 {
    if slider % 2 == 0 {
        slider + 1
    } else {
        slider
    }
}

/// Gaussian sigma for an odd kernel size.
///
/// Formula: `sigma = 0.3 * ((k - 1) * 0.5 - 1) + 0.8`
#[inline]
pub fn gaussian_sigma(kernel_size: u32) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Blur with the kernel derived from `slider`.
///
/// A kernel size of 1 is the identity and returns a copy of the input.
///
/// # Errors
///
/// Returns `TransformError::InvalidKernelSize` when the effective kernel is
/// larger than [`MAX_KERNEL_SIZE`].
pub fn apply_blur(
    image: &PixelBuffer,
    kind: BlurKind,
    slider: u32,
) -> Result<PixelBuffer, TransformError> {
    let kernel = effective_kernel_size(slider);
    if kernel > MAX_KERNEL_SIZE {
        return Err(TransformError::InvalidKernelSize(kernel));
    }

    let rgb = to_rgb(image)?;
    if kernel == 1 {
        return Ok(image.clone());
    }
    let radius = kernel / 2;

    match kind {
        BlurKind::Box => {
            let planes = split_channels(&rgb).map(|plane| filter::box_filter(&plane, radius, radius));
            Ok(merge_channels(&planes))
        }
        BlurKind::Gaussian => Ok(gaussian(image, kernel)),
        BlurKind::Median => Ok(PixelBuffer::from_rgb_image(filter::median_filter(
            &rgb, radius, radius,
        ))),
    }
}

/// Normalized 1-D Gaussian weights with exactly `kernel_size` taps.
pub fn gaussian_kernel(kernel_size: u32) -> Vec<f32> {
    let sigma = gaussian_sigma(kernel_size);
    let center = (kernel_size / 2) as f32;
    let weights: Vec<f32> = (0..kernel_size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let total: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

/// Separable Gaussian in f32, rounded back to `u8` once at the end.
fn gaussian(image: &PixelBuffer, kernel_size: u32) -> PixelBuffer {
    let samples = image.pixels.iter().map(|&v| f32::from(v)).collect();
    let Some(input) = Image::<Rgb<f32>>::from_raw(image.width, image.height, samples) else {
        return image.clone();
    };

    let blurred = filter::separable_filter_equal(&input, &gaussian_kernel(kernel_size));
    let pixels = blurred
        .into_raw()
        .into_iter()
        .map(|v| v.round().clamp(0.0, 255.0) as u8)
        .collect();
    PixelBuffer::new(image.width, image.height, pixels)
}
