//! Resampling for the on-screen preview.

use super::{to_rgb, TransformError};
use crate::decode::{FilterType, PixelBuffer};

/// Resize an image to exact dimensions.
///
/// # Errors
///
/// Returns `TransformError::InvalidParameter` for a zero target dimension.
pub fn resize(
    image: &PixelBuffer,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<PixelBuffer, TransformError> {
    if width == 0 || height == 0 {
        return Err(TransformError::InvalidParameter(format!(
            "resize target {width}x{height} has a zero dimension"
        )));
    }

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let rgb_image = to_rgb(image)?;
    let resized = image::imageops::resize(&rgb_image, width, height, filter.to_image_filter());

    Ok(PixelBuffer::from_rgb_image(resized))
}
