//! Pure pixel transforms used by the edit pipeline.
//!
//! Every transform takes a borrowed [`PixelBuffer`] plus parameters and
//! returns a new buffer. The input is never modified, which is what lets the
//! session keep `original` and `committed` intact while a preview is shown.
//!
//! # Coordinate System
//!
//! - Geometry and drawing operate in source (full resolution) pixels
//! - Origin is the top-left corner
//! - Crop rectangles use an exclusive end corner

mod blur;
mod color;
mod convolve;
mod draw;
mod geometry;
mod morphology;
mod resize;
mod stylize;

use thiserror::Error;

use crate::decode::PixelBuffer;

pub use blur::{apply_blur, effective_kernel_size, gaussian_kernel, gaussian_sigma, BlurKind};
pub use color::{brightness_offset, brightness_scale, convert_scale_abs, grayscale, negate, threshold};
pub use convolve::{correlate3x3, emboss, sepia, EMBOSS_KERNEL, SEPIA_KERNEL};
pub use draw::{draw_line, draw_text, stroke_thickness, TEXT_BASE_HEIGHT};
pub use geometry::{apply_crop, apply_flip, apply_rotate, FlipAxis, RotateDirection};
pub use morphology::{dilate, erode, MORPH_KERNEL_SIZE};
pub use resize::resize;
pub use stylize::{pencil_sketch, stylize, SketchParams, StylizeParams};

/// Errors raised by a single transform.
///
/// A failed transform never touches the buffers it was given.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A crop or text selection covers no pixels.
    #[error("Selection is empty: {width}x{height}")]
    EmptySelection { width: u32, height: u32 },

    /// Kernel sizes must be odd and positive.
    #[error("Invalid kernel size {0}: must be odd and at least 1")]
    InvalidKernelSize(u32),

    /// Text overlay requested without a usable font.
    #[error("No font available for text overlay")]
    MissingFont,

    /// A parameter is outside its accepted range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The buffer's pixel data does not match its dimensions.
    #[error("Malformed buffer: expected {expected} bytes, got {actual}")]
    InvalidBuffer { expected: usize, actual: usize },
}

/// Borrow the buffer as an `RgbImage`, checking its shape first.
pub(crate) fn to_rgb(image: &PixelBuffer) -> Result<image::RgbImage, TransformError> {
    let expected = (image.width as usize) * (image.height as usize) * 3;
    image
        .to_rgb_image()
        .filter(|_| !image.is_empty())
        .ok_or(TransformError::InvalidBuffer {
            expected,
            actual: image.pixels.len(),
        })
}

/// Split an RGB image into three single-channel planes.
pub(crate) fn split_channels(image: &image::RgbImage) -> [image::GrayImage; 3] {
    let (w, h) = image.dimensions();
    [0, 1, 2].map(|c| image::GrayImage::from_fn(w, h, |x, y| image::Luma([image.get_pixel(x, y)[c]])))
}

/// Inverse of [`split_channels`].
pub(crate) fn merge_channels(planes: &[image::GrayImage; 3]) -> PixelBuffer {
    let (w, h) = planes[0].dimensions();
    let rgb = image::RgbImage::from_fn(w, h, |x, y| {
        image::Rgb([
            planes[0].get_pixel(x, y)[0],
            planes[1].get_pixel(x, y)[0],
            planes[2].get_pixel(x, y)[0],
        ])
    });
    PixelBuffer::from_rgb_image(rgb)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_rgb_rejects_malformed_buffer() {
        let bad = PixelBuffer {
            width: 4,
            height: 4,
            pixels: vec![0; 10],
        };
        assert!(matches!(
            to_rgb(&bad),
            Err(TransformError::InvalidBuffer {
                expected: 48,
                actual: 10
            })
        ));
    }

    #[test]
    fn test_split_merge_channels() {
        let img = test_util::gradient(7, 5);
        let rgb = to_rgb(&img).unwrap();
        let planes = split_channels(&rgb);

        assert_eq!(planes[2].get_pixel(3, 1)[0], img.pixel(3, 1).unwrap()[2]);
        assert_eq!(merge_channels(&planes), img);
    }
}
