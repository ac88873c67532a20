//! Erosion and dilation with a square structuring element.

use image::GrayImage;
use imageproc::morphology::{grayscale_dilate, grayscale_erode, Mask};

use super::{merge_channels, split_channels, to_rgb, TransformError};
use crate::decode::PixelBuffer;

/// Side length of the square structuring element.
pub const MORPH_KERNEL_SIZE: u8 = 5;

/// One erosion pass per channel (local minimum over a 5x5 window).
pub fn erode(image: &PixelBuffer) -> Result<PixelBuffer, TransformError> {
    per_channel(image, grayscale_erode)
}

/// One dilation pass per channel (local maximum over a 5x5 window).
pub fn dilate(image: &PixelBuffer) -> Result<PixelBuffer, TransformError> {
    per_channel(image, grayscale_dilate)
}

fn per_channel(
    image: &PixelBuffer,
    op: fn(&GrayImage, &Mask) -> GrayImage,
) -> Result<PixelBuffer, TransformError> {
    let rgb = to_rgb(image)?;
    let mask = Mask::square(MORPH_KERNEL_SIZE / 2);
    let planes = split_channels(&rgb).map(|plane| op(&plane, &mask));
    Ok(merge_channels(&planes))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 9x9 black image with a single white pixel in the middle.
    fn dot() -> PixelBuffer {
        let mut img = PixelBuffer::filled(9, 9, [0, 0, 0]);
        let idx = (4 * 9 + 4) * 3;
        img.pixels[idx..idx + 3].copy_from_slice(&[255, 255, 255]);
        img
    }

    #[test]
    fn test_dilate_grows_to_kernel_square() {
        let out = dilate(&dot()).unwrap();

        assert_eq!(out.pixel(2, 2), Some([255, 255, 255]));
        assert_eq!(out.pixel(6, 6), Some([255, 255, 255]));
        assert_eq!(out.pixel(1, 4), Some([0, 0, 0]));
        assert_eq!(out.pixel(7, 4), Some([0, 0, 0]));

        let white = out.pixels.chunks(3).filter(|p| p[0] == 255).count();
        assert_eq!(white, 25);
    }

    #[test]
    fn test_erode_removes_isolated_dot() {
        let out = erode(&dot()).unwrap();
        assert!(out.pixels.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_channels_are_independent() {
        let mut img = PixelBuffer::filled(9, 9, [0, 0, 0]);
        let idx = (4 * 9 + 4) * 3;
        img.pixels[idx] = 200; // red only

        let out = dilate(&img).unwrap();
        assert_eq!(out.pixel(3, 3), Some([200, 0, 0]));
        assert_eq!(out.pixel(4, 4), Some([200, 0, 0]));
        assert_eq!(out.pixel(1, 1), Some([0, 0, 0]));
    }

    #[test]
    fn test_grayscale_min_and_max() {
        // Levels are kept, not thresholded to 0/255
        let mut img = PixelBuffer::filled(9, 9, [100, 100, 100]);
        let idx = (4 * 9 + 4) * 3;
        img.pixels[idx..idx + 3].copy_from_slice(&[40, 160, 100]);

        let eroded = erode(&img).unwrap();
        assert_eq!(eroded.pixel(2, 2), Some([40, 100, 100]));
        assert_eq!(eroded.pixel(0, 0), Some([100, 100, 100]));

        let dilated = dilate(&img).unwrap();
        assert_eq!(dilated.pixel(6, 6), Some([100, 160, 100]));
        assert_eq!(dilated.pixel(7, 7), Some([100, 100, 100]));
    }

    #[test]
    fn test_flat_image_unchanged() {
        let img = PixelBuffer::filled(6, 6, [80, 90, 100]);
        assert_eq!(erode(&img).unwrap(), img);
        assert_eq!(dilate(&img).unwrap(), img);
    }
}
