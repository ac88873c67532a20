//! Cropping, quarter-turn rotation and mirroring.
//!
//! All operations are lossless: pixels are moved, never resampled.

use serde::{Deserialize, Serialize};

use super::TransformError;
use crate::decode::PixelBuffer;
use crate::selection::SelectionRect;

/// Direction of a 90° rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotateDirection {
    /// Counter-clockwise.
    Left,
    /// Clockwise.
    Right,
}

/// Mirror axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlipAxis {
    /// Top and bottom swap.
    Vertical,
    /// Left and right swap.
    Horizontal,
}

/// Crop to a source-space rectangle.
///
/// The end corner is exclusive. The rectangle is clamped to the image bounds
/// first.
///
/// # Errors
///
/// Returns `TransformError::EmptySelection` if nothing is left after
/// clamping (zero-width or zero-height drags included).
pub fn apply_crop(image: &PixelBuffer, rect: &SelectionRect) -> Result<PixelBuffer, TransformError> {
    super::to_rgb(image)?;

    let px_left = rect.start.x.min(image.width);
    let px_top = rect.start.y.min(image.height);
    let px_right = rect.end.x.min(image.width);
    let px_bottom = rect.end.y.min(image.height);

    let out_width = px_right.saturating_sub(px_left);
    let out_height = px_bottom.saturating_sub(px_top);
    if out_width == 0 || out_height == 0 {
        return Err(TransformError::EmptySelection {
            width: out_width,
            height: out_height,
        });
    }

    // Fast path: full crop returns a clone
    if out_width == image.width && out_height == image.height {
        return Ok(image.clone());
    }

    let row_bytes = (out_width * 3) as usize;
    let mut output = Vec::with_capacity(row_bytes * out_height as usize);

    // Copy pixel data row by row
    for y in px_top..px_bottom {
        let src_row_start = ((y * image.width + px_left) * 3) as usize;
        output.extend_from_slice(&image.pixels[src_row_start..src_row_start + row_bytes]);
    }

    Ok(PixelBuffer::new(out_width, out_height, output))
}

/// Rotate by a quarter turn. Width and height swap.
pub fn apply_rotate(image: &PixelBuffer, direction: RotateDirection) -> Result<PixelBuffer, TransformError> {
    let rgb = super::to_rgb(image)?;
    let rotated = match direction {
        RotateDirection::Left => image::imageops::rotate270(&rgb),
        RotateDirection::Right => image::imageops::rotate90(&rgb),
    };
    Ok(PixelBuffer::from_rgb_image(rotated))
}

/// Mirror along an axis.
pub fn apply_flip(image: &PixelBuffer, axis: FlipAxis) -> Result<PixelBuffer, TransformError> {
    let rgb = super::to_rgb(image)?;
    let flipped = match axis {
        FlipAxis::Vertical => image::imageops::flip_vertical(&rgb),
        FlipAxis::Horizontal => image::imageops::flip_horizontal(&rgb),
    };
    Ok(PixelBuffer::from_rgb_image(flipped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::SourcePoint;

    /// Create a test image where each pixel has a unique value based on position.
    fn test_image(width: u32, height: u32) -> PixelBuffer {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((y * width + x) % 256) as u8;
                pixels.extend_from_slice(&[v, v, v]);
            }
        }
        PixelBuffer::new(width, height, pixels)
    }

    fn rect(x0: u32, y0: u32, x1: u32, y1: u32) -> SelectionRect {
        SelectionRect {
            start: SourcePoint::new(x0, y0),
            end: SourcePoint::new(x1, y1),
        }
    }

    #[test]
    fn test_full_crop() {
        let img = test_image(100, 100);
        let result = apply_crop(&img, &rect(0, 0, 100, 100)).unwrap();
        assert_eq!(result, img);
    }

    #[test]
    fn test_center_crop() {
        let img = test_image(10, 10);
        let result = apply_crop(&img, &rect(2, 2, 8, 8)).unwrap();

        assert_eq!((result.width, result.height), (6, 6));
        // First pixel should be from position (2, 2) in the original
        assert_eq!(result.pixels[0], 22);
    }

    #[test]
    fn test_crop_end_is_exclusive() {
        let img = test_image(10, 10);
        let result = apply_crop(&img, &rect(3, 3, 4, 4)).unwrap();

        assert_eq!((result.width, result.height), (1, 1));
        assert_eq!(result.pixels, vec![33, 33, 33]);
    }

    #[test]
    fn test_crop_clamps_to_bounds() {
        let img = test_image(10, 10);
        let result = apply_crop(&img, &rect(8, 8, 50, 50)).unwrap();
        assert_eq!((result.width, result.height), (2, 2));
    }

    #[test]
    fn test_crop_rectangular() {
        let img = test_image(200, 100);
        let result = apply_crop(&img, &rect(0, 0, 50, 100)).unwrap();
        assert_eq!((result.width, result.height), (50, 100));
    }

    #[test]
    fn test_empty_crop_is_error() {
        let img = test_image(10, 10);
        assert!(matches!(
            apply_crop(&img, &rect(4, 4, 4, 9)),
            Err(TransformError::EmptySelection { width: 0, height: 5 })
        ));
        assert!(apply_crop(&img, &rect(12, 12, 20, 20)).is_err());
    }

    #[test]
    fn test_rotate_swaps_dimensions() {
        let img = test_image(4, 2);
        let left = apply_rotate(&img, RotateDirection::Left).unwrap();
        let right = apply_rotate(&img, RotateDirection::Right).unwrap();

        assert_eq!((left.width, left.height), (2, 4));
        assert_eq!((right.width, right.height), (2, 4));
    }

    #[test]
    fn test_rotate_pixel_placement() {
        // Top-left pixel of the source ends up top-right after a right turn
        let img = test_image(3, 2);
        let right = apply_rotate(&img, RotateDirection::Right).unwrap();
        assert_eq!(right.pixel(1, 0), img.pixel(0, 0));

        // ... and bottom-left after a left turn
        let left = apply_rotate(&img, RotateDirection::Left).unwrap();
        assert_eq!(left.pixel(0, 2), img.pixel(0, 0));
    }

    #[test]
    fn test_left_then_right_is_identity() {
        let img = test_image(5, 3);
        let turned = apply_rotate(&img, RotateDirection::Left).unwrap();
        assert_eq!(apply_rotate(&turned, RotateDirection::Right).unwrap(), img);
    }

    #[test]
    fn test_flip() {
        let img = test_image(3, 2);
        let v = apply_flip(&img, FlipAxis::Vertical).unwrap();
        let h = apply_flip(&img, FlipAxis::Horizontal).unwrap();

        assert_eq!(v.pixel(0, 0), img.pixel(0, 1));
        assert_eq!(h.pixel(0, 0), img.pixel(2, 0));
        assert_eq!(apply_flip(&h, FlipAxis::Horizontal).unwrap(), img);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::view::SourcePoint;
    use proptest::prelude::*;

    fn create_test_image(width: u32, height: u32) -> PixelBuffer {
        let pixels = (0..width * height)
            .flat_map(|i| {
                let v = (i % 256) as u8;
                [v, v, v]
            })
            .collect();
        PixelBuffer::new(width, height, pixels)
    }

    proptest! {
        /// Property: Output dimensions never exceed input dimensions.
        #[test]
        fn prop_output_bounded_by_input(
            (width, height) in (1u32..=60, 1u32..=60),
            (x0, y0, x1, y1) in (0u32..80, 0u32..80, 0u32..80, 0u32..80),
        ) {
            let img = create_test_image(width, height);
            let rect = SelectionRect {
                start: SourcePoint::new(x0.min(x1), y0.min(y1)),
                end: SourcePoint::new(x0.max(x1), y0.max(y1)),
            };

            if let Ok(result) = apply_crop(&img, &rect) {
                prop_assert!(result.width >= 1 && result.width <= width);
                prop_assert!(result.height >= 1 && result.height <= height);
                prop_assert!(result.is_well_formed());
            }
        }

        /// Property: The first cropped pixel is the source pixel at the start corner.
        #[test]
        fn prop_crop_origin_matches_source(
            (width, height) in (2u32..=60, 2u32..=60),
            (x0, y0) in (0u32..60, 0u32..60),
        ) {
            let x0 = x0 % width;
            let y0 = y0 % height;
            let img = create_test_image(width, height);
            let rect = SelectionRect {
                start: SourcePoint::new(x0, y0),
                end: SourcePoint::new(width, height),
            };

            let result = apply_crop(&img, &rect).unwrap();
            prop_assert_eq!(result.pixel(0, 0), img.pixel(x0, y0));
        }

        /// Property: Four quarter turns restore the image.
        #[test]
        fn prop_four_turns_identity(
            (width, height) in (1u32..=30, 1u32..=30),
            left in any::<bool>(),
        ) {
            let img = create_test_image(width, height);
            let dir = if left { RotateDirection::Left } else { RotateDirection::Right };

            let mut out = img.clone();
            for _ in 0..4 {
                out = apply_rotate(&out, dir).unwrap();
            }
            prop_assert_eq!(out, img);
        }
    }
}
