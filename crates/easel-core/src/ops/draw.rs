//! Freehand stroke segments and text overlay.

use ab_glyph::{FontArc, PxScale};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_text_mut, text_size};

use super::{to_rgb, TransformError};
use crate::decode::PixelBuffer;
use crate::view::SourcePoint;
use crate::Color;

/// Glyph height in pixels at font scale 1.0.
pub const TEXT_BASE_HEIGHT: f32 = 22.0;

/// Source-space stroke thickness for a preview stroke width.
///
/// A stroke drawn `width` preview pixels wide covers `width * ratio` source
/// pixels; never thinner than one pixel.
pub fn stroke_thickness(ratio: f64, width: u32) -> u32 {
    ((ratio * width as f64) as u32).max(1)
}

/// Draw a straight segment of the given thickness.
pub fn draw_line(
    image: &PixelBuffer,
    from: SourcePoint,
    to: SourcePoint,
    color: Color,
    thickness: u32,
) -> Result<PixelBuffer, TransformError> {
    let mut canvas = to_rgb(image)?;
    let rgb = color.to_rgb();

    // Discs reach `radius` past the segment, so clip against a padded canvas.
    let radius = (thickness / 2).max(1);
    let pad = radius as f64;
    let bounds = (
        -pad,
        -pad,
        image.width as f64 - 1.0 + pad,
        image.height as f64 - 1.0 + pad,
    );
    let start = (from.x as f64, from.y as f64);
    let end = (to.x as f64, to.y as f64);
    let Some(((x0, y0), (x1, y1))) = clip_segment(start, end, bounds) else {
        return Ok(PixelBuffer::from_rgb_image(canvas));
    };
    let (x0, y0, x1, y1) = (x0 as f32, y0 as f32, x1 as f32, y1 as f32);

    if thickness <= 1 {
        draw_line_segment_mut(&mut canvas, (x0, y0), (x1, y1), rgb);
        return Ok(PixelBuffer::from_rgb_image(canvas));
    }

    // Stamp a disc at every step along the segment.
    let radius = radius as i32;
    let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0) as u32;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let cx = (x0 + (x1 - x0) * t).round() as i32;
        let cy = (y0 + (y1 - y0) * t).round() as i32;
        draw_filled_circle_mut(&mut canvas, (cx, cy), radius, rgb);
    }

    Ok(PixelBuffer::from_rgb_image(canvas))
}

/// Liang-Barsky clip of a segment to `(min_x, min_y, max_x, max_y)`.
fn clip_segment(
    start: (f64, f64),
    end: (f64, f64),
    (min_x, min_y, max_x, max_y): (f64, f64, f64, f64),
) -> Option<((f64, f64), (f64, f64))> {
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;

    for (p, q) in [
        (-dx, start.0 - min_x),
        (dx, max_x - start.0),
        (-dy, start.1 - min_y),
        (dy, max_y - start.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }

    Some((
        (start.0 + t0 * dx, start.1 + t0 * dy),
        (start.0 + t1 * dx, start.1 + t1 * dy),
    ))
}

/// Render `text` with its baseline-left corner at `anchor`.
///
/// `scale` is relative to [`TEXT_BASE_HEIGHT`].
///
/// # Errors
///
/// Returns `TransformError::MissingFont` without a font and
/// `TransformError::InvalidParameter` for empty text or a non-positive scale.
pub fn draw_text(
    image: &PixelBuffer,
    text: &str,
    anchor: SourcePoint,
    color: Color,
    scale: f32,
    font: Option<&FontArc>,
) -> Result<PixelBuffer, TransformError> {
    let font = font.ok_or(TransformError::MissingFont)?;
    if text.is_empty() {
        return Err(TransformError::InvalidParameter("text is empty".to_string()));
    }
    if scale.is_nan() || scale <= 0.0 {
        return Err(TransformError::InvalidParameter(format!(
            "font scale {scale} must be positive"
        )));
    }

    let mut canvas = to_rgb(image)?;
    let px = PxScale::from(scale * TEXT_BASE_HEIGHT);
    let (_, height) = text_size(px, font, text);
    let top = anchor.y as i32 - height as i32;

    draw_text_mut(&mut canvas, color.to_rgb(), anchor.x as i32, top, px, font, text);
    Ok(PixelBuffer::from_rgb_image(canvas))
}
