//! Mapping between the down-scaled preview canvas and source pixels.
//!
//! The preview is fitted into a fixed box (300 wide by 400 tall by default).
//! Every time a buffer is displayed a new [`ViewTransform`] is derived from
//! its dimensions, and canvas points are mapped back with
//! `source = trunc(canvas * ratio)`.

use serde::{Deserialize, Serialize};

/// A point on the preview canvas, in canvas pixels.
///
/// Canvas events may land outside the displayed image (drags past the edge),
/// so coordinates are signed and fractional.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A point in source (full resolution) pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourcePoint {
    pub x: u32,
    pub y: u32,
}

impl SourcePoint {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Maximum on-screen size of the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewBox {
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for PreviewBox {
    fn default() -> Self {
        Self {
            max_width: 300,
            max_height: 400,
        }
    }
}

/// Relationship between the displayed preview and the source buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// Width of the displayed preview.
    pub display_width: u32,
    /// Height of the displayed preview.
    pub display_height: u32,
    /// `source_height / display_height`
    pub ratio: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity(0, 0)
    }
}

impl ViewTransform {
    /// Derive the transform for displaying a `width` x `height` source.
    pub fn fit(width: u32, height: u32, preview: PreviewBox) -> Self {
        let (display_width, display_height) = compute_display_size(width, height, preview);
        Self {
            display_width,
            display_height,
            ratio: height as f64 / display_height as f64,
        }
    }

    /// A 1:1 transform.
    pub fn identity(width: u32, height: u32) -> Self {
        Self {
            display_width: width,
            display_height: height,
            ratio: 1.0,
        }
    }

    /// Map a canvas point to source pixels.
    ///
    /// Coordinates are truncated toward zero; negative canvas coordinates
    /// saturate to 0.
    pub fn map_to_source(&self, point: Point) -> SourcePoint {
        SourcePoint {
            x: (point.x * self.ratio) as u32,
            y: (point.y * self.ratio) as u32,
        }
    }
}

/// Compute the on-screen size of a `width` x `height` image.
///
/// Images that already fit are shown 1:1. Otherwise a landscape image
/// (`height / width < 1`) is clamped to the box width and its height scaled;
/// anything else is clamped to the box height and its width scaled. If the
/// chosen clamp still overflows the other axis, the other clamp is used. The
/// scaled side is truncated and never drops below 1.
pub fn compute_display_size(width: u32, height: u32, preview: PreviewBox) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }
    if width <= preview.max_width && height <= preview.max_height {
        return (width, height);
    }

    let scaled = |side: u32, num: u32, den: u32| -> u32 {
        ((side as u64 * num as u64 / den as u64) as u32).max(1)
    };
    let by_width = (preview.max_width, scaled(preview.max_width, height, width));
    let by_height = (scaled(preview.max_height, width, height), preview.max_height);

    // height / width < 1
    if height < width {
        if by_width.1 <= preview.max_height {
            by_width
        } else {
            by_height
        }
    } else if by_height.0 <= preview.max_width {
        by_height
    } else {
        by_width
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
