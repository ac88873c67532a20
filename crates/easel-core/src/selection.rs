//! Drag rectangles normalized into source space.

use serde::{Deserialize, Serialize};

use crate::view::{Point, SourcePoint, ViewTransform};

/// Axis-aligned rectangle in source pixels with `start <= end` on both axes.
///
/// `end` is exclusive when used as a crop region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRect {
    pub start: SourcePoint,
    pub end: SourcePoint,
}

impl SelectionRect {
    pub fn width(&self) -> u32 {
        self.end.x - self.start.x
    }

    pub fn height(&self) -> u32 {
        self.end.y - self.start.y
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// Build a source-space rectangle from two canvas corners.
///
/// The corners may come in any drag direction; each axis is ordered before
/// mapping through `view`, so the result always has `start <= end`.
pub fn normalize_selection(p0: Point, p1: Point, view: &ViewTransform) -> SelectionRect {
    let top_left = Point::new(p0.x.min(p1.x), p0.y.min(p1.y));
    let bottom_right = Point::new(p0.x.max(p1.x), p0.y.max(p1.y));

    SelectionRect {
        start: view.map_to_source(top_left),
        end: view.map_to_source(bottom_right),
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
