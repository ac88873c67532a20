//! Edit intents and the table that dispatches them onto a session.
//!
//! Intents are plain data so the whole pipeline can be driven from a script
//! or a test without any canvas. Points are preview-canvas coordinates and
//! are mapped through the session's current view.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::TransformSource;
use crate::decode::PixelBuffer;
use crate::ops::{self, BlurKind, FlipAxis, RotateDirection, SketchParams, StylizeParams, TransformError};
use crate::selection::normalize_selection;
use crate::session::{EditSession, Presenter, PreviewKind, SessionError, SourceBuffer};
use crate::view::Point;
use crate::Color;

/// Single-shot filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Negative,
    Grayscale,
    Stylize,
    Sketch,
    Emboss,
    Sepia,
    BinaryThreshold,
    Erode,
    Dilate,
}

impl FilterKind {
    /// Filters that may be configured to read the unedited original.
    pub fn reads_original(self, source: TransformSource) -> bool {
        matches!(self, FilterKind::Emboss | FilterKind::Sepia)
            && source == TransformSource::Original
    }

    pub fn apply(self, image: &PixelBuffer) -> Result<PixelBuffer, TransformError> {
        match self {
            FilterKind::Negative => Ok(ops::negate(image)),
            FilterKind::Grayscale => Ok(ops::grayscale(image)),
            FilterKind::Stylize => ops::stylize(image, StylizeParams::default()),
            FilterKind::Sketch => ops::pencil_sketch(image, SketchParams::default()),
            FilterKind::Emboss => ops::emboss(image),
            FilterKind::Sepia => ops::sepia(image),
            FilterKind::BinaryThreshold => Ok(ops::threshold(image)),
            FilterKind::Erode => ops::erode(image),
            FilterKind::Dilate => ops::dilate(image),
        }
    }
}

/// Slider-driven level adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustKind {
    /// Multiply by `value` in 0.0..=2.0.
    BrightnessScale,
    /// Add `value` in -200.0..=200.0.
    BrightnessOffset,
}

/// One user edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditIntent {
    /// Crop to the rectangle spanned by two canvas corners.
    Crop { start: Point, end: Point },
    /// Freehand stroke through `points`.
    Draw {
        points: Vec<Point>,
        #[serde(default)]
        color: Color,
    },
    Filter { kind: FilterKind },
    /// `radius` is the raw slider value; even values round up to the next odd kernel.
    Blur { kind: BlurKind, radius: u32 },
    Adjust { kind: AdjustKind, value: f32 },
    Rotate { direction: RotateDirection },
    Flip { axis: FlipAxis },
    /// Text anchored at the top-left of the dragged rectangle.
    Text {
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        color: Color,
        #[serde(default)]
        scale: Option<f32>,
        start: Point,
        end: Point,
    },
}

impl EditIntent {
    pub fn name(&self) -> &'static str {
        match self {
            EditIntent::Crop { .. } => "crop",
            EditIntent::Draw { .. } => "draw",
            EditIntent::Filter { .. } => "filter",
            EditIntent::Blur { .. } => "blur",
            EditIntent::Adjust { .. } => "adjust",
            EditIntent::Rotate { .. } => "rotate",
            EditIntent::Flip { .. } => "flip",
            EditIntent::Text { .. } => "text",
        }
    }
}

impl<P: Presenter> EditSession<P> {
    /// Preview the result of `intent`. Nothing is committed.
    pub fn apply(&mut self, intent: &EditIntent) -> Result<(), SessionError> {
        debug!("Dispatching {} intent", intent.name());

        match intent {
            EditIntent::Crop { start, end } => {
                let rect = normalize_selection(*start, *end, self.view());
                self.begin_preview(|image| ops::apply_crop(image, &rect))
            }
            EditIntent::Draw { points, color } => self.draw_path(points, *color),
            EditIntent::Filter { kind } => {
                let source = if kind.reads_original(self.config().transform_source) {
                    SourceBuffer::Original
                } else {
                    SourceBuffer::Committed
                };
                self.preview_with(PreviewKind::Other, source, |image| kind.apply(image))
            }
            EditIntent::Blur { kind, radius } => {
                self.begin_preview(|image| ops::apply_blur(image, *kind, *radius))
            }
            EditIntent::Adjust { kind, value } => self.begin_preview(|image| match kind {
                AdjustKind::BrightnessScale => ops::brightness_scale(image, *value),
                AdjustKind::BrightnessOffset => ops::brightness_offset(image, *value),
            }),
            EditIntent::Rotate { direction } => self.preview_with(
                PreviewKind::Orientation,
                SourceBuffer::Committed,
                |image| ops::apply_rotate(image, *direction),
            ),
            EditIntent::Flip { axis } => self.preview_with(
                PreviewKind::Orientation,
                SourceBuffer::Committed,
                |image| ops::apply_flip(image, *axis),
            ),
            EditIntent::Text {
                text,
                color,
                scale,
                start,
                end,
            } => {
                let text = match text.as_deref() {
                    Some(t) if !t.is_empty() => t.to_string(),
                    _ => self.config().default_text.clone(),
                };
                let scale = scale.unwrap_or(self.config().default_font_scale);
                self.overlay_text(&text, *color, scale, *start, *end)
            }
        }
    }

    /// Extend the stroke preview with one canvas segment.
    pub fn stroke(&mut self, from: Point, to: Point, color: Color) -> Result<(), SessionError> {
        self.draw_path(&[from, to], color)
    }

    /// Preview text inside the rectangle spanned by `start` and `end`.
    pub fn overlay_text(
        &mut self,
        text: &str,
        color: Color,
        scale: f32,
        start: Point,
        end: Point,
    ) -> Result<(), SessionError> {
        let anchor = normalize_selection(start, end, self.view()).start;
        let font = self.text_font();
        self.begin_preview(|image| ops::draw_text(image, text, anchor, color, scale, font.as_ref()))
    }

    fn draw_path(&mut self, points: &[Point], color: Color) -> Result<(), SessionError> {
        let view = *self.view();
        let thickness = ops::stroke_thickness(view.ratio, self.config().stroke_width);

        let segments: Vec<_> = match points {
            [] => {
                return Err(TransformError::InvalidParameter("stroke has no points".to_string()).into())
            }
            [only] => vec![(*only, *only)],
            _ => points.windows(2).map(|w| (w[0], w[1])).collect(),
        };

        self.preview_with(PreviewKind::Stroke, SourceBuffer::Committed, |image| {
            let mut canvas = image.clone();
            for (from, to) in segments {
                canvas = ops::draw_line(
                    &canvas,
                    view.map_to_source(from),
                    view.map_to_source(to),
                    color,
                    thickness,
                )?;
            }
            Ok(canvas)
        })
    }
}
