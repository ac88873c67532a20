//! Easel Core - preview-synchronised photo edit pipeline
//!
//! This crate keeps a down-scaled on-screen preview in sync with a
//! full-resolution working buffer across a chain of edits: crop, freehand
//! drawing, text, filters, blur, brightness, rotate and flip. Each edit is
//! previewed first and only becomes part of the image on commit.

pub mod config;
pub mod decode;
pub mod encode;
pub mod gesture;
pub mod intent;
pub mod ops;
pub mod selection;
pub mod session;
pub mod tool;
pub mod view;

pub use config::{ConfigError, EditorConfig, TransformSource};
pub use decode::{decode_bytes, decode_file, DecodeError, FilterType, PixelBuffer};
pub use encode::{default_save_path, encode_file, EncodeError, SaveFormat};
pub use gesture::{Drag, Gesture, GesturePhase};
pub use intent::{AdjustKind, EditIntent, FilterKind};
pub use ops::TransformError;
pub use selection::{normalize_selection, SelectionRect};
pub use session::{
    EditSession, LatestFrame, NullPresenter, Presenter, PreviewKind, SessionError, SessionState,
    SourceBuffer,
};
pub use tool::{PointerTool, Tool};
pub use view::{compute_display_size, Point, PreviewBox, SourcePoint, ViewTransform};

/// Stroke and text color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const RED: Color = Color::new(255, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_rgb(self) -> image::Rgb<u8> {
        image::Rgb([self.r, self.g, self.b])
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::RED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_default_is_red() {
        assert_eq!(Color::default(), Color::new(255, 0, 0));
        assert_eq!(Color::default().to_rgb(), image::Rgb([255, 0, 0]));
    }

    #[test]
    fn test_color_from_json() {
        let color: Color = serde_json::from_str(r#"{"r": 1, "g": 2, "b": 3}"#).unwrap();
        assert_eq!(color, Color::new(1, 2, 3));
    }
}
