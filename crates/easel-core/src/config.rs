//! Editor settings.
//!
//! Every field has a default, so an empty or partial TOML file is valid:
//!
//! ```toml
//! jpeg_quality = 90
//! transform_source = "original"
//!
//! [preview]
//! max_width = 300
//! max_height = 400
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::FilterType;
use crate::view::PreviewBox;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Which buffer source-reading filters start from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformSource {
    /// Every transform reads the last committed edit.
    #[default]
    Committed,
    /// Emboss and sepia read the unedited original, ignoring committed edits.
    Original,
}

/// Settings for an editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Box the preview is fitted into.
    pub preview: PreviewBox,
    /// Resampling used for the preview.
    pub preview_filter: FilterType,
    /// Freehand stroke width in preview pixels.
    pub stroke_width: u32,
    /// Text used when a text intent carries none.
    pub default_text: String,
    /// Font scale used when a text intent carries none.
    pub default_font_scale: f32,
    /// TrueType/OpenType font for text overlay.
    pub font_path: Option<PathBuf>,
    /// System font family used when `font_path` is unset.
    pub font_family: Option<String>,
    /// JPEG quality (1-100) used on save.
    pub jpeg_quality: u8,
    /// Input buffer for emboss and sepia.
    pub transform_source: TransformSource,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            preview: PreviewBox::default(),
            preview_filter: FilterType::Bilinear,
            stroke_width: 2,
            default_text: "hello".to_string(),
            default_font_scale: 2.0,
            font_path: None,
            font_family: None,
            jpeg_quality: 95,
            transform_source: TransformSource::Committed,
        }
    }
}

impl EditorConfig {
    /// Parse and validate TOML.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Reject settings the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.preview.max_width == 0 || self.preview.max_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "preview box {}x{} has a zero side",
                self.preview.max_width, self.preview.max_height
            )));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::Invalid(format!(
                "jpeg_quality {} outside 1..=100",
                self.jpeg_quality
            )));
        }
        if self.stroke_width == 0 {
            return Err(ConfigError::Invalid("stroke_width must be at least 1".to_string()));
        }
        if self.default_font_scale.is_nan() || self.default_font_scale <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "default_font_scale {} must be positive",
                self.default_font_scale
            )));
        }
        Ok(())
    }
}
