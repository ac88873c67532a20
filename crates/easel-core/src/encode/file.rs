//! Extension-driven encoding to disk.

use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat};
use thiserror::Error;

use crate::decode::PixelBuffer;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The target extension has no encoder
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// Encoder failed
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),

    /// Writing the file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Formats the editor can save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    Png,
    Jpeg,
    Bmp,
    Gif,
}

impl SaveFormat {
    /// Pick the format from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, EncodeError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "png" => Ok(SaveFormat::Png),
            "jpg" | "jpeg" => Ok(SaveFormat::Jpeg),
            "bmp" => Ok(SaveFormat::Bmp),
            "gif" => Ok(SaveFormat::Gif),
            other => Err(EncodeError::UnsupportedFormat(if other.is_empty() {
                path.display().to_string()
            } else {
                other.to_string()
            })),
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            SaveFormat::Png => ImageFormat::Png,
            SaveFormat::Jpeg => ImageFormat::Jpeg,
            SaveFormat::Bmp => ImageFormat::Bmp,
            SaveFormat::Gif => ImageFormat::Gif,
        }
    }
}

/// Suggested save target next to `input`, keeping its extension.
///
/// `photos/cat.jpeg` becomes `photos/cat-edited.jpeg`.
pub fn default_save_path(input: impl AsRef<Path>) -> PathBuf {
    let input = input.as_ref();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let name = match input.extension() {
        Some(ext) => format!("{stem}-edited.{}", ext.to_string_lossy()),
        None => format!("{stem}-edited"),
    };
    input.with_file_name(name)
}

/// Encode `image` to `path`, choosing the format from the extension.
///
/// `jpeg_quality` (1-100) only applies to JPEG output. Nothing is written
/// when validation fails.
pub fn encode_file(
    image: &PixelBuffer,
    path: impl AsRef<Path>,
    jpeg_quality: u8,
) -> Result<(), EncodeError> {
    let path = path.as_ref();
    let format = SaveFormat::from_path(path)?;
    validate(&image.pixels, image.width, image.height)?;

    let bytes = match format {
        SaveFormat::Jpeg => encode_jpeg(&image.pixels, image.width, image.height, jpeg_quality)?,
        other => {
            let mut buffer = Cursor::new(Vec::new());
            image::write_buffer_with_format(
                &mut buffer,
                &image.pixels,
                image.width,
                image.height,
                ExtendedColorType::Rgb8,
                other.image_format(),
            )
            .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;
            buffer.into_inner()
        }
    };

    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Encode RGB pixel data to JPEG bytes.
///
/// # Quality Guidelines
///
/// * 90-100: High quality, suitable for archival or further editing
/// * 80-90: Good quality, recommended for most uses
/// * 60-80: Medium quality, acceptable for web/social media
/// * Below 60: Low quality, visible artifacts
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    validate(pixels, width, height)?;

    // Clamp quality to valid range (1-100)
    let quality = quality.clamp(1, 100);

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    encoder
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

fn validate(pixels: &[u8], width: u32, height: u32) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected_len = (width as usize) * (height as usize) * 3;
    if pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: pixels.len(),
        });
    }
    Ok(())
}
