//! File and byte decoding with EXIF orientation handling.

use std::io::Cursor;
use std::path::Path;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageError, ImageReader};

use super::{DecodeError, Orientation, PixelBuffer};

/// Decode an image from bytes, applying EXIF orientation correction.
///
/// The format is guessed from the content. Anything the `image` crate was
/// built with (PNG, JPEG, BMP, GIF) is accepted; GIFs yield their first frame.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the format is not recognized,
/// `DecodeError::CorruptedFile` if decoding fails part way, and
/// `DecodeError::EmptyImage` if the image has no pixels.
pub fn decode_bytes(bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    let orientation = extract_orientation(bytes);

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let img = reader.decode().map_err(map_image_error)?;
    let oriented = apply_orientation(img, orientation);

    let buffer = PixelBuffer::from_rgb_image(oriented.into_rgb8());
    if buffer.is_empty() {
        return Err(DecodeError::EmptyImage {
            width: buffer.width,
            height: buffer.height,
        });
    }
    Ok(buffer)
}

/// Read and decode an image file.
///
/// The loader is not retried; the first failure is returned to the caller.
pub fn decode_file(path: impl AsRef<Path>) -> Result<PixelBuffer, DecodeError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|e| DecodeError::IoError(format!("{}: {}", path.display(), e)))?;
    decode_bytes(&bytes)
}

/// Extract EXIF orientation value from image bytes (for external use).
pub fn get_orientation(bytes: &[u8]) -> Orientation {
    extract_orientation(bytes)
}

fn map_image_error(err: ImageError) -> DecodeError {
    match err {
        ImageError::Unsupported(_) => DecodeError::InvalidFormat,
        ImageError::IoError(e) => DecodeError::IoError(e.to_string()),
        other => DecodeError::CorruptedFile(other.to_string()),
    }
}

/// Returns `Orientation::Normal` if no EXIF data is found.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    let Ok(exif) = Reader::new().read_from_container(&mut cursor) else {
        return Orientation::Normal;
    };

    exif.get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .map(Orientation::from)
        .unwrap_or_default()
}

fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};

    fn encoded(img: &RgbImage, format: ImageFormat) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    fn two_pixel_image() -> RgbImage {
        RgbImage::from_raw(2, 1, vec![255, 0, 0, 0, 255, 0]).unwrap()
    }

    #[test]
    fn test_decode_png_bytes() {
        let bytes = encoded(&two_pixel_image(), ImageFormat::Png);
        let img = decode_bytes(&bytes).unwrap();

        assert_eq!((img.width, img.height), (2, 1));
        assert_eq!(img.pixels, vec![255, 0, 0, 0, 255, 0]);
    }

    #[test]
    fn test_decode_bmp_bytes() {
        let bytes = encoded(&two_pixel_image(), ImageFormat::Bmp);
        let img = decode_bytes(&bytes).unwrap();
        assert_eq!(img.pixel(1, 0), Some([0, 255, 0]));
    }

    #[test]
    fn test_decode_jpeg_bytes() {
        let src = RgbImage::from_pixel(16, 8, image::Rgb([120, 120, 120]));
        let bytes = encoded(&src, ImageFormat::Jpeg);
        let img = decode_bytes(&bytes).unwrap();
        assert_eq!((img.width, img.height), (16, 8));
    }

    #[test]
    fn test_decode_garbage_is_invalid_format() {
        let result = decode_bytes(&[0x00, 0x01, 0x02, 0x03]);
        assert!(matches!(result, Err(DecodeError::InvalidFormat)));
    }

    #[test]
    fn test_decode_empty_bytes() {
        assert!(decode_bytes(&[]).is_err());
    }

    #[test]
    fn test_decode_truncated_png() {
        let bytes = encoded(&two_pixel_image(), ImageFormat::Png);
        let result = decode_bytes(&bytes[..bytes.len() / 2]);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = decode_file(dir.path().join("missing.png"));
        assert!(matches!(result, Err(DecodeError::IoError(_))));
    }

    #[test]
    fn test_decode_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.png");
        two_pixel_image().save(&path).unwrap();

        let img = decode_file(&path).unwrap();
        assert_eq!(img.pixel(0, 0), Some([255, 0, 0]));
    }

    #[test]
    fn test_orientation_extraction_no_exif() {
        let bytes = encoded(&two_pixel_image(), ImageFormat::Png);
        assert_eq!(get_orientation(&bytes), Orientation::Normal);
        assert_eq!(get_orientation(&[0x00, 0x01, 0x02]), Orientation::Normal);
    }

    #[test]
    fn test_apply_orientation_rotate90() {
        let img = DynamicImage::ImageRgb8(two_pixel_image());
        let rotated = apply_orientation(img, Orientation::Rotate90CW).into_rgb8();
        assert_eq!(rotated.dimensions(), (1, 2));
    }

    #[test]
    fn test_apply_orientation_flip_horizontal() {
        let img = DynamicImage::ImageRgb8(two_pixel_image());
        let flipped = apply_orientation(img, Orientation::FlipHorizontal).into_rgb8();

        assert_eq!(flipped.get_pixel(0, 0).0, [0, 255, 0]);
        assert_eq!(flipped.get_pixel(1, 0).0, [255, 0, 0]);
    }
}
