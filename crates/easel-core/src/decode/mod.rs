//! Image decoding for the edit pipeline.
//!
//! This module provides:
//! - Decoding PNG, JPEG, BMP and GIF from bytes or files
//! - EXIF orientation correction
//! - The [`PixelBuffer`] type every other module works on
//!
//! # Examples
//!
//! ```ignore
//! use easel_core::decode::decode_file;
//!
//! let image = decode_file("photo.jpg")?;
//! println!("Decoded {}x{} image", image.width, image.height);
//! ```

mod file;
mod types;

pub use file::{decode_bytes, decode_file, get_orientation};
pub use types::{DecodeError, FilterType, Orientation, PixelBuffer};
