//! Image encoding for save.
//!
//! The output format follows the target file's extension, so saving keeps
//! whatever format the image was loaded from unless the caller picks
//! another extension.
//!
//! # Examples
//!
//! ```ignore
//! use easel_core::encode::{default_save_path, encode_file};
//!
//! let target = default_save_path("holiday.jpg");
//! encode_file(&buffer, &target, 95)?;
//! ```

mod file;

pub use file::{default_save_path, encode_file, encode_jpeg, EncodeError, SaveFormat};
