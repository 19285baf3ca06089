//! Image encoding and persistence for prismview.
//!
//! This module provides functionality for:
//! - Encoding buffers to any enabled `image` format, JPEG with quality control
//! - Embedding the source EXIF block in JPEG, PNG and WebP output
//! - Replacing files atomically so a failed save leaves the destination intact
//!
//! # Examples
//!
//! ```ignore
//! use prismview_core::encode::save_buffer;
//!
//! save_buffer(&buffer, Path::new("out.jpg"), ImageFormat::Jpeg, 90, block.exif())?;
//! ```

mod file;

pub use file::{
    encode_to_vec, encode_with_exif, format_for_path, save_buffer, write_atomically, EncodeError,
    Encoded, ExifEmbed,
};
