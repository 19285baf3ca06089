//! Image decoding for prismview.
//!
//! This module provides functionality for:
//! - The shared `PixelBuffer` type every pipeline stage consumes and produces
//! - Decoding still images from files or bytes (`image` crate backed)
//! - Probing GIF/WebP/APNG streams for animation frames
//!
//! Decoding never applies EXIF orientation; see
//! [`crate::transform::apply_exif_orientation`].

mod file;
mod types;

pub use file::{decode_bytes, decode_file, probe_animation, ANIMATION_PROBE_FRAMES};
pub use types::{
    AnimationInfo, DecodeError, DecodedImage, FilterType, Orientation, PixelBuffer, PixelFormat,
    PLACEHOLDER_SIZE,
};
