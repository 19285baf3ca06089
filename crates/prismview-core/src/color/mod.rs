//! Color adjustments for the viewer.
//!
//! This module provides functionality for:
//! - RGB ↔ HSL conversion on the 8-bit wheel
//! - Contrast and brightness lookup tables
//! - The per-pixel [`colorize`] pass driven by [`ColorState`](crate::ColorState)

mod colorize;
mod hsl;
mod lut;

pub use colorize::colorize;
pub use hsl::{hsl_to_rgb, rgb_to_hsl};
pub use lut::{build_brightness_table, build_contrast_table, ChannelLut};
