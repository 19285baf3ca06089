//! Resizing for scaled-size requests and icon thumbnails.
//!
//! Provides resize operations using the `image` crate's algorithms.
//! All functions return new buffers without modifying the input.

use super::{with_dynamic, TransformError};
use crate::decode::{FilterType, PixelBuffer};

/// Resize an image to exact dimensions, ignoring aspect ratio.
///
/// # Arguments
///
/// * `buffer` - The source image to resize
/// * `width` - Target width in pixels
/// * `height` - Target height in pixels
/// * `filter` - Interpolation filter to use
///
/// # Errors
///
/// Returns `TransformError::InvalidTargetSize` for a zero target dimension.
pub fn resize_exact(
    buffer: &PixelBuffer,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<PixelBuffer, TransformError> {
    if width == 0 || height == 0 {
        return Err(TransformError::InvalidTargetSize { width, height });
    }

    // Fast path: if dimensions match, just clone
    if buffer.width == width && buffer.height == height {
        return Ok(buffer.clone());
    }

    if buffer.is_empty() {
        return Err(TransformError::EmptySource);
    }

    Ok(with_dynamic(buffer, |img| {
        img.resize_exact(width, height, filter.to_image_filter())
    }))
}

/// Resize an image so its longest edge is at most `max_edge`, keeping the
/// aspect ratio. Images that already fit are returned unchanged.
///
/// # Errors
///
/// Returns `TransformError::InvalidTargetSize` when `max_edge` is zero.
pub fn resize_to_fit(
    buffer: &PixelBuffer,
    max_edge: u32,
    filter: FilterType,
) -> Result<PixelBuffer, TransformError> {
    if max_edge == 0 {
        return Err(TransformError::InvalidTargetSize {
            width: 0,
            height: 0,
        });
    }

    if buffer.width <= max_edge && buffer.height <= max_edge {
        return Ok(buffer.clone());
    }

    let (new_width, new_height) = calculate_fit_dimensions(buffer.width, buffer.height, max_edge);
    resize_exact(buffer, new_width, new_height, filter)
}

/// Calculate dimensions to fit within max_edge while preserving aspect ratio.
fn calculate_fit_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    let ratio = width as f64 / height as f64;

    if width >= height {
        let new_height = (max_edge as f64 / ratio).round() as u32;
        (max_edge, new_height.max(1))
    } else {
        let new_width = (max_edge as f64 * ratio).round() as u32;
        (new_width.max(1), max_edge)
    }
}
