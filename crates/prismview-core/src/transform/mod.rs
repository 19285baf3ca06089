//! Geometric operations: rotation, mirroring, cropping and EXIF orientation.
//!
//! # Transform Order
//!
//! [`apply_transform`] always runs the user transforms in this order:
//! 1. Rotation
//! 2. Mirror (horizontal, vertical)
//! 3. Crop
//!
//! EXIF orientation is corrected once at load time, before any of these.
//!
//! # Coordinate System
//!
//! - Rotation angles are in degrees, positive = clockwise
//! - Crop margins are pixels and/or percent of the current size
//! - Origin is top-left corner

mod crop;
mod flip;
mod orientation;
mod resize;
mod rotation;

use image::DynamicImage;
use thiserror::Error;

use crate::decode::PixelBuffer;
use crate::TransformState;

pub use crop::{crop, crop_rect, CropRect};
pub use flip::mirror;
pub use orientation::{apply_exif_orientation, apply_orientation};
pub use resize::{resize_exact, resize_to_fit};
pub use rotation::{compute_rotated_bounds, is_identity_angle, rotate, InterpolationFilter};

/// Errors from size-changing operations.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Width or height of the requested size is zero
    #[error("Invalid target size {width}x{height}")]
    InvalidTargetSize { width: u32, height: u32 },

    /// The source buffer holds no pixels
    #[error("Cannot resize an empty image")]
    EmptySource,
}

/// Run `f` on an `image` view of the buffer. Buffers whose pixel data does
/// not match their dimensions are returned unchanged.
pub(crate) fn with_dynamic(
    buffer: &PixelBuffer,
    f: impl FnOnce(DynamicImage) -> DynamicImage,
) -> PixelBuffer {
    match buffer.to_dynamic() {
        Some(img) => PixelBuffer::from_dynamic(f(img)),
        None => {
            tracing::warn!(
                width = buffer.width,
                height = buffer.height,
                len = buffer.pixels.len(),
                "Pixel data does not match dimensions"
            );
            buffer.clone()
        }
    }
}

/// Apply rotation, mirroring and crop from `state`, in that order.
pub fn apply_transform(
    buffer: &PixelBuffer,
    state: &TransformState,
    filter: InterpolationFilter,
) -> PixelBuffer {
    if state.is_identity() {
        return buffer.clone();
    }

    let rotated = rotate(buffer, state.rotation, filter);
    let mirrored = mirror(&rotated, state.flip_h, state.flip_v);
    let cropped = crop(&mirrored, &state.crop);

    tracing::debug!(
        rotation = state.rotation,
        flip_h = state.flip_h,
        flip_v = state.flip_v,
        from_width = buffer.width,
        from_height = buffer.height,
        width = cropped.width,
        height = cropped.height,
        "Applied transform"
    );
    cropped
}
