//! EXIF orientation correction.
//!
//! Maps the eight EXIF orientation codes onto lossless quarter turns and
//! mirrors so the picture displays upright.

use super::{mirror, rotate, InterpolationFilter};
use crate::decode::{Orientation, PixelBuffer};

/// Apply an EXIF orientation code. Codes outside 1..=8 are ignored.
pub fn apply_exif_orientation(buffer: &PixelBuffer, code: u32) -> PixelBuffer {
    match Orientation::from_exif(code) {
        Some(orientation) => apply_orientation(buffer, orientation),
        None => {
            tracing::debug!(code, "Ignoring unknown EXIF orientation");
            buffer.clone()
        }
    }
}

/// Apply `orientation` to `buffer`.
///
/// | Code | Operation                  |
/// |------|----------------------------|
/// | 1    | none                       |
/// | 2    | mirror horizontally        |
/// | 3    | rotate 180°                |
/// | 4    | mirror vertically          |
/// | 5    | rotate 90° CW, mirror H    |
/// | 6    | rotate 90° CW              |
/// | 7    | rotate 90° CW, mirror V    |
/// | 8    | rotate 270° CW             |
pub fn apply_orientation(buffer: &PixelBuffer, orientation: Orientation) -> PixelBuffer {
    // Quarter turns never resample, so the filter is irrelevant here
    let turn = |b: &PixelBuffer, degrees: f64| rotate(b, degrees, InterpolationFilter::Bilinear);

    match orientation {
        Orientation::Normal => buffer.clone(),
        Orientation::FlipHorizontal => mirror(buffer, true, false),
        Orientation::Rotate180 => turn(buffer, 180.0),
        Orientation::FlipVertical => mirror(buffer, false, true),
        Orientation::Transpose => mirror(&turn(buffer, 90.0), true, false),
        Orientation::Rotate90CW => turn(buffer, 90.0),
        Orientation::Transverse => mirror(&turn(buffer, 90.0), false, true),
        Orientation::Rotate270CW => turn(buffer, 270.0),
    }
}
