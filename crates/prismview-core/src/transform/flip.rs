//! Mirroring across the vertical and horizontal axes.

use super::with_dynamic;
use crate::decode::PixelBuffer;

/// Reflect `buffer` left-right when `flip_h` is set and top-bottom when
/// `flip_v` is set. With neither flag the input is returned unchanged.
pub fn mirror(buffer: &PixelBuffer, flip_h: bool, flip_v: bool) -> PixelBuffer {
    match (flip_h, flip_v) {
        (false, false) => buffer.clone(),
        (true, false) => with_dynamic(buffer, |img| img.fliph()),
        (false, true) => with_dynamic(buffer, |img| img.flipv()),
        // Both reflections together are a half turn
        (true, true) => with_dynamic(buffer, |img| img.rotate180()),
    }
}
