//! Image cropping with margin-based parameters.
//!
//! A [`CropState`] describes how much to trim from each edge, not the kept
//! region: `left`/`top` are offsets from the top-left corner and
//! `width`/`height` are the margins removed from the right and bottom.
//! Each margin may be given in pixels, in percent of the current image size,
//! or both, in which case the two are added.
//!
//! # Example
//!
//! ```ignore
//! // Trim 10% from every edge
//! let crop = CropState { left_pct: 10, top_pct: 10, width_pct: 10, height_pct: 10, ..Default::default() };
//! let cropped = crop(&image, &crop);
//! ```

use crate::decode::PixelBuffer;
use crate::CropState;

/// A resolved crop region in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    /// Returns true if the region keeps no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[inline]
fn percent_of(dim: u32, pct: u32) -> i64 {
    (dim as i64 * pct.min(100) as i64) / 100
}

/// Resolve `crop` against an image of `width` x `height` pixels.
///
/// Returns `None` when no crop is configured. When any absolute margin is
/// set, the rect combines pixel and percentage margins; otherwise it uses
/// the percentage margins alone. A rect whose margins meet or overlap comes
/// back with zero width or height.
///
/// # Example
///
/// ```
/// use prismview_core::transform::crop_rect;
/// use prismview_core::CropState;
///
/// let crop = CropState { left: 5, left_pct: 10, ..Default::default() };
/// let rect = crop_rect(100, 50, &crop).unwrap();
/// assert_eq!((rect.x, rect.width), (15, 85));
/// ```
pub fn crop_rect(width: u32, height: u32, crop: &CropState) -> Option<CropRect> {
    let (w, h) = (width as i64, height as i64);

    let lp = percent_of(width, crop.left_pct);
    let tp = percent_of(height, crop.top_pct);
    let wp = percent_of(width, crop.width_pct);
    let hp = percent_of(height, crop.height_pct);

    let (x, y, cw, ch) = if crop.has_absolute() {
        let (left, top) = (crop.left as i64, crop.top as i64);
        (
            left + lp,
            top + tp,
            w - left - crop.width as i64 - lp - wp,
            h - top - crop.height as i64 - tp - hp,
        )
    } else if crop.has_percent() {
        (lp, tp, w - lp - wp, h - tp - hp)
    } else {
        return None;
    };

    let x = x.clamp(0, w);
    let y = y.clamp(0, h);
    Some(CropRect {
        x: x as u32,
        y: y as u32,
        width: cw.clamp(0, w - x) as u32,
        height: ch.clamp(0, h - y) as u32,
    })
}

/// Apply `crop` to `buffer`.
///
/// No configured crop returns a copy of the input. A degenerate region
/// returns an empty 0x0 buffer of the same pixel format.
pub fn crop(buffer: &PixelBuffer, crop: &CropState) -> PixelBuffer {
    let Some(rect) = crop_rect(buffer.width, buffer.height, crop) else {
        return buffer.clone();
    };

    if rect.is_empty() {
        tracing::debug!(
            width = buffer.width,
            height = buffer.height,
            "Crop margins leave no pixels"
        );
        return PixelBuffer::blank(0, 0, buffer.format);
    }

    extract(buffer, rect)
}

/// Copy the pixels of `rect`, row by row.
pub(crate) fn extract(buffer: &PixelBuffer, rect: CropRect) -> PixelBuffer {
    let c = buffer.format.channels();
    let src_stride = buffer.stride();
    let row_len = rect.width as usize * c;

    let mut output = Vec::with_capacity(row_len * rect.height as usize);
    for y in rect.y..rect.y + rect.height {
        let start = y as usize * src_stride + rect.x as usize * c;
        output.extend_from_slice(&buffer.pixels[start..start + row_len]);
    }

    PixelBuffer::new(rect.width, rect.height, buffer.format, output)
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: The resolved rect always lies inside the image.
        #[test]
        fn prop_rect_within_bounds(
            width in 1u32..500,
            height in 1u32..500,
            left in 0u32..600,
            top in 0u32..600,
            right in 0u32..600,
            bottom in 0u32..600,
            left_pct in 0u32..150,
            width_pct in 0u32..150,
        ) {
            let state = CropState {
                left,
                top,
                width: right,
                height: bottom,
                left_pct,
                top_pct: 0,
                width_pct,
                height_pct: 0,
            };
            if let Some(rect) = crop_rect(width, height, &state) {
                prop_assert!(rect.x as u64 + rect.width as u64 <= width as u64);
                prop_assert!(rect.y as u64 + rect.height as u64 <= height as u64);
            }
        }

        /// Property: Cropped output dimensions match the resolved rect.
        #[test]
        fn prop_output_matches_rect(
            width in 1u32..40,
            height in 1u32..40,
            left in 0u32..20,
            bottom in 0u32..20,
            top_pct in 0u32..60,
        ) {
            let img = PixelBuffer::blank(width, height, crate::decode::PixelFormat::Rgb8);
            let state = CropState { left, height: bottom, top_pct, ..Default::default() };
            let out = crop(&img, &state);
            match crop_rect(width, height, &state) {
                None => prop_assert_eq!(&out, &img),
                Some(rect) if rect.is_empty() => prop_assert!(out.is_empty()),
                Some(rect) => {
                    prop_assert_eq!((out.width, out.height), (rect.width, rect.height));
                    prop_assert_eq!(out.pixels.len(), out.pixel_count() * 3);
                }
            }
        }
    }
}
