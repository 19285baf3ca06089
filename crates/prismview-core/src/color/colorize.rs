//! Per-pixel color adjustment pass.
//!
//! ## Order
//! 1. Channel negation
//! 2. Channel gain
//! 3. Brightness table
//! 4. Contrast table
//! 5. Hue (offset or replace), saturation and lightness in HSL
//! 6. Channel enable mask (disabled channels keep their input value)
//!
//! Alpha is never touched.

use super::{hsl_to_rgb, rgb_to_hsl, ChannelLut};
use crate::decode::PixelBuffer;
use crate::ColorState;

/// Apply `state` to every pixel of `buffer` in place.
///
/// # Example
/// ```
/// use prismview_core::{color::colorize, ColorState};
/// use prismview_core::decode::{PixelBuffer, PixelFormat};
///
/// let mut img = PixelBuffer::new(1, 1, PixelFormat::Rgb8, vec![255, 0, 0]);
/// let mut state = ColorState::default();
/// state.saturation = 0;
/// colorize(&mut img, &state);
/// assert_eq!(img.pixels, vec![128, 128, 128]);
/// ```
pub fn colorize(buffer: &mut PixelBuffer, state: &ColorState) {
    // Every output channel would fall back to its input
    if !state.channels.any() {
        return;
    }

    let brightness = ChannelLut::brightness(state.brightness_unit());
    let contrast = ChannelLut::contrast(state.contrast_unit());
    let stride = buffer.format.channels();

    for px in buffer.pixels.chunks_exact_mut(stride) {
        let (r, g, b) = colorize_pixel(px[0], px[1], px[2], state, &brightness, &contrast);
        px[0] = r;
        px[1] = g;
        px[2] = b;
    }
}

#[inline]
fn colorize_pixel(
    r: u8,
    g: u8,
    b: u8,
    state: &ColorState,
    brightness: &ChannelLut,
    contrast: &ChannelLut,
) -> (u8, u8, u8) {
    let tone = |v: u8, negate: bool, gain: i32| {
        let v = if negate { 255 - v } else { v };
        let v = apply_gain(v, gain);
        contrast.apply(brightness.apply(v))
    };

    let tr = tone(r, state.negate.red, state.gain.red);
    let tg = tone(g, state.negate.green, state.gain.green);
    let tb = tone(b, state.negate.blue, state.gain.blue);

    let (h, s, l) = rgb_to_hsl(tr, tg, tb);
    let h = shift_hue(h, state);
    let s = scale_percent(s, state.saturation);
    let l = scale_percent(l, state.lightness);
    let (hr, hg, hb) = hsl_to_rgb(h, s, l);

    (
        if state.channels.red { hr } else { r },
        if state.channels.green { hg } else { g },
        if state.channels.blue { hb } else { b },
    )
}

/// Scale by `(gain + 100) / 100` with integer division, clamped to 0..=255.
#[inline]
fn apply_gain(v: u8, gain: i32) -> u8 {
    if gain == 0 {
        return v;
    }
    ((v as i64 * (gain as i64 + 100)) / 100).clamp(0, 255) as u8
}

/// Replace the hue when colorizing, otherwise rotate it; both on the 8-bit wheel.
#[inline]
fn shift_hue(h: u8, state: &ColorState) -> u8 {
    if state.colorize {
        state.hue
    } else {
        h.wrapping_add(state.hue)
    }
}

#[inline]
fn scale_percent(v: u8, percent: u32) -> u8 {
    ((v as u64 * percent as u64) / 100).min(255) as u8
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::decode::PixelFormat;
    use crate::ChannelMask;
    use proptest::prelude::*;

    proptest! {
        /// Property: With every channel disabled the buffer is untouched.
        #[test]
        fn prop_disabled_channels_identity(
            pixels in prop::collection::vec(any::<u8>(), 48..=48),
            hue: u8,
            saturation in 0u32..=300,
            negate: bool,
        ) {
            let mut state = ColorState::default();
            state.channels = ChannelMask::none();
            state.hue = hue;
            state.saturation = saturation;
            state.negate = if negate { ChannelMask::all() } else { ChannelMask::none() };

            let mut img = PixelBuffer::new(4, 4, PixelFormat::Rgb8, pixels.clone());
            colorize(&mut img, &state);
            prop_assert_eq!(img.pixels, pixels);
        }

        /// Property: Alpha bytes never change.
        #[test]
        fn prop_alpha_untouched(
            pixels in prop::collection::vec(any::<u8>(), 64..=64),
            hue: u8,
            colorize_flag: bool,
        ) {
            let mut state = ColorState::default();
            state.hue = hue;
            state.colorize = colorize_flag;

            let mut img = PixelBuffer::new(4, 4, PixelFormat::Rgba8, pixels.clone());
            colorize(&mut img, &state);
            for (before, after) in pixels.chunks_exact(4).zip(img.pixels.chunks_exact(4)) {
                prop_assert_eq!(before[3], after[3]);
            }
        }
    }
}
