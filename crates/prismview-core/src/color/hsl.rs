//! 8-bit RGB ↔ HSL conversion.
//!
//! All three HSL components live in 0..=255. A full hue turn is 255 units,
//! so one sixth of the wheel is 42.5.

/// One sixth of the 255-unit hue wheel.
const HUE_SEXTANT: f64 = 42.5;

/// Hue offset between the red, green and blue sample points (a third of a turn).
const HUE_THIRD: f64 = 85.0;

#[inline]
fn round_half_up(x: f64) -> u8 {
    (x + 0.5).clamp(0.0, 255.0) as u8
}

/// Convert an RGB triple to (hue, saturation, lightness).
///
/// Saturation uses the `l < 128` branch split so both halves divide by the
/// distance to the nearer extreme.
pub fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);

    let l = (max + min) as f64 / 2.0;

    if max == min {
        return (0, 0, round_half_up(l));
    }

    let delta = (max - min) as f64;
    let s = if l < 128.0 {
        255.0 * delta / (max + min) as f64
    } else {
        255.0 * delta / (511 - max - min) as f64
    };

    let mut h = if r == max {
        (g - b) as f64 / delta
    } else if g == max {
        2.0 + (b - r) as f64 / delta
    } else {
        4.0 + (r - g) as f64 / delta
    };

    h *= HUE_SEXTANT;
    if h < 0.0 {
        h += 255.0;
    } else if h > 255.0 {
        h -= 255.0;
    }

    (round_half_up(h), round_half_up(s), round_half_up(l))
}

/// Sample the piecewise-linear hue ramp between the two working levels.
#[inline]
fn hue_ramp(m1: f64, m2: f64, hue: f64) -> u8 {
    let hue = if hue > 255.0 {
        hue - 255.0
    } else if hue < 0.0 {
        hue + 255.0
    } else {
        hue
    };

    let value = if hue < HUE_SEXTANT {
        m1 + (m2 - m1) * (hue / HUE_SEXTANT)
    } else if hue < 127.5 {
        m2
    } else if hue < 170.0 {
        m1 + (m2 - m1) * ((170.0 - hue) / HUE_SEXTANT)
    } else {
        m1
    };

    round_half_up(value * 255.0)
}

/// Convert (hue, saturation, lightness) back to RGB.
pub fn hsl_to_rgb(h: u8, s: u8, l: u8) -> (u8, u8, u8) {
    if s == 0 {
        return (l, l, l);
    }

    let (h, s, l) = (h as f64, s as f64, l as f64);
    let m2 = if l < 128.0 {
        (l * (255.0 + s)) / 65025.0
    } else {
        (l + s - (l * s) / 255.0) / 255.0
    };
    let m1 = (l / 127.5) - m2;

    (
        hue_ramp(m1, m2, h + HUE_THIRD),
        hue_ramp(m1, m2, h),
        hue_ramp(m1, m2, h - HUE_THIRD),
    )
}


// ============================================================================
// Property-Based Tests
// ============================================================================
