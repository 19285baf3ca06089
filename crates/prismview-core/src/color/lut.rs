//! Per-intensity remap tables for contrast and brightness.

// ============================================================================
// LUT Type
// ============================================================================

/// Pre-computed 256-entry lookup table applied to each color channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelLut {
    /// LUT values: lut[input] = output
    pub lut: [u8; 256],
}

impl ChannelLut {
    /// Contrast curve for a unit value in radians. See [`build_contrast_table`].
    pub fn contrast(unit: f64) -> Self {
        Self {
            lut: build_contrast_table(unit),
        }
    }

    /// Gamma-style brightness curve. See [`build_brightness_table`].
    pub fn brightness(unit: f64) -> Self {
        Self {
            lut: build_brightness_table(unit),
        }
    }

    /// Create identity LUT (no change).
    pub fn identity() -> Self {
        let mut lut = [0u8; 256];
        for (i, lut_value) in lut.iter_mut().enumerate() {
            *lut_value = i as u8;
        }
        Self { lut }
    }

    #[inline]
    pub fn apply(&self, value: u8) -> u8 {
        self.lut[value as usize]
    }

    /// Largest distance of any entry from the identity mapping.
    pub fn max_deviation(&self) -> u8 {
        self.lut
            .iter()
            .enumerate()
            .map(|(i, &v)| (i as u8).abs_diff(v))
            .max()
            .unwrap_or(0)
    }
}

impl Default for ChannelLut {
    fn default() -> Self {
        Self::identity()
    }
}

/// Build the contrast remap `i -> (i - 128) / tan(unit) + 128`.
///
/// The linear part only holds inside the cone
/// `(128 - 128·tan(unit), 128 + 128·tan(unit))`; intensities at or above the
/// upper bound saturate to 255 and the rest to 0. `unit = π/4` is the
/// identity; smaller units steepen the curve, larger ones flatten it.
pub fn build_contrast_table(unit: f64) -> [u8; 256] {
    let slope = unit.tan();
    let upper = (128.0 + 128.0 * slope) as i32;
    let lower = (128.0 - 128.0 * slope) as i32;

    let mut lut = [0u8; 256];
    for (i, lut_value) in lut.iter_mut().enumerate() {
        let i = i as i32;
        *lut_value = if i < upper && i > lower {
            (((i - 128) as f64 / slope + 128.0) as i32).clamp(0, 255) as u8
        } else if i >= upper {
            255
        } else {
            0
        };
    }
    lut
}

/// Build the brightness remap `i -> 255 · (i / 255)^(1 / unit)`, rounded and
/// capped at 255. `unit = 1` is the identity; larger units brighten.
pub fn build_brightness_table(unit: f64) -> [u8; 256] {
    let exponent = 1.0 / unit;
    let mut lut = [0u8; 256];
    for (i, lut_value) in lut.iter_mut().enumerate() {
        let v = 255.0 * (i as f64 / 255.0).powf(exponent) + 0.5;
        *lut_value = v.clamp(0.0, 255.0) as u8;
    }
    lut
}


// ============================================================================
// Property-Based Tests
// ============================================================================
