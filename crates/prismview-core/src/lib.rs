//! Prismview Core - Image display and transform engine
//!
//! This crate provides the pixel pipeline behind the prismview photo viewer:
//! geometric transforms, color adjustments, mirror layouts, viewport fitting,
//! and saving with metadata preservation. Windowing, timers and scroll
//! containers are supplied by the host through the traits in [`host`].

pub mod codec;
pub mod color;
pub mod compose;
pub mod decode;
pub mod encode;
pub mod feedback;
pub mod host;
pub mod metadata;
pub mod pipeline;
pub mod settings;
pub mod transform;
pub mod zoom;

pub use codec::{ImageCodec, StdCodec};
pub use compose::{composite, MirrorLayout};
pub use decode::{Orientation, PixelBuffer, PixelFormat};
pub use metadata::{ExifMetadata, MetadataService};
pub use pipeline::{ImagePipeline, LoadOutcome, SaveError, SaveReport};
pub use settings::{RenderConfig, ViewerSettings};
pub use transform::{apply_transform, InterpolationFilter};
pub use zoom::{FitMode, FitOutcome, Size, ZoomFitPlanner, ZoomPolicy};

use serde::{Deserialize, Serialize};

/// Per-channel on/off flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMask {
    pub red: bool,
    pub green: bool,
    pub blue: bool,
}

impl ChannelMask {
    pub const fn all() -> Self {
        Self {
            red: true,
            green: true,
            blue: true,
        }
    }

    pub const fn none() -> Self {
        Self {
            red: false,
            green: false,
            blue: false,
        }
    }

    /// Check if at least one channel is set
    pub fn any(&self) -> bool {
        self.red || self.green || self.blue
    }
}

/// Per-channel gain in percent (0 = unchanged, -100 = channel off)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelGain {
    pub red: i32,
    pub green: i32,
    pub blue: i32,
}

/// Color adjustment settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorState {
    /// Hue offset, or absolute hue when `colorize` is set (0 to 255, wraps)
    pub hue: u8,
    /// Saturation scale in percent (100 = unchanged)
    pub saturation: u32,
    /// Lightness scale in percent (100 = unchanged)
    pub lightness: u32,
    /// Channels that take the adjusted value; others keep their input
    pub channels: ChannelMask,
    /// Channels inverted before any other step
    pub negate: ChannelMask,
    /// Per-channel gain
    pub gain: ChannelGain,
    /// Contrast in hundredths of a radian (78 ≈ π/4 = neutral)
    pub contrast: i32,
    /// Brightness in percent (100 = neutral)
    pub brightness: i32,
    /// Replace the hue instead of rotating it
    pub colorize: bool,
}

impl Default for ColorState {
    fn default() -> Self {
        Self {
            hue: 0,
            saturation: 100,
            lightness: 100,
            channels: ChannelMask::all(),
            negate: ChannelMask::none(),
            gain: ChannelGain::default(),
            contrast: 78,
            brightness: 100,
            colorize: false,
        }
    }
}

impl ColorState {
    /// Create a new ColorState with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if all values are at their defaults
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Contrast as the angle fed to the contrast table
    pub fn contrast_unit(&self) -> f64 {
        self.contrast as f64 / 100.0
    }

    /// Brightness as the exponent divisor fed to the brightness table
    pub fn brightness_unit(&self) -> f64 {
        self.brightness as f64 / 100.0
    }
}

/// Crop margins.
///
/// `left`/`top` offset the kept region from the top-left corner and
/// `width`/`height` trim the right and bottom edges. Pixel and percentage
/// margins add up; see [`transform::crop_rect`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropState {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
    /// Percentage margins (0 to 100, larger values are clamped)
    pub left_pct: u32,
    pub top_pct: u32,
    pub width_pct: u32,
    pub height_pct: u32,
}

impl CropState {
    /// Check if any pixel margin is set
    pub fn has_absolute(&self) -> bool {
        self.left != 0 || self.top != 0 || self.width != 0 || self.height != 0
    }

    /// Check if any percentage margin is set
    pub fn has_percent(&self) -> bool {
        self.left_pct != 0 || self.top_pct != 0 || self.width_pct != 0 || self.height_pct != 0
    }

    /// Check if no crop is configured
    pub fn is_empty(&self) -> bool {
        !self.has_absolute() && !self.has_percent()
    }

    pub fn clear_absolute(&mut self) {
        self.left = 0;
        self.top = 0;
        self.width = 0;
        self.height = 0;
    }

    pub fn clear_percent(&mut self) {
        self.left_pct = 0;
        self.top_pct = 0;
        self.width_pct = 0;
        self.height_pct = 0;
    }

    /// Convert a rubber-band selection into pixel margins.
    ///
    /// # Arguments
    ///
    /// * `image` - Size of the buffer the crop will apply to
    /// * `display` - Size the buffer is shown at
    /// * `top_left` - Selection corner in display coordinates
    /// * `bottom_right` - Opposite selection corner in display coordinates
    ///
    /// Corners outside the picture are clamped to its edges.
    pub fn from_selection(
        image: Size,
        display: Size,
        top_left: (i32, i32),
        bottom_right: (i32, i32),
    ) -> Self {
        if display.is_empty() {
            return Self::default();
        }

        let sx = image.width as f64 / display.width as f64;
        let sy = image.height as f64 / display.height as f64;
        let to_image = |v: i32, scale: f64, limit: u32| {
            ((v as f64 * scale) as i64).clamp(0, limit as i64) as u32
        };

        let x0 = to_image(top_left.0, sx, image.width);
        let y0 = to_image(top_left.1, sy, image.height);
        let x1 = to_image(bottom_right.0, sx, image.width);
        let y1 = to_image(bottom_right.1, sy, image.height);

        Self {
            left: x0,
            top: y0,
            width: image.width - x1,
            height: image.height - y1,
            ..Default::default()
        }
    }
}

/// Geometric transform settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformState {
    /// Rotation in degrees, positive = clockwise
    pub rotation: f64,
    pub flip_h: bool,
    pub flip_v: bool,
    pub crop: CropState,
}

impl TransformState {
    /// Check if applying this state would leave the image untouched
    pub fn is_identity(&self) -> bool {
        transform::is_identity_angle(self.rotation)
            && !self.flip_h
            && !self.flip_v
            && self.crop.is_empty()
    }
}
