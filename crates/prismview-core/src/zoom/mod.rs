//! Viewport fitting.
//!
//! [`fit_size`] decides how large the rendered image is shown. Two policies
//! run one after the other:
//! 1. The zoom-in policy, for images no larger than the viewport
//! 2. The zoom-out policy, re-evaluated on the zoom-in result, for images
//!    no smaller than the viewport
//!
//! Every bound handed to the aspect-preserving scale is first multiplied by
//! the user zoom factor (truncated to whole pixels).
//!
//! [`ZoomFitPlanner`] applies the result to a [`Viewport`](crate::host::Viewport)
//! and keeps the scroll position stable across resizes.

mod planner;

use serde::{Deserialize, Serialize};

pub use planner::{pan, FitOutcome, PanDirection, ScrollPos, ZoomFitPlanner, PAN_STEP};

/// Width and height in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Check if either dimension is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Largest size with this aspect ratio that fits inside `bound`.
    ///
    /// Integer arithmetic throughout; an empty size returns `bound` as is.
    pub fn scaled_within(self, bound: Size) -> Size {
        if self.is_empty() {
            return bound;
        }

        let (w, h) = (self.width as u64, self.height as u64);
        let width_for_bound_height = bound.height as u64 * w / h;
        if width_for_bound_height <= bound.width as u64 {
            Size::new(width_for_bound_height as u32, bound.height)
        } else {
            Size::new(bound.width, (bound.width as u64 * h / w) as u32)
        }
    }

    /// Check if both dimensions fit within `other`
    pub fn fits_in(&self, other: Size) -> bool {
        self.width <= other.width && self.height <= other.height
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// How an image is fitted against the viewport
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitMode {
    /// Keep the natural size (apart from the zoom factor)
    #[default]
    Disable,
    /// Fit inside the viewport, aspect preserved
    WidthAndHeight,
    /// Match the viewport width, aspect preserved
    Width,
    /// Match the viewport height, aspect preserved
    Height,
    /// Clamp each dimension to the viewport independently, aspect ignored
    Disproportionate,
}

/// Zoom-in and zoom-out fitting rules plus the user zoom factor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomPolicy {
    /// Applied when the image is no larger than the viewport
    pub zoom_in: FitMode,
    /// Applied when the image is no smaller than the viewport
    pub zoom_out: FitMode,
    /// Multiplier applied to every fitting bound
    pub zoom_factor: f64,
    /// Keep the natural size regardless of both modes
    pub suspended: bool,
}

impl Default for ZoomPolicy {
    fn default() -> Self {
        Self {
            zoom_in: FitMode::Disable,
            zoom_out: FitMode::WidthAndHeight,
            zoom_factor: 1.0,
            suspended: false,
        }
    }
}

impl ZoomPolicy {
    /// Scale a single dimension by the zoom factor, truncating.
    #[inline]
    pub fn zoomed(&self, value: u32) -> u32 {
        (value as f64 * self.zoom_factor) as u32
    }

    fn zoomed_size(&self, width: u32, height: u32) -> Size {
        Size::new(self.zoomed(width), self.zoomed(height))
    }
}

/// Height that keeps the aspect of `size` at `new_width`, truncated.
fn height_by_width(size: Size, new_width: u32) -> u32 {
    let aspect = size.width as f64 / new_width as f64;
    (size.height as f64 / aspect) as u32
}

/// Width that keeps the aspect of `size` at `new_height`, truncated.
fn width_by_height(size: Size, new_height: u32) -> u32 {
    let aspect = size.height as f64 / new_height as f64;
    (size.width as f64 / aspect) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sweep {
    In,
    Out,
}

impl Sweep {
    /// The sweep's comparison between an image dimension and its bound
    #[inline]
    fn applies(self, dim: u32, bound: u32) -> bool {
        match self {
            Sweep::In => dim <= bound,
            Sweep::Out => dim >= bound,
        }
    }
}

fn apply_mode(size: Size, view: Size, mode: FitMode, sweep: Sweep, policy: &ZoomPolicy) -> Size {
    let w_hit = sweep.applies(size.width, view.width);
    let h_hit = sweep.applies(size.height, view.height);
    // Zoom in needs both dimensions inside the viewport, zoom out either one outside
    let both = match sweep {
        Sweep::In => w_hit && h_hit,
        Sweep::Out => w_hit || h_hit,
    };

    match mode {
        FitMode::Disable if both => {
            size.scaled_within(policy.zoomed_size(size.width, size.height))
        }
        FitMode::WidthAndHeight if both => {
            size.scaled_within(policy.zoomed_size(view.width, view.height))
        }
        FitMode::Width if w_hit => {
            let bound = policy.zoomed_size(view.width, height_by_width(size, view.width));
            size.scaled_within(bound)
        }
        FitMode::Height if h_hit => {
            let bound = policy.zoomed_size(width_by_height(size, view.height), view.height);
            size.scaled_within(bound)
        }
        FitMode::Disproportionate => {
            let width = if w_hit { view.width } else { size.width };
            let height = if h_hit { view.height } else { size.height };
            policy.zoomed_size(width, height)
        }
        _ => size,
    }
}

/// Compute the display size of an image of `natural` size in `viewport`.
///
/// # Example
///
/// ```
/// use prismview_core::zoom::{fit_size, FitMode, Size, ZoomPolicy};
///
/// let policy = ZoomPolicy { zoom_in: FitMode::WidthAndHeight, ..Default::default() };
/// let shown = fit_size(Size::new(100, 50), Size::new(800, 600), &policy);
/// assert_eq!(shown, Size::new(800, 400));
/// ```
pub fn fit_size(natural: Size, viewport: Size, policy: &ZoomPolicy) -> Size {
    if policy.suspended {
        return natural;
    }

    let zoomed_in = apply_mode(natural, viewport, policy.zoom_in, Sweep::In, policy);
    apply_mode(zoomed_in, viewport, policy.zoom_out, Sweep::Out, policy)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: Size = Size::new(800, 600);

    fn policy(zoom_in: FitMode, zoom_out: FitMode) -> ZoomPolicy {
        ZoomPolicy {
            zoom_in,
            zoom_out,
            zoom_factor: 1.0,
            suspended: false,
        }
    }

    #[test]
    fn test_scaled_within_keeps_aspect() {
        assert_eq!(
            Size::new(100, 50).scaled_within(Size::new(800, 600)),
            Size::new(800, 400)
        );
        assert_eq!(
            Size::new(50, 100).scaled_within(Size::new(800, 600)),
            Size::new(300, 600)
        );
        // Integer truncation
        assert_eq!(
            Size::new(3, 2).scaled_within(Size::new(10, 10)),
            Size::new(10, 6)
        );
        assert_eq!(
            Size::new(0, 5).scaled_within(Size::new(10, 10)),
            Size::new(10, 10)
        );
    }

    #[test]
    fn test_small_image_fills_with_width_and_height() {
        let p = policy(FitMode::WidthAndHeight, FitMode::Disable);
        assert_eq!(fit_size(Size::new(100, 50), VIEW, &p), Size::new(800, 400));
    }

    #[test]
    fn test_disable_keeps_natural_size() {
        let p = policy(FitMode::Disable, FitMode::Disable);
        assert_eq!(fit_size(Size::new(100, 50), VIEW, &p), Size::new(100, 50));
        assert_eq!(fit_size(Size::new(4000, 3000), VIEW, &p), Size::new(4000, 3000));
    }

    #[test]
    fn test_large_image_shrinks_with_width_and_height() {
        let p = policy(FitMode::Disable, FitMode::WidthAndHeight);
        assert_eq!(fit_size(Size::new(4000, 1000), VIEW, &p), Size::new(800, 200));
        assert_eq!(fit_size(Size::new(1000, 3000), VIEW, &p), Size::new(200, 600));
    }

    #[test]
    fn test_width_policy_matches_viewport_width() {
        let p = policy(FitMode::Disable, FitMode::Width);
        let out = fit_size(Size::new(1600, 800), VIEW, &p);
        assert_eq!(out, Size::new(800, 400));

        // Taller than the viewport after fitting, still width-matched
        let out = fit_size(Size::new(1000, 2000), VIEW, &p);
        assert_eq!(out, Size::new(800, 1600));
    }

    #[test]
    fn test_width_policy_with_zoom_factor() {
        let mut p = policy(FitMode::Disable, FitMode::Width);
        p.zoom_factor = 1.5;
        let out = fit_size(Size::new(1600, 800), VIEW, &p);
        assert_eq!(out.width, 1200);
        assert_eq!(out.height, 600);
    }

    #[test]
    fn test_width_policy_zooms_in_narrow_image() {
        let p = policy(FitMode::Width, FitMode::Disable);
        // 200x100 widened to 800: height 400, then out-sweep sees 800 >= 800
        // and Disable rescales to its own size
        assert_eq!(fit_size(Size::new(200, 100), VIEW, &p), Size::new(800, 400));
    }

    #[test]
    fn test_height_policy_matches_viewport_height() {
        let p = policy(FitMode::Disable, FitMode::Height);
        assert_eq!(fit_size(Size::new(500, 1000), VIEW, &p), Size::new(300, 600));

        let p = policy(FitMode::Height, FitMode::Disable);
        assert_eq!(fit_size(Size::new(100, 300), VIEW, &p), Size::new(200, 600));
    }

    #[test]
    fn test_disproportionate_clamps_each_dimension() {
        let p = policy(FitMode::Disproportionate, FitMode::Disproportionate);
        assert_eq!(fit_size(Size::new(4000, 10), VIEW, &p), Size::new(800, 600));
        assert_eq!(fit_size(Size::new(10, 4000), VIEW, &p), Size::new(800, 600));
        assert_eq!(fit_size(Size::new(30, 40), VIEW, &p), Size::new(800, 600));
    }

    #[test]
    fn test_disproportionate_out_only() {
        let p = policy(FitMode::Disable, FitMode::Disproportionate);
        // Only the oversized dimension is clamped
        assert_eq!(fit_size(Size::new(4000, 10), VIEW, &p), Size::new(800, 10));
    }

    #[test]
    fn test_zoom_factor_applies_to_disabled_policy() {
        let mut p = policy(FitMode::Disable, FitMode::Disable);
        p.zoom_factor = 2.0;
        assert_eq!(fit_size(Size::new(100, 50), VIEW, &p), Size::new(200, 100));
    }

    #[test]
    fn test_suspended_keeps_natural() {
        let mut p = policy(FitMode::WidthAndHeight, FitMode::WidthAndHeight);
        p.suspended = true;
        assert_eq!(fit_size(Size::new(100, 50), VIEW, &p), Size::new(100, 50));
    }

    #[test]
    fn test_zero_viewport_does_not_panic() {
        let p = policy(FitMode::Width, FitMode::Height);
        let _ = fit_size(Size::new(100, 50), Size::new(0, 0), &p);
        let p = policy(FitMode::WidthAndHeight, FitMode::WidthAndHeight);
        assert_eq!(fit_size(Size::new(100, 50), Size::new(0, 0), &p), Size::new(0, 0));
    }

    #[test]
    fn test_negative_zoom_saturates_to_zero() {
        let p = ZoomPolicy {
            zoom_factor: -1.0,
            ..Default::default()
        };
        assert_eq!(p.zoomed(100), 0);
    }

    #[test]
    fn test_policy_json_defaults() {
        let p: ZoomPolicy = serde_json::from_str(r#"{"zoom_in": "Width"}"#).unwrap();
        assert_eq!(p.zoom_in, FitMode::Width);
        assert_eq!(p.zoom_out, FitMode::WidthAndHeight);
        assert_eq!(p.zoom_factor, 1.0);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
