//! Applying a fit to a viewport.

use std::cell::Cell;

use super::{fit_size, Size, ZoomPolicy};
use crate::host::{Axis, ScrollBar, Viewport};

/// Pixels moved per keyboard pan step
pub const PAN_STEP: u32 = 50;

/// Content smaller than the viewport plus this margin is always re-centred
const RECENTRE_MARGIN: u32 = 100;

/// Scroll offsets in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollPos {
    pub x: u32,
    pub y: u32,
}

/// Result of [`ZoomFitPlanner::fit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitOutcome {
    /// A fit was already running on this planner
    Skipped,
    /// The image has no pixels; the viewport was left alone
    Empty,
    Resized { size: Size, scroll: ScrollPos },
}

/// Keyboard pan direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanDirection {
    Left,
    Right,
    Up,
    Down,
}

/// Sizes the displayed image and keeps the scroll position stable.
///
/// Viewport callbacks may call back into the planner while a fit is in
/// progress. Such nested calls return [`FitOutcome::Skipped`].
#[derive(Debug, Default)]
pub struct ZoomFitPlanner {
    recomputing: Cell<bool>,
}

/// Clears the recomputing flag when dropped.
struct RecomputeGuard<'a>(&'a Cell<bool>);

impl<'a> RecomputeGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for RecomputeGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl ZoomFitPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a fit is running on this planner
    pub fn is_recomputing(&self) -> bool {
        self.recomputing.get()
    }

    /// Fit an image of `natural` size into `viewport`.
    ///
    /// # Arguments
    ///
    /// * `natural` - Size of the rendered buffer
    /// * `viewport` - Scroll area receiving the new content size
    /// * `policy` - Zoom-in/zoom-out modes and zoom factor
    ///
    /// # Returns
    ///
    /// The applied size and scroll offsets, or why nothing was applied.
    pub fn fit(&self, natural: Size, viewport: &mut dyn Viewport, policy: &ZoomPolicy) -> FitOutcome {
        let Some(_guard) = RecomputeGuard::enter(&self.recomputing) else {
            tracing::trace!("Fit already in progress, dropping nested request");
            return FitOutcome::Skipped;
        };

        if natural.is_empty() {
            return FitOutcome::Empty;
        }

        let view = viewport.size();
        let before_x = viewport.scroll(Axis::Horizontal);
        let before_y = viewport.scroll(Axis::Vertical);
        let (frac_x, frac_y) = (before_x.fraction(), before_y.fraction());

        let size = fit_size(natural, view, policy);
        viewport.set_content_size(size);

        let bar_x = viewport.scroll(Axis::Horizontal);
        let bar_y = viewport.scroll(Axis::Vertical);

        let at_origin = before_x.value == 0 && before_y.value == 0;
        let near_viewport = size.width < view.width.saturating_add(RECENTRE_MARGIN)
            || size.height < view.height.saturating_add(RECENTRE_MARGIN);

        let scroll = if at_origin || near_viewport {
            ScrollPos {
                x: centred(size.width, view.width, bar_x),
                y: centred(size.height, view.height, bar_y),
            }
        } else {
            ScrollPos {
                x: (bar_x.maximum as f64 * frac_x) as u32,
                y: (bar_y.maximum as f64 * frac_y) as u32,
            }
        };

        viewport.set_scroll(Axis::Horizontal, scroll.x);
        viewport.set_scroll(Axis::Vertical, scroll.y);

        tracing::debug!(
            natural_width = natural.width,
            natural_height = natural.height,
            width = size.width,
            height = size.height,
            scroll_x = scroll.x,
            scroll_y = scroll.y,
            "Fitted image to viewport"
        );
        FitOutcome::Resized { size, scroll }
    }
}

/// Offset that puts the content centre in the middle of the view.
fn centred(content: u32, view: u32, bar: ScrollBar) -> u32 {
    (content / 2).saturating_sub(view / 2).min(bar.maximum)
}

/// Move the view by one [`PAN_STEP`] in `direction`.
///
/// An axis only moves when `content` is larger than the viewport along it.
pub fn pan(viewport: &mut dyn Viewport, content: Size, direction: PanDirection) {
    let view = viewport.size();
    let (axis, forward, scrollable) = match direction {
        PanDirection::Left => (Axis::Horizontal, false, content.width > view.width),
        PanDirection::Right => (Axis::Horizontal, true, content.width > view.width),
        PanDirection::Up => (Axis::Vertical, false, content.height > view.height),
        PanDirection::Down => (Axis::Vertical, true, content.height > view.height),
    };
    if !scrollable {
        return;
    }

    let bar = viewport.scroll(axis);
    let value = if forward {
        bar.value.saturating_add(PAN_STEP).min(bar.maximum)
    } else {
        bar.value.saturating_sub(PAN_STEP)
    };
    viewport.set_scroll(axis, value);
}
