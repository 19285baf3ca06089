//! Capabilities supplied by the embedding application.
//!
//! The engine never owns a window or an event loop. The host implements
//! [`Viewport`] for its scroll container and [`Scheduler`] for its timer
//! facility, and forwards timer expirations back to whoever scheduled them.

use std::time::Duration;

use crate::decode::PixelBuffer;
use crate::zoom::Size;

/// Scroll axis of a viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// State of one scroll bar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollBar {
    pub value: u32,
    pub maximum: u32,
}

impl ScrollBar {
    pub const fn new(value: u32, maximum: u32) -> Self {
        Self { value, maximum }
    }

    /// Position as a fraction of the scroll range, 0 when either is zero.
    pub fn fraction(&self) -> f64 {
        if self.value == 0 || self.maximum == 0 {
            return 0.0;
        }
        (self.value as f64 / self.maximum as f64).min(1.0)
    }
}

/// A scrollable area that shows one image.
///
/// After [`set_content_size`](Viewport::set_content_size) the implementation
/// must report scroll maxima matching the new content size.
pub trait Viewport {
    /// Visible area in pixels
    fn size(&self) -> Size;

    fn scroll(&self, axis: Axis) -> ScrollBar;

    fn set_scroll(&mut self, axis: Axis, value: u32);

    /// Resize the displayed content
    fn set_content_size(&mut self, size: Size);

    /// Replace the displayed pixels
    fn display(&mut self, buffer: &PixelBuffer);
}

/// Handle for a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// One-shot, cancellable timers driven by the host event loop.
pub trait Scheduler {
    /// Arrange for the returned id to be delivered after `delay`
    fn schedule(&mut self, delay: Duration) -> TimerId;

    /// Cancel a pending timer. Unknown or fired ids are ignored.
    fn cancel(&mut self, id: TimerId);
}
