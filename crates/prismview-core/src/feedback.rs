//! Transient status messages and idle cursor hiding.
//!
//! Both state machines own at most one pending timer on the host
//! [`Scheduler`] and ignore expirations of timers they no longer track.

use std::time::Duration;

use crate::host::{Scheduler, TimerId};

/// How long a time-limited message stays visible
pub const FEEDBACK_TIMEOUT: Duration = Duration::from_secs(3);

/// Interval between pointer position checks
pub const CURSOR_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// On-screen feedback message, optionally dismissed after [`FEEDBACK_TIMEOUT`].
#[derive(Debug, Default)]
pub struct Feedback {
    text: Option<String>,
    timer: Option<TimerId>,
}

impl Feedback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `text`, replacing the current message.
    ///
    /// Empty text is ignored and returns `false`. A time-limited message
    /// restarts the dismissal timer.
    pub fn show(
        &mut self,
        text: impl Into<String>,
        time_limited: bool,
        scheduler: &mut dyn Scheduler,
    ) -> bool {
        let text = text.into();
        if text.is_empty() {
            return false;
        }

        if let Some(id) = self.timer.take() {
            scheduler.cancel(id);
        }
        if time_limited {
            self.timer = Some(scheduler.schedule(FEEDBACK_TIMEOUT));
        }
        self.text = Some(text);
        true
    }

    /// Current message, if any
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Handle a timer expiration. Returns `true` if the message was dismissed.
    pub fn on_timer(&mut self, id: TimerId) -> bool {
        if self.timer != Some(id) {
            return false;
        }
        self.timer = None;
        self.text = None;
        true
    }

    pub fn clear(&mut self, scheduler: &mut dyn Scheduler) {
        if let Some(id) = self.timer.take() {
            scheduler.cancel(id);
        }
        self.text = None;
    }
}

/// Cursor visibility change the host should apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorChange {
    Hide,
    Show,
}

/// Hides the pointer while it rests over the image.
#[derive(Debug, Default)]
pub struct CursorIdle {
    timer: Option<TimerId>,
    last: Option<(i32, i32)>,
    hidden: bool,
}

impl CursorIdle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_active(&self) -> bool {
        self.timer.is_some()
    }

    /// Start or stop polling.
    ///
    /// Stopping returns [`CursorChange::Show`] when the cursor is currently
    /// hidden and must be restored.
    pub fn set_hiding(
        &mut self,
        enabled: bool,
        pointer: (i32, i32),
        scheduler: &mut dyn Scheduler,
    ) -> Option<CursorChange> {
        if enabled {
            if self.timer.is_none() {
                self.last = Some(pointer);
                self.timer = Some(scheduler.schedule(CURSOR_POLL_INTERVAL));
            }
            return None;
        }

        if let Some(id) = self.timer.take() {
            scheduler.cancel(id);
        }
        self.last = None;
        self.reveal()
    }

    /// Handle a poll tick with the current pointer position.
    pub fn on_timer(
        &mut self,
        id: TimerId,
        pointer: (i32, i32),
        scheduler: &mut dyn Scheduler,
    ) -> Option<CursorChange> {
        if self.timer != Some(id) {
            return None;
        }

        let moved = self.last != Some(pointer);
        self.last = Some(pointer);
        self.timer = Some(scheduler.schedule(CURSOR_POLL_INTERVAL));

        if moved {
            self.reveal()
        } else if !self.hidden {
            self.hidden = true;
            Some(CursorChange::Hide)
        } else {
            None
        }
    }

    fn reveal(&mut self) -> Option<CursorChange> {
        if self.hidden {
            self.hidden = false;
            Some(CursorChange::Show)
        } else {
            None
        }
    }
}
