//! Mouse and keyboard input trackers feeding the tooltip.

use crate::config::TooltipFollows;
use crate::debounce::Debouncer;
use crate::host::{EditorHost, MarkerId, MouseEvent};
use crate::position::Position;
use std::time::{Duration, Instant};

/// Minimum spacing between two handled mouse moves.
pub const MOUSE_DEBOUNCE: Duration = Duration::from_millis(300);

/// Quiet period before a cursor move reaches the tooltip (one frame).
pub const KEYBOARD_DEBOUNCE: Duration = Duration::from_millis(16);

/// Leading-edge mouse tracker.
#[derive(Debug)]
pub struct MouseTracker {
    debounce: Debouncer<MouseEvent>,
}

impl MouseTracker {
    /// Create a tracker with the default interval.
    pub fn new() -> Self {
        Self::with_interval(MOUSE_DEBOUNCE)
    }

    /// Create a tracker with a custom interval.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            debounce: Debouncer::leading(interval),
        }
    }

    /// Submit a mouse move; returns the event if it should be handled now.
    pub fn track(&mut self, event: MouseEvent, now: Instant) -> Option<MouseEvent> {
        self.debounce.call(event, now)
    }
}

impl Default for MouseTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Trailing-edge cursor tracker.
#[derive(Debug)]
pub struct KeyboardTracker {
    debounce: Debouncer<Position>,
}

impl KeyboardTracker {
    /// Create a tracker with the default interval.
    pub fn new() -> Self {
        Self::with_interval(KEYBOARD_DEBOUNCE)
    }

    /// Create a tracker with a custom interval.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            debounce: Debouncer::trailing(interval),
        }
    }

    /// Submit a cursor position.
    pub fn track(&mut self, position: Position, now: Instant) {
        self.debounce.call(position, now);
    }

    /// The settled position, once the quiet period has passed.
    pub fn poll(&mut self, now: Instant) -> Option<Position> {
        self.debounce.poll(now)
    }

    /// When [`poll`](Self::poll) is next due.
    pub fn deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }
}

impl Default for KeyboardTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// The trackers installed for the current [`TooltipFollows`] mode.
///
/// Replacing the value tears down the previous subscriptions along with their pending work.
#[derive(Debug, Default)]
pub struct InputTrackers {
    /// Mouse tracker, when the mode follows the mouse.
    pub mouse: Option<MouseTracker>,
    /// Keyboard tracker, when the mode follows the cursor.
    pub keyboard: Option<KeyboardTracker>,
}

impl InputTrackers {
    /// Install the trackers `follows` needs.
    pub fn for_mode(follows: TooltipFollows) -> Self {
        Self {
            mouse: follows.tracks_mouse().then(MouseTracker::new),
            keyboard: follows.tracks_keyboard().then(KeyboardTracker::new),
        }
    }

    /// When pending keyboard work is next due.
    pub fn deadline(&self) -> Option<Instant> {
        self.keyboard.as_ref().and_then(KeyboardTracker::deadline)
    }
}

/// Outcome of a handled mouse move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseResolution {
    /// Leave the tooltip alone.
    Ignore,
    /// Move the candidate position (`None` closes the tooltip).
    Position(Option<Position>),
}

/// Turn a mouse move into a candidate tooltip position.
///
/// Moves outside the text area, and moves that stay near the open tooltip's anchor, are ignored.
/// Large documents never resolve a position.
pub fn resolve_mouse<H: EditorHost + ?Sized>(
    host: &H,
    tooltip_anchor: Option<MarkerId>,
    event: &MouseEvent,
) -> MouseResolution {
    if !event.in_text_area {
        return MouseResolution::Ignore;
    }
    let near_tooltip = tooltip_anchor
        .and_then(|anchor| host.marker_start_screen_position(anchor))
        .is_some_and(|anchor| host.mouse_near_screen_position(event, anchor));
    if near_tooltip {
        return MouseResolution::Ignore;
    }
    if host.is_large_file() {
        return MouseResolution::Position(None);
    }
    MouseResolution::Position(host.buffer_position_for_mouse(event))
}
