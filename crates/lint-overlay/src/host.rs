//! The editor-facing interface.
//!
//! The engine never renders anything itself. Everything it paints goes through an
//! [`EditorHost`]: range markers, gutter lanes, decorations and the tooltip overlay. The host
//! in turn reports what happens in the editor as [`EditorEvent`]s, which are fed to
//! [`AnnotationEngine::handle_event`](crate::AnnotationEngine::handle_event).
//!
//! Markers created through this interface use "never invalidate" semantics: they follow edits
//! until the engine destroys them explicitly.

use crate::message::Severity;
use crate::position::{Position, Range};
use std::path::Path;
use thiserror::Error;

/// Handle to a range marker owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(pub u64);

/// Handle to a gutter lane owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GutterId(pub u64);

/// Stable identifier of a cursor, valid until the host reports its destruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CursorId(pub u64);

/// Errors reported by an [`EditorHost`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("document has been destroyed")]
    /// The document backing the editor was torn down.
    DocumentDestroyed,

    #[error("unknown marker {0:?}")]
    /// The marker does not exist (already destroyed, or never created).
    UnknownMarker(MarkerId),

    #[error("unknown gutter {0:?}")]
    /// The gutter lane does not exist.
    UnknownGutter(GutterId),
}

/// Which layer a decoration is painted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecorationTarget {
    /// Inline highlight over the marked text.
    Text,
    /// An item rendered in the given gutter lane, on every row the marker spans.
    Gutter(GutterId),
}

/// A decoration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    /// Layer to paint in.
    pub target: DecorationTarget,
    /// Style class applied to the decorated region or gutter row.
    pub class: String,
    /// Style class of the element rendered inside the gutter row (gutter decorations only).
    pub item_class: Option<String>,
}

impl Decoration {
    /// Inline text highlight.
    pub fn text(class: impl Into<String>) -> Self {
        Self {
            target: DecorationTarget::Text,
            class: class.into(),
            item_class: None,
        }
    }

    /// Gutter row with a rendered item.
    pub fn gutter(gutter: GutterId, class: impl Into<String>, item_class: impl Into<String>) -> Self {
        Self {
            target: DecorationTarget::Gutter(gutter),
            class: class.into(),
            item_class: Some(item_class.into()),
        }
    }
}

/// One entry of a tooltip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipMessage {
    /// Key of the listed message.
    pub key: String,
    /// Message severity.
    pub severity: Severity,
    /// One-line summary.
    pub excerpt: String,
    /// Optional long-form description.
    pub description: Option<String>,
    /// Provider name, present only when provider names are enabled.
    pub provider: Option<String>,
}

/// Everything the host needs to render a tooltip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipContent {
    /// Buffer position the tooltip was opened for.
    pub position: Position,
    /// Messages covering that position.
    pub messages: Vec<TooltipMessage>,
}

/// Current state of one cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorSnapshot {
    /// Cursor identifier.
    pub id: CursorId,
    /// Cursor position in buffer coordinates.
    pub buffer_position: Position,
    /// Selection head in screen coordinates.
    pub head: Position,
    /// Selection tail in screen coordinates.
    pub tail: Position,
}

/// A mouse-move event in editor-relative pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    /// Horizontal offset from the left edge of the text area.
    pub x: f32,
    /// Vertical offset from the top of the document.
    pub y: f32,
    /// Whether the pointer is over the text-rendering area (not the gutter or a scrollbar).
    pub in_text_area: bool,
}

/// A change reported for a buffer marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerChange {
    /// Marker that changed.
    pub marker: MarkerId,
    /// Head before the change.
    pub old_head: Position,
    /// Head after the change.
    pub new_head: Position,
    /// Range after the change.
    pub new_range: Range,
    /// Whether the marker is still valid.
    pub is_valid: bool,
}

impl MarkerChange {
    /// Returns `true` for notifications that must not update anything: invalid markers, and
    /// heads that jumped back to the first line (a buffer reset, not an edit).
    pub fn is_stale(&self) -> bool {
        !self.is_valid || (self.new_head.line == 0 && self.old_head.line != 0)
    }
}

/// Events the host reports to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// A cursor was created. Positions are in screen coordinates.
    CursorAdded {
        /// The new cursor.
        cursor: CursorId,
        /// Buffer position of the new cursor.
        buffer_position: Position,
        /// Selection head.
        head: Position,
        /// Selection tail.
        tail: Position,
    },
    /// A cursor's selection head or tail moved. Positions are in screen coordinates.
    SelectionChanged {
        /// The cursor.
        cursor: CursorId,
        /// New selection head.
        head: Position,
        /// New selection tail.
        tail: Position,
    },
    /// A cursor reported its buffer position (possibly unchanged).
    CursorPositionChanged {
        /// The cursor.
        cursor: CursorId,
        /// New buffer position.
        position: Position,
    },
    /// A cursor was destroyed.
    CursorDestroyed(CursorId),
    /// The document text changed.
    TextChanged,
    /// The mouse moved over the editor.
    MouseMoved(MouseEvent),
    /// A buffer marker moved.
    MarkerChanged(MarkerChange),
    /// The document was closed.
    Destroyed,
}

/// The editor API the engine paints through.
///
/// All methods may fail with [`HostError::DocumentDestroyed`] once the document is gone; the
/// engine treats such failures during teardown as benign.
pub trait EditorHost {
    /// Path of the document, if it has one.
    fn path(&self) -> Option<&Path>;

    /// Whether the editor runs in a reduced-fidelity mode for very large files.
    fn is_large_file(&self) -> bool {
        false
    }

    /// Create a never-invalidating marker over a buffer range.
    fn mark_buffer_range(&mut self, range: Range) -> Result<MarkerId, HostError>;

    /// Create a never-invalidating marker over a screen range.
    ///
    /// End-of-line sentinel columns ([`Position::line_end`]) are clipped by the host.
    fn mark_screen_range(&mut self, range: Range) -> Result<MarkerId, HostError>;

    /// Destroy a marker together with all of its decorations.
    fn destroy_marker(&mut self, marker: MarkerId) -> Result<(), HostError>;

    /// Screen position of the marker start.
    fn marker_start_screen_position(&self, marker: MarkerId) -> Option<Position>;

    /// Add a gutter lane. Lower priorities render further left.
    fn add_gutter(&mut self, name: &str, priority: i32) -> Result<GutterId, HostError>;

    /// Remove a gutter lane and every decoration painted in it.
    fn destroy_gutter(&mut self, gutter: GutterId) -> Result<(), HostError>;

    /// Paint a marker.
    fn decorate_marker(&mut self, marker: MarkerId, decoration: Decoration) -> Result<(), HostError>;

    /// Current cursors.
    fn cursors(&self) -> Vec<CursorSnapshot>;

    /// Resolve a mouse event to a buffer position.
    fn buffer_position_for_mouse(&self, event: &MouseEvent) -> Option<Position>;

    /// Whether the pointer is close enough to a tooltip anchored at `anchor` (screen
    /// coordinates) to count as hovering that tooltip.
    fn mouse_near_screen_position(&self, event: &MouseEvent, anchor: Position) -> bool;

    /// Render a tooltip bound to `anchor`. Destroying the anchor removes the tooltip.
    fn show_tooltip(&mut self, anchor: MarkerId, content: TooltipContent) -> Result<(), HostError>;

    /// Drain events queued by the host since the last call.
    ///
    /// Hosts that deliver events by calling the engine directly keep the default.
    fn take_events(&mut self) -> Vec<EditorEvent> {
        Vec::new()
    }
}
