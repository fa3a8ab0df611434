//! Current-line highlight following the cursors.
//!
//! Exactly one gutter marker covers the lines of the most recently moved selection. The marker
//! is only recreated when the painted value (line range plus "is caret" flag) changes.

use crate::host::{CursorId, Decoration, EditorHost, GutterId, MarkerId};
use crate::position::{Position, Range};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// Compute the whole-line range painted for a selection, and whether the selection is empty.
///
/// A multi-line selection ending at column 0 does not paint its last line: editors draw no row
/// for the zero-width tail.
pub fn line_range_for_selection(head: Position, tail: Position) -> (Range, bool) {
    let current = Range::new(head, tail);
    let mut end_line = current.end.line;
    if current.is_multi_line() && current.end.column == 0 {
        end_line -= 1;
    }
    let lines = Range::new(
        Position::new(current.start.line, 0),
        Position::line_end(end_line),
    );
    (lines, current.is_empty())
}

/// Class of the item rendered in the gutter row.
pub fn cursor_line_item_class(empty: bool) -> String {
    if empty {
        "line-number cursor-line linter-cursor-line cursor-line-no-selection".to_string()
    } else {
        "line-number cursor-line linter-cursor-line".to_string()
    }
}

/// The last painted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentLineState {
    /// Painted line range (screen coordinates).
    pub range: Range,
    /// Whether the selection was a caret.
    pub empty: bool,
}

#[derive(Debug, Clone, Copy)]
struct Selection {
    cursor: CursorId,
    head: Position,
    tail: Position,
}

/// Maintains the single current-line marker.
#[derive(Debug, Default)]
pub struct CurrentLineHighlighter {
    cursors: HashSet<CursorId>,
    last: Option<CurrentLineState>,
    marker: Option<(CursorId, MarkerId)>,
    selection: Option<Selection>,
}

impl CurrentLineHighlighter {
    /// Create a highlighter with no subscribed cursors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `cursor` and paint its selection.
    pub fn observe_cursor<H: EditorHost + ?Sized>(
        &mut self,
        host: &mut H,
        lane: Option<GutterId>,
        cursor: CursorId,
        head: Position,
        tail: Position,
    ) {
        self.cursors.insert(cursor);
        self.selection_changed(host, lane, cursor, head, tail);
    }

    /// Handle a head/tail change of `cursor`.
    pub fn selection_changed<H: EditorHost + ?Sized>(
        &mut self,
        host: &mut H,
        lane: Option<GutterId>,
        cursor: CursorId,
        head: Position,
        tail: Position,
    ) {
        if !self.cursors.contains(&cursor) {
            return;
        }
        self.selection = Some(Selection { cursor, head, tail });
        self.paint(host, lane);
    }

    /// Drop the cached value and paint the last selection again, e.g. after the lane changed.
    pub fn repaint<H: EditorHost + ?Sized>(&mut self, host: &mut H, lane: Option<GutterId>) {
        self.last = None;
        self.paint(host, lane);
    }

    /// Unsubscribe `cursor`, destroying the marker if that cursor owns it.
    pub fn cursor_destroyed<H: EditorHost + ?Sized>(&mut self, host: &mut H, cursor: CursorId) {
        self.cursors.remove(&cursor);
        if self.selection.is_some_and(|s| s.cursor == cursor) {
            self.selection = None;
        }
        if self.marker.is_some_and(|(owner, _)| owner == cursor) {
            self.destroy_marker(host);
            self.last = None;
        }
    }

    /// Unsubscribe everything and destroy the marker.
    pub fn clear<H: EditorHost + ?Sized>(&mut self, host: &mut H) {
        self.cursors.clear();
        self.selection = None;
        self.last = None;
        self.destroy_marker(host);
    }

    /// The last painted value.
    pub fn state(&self) -> Option<CurrentLineState> {
        self.last
    }

    /// The live marker.
    pub fn marker(&self) -> Option<MarkerId> {
        self.marker.map(|(_, marker)| marker)
    }

    /// Whether `cursor` is subscribed.
    pub fn is_observing(&self, cursor: CursorId) -> bool {
        self.cursors.contains(&cursor)
    }

    fn paint<H: EditorHost + ?Sized>(&mut self, host: &mut H, lane: Option<GutterId>) {
        let Some(selection) = self.selection else {
            return;
        };
        let Some(lane) = lane else {
            self.destroy_marker(host);
            self.last = None;
            return;
        };

        let (range, empty) = line_range_for_selection(selection.head, selection.tail);
        let state = CurrentLineState { range, empty };
        if self.last == Some(state) {
            // Same lines, but the marker now belongs to the cursor that moved last.
            if let Some((owner, _)) = self.marker.as_mut() {
                *owner = selection.cursor;
            }
            return;
        }
        self.destroy_marker(host);
        self.last = Some(state);

        let marker = match host.mark_screen_range(range) {
            Ok(marker) => marker,
            Err(err) => {
                debug!(%range, error = %err, "failed to mark current line");
                return;
            }
        };
        self.marker = Some((selection.cursor, marker));
        let decoration = Decoration::gutter(lane, "linter-row", cursor_line_item_class(empty));
        if let Err(err) = host.decorate_marker(marker, decoration) {
            debug!(?marker, error = %err, "failed to paint current line");
        }
        trace!(%range, empty, "current line painted");
    }

    fn destroy_marker<H: EditorHost + ?Sized>(&mut self, host: &mut H) {
        if let Some((_, marker)) = self.marker.take() {
            if let Err(err) = host.destroy_marker(marker) {
                debug!(?marker, error = %err, "ignoring current line destroy failure");
            }
        }
    }
}

/// Last observed buffer position of every live cursor.
///
/// Entries are removed as soon as the host reports the cursor destroyed.
#[derive(Debug, Default)]
pub struct CursorPositionCache {
    positions: HashMap<CursorId, Position>,
}

impl CursorPositionCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `position` for `cursor`; returns `true` if it differs from the cached one.
    pub fn observe(&mut self, cursor: CursorId, position: Position) -> bool {
        self.positions.insert(cursor, position) != Some(position)
    }

    /// Overwrite the cached position without reporting a change.
    pub fn reset(&mut self, cursor: CursorId, position: Position) {
        self.positions.insert(cursor, position);
    }

    /// Forget `cursor`.
    pub fn remove(&mut self, cursor: CursorId) {
        self.positions.remove(&cursor);
    }

    /// Cached position of `cursor`.
    pub fn get(&self, cursor: CursorId) -> Option<Position> {
        self.positions.get(&cursor).copied()
    }

    /// Number of tracked cursors.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` if no cursor is tracked.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Forget every cursor.
    pub fn clear(&mut self) {
        self.positions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(line: usize, column: usize) -> Position {
        Position::new(line, column)
    }

    #[test]
    fn test_multi_line_selection_ending_at_column_zero_drops_last_line() {
        let (range, empty) = line_range_for_selection(p(0, 0), p(2, 0));
        assert_eq!(range, Range::new(p(0, 0), Position::line_end(1)));
        assert!(!empty);

        let (range, _) = line_range_for_selection(p(0, 0), p(2, 3));
        assert_eq!(range, Range::new(p(0, 0), Position::line_end(2)));
    }

    #[test]
    fn test_reversed_selection_is_normalized() {
        let (range, _) = line_range_for_selection(p(2, 0), p(0, 0));
        assert_eq!(range, Range::new(p(0, 0), Position::line_end(1)));
    }

    #[test]
    fn test_caret_covers_its_own_line() {
        let (range, empty) = line_range_for_selection(p(4, 0), p(4, 0));
        assert_eq!(range, Range::new(p(4, 0), Position::line_end(4)));
        assert!(empty);

        let (range, empty) = line_range_for_selection(p(4, 0), p(4, 7));
        assert_eq!(range, Range::new(p(4, 0), Position::line_end(4)));
        assert!(!empty);
    }

    #[test]
    fn test_item_class_marks_carets() {
        assert!(cursor_line_item_class(true).ends_with("cursor-line-no-selection"));
        assert!(!cursor_line_item_class(false).contains("no-selection"));
    }

    #[test]
    fn test_position_cache_detects_real_moves() {
        let mut cache = CursorPositionCache::new();
        let cursor = CursorId(1);
        assert!(cache.observe(cursor, p(0, 0)));
        assert!(!cache.observe(cursor, p(0, 0)));
        assert!(cache.observe(cursor, p(0, 1)));

        cache.reset(cursor, p(3, 3));
        assert!(!cache.observe(cursor, p(3, 3)));

        cache.remove(cursor);
        assert!(cache.is_empty());
        assert!(cache.observe(cursor, p(3, 3)));
    }
}
