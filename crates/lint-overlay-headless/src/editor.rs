//! In-memory editor implementing [`EditorHost`].
//!
//! Markers and cursors are stored as character offsets into a [`Rope`] and shifted on every edit,
//! so they never invalidate. Events are queued in the order a live editor emits them (cursor and
//! marker moves first, then the text change) and drained by
//! [`AnnotationEngine::pump`](lint_overlay::AnnotationEngine::pump).

use crate::metrics::{DEFAULT_TAB_WIDTH, PixelMetrics, column_for_visual_x, visual_x_for_column};
use lint_overlay::{
    CursorId, CursorSnapshot, Decoration, DecorationTarget, EditorEvent, EditorHost, GutterId,
    HostError, MarkerChange, MarkerId, MouseEvent, Position, Range, TooltipContent,
};
use ropey::Rope;
use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use tracing::trace;

/// Coordinate space a marker was created in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// Created with [`EditorHost::mark_buffer_range`]; reports [`EditorEvent::MarkerChanged`].
    Buffer,
    /// Created with [`EditorHost::mark_screen_range`].
    Screen,
}

#[derive(Debug, Clone)]
struct MarkerEntry {
    start: usize,
    end: usize,
    kind: MarkerKind,
    decorations: Vec<Decoration>,
}

#[derive(Debug, Clone, Copy)]
struct CursorEntry {
    head: usize,
    tail: usize,
}

#[derive(Debug, Clone)]
struct GutterEntry {
    name: String,
    priority: i32,
}

/// A gutter lane as seen by tests and renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GutterLane {
    /// Lane handle.
    pub id: GutterId,
    /// Lane name.
    pub name: String,
    /// Lane priority.
    pub priority: i32,
}

/// One painted gutter row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct GutterRow {
    /// Buffer line.
    pub line: usize,
    /// Row class.
    pub class: String,
    /// Class of the rendered item.
    pub item_class: String,
}

/// A headless editor for a single document.
#[derive(Debug)]
pub struct HeadlessEditor {
    rope: Rope,
    path: Option<PathBuf>,
    large_file: bool,
    destroyed: bool,
    tab_width: usize,
    metrics: PixelMetrics,
    markers: BTreeMap<MarkerId, MarkerEntry>,
    gutters: BTreeMap<GutterId, GutterEntry>,
    cursors: BTreeMap<CursorId, CursorEntry>,
    tooltips: BTreeMap<MarkerId, TooltipContent>,
    events: VecDeque<EditorEvent>,
    next_id: u64,
}

impl HeadlessEditor {
    /// Create an editor over `text` with a single cursor at the start.
    pub fn new(text: &str) -> Self {
        let mut editor = Self {
            rope: Rope::from_str(text),
            path: None,
            large_file: false,
            destroyed: false,
            tab_width: DEFAULT_TAB_WIDTH,
            metrics: PixelMetrics::default(),
            markers: BTreeMap::new(),
            gutters: BTreeMap::new(),
            cursors: BTreeMap::new(),
            tooltips: BTreeMap::new(),
            events: VecDeque::new(),
            next_id: 1,
        };
        let id = CursorId(editor.allocate_id());
        editor.cursors.insert(id, CursorEntry { head: 0, tail: 0 });
        editor
    }

    /// Set the document path.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the pixel metrics used for mouse resolution.
    pub fn with_metrics(mut self, metrics: PixelMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Set the tab width used for screen columns.
    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width.max(1);
        self
    }

    /// Toggle the reduced-fidelity large-file mode.
    pub fn set_large_file(&mut self, large_file: bool) {
        self.large_file = large_file;
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn ensure_alive(&self) -> Result<(), HostError> {
        if self.destroyed {
            Err(HostError::DocumentDestroyed)
        } else {
            Ok(())
        }
    }

    // ----- text and coordinates -----

    /// Full document text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Number of lines (a trailing newline starts an empty last line).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Text of `line` without its line break.
    pub fn line_text(&self, line: usize) -> String {
        if line >= self.rope.len_lines() {
            return String::new();
        }
        let mut text = self.rope.line(line).to_string();
        while text.ends_with('\n') || text.ends_with('\r') {
            text.pop();
        }
        text
    }

    /// Length of `line` in characters, line break excluded.
    pub fn line_len(&self, line: usize) -> usize {
        if line >= self.rope.len_lines() {
            return 0;
        }
        let slice = self.rope.line(line);
        let mut len = slice.len_chars();
        while len > 0 && matches!(slice.char(len - 1), '\n' | '\r') {
            len -= 1;
        }
        len
    }

    /// Clamp a buffer position to the document.
    pub fn clip(&self, position: Position) -> Position {
        let last_line = self.rope.len_lines().saturating_sub(1);
        let line = position.line.min(last_line);
        Position::new(line, position.column.min(self.line_len(line)))
    }

    fn offset_of(&self, position: Position) -> usize {
        let position = self.clip(position);
        self.rope.line_to_char(position.line) + position.column
    }

    fn position_of(&self, offset: usize) -> Position {
        let offset = offset.min(self.rope.len_chars());
        let line = self.rope.char_to_line(offset);
        Position::new(line, offset - self.rope.line_to_char(line))
    }

    /// Screen position of a buffer position.
    pub fn screen_position_for_buffer(&self, position: Position) -> Position {
        let position = self.clip(position);
        let line = self.line_text(position.line);
        Position::new(
            position.line,
            visual_x_for_column(&line, position.column, self.tab_width),
        )
    }

    /// Buffer position of a screen position; end-of-line sentinels clip to the line end.
    pub fn buffer_position_for_screen(&self, position: Position) -> Position {
        let last_line = self.rope.len_lines().saturating_sub(1);
        let line = position.line.min(last_line);
        let text = self.line_text(line);
        Position::new(line, column_for_visual_x(&text, position.column, self.tab_width))
    }

    // ----- editing -----

    /// Insert `text` at `position`.
    pub fn insert(&mut self, position: Position, text: &str) -> Result<(), HostError> {
        self.ensure_alive()?;
        if text.is_empty() {
            return Ok(());
        }
        let at = self.offset_of(position);
        let len = text.chars().count();
        // Non-empty ranges grow when text lands on either boundary; carets move past it.
        let shift_start = |offset: usize, empty: bool| {
            if offset > at || (empty && offset == at) {
                offset + len
            } else {
                offset
            }
        };
        let shift_end = |offset: usize| if offset >= at { offset + len } else { offset };
        self.edit(|rope| rope.insert(at, text), shift_start, shift_end);
        Ok(())
    }

    /// Delete the text in `range`.
    pub fn delete(&mut self, range: Range) -> Result<(), HostError> {
        self.ensure_alive()?;
        let start = self.offset_of(range.start);
        let end = self.offset_of(range.end);
        if start == end {
            return Ok(());
        }
        let shift = move |offset: usize| {
            if offset <= start {
                offset
            } else if offset >= end {
                offset - (end - start)
            } else {
                start
            }
        };
        self.edit(|rope| rope.remove(start..end), move |offset, _| shift(offset), shift);
        Ok(())
    }

    /// Replace the whole document. Every marker and cursor collapses to the origin.
    pub fn set_text(&mut self, text: &str) -> Result<(), HostError> {
        self.ensure_alive()?;
        let replacement = text.to_string();
        self.edit(
            move |rope| *rope = Rope::from_str(&replacement),
            |_, _| 0,
            |_| 0,
        );
        Ok(())
    }

    /// Apply a text mutation and move every marker and cursor.
    ///
    /// `shift_start` maps a range start (with whether the range is empty); `shift_end` maps a
    /// range end. Cursors are empty ranges when they have no selection.
    fn edit(
        &mut self,
        mutate: impl FnOnce(&mut Rope),
        shift_start: impl Fn(usize, bool) -> usize,
        shift_end: impl Fn(usize) -> usize,
    ) {
        let old_marker_ranges: BTreeMap<MarkerId, Range> = self
            .markers
            .iter()
            .filter(|(_, m)| m.kind == MarkerKind::Buffer)
            .map(|(id, m)| (*id, Range::new(self.position_of(m.start), self.position_of(m.end))))
            .collect();
        let old_cursors: BTreeMap<CursorId, (Position, Position)> = self
            .cursors
            .iter()
            .map(|(id, c)| (*id, (self.position_of(c.head), self.position_of(c.tail))))
            .collect();

        mutate(&mut self.rope);

        for marker in self.markers.values_mut() {
            let empty = marker.start == marker.end;
            marker.start = shift_start(marker.start, empty);
            marker.end = if empty { marker.start } else { shift_end(marker.end) };
        }
        for cursor in self.cursors.values_mut() {
            if cursor.head == cursor.tail {
                cursor.head = shift_start(cursor.head, true);
                cursor.tail = cursor.head;
            } else {
                let (lo, hi) = (cursor.head.min(cursor.tail), cursor.head.max(cursor.tail));
                let (new_lo, new_hi) = (shift_start(lo, false), shift_end(hi));
                if cursor.head <= cursor.tail {
                    cursor.head = new_lo;
                    cursor.tail = new_hi;
                } else {
                    cursor.head = new_hi;
                    cursor.tail = new_lo;
                }
            }
        }

        let cursor_ids: Vec<CursorId> = self.cursors.keys().copied().collect();
        for id in cursor_ids {
            let (head, tail) = self.cursor_positions(id);
            if old_cursors.get(&id) != Some(&(head, tail)) {
                self.events.push_back(EditorEvent::SelectionChanged {
                    cursor: id,
                    head: self.screen_position_for_buffer(head),
                    tail: self.screen_position_for_buffer(tail),
                });
                if old_cursors.get(&id).map(|(old_head, _)| *old_head) != Some(head) {
                    self.events.push_back(EditorEvent::CursorPositionChanged {
                        cursor: id,
                        position: head,
                    });
                }
            }
        }

        for (id, old_range) in old_marker_ranges {
            let Some(range) = self.marker_range(id) else {
                continue;
            };
            if range != old_range {
                self.events.push_back(EditorEvent::MarkerChanged(MarkerChange {
                    marker: id,
                    old_head: old_range.end,
                    new_head: range.end,
                    new_range: range,
                    is_valid: true,
                }));
            }
        }

        self.events.push_back(EditorEvent::TextChanged);
        trace!(chars = self.rope.len_chars(), "document edited");
    }

    // ----- cursors -----

    fn cursor_positions(&self, id: CursorId) -> (Position, Position) {
        self.cursors
            .get(&id)
            .map(|c| (self.position_of(c.head), self.position_of(c.tail)))
            .unwrap_or_default()
    }

    fn queue_cursor_change(&mut self, id: CursorId, old: (Position, Position)) {
        let (head, tail) = self.cursor_positions(id);
        if old == (head, tail) {
            return;
        }
        self.events.push_back(EditorEvent::SelectionChanged {
            cursor: id,
            head: self.screen_position_for_buffer(head),
            tail: self.screen_position_for_buffer(tail),
        });
        if old.0 != head {
            self.events.push_back(EditorEvent::CursorPositionChanged {
                cursor: id,
                position: head,
            });
        }
    }

    /// The first cursor.
    pub fn primary_cursor(&self) -> Option<CursorId> {
        self.cursors.keys().next().copied()
    }

    /// Add a cursor at `position`.
    pub fn add_cursor(&mut self, position: Position) -> Result<CursorId, HostError> {
        self.ensure_alive()?;
        let offset = self.offset_of(position);
        let id = CursorId(self.allocate_id());
        self.cursors.insert(
            id,
            CursorEntry {
                head: offset,
                tail: offset,
            },
        );
        let position = self.position_of(offset);
        let screen = self.screen_position_for_buffer(position);
        self.events.push_back(EditorEvent::CursorAdded {
            cursor: id,
            buffer_position: position,
            head: screen,
            tail: screen,
        });
        Ok(id)
    }

    /// Move a cursor, collapsing its selection.
    pub fn move_cursor(&mut self, id: CursorId, position: Position) -> Result<(), HostError> {
        self.select(id, position, position)
    }

    /// Select from `tail` to `head`; the cursor sits at `head`.
    pub fn select(&mut self, id: CursorId, tail: Position, head: Position) -> Result<(), HostError> {
        self.ensure_alive()?;
        if !self.cursors.contains_key(&id) {
            return Ok(());
        }
        let old = self.cursor_positions(id);
        let (head, tail) = (self.offset_of(head), self.offset_of(tail));
        if let Some(cursor) = self.cursors.get_mut(&id) {
            cursor.head = head;
            cursor.tail = tail;
        }
        self.queue_cursor_change(id, old);
        Ok(())
    }

    /// Report the cursor position again without moving it, as editors do after some commands.
    pub fn touch_cursor(&mut self, id: CursorId) -> Result<(), HostError> {
        self.ensure_alive()?;
        let (head, _) = self.cursor_positions(id);
        self.events.push_back(EditorEvent::CursorPositionChanged {
            cursor: id,
            position: head,
        });
        Ok(())
    }

    /// Remove a cursor.
    pub fn remove_cursor(&mut self, id: CursorId) -> Result<(), HostError> {
        self.ensure_alive()?;
        if self.cursors.remove(&id).is_some() {
            self.events.push_back(EditorEvent::CursorDestroyed(id));
        }
        Ok(())
    }

    /// Buffer position of a cursor.
    pub fn cursor_position(&self, id: CursorId) -> Option<Position> {
        self.cursors.get(&id).map(|c| self.position_of(c.head))
    }

    // ----- mouse -----

    /// A mouse event over the middle of the cell at `screen`.
    pub fn mouse_event_at(&self, screen: Position) -> MouseEvent {
        let (x, y) = self.metrics.pixel_for_cell(screen.line, screen.column);
        MouseEvent {
            x: x + self.metrics.char_width / 2.0,
            y: y + self.metrics.line_height / 2.0,
            in_text_area: true,
        }
    }

    /// A mouse event over the middle of the cell at buffer `position`.
    pub fn mouse_event_at_buffer(&self, position: Position) -> MouseEvent {
        self.mouse_event_at(self.screen_position_for_buffer(position))
    }

    /// Queue a mouse move.
    pub fn move_mouse(&mut self, event: MouseEvent) {
        if !self.destroyed {
            self.events.push_back(EditorEvent::MouseMoved(event));
        }
    }

    // ----- lifecycle -----

    /// Close the document. Later host calls fail with [`HostError::DocumentDestroyed`].
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.events.push_back(EditorEvent::Destroyed);
    }

    /// Whether the document was closed.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    // ----- inspection -----

    /// Number of live markers.
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Buffer range of a marker.
    pub fn marker_range(&self, id: MarkerId) -> Option<Range> {
        self.markers
            .get(&id)
            .map(|m| Range::new(self.position_of(m.start), self.position_of(m.end)))
    }

    /// Kind of a marker.
    pub fn marker_kind(&self, id: MarkerId) -> Option<MarkerKind> {
        self.markers.get(&id).map(|m| m.kind)
    }

    /// Decorations painted on a marker.
    pub fn decorations(&self, id: MarkerId) -> &[Decoration] {
        self.markers
            .get(&id)
            .map(|m| m.decorations.as_slice())
            .unwrap_or(&[])
    }

    /// Live gutter lanes.
    pub fn gutter_lanes(&self) -> Vec<GutterLane> {
        self.gutters
            .iter()
            .map(|(id, g)| GutterLane {
                id: *id,
                name: g.name.clone(),
                priority: g.priority,
            })
            .collect()
    }

    /// Every row painted in `gutter`, sorted by line.
    pub fn gutter_rows(&self, gutter: GutterId) -> Vec<GutterRow> {
        let mut rows = Vec::new();
        for marker in self.markers.values() {
            let start = self.position_of(marker.start).line;
            let end = self.position_of(marker.end).line;
            for decoration in &marker.decorations {
                if decoration.target != DecorationTarget::Gutter(gutter) {
                    continue;
                }
                for line in start..=end {
                    rows.push(GutterRow {
                        line,
                        class: decoration.class.clone(),
                        item_class: decoration.item_class.clone().unwrap_or_default(),
                    });
                }
            }
        }
        rows.sort();
        rows
    }

    /// Every inline highlight, sorted by range.
    pub fn highlights(&self) -> Vec<(Range, String)> {
        let mut highlights: Vec<(Range, String)> = self
            .markers
            .iter()
            .flat_map(|(id, marker)| {
                let range = self.marker_range(*id).unwrap_or_default();
                marker
                    .decorations
                    .iter()
                    .filter(|d| d.target == DecorationTarget::Text)
                    .map(move |d| (range, d.class.clone()))
            })
            .collect();
        highlights.sort_by(|a, b| {
            a.0.start
                .cmp(&b.0.start)
                .then_with(|| a.0.end.cmp(&b.0.end))
                .then_with(|| a.1.cmp(&b.1))
        });
        highlights
    }

    /// Rendered tooltips with their anchors.
    pub fn tooltips(&self) -> Vec<(MarkerId, &TooltipContent)> {
        self.tooltips.iter().map(|(id, t)| (*id, t)).collect()
    }

    /// Number of queued events.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }
}

impl EditorHost for HeadlessEditor {
    fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn is_large_file(&self) -> bool {
        self.large_file
    }

    fn mark_buffer_range(&mut self, range: Range) -> Result<MarkerId, HostError> {
        self.ensure_alive()?;
        let id = MarkerId(self.allocate_id());
        let entry = MarkerEntry {
            start: self.offset_of(range.start),
            end: self.offset_of(range.end),
            kind: MarkerKind::Buffer,
            decorations: Vec::new(),
        };
        self.markers.insert(id, entry);
        Ok(id)
    }

    fn mark_screen_range(&mut self, range: Range) -> Result<MarkerId, HostError> {
        self.ensure_alive()?;
        let start = self.buffer_position_for_screen(range.start);
        let end = self.buffer_position_for_screen(range.end);
        let id = MarkerId(self.allocate_id());
        let entry = MarkerEntry {
            start: self.offset_of(start),
            end: self.offset_of(end),
            kind: MarkerKind::Screen,
            decorations: Vec::new(),
        };
        self.markers.insert(id, entry);
        Ok(id)
    }

    fn destroy_marker(&mut self, marker: MarkerId) -> Result<(), HostError> {
        self.ensure_alive()?;
        self.markers
            .remove(&marker)
            .ok_or(HostError::UnknownMarker(marker))?;
        self.tooltips.remove(&marker);
        Ok(())
    }

    fn marker_start_screen_position(&self, marker: MarkerId) -> Option<Position> {
        let entry = self.markers.get(&marker)?;
        Some(self.screen_position_for_buffer(self.position_of(entry.start)))
    }

    fn add_gutter(&mut self, name: &str, priority: i32) -> Result<GutterId, HostError> {
        self.ensure_alive()?;
        let id = GutterId(self.allocate_id());
        self.gutters.insert(
            id,
            GutterEntry {
                name: name.to_string(),
                priority,
            },
        );
        Ok(id)
    }

    fn destroy_gutter(&mut self, gutter: GutterId) -> Result<(), HostError> {
        self.ensure_alive()?;
        self.gutters
            .remove(&gutter)
            .ok_or(HostError::UnknownGutter(gutter))?;
        for marker in self.markers.values_mut() {
            marker
                .decorations
                .retain(|d| d.target != DecorationTarget::Gutter(gutter));
        }
        Ok(())
    }

    fn decorate_marker(&mut self, marker: MarkerId, decoration: Decoration) -> Result<(), HostError> {
        self.ensure_alive()?;
        if let DecorationTarget::Gutter(gutter) = decoration.target {
            if !self.gutters.contains_key(&gutter) {
                return Err(HostError::UnknownGutter(gutter));
            }
        }
        let entry = self
            .markers
            .get_mut(&marker)
            .ok_or(HostError::UnknownMarker(marker))?;
        entry.decorations.push(decoration);
        Ok(())
    }

    fn cursors(&self) -> Vec<CursorSnapshot> {
        if self.destroyed {
            return Vec::new();
        }
        self.cursors
            .keys()
            .map(|id| {
                let (head, tail) = self.cursor_positions(*id);
                CursorSnapshot {
                    id: *id,
                    buffer_position: head,
                    head: self.screen_position_for_buffer(head),
                    tail: self.screen_position_for_buffer(tail),
                }
            })
            .collect()
    }

    fn buffer_position_for_mouse(&self, event: &MouseEvent) -> Option<Position> {
        let (line, x) = self.metrics.cell_for_pixel(event.x, event.y)?;
        if line >= self.rope.len_lines() {
            return None;
        }
        Some(self.buffer_position_for_screen(Position::new(line, x)))
    }

    fn mouse_near_screen_position(&self, event: &MouseEvent, anchor: Position) -> bool {
        self.metrics
            .near_anchor(event.x, event.y, anchor.line, anchor.column)
    }

    fn show_tooltip(&mut self, anchor: MarkerId, content: TooltipContent) -> Result<(), HostError> {
        self.ensure_alive()?;
        if !self.markers.contains_key(&anchor) {
            return Err(HostError::UnknownMarker(anchor));
        }
        self.tooltips.insert(anchor, content);
        Ok(())
    }

    fn take_events(&mut self) -> Vec<EditorEvent> {
        self.events.drain(..).collect()
    }
}
