use lint_overlay::{
    AnnotationEngine, Config, ConfigChange, CursorSnapshot, Decoration, DiagnosticMessage,
    EditorEvent, EditorHost, GutterId, HostError, MarkerId, MouseEvent, Position, Range,
    Severity, TooltipContent, TooltipFollows,
};
use lint_overlay_headless::HeadlessEditor;
use pretty_assertions::assert_eq;
use std::cell::Cell;
use std::path::Path;
use std::time::{Duration, Instant};

const PATH: &str = "/project/src/main.rs";

fn document() -> String {
    (0..8)
        .map(|i| format!("line {i} {}", "x".repeat(24)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn message(key: &str, start: (usize, usize), end: (usize, usize)) -> DiagnosticMessage {
    DiagnosticMessage::new(key, Severity::Error, format!("{key} excerpt"), PATH, Range::new(start, end))
        .with_linter_name(format!("{key}-linter"))
}

fn engine(follows: TooltipFollows) -> AnnotationEngine<HeadlessEditor> {
    let config = Config {
        tooltip_follows: follows,
        ..Config::default()
    };
    AnnotationEngine::new(HeadlessEditor::new(&document()).with_path(PATH), config)
}

fn hover(engine: &mut AnnotationEngine<HeadlessEditor>, position: Position, now: Instant) {
    let event = engine.host().mouse_event_at_buffer(position);
    engine.host_mut().move_mouse(event);
    engine.pump_at(now);
}

fn tooltip_keys(engine: &AnnotationEngine<HeadlessEditor>) -> Vec<Vec<String>> {
    engine
        .host()
        .tooltips()
        .into_iter()
        .map(|(_, content)| content.messages.iter().map(|m| m.key.clone()).collect())
        .collect()
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

#[test]
fn test_mouse_hover_opens_tooltip() {
    let mut engine = engine(TooltipFollows::Mouse);
    engine.apply(&[message("a", (1, 4), (1, 12))], &[]);

    hover(&mut engine, Position::new(1, 6), Instant::now());

    assert_eq!(tooltip_keys(&engine), vec![vec!["a".to_string()]]);
    let (anchor, content) = engine.host().tooltips()[0];
    assert_eq!(content.position, Position::new(1, 6));
    assert_eq!(content.messages[0].excerpt, "a excerpt");
    assert_eq!(content.messages[0].provider.as_deref(), Some("a-linter"));
    assert_eq!(engine.host().marker_range(anchor), Some(Range::point(Position::new(1, 6))));
    assert_eq!(engine.tooltip().map(|t| t.anchor), Some(anchor));
}

#[test]
fn test_tooltip_lists_covering_messages_in_key_order() {
    let mut engine = engine(TooltipFollows::Mouse);
    let other_file = DiagnosticMessage::new(
        "c",
        Severity::Info,
        "elsewhere",
        "/project/src/other.rs",
        Range::new((1, 0), (1, 20)),
    );
    engine.apply(
        &[
            message("b", (1, 5), (1, 8)),
            message("a", (1, 0), (1, 20)),
            message("d", (3, 0), (3, 4)),
            other_file,
        ],
        &[],
    );

    hover(&mut engine, Position::new(1, 6), Instant::now());

    assert_eq!(
        tooltip_keys(&engine),
        vec![vec!["a".to_string(), "b".to_string()]]
    );
}

#[test]
fn test_provider_name_can_be_hidden() {
    let mut engine = engine(TooltipFollows::Mouse);
    engine.configure(ConfigChange::ShowProviderName(false));
    engine.apply(&[message("a", (1, 4), (1, 12))], &[]);

    hover(&mut engine, Position::new(1, 6), Instant::now());

    let (_, content) = engine.host().tooltips()[0];
    assert_eq!(content.messages[0].provider, None);
}

#[test]
fn test_mouse_burst_resolves_once_per_window() {
    let config = Config {
        tooltip_follows: TooltipFollows::Mouse,
        ..Config::default()
    };
    let host = CountingHost::new(HeadlessEditor::new(&document()).with_path(PATH));
    let mut engine = AnnotationEngine::new(host, config);
    let t0 = Instant::now();

    for i in 0..10u32 {
        let event = engine
            .host()
            .inner
            .mouse_event_at_buffer(Position::new(2, i as usize));
        engine.handle_event_at(EditorEvent::MouseMoved(event), t0 + ms(u64::from(i) * 25));
    }
    assert_eq!(engine.host().resolutions.get(), 1);
    assert_eq!(engine.cursor_position(), Some(Position::new(2, 0)));

    let event = engine.host().inner.mouse_event_at_buffer(Position::new(4, 4));
    engine.handle_event_at(EditorEvent::MouseMoved(event), t0 + ms(350));
    assert_eq!(engine.host().resolutions.get(), 2);
    assert_eq!(engine.cursor_position(), Some(Position::new(4, 4)));
}

#[test]
fn test_tooltip_is_kept_while_messages_match() {
    let mut engine = engine(TooltipFollows::Mouse);
    engine.apply(&[message("a", (1, 4), (1, 20))], &[]);
    let t0 = Instant::now();

    hover(&mut engine, Position::new(1, 5), t0);
    let anchor = engine.tooltip().map(|t| t.anchor);
    assert!(anchor.is_some());

    hover(&mut engine, Position::new(1, 15), t0 + ms(400));
    assert_eq!(engine.tooltip().map(|t| t.anchor), anchor);
    assert_eq!(engine.host().tooltips().len(), 1);
}

#[test]
fn test_moving_near_the_tooltip_keeps_it_open() {
    let mut engine = engine(TooltipFollows::Mouse);
    engine.apply(&[message("a", (1, 0), (1, 20))], &[]);
    let t0 = Instant::now();

    hover(&mut engine, Position::new(1, 2), t0);
    assert_eq!(engine.host().tooltips().len(), 1);

    // Line 2 sits inside the tooltip box rendered below the anchor.
    hover(&mut engine, Position::new(2, 3), t0 + ms(400));
    assert_eq!(engine.host().tooltips().len(), 1);
    assert_eq!(engine.cursor_position(), Some(Position::new(1, 2)));

    hover(&mut engine, Position::new(6, 3), t0 + ms(800));
    assert!(engine.host().tooltips().is_empty());
    assert!(engine.tooltip().is_none());
    assert_eq!(engine.cursor_position(), Some(Position::new(6, 3)));
}

#[test]
fn test_mouse_outside_text_area_is_ignored() {
    let mut engine = engine(TooltipFollows::Mouse);
    engine.apply(&[message("a", (1, 0), (1, 20))], &[]);

    let mut event = engine.host().mouse_event_at_buffer(Position::new(1, 2));
    event.in_text_area = false;
    engine.host_mut().move_mouse(event);
    engine.pump();

    assert!(engine.host().tooltips().is_empty());
    assert_eq!(engine.cursor_position(), None);
}

#[test]
fn test_large_file_never_resolves_mouse_position() {
    let mut engine = engine(TooltipFollows::Mouse);
    engine.apply(&[message("a", (1, 0), (1, 20))], &[]);
    engine.host_mut().set_large_file(true);

    hover(&mut engine, Position::new(1, 2), Instant::now());

    assert!(engine.host().tooltips().is_empty());
    assert_eq!(engine.cursor_position(), None);
}

#[test]
fn test_keyboard_tooltip_waits_for_cursor_to_settle() {
    let mut engine = engine(TooltipFollows::Keyboard);
    engine.apply(&[message("a", (0, 4), (0, 9))], &[]);
    let cursor = engine.host().primary_cursor().unwrap();
    let t0 = Instant::now();

    engine.host_mut().move_cursor(cursor, Position::new(0, 5)).unwrap();
    engine.pump_at(t0);
    engine.host_mut().move_cursor(cursor, Position::new(0, 6)).unwrap();
    engine.pump_at(t0 + ms(5));
    assert!(engine.host().tooltips().is_empty());
    assert_eq!(engine.next_deadline(), Some(t0 + ms(21)));

    engine.poll_at(t0 + ms(10));
    assert!(engine.host().tooltips().is_empty());

    engine.poll_at(t0 + ms(21));
    let (_, content) = engine.host().tooltips()[0];
    assert_eq!(content.position, Position::new(0, 6));
    assert_eq!(engine.next_deadline(), None);
}

#[test]
fn test_typing_suppresses_tooltip_until_cursor_really_moves() {
    let mut engine = engine(TooltipFollows::Keyboard);
    engine.apply(&[message("a", (0, 4), (0, 9))], &[]);
    let cursor = engine.host().primary_cursor().unwrap();
    let t0 = Instant::now();

    engine.host_mut().move_cursor(cursor, Position::new(0, 6)).unwrap();
    engine.pump_at(t0);
    engine.poll_at(t0 + ms(20));
    assert_eq!(engine.host().tooltips().len(), 1);

    // Typing moves the cursor and then changes the text.
    engine.host_mut().insert(Position::new(0, 6), "z").unwrap();
    engine.pump_at(t0 + ms(100));
    assert!(engine.is_tooltip_suppressed());
    assert!(engine.host().tooltips().is_empty());
    engine.poll_at(t0 + ms(120));
    assert!(engine.host().tooltips().is_empty());

    // Re-reporting the same position is not a move.
    engine.host_mut().touch_cursor(cursor).unwrap();
    engine.pump_at(t0 + ms(200));
    engine.poll_at(t0 + ms(220));
    assert!(engine.is_tooltip_suppressed());
    assert!(engine.host().tooltips().is_empty());

    engine.host_mut().move_cursor(cursor, Position::new(0, 5)).unwrap();
    engine.pump_at(t0 + ms(300));
    assert!(!engine.is_tooltip_suppressed());
    engine.poll_at(t0 + ms(320));
    assert_eq!(tooltip_keys(&engine), vec![vec!["a".to_string()]]);
    // The message range grew with the inserted character.
    assert_eq!(
        engine.message("a").and_then(DiagnosticMessage::range),
        Some(Range::new((0, 4), (0, 10)))
    );
}

#[test]
fn test_typing_does_not_suppress_mouse_tooltips() {
    let mut engine = engine(TooltipFollows::Mouse);
    engine.apply(&[message("a", (1, 0), (1, 20))], &[]);

    engine.host_mut().insert(Position::new(3, 0), "abc").unwrap();
    engine.pump();

    assert!(!engine.is_tooltip_suppressed());
    hover(&mut engine, Position::new(1, 2), Instant::now());
    assert_eq!(engine.host().tooltips().len(), 1);
}

#[test]
fn test_cursor_move_closes_mouse_tooltip() {
    let mut engine = engine(TooltipFollows::Mouse);
    engine.apply(&[message("a", (1, 0), (1, 20))], &[]);
    hover(&mut engine, Position::new(1, 2), Instant::now());
    assert_eq!(engine.host().tooltips().len(), 1);

    let cursor = engine.host().primary_cursor().unwrap();
    engine.host_mut().move_cursor(cursor, Position::new(5, 0)).unwrap();
    engine.pump();

    assert!(engine.host().tooltips().is_empty());
    assert!(engine.tooltip().is_none());
}

#[test]
fn test_switching_follow_mode_drops_pending_work() {
    let mut engine = engine(TooltipFollows::Both);
    engine.apply(&[message("a", (0, 4), (0, 9)), message("b", (1, 0), (1, 20))], &[]);
    let t0 = Instant::now();

    hover(&mut engine, Position::new(1, 2), t0);
    assert_eq!(engine.host().tooltips().len(), 1);

    let cursor = engine.host().primary_cursor().unwrap();
    engine.host_mut().move_cursor(cursor, Position::new(0, 6)).unwrap();
    engine.pump_at(t0 + ms(1));
    assert!(engine.next_deadline().is_some());

    engine.configure(ConfigChange::TooltipFollows(TooltipFollows::Mouse));
    assert!(engine.host().tooltips().is_empty());
    assert_eq!(engine.next_deadline(), None);

    engine.poll_at(t0 + ms(50));
    assert!(engine.host().tooltips().is_empty());
}

#[test]
fn test_never_mode_ignores_input() {
    let mut engine = engine(TooltipFollows::Never);
    engine.apply(&[message("a", (1, 0), (1, 20))], &[]);

    hover(&mut engine, Position::new(1, 2), Instant::now());
    let cursor = engine.host().primary_cursor().unwrap();
    engine.host_mut().move_cursor(cursor, Position::new(1, 3)).unwrap();
    engine.pump();
    engine.poll_at(Instant::now() + ms(100));

    assert!(engine.host().tooltips().is_empty());
}

#[test]
fn test_disabling_tooltips_closes_the_open_one() {
    let mut engine = engine(TooltipFollows::Mouse);
    engine.apply(&[message("a", (1, 0), (1, 20))], &[]);
    let t0 = Instant::now();
    hover(&mut engine, Position::new(1, 2), t0);
    assert_eq!(engine.host().tooltips().len(), 1);

    engine.configure(ConfigChange::ShowTooltip(false));
    assert!(engine.host().tooltips().is_empty());

    hover(&mut engine, Position::new(1, 12), t0 + ms(400));
    assert!(engine.host().tooltips().is_empty());
}

#[test]
fn test_apply_opens_tooltip_under_last_position() {
    let mut engine = engine(TooltipFollows::Mouse);
    hover(&mut engine, Position::new(2, 6), Instant::now());
    assert!(engine.host().tooltips().is_empty());

    engine.apply(&[message("a", (2, 0), (2, 10))], &[]);
    assert_eq!(tooltip_keys(&engine), vec![vec!["a".to_string()]]);
}

#[test]
fn test_removing_a_listed_message_refreshes_the_tooltip() {
    let mut engine = engine(TooltipFollows::Mouse);
    let a = message("a", (1, 0), (1, 20));
    let b = message("b", (1, 2), (1, 8));
    engine.apply(&[a.clone(), b], &[]);
    hover(&mut engine, Position::new(1, 4), Instant::now());
    let old_anchor = engine.tooltip().map(|t| t.anchor).unwrap();
    assert_eq!(engine.store().markers("b").len(), 2);

    engine.apply(&[], &[a]);

    assert_eq!(engine.host().marker_range(old_anchor), None);
    assert_eq!(tooltip_keys(&engine), vec![vec!["b".to_string()]]);
    let new_anchor = engine.tooltip().map(|t| t.anchor).unwrap();
    assert_ne!(new_anchor, old_anchor);
    assert_eq!(engine.store().markers("b").len(), 2);
    assert!(engine.store().markers("b").contains(&new_anchor));
}

#[test]
fn test_tooltip_anchor_is_not_iconed_after_gutter_rebuild() {
    let mut engine = engine(TooltipFollows::Mouse);
    engine.apply(&[message("a", (1, 0), (1, 20))], &[]);
    hover(&mut engine, Position::new(1, 2), Instant::now());
    let anchor = engine.tooltip().map(|t| t.anchor).unwrap();

    engine.configure(ConfigChange::ShowDecorations(false));
    engine.configure(ConfigChange::ShowDecorations(true));

    assert!(engine.host().decorations(anchor).is_empty());
    assert_eq!(engine.host().tooltips().len(), 1);
}

#[test]
fn test_pending_keyboard_work_is_dropped_on_dispose() {
    let mut engine = engine(TooltipFollows::Both);
    engine.apply(&[message("a", (0, 4), (0, 9))], &[]);
    let cursor = engine.host().primary_cursor().unwrap();
    let t0 = Instant::now();

    engine.host_mut().move_cursor(cursor, Position::new(0, 6)).unwrap();
    engine.pump_at(t0);
    assert!(engine.next_deadline().is_some());

    engine.dispose();
    assert_eq!(engine.next_deadline(), None);
    engine.poll_at(t0 + ms(50));

    let event = engine.host().mouse_event_at_buffer(Position::new(0, 6));
    engine.handle_event_at(EditorEvent::MouseMoved(event), t0 + ms(60));
    engine.host_mut().move_mouse(event);
    engine.pump_at(t0 + ms(400));

    assert!(engine.tooltip().is_none());
    assert!(engine.host().tooltips().is_empty());
    assert_eq!(engine.host().marker_count(), 0);
    assert_eq!(engine.next_deadline(), None);
}

/// Counts how often the engine asks the host to resolve a mouse position.
struct CountingHost {
    inner: HeadlessEditor,
    resolutions: Cell<usize>,
}

impl CountingHost {
    fn new(inner: HeadlessEditor) -> Self {
        Self {
            inner,
            resolutions: Cell::new(0),
        }
    }
}

impl EditorHost for CountingHost {
    fn path(&self) -> Option<&Path> {
        self.inner.path()
    }

    fn is_large_file(&self) -> bool {
        self.inner.is_large_file()
    }

    fn mark_buffer_range(&mut self, range: Range) -> Result<MarkerId, HostError> {
        self.inner.mark_buffer_range(range)
    }

    fn mark_screen_range(&mut self, range: Range) -> Result<MarkerId, HostError> {
        self.inner.mark_screen_range(range)
    }

    fn destroy_marker(&mut self, marker: MarkerId) -> Result<(), HostError> {
        self.inner.destroy_marker(marker)
    }

    fn marker_start_screen_position(&self, marker: MarkerId) -> Option<Position> {
        self.inner.marker_start_screen_position(marker)
    }

    fn add_gutter(&mut self, name: &str, priority: i32) -> Result<GutterId, HostError> {
        self.inner.add_gutter(name, priority)
    }

    fn destroy_gutter(&mut self, gutter: GutterId) -> Result<(), HostError> {
        self.inner.destroy_gutter(gutter)
    }

    fn decorate_marker(&mut self, marker: MarkerId, decoration: Decoration) -> Result<(), HostError> {
        self.inner.decorate_marker(marker, decoration)
    }

    fn cursors(&self) -> Vec<CursorSnapshot> {
        self.inner.cursors()
    }

    fn buffer_position_for_mouse(&self, event: &MouseEvent) -> Option<Position> {
        self.resolutions.set(self.resolutions.get() + 1);
        self.inner.buffer_position_for_mouse(event)
    }

    fn mouse_near_screen_position(&self, event: &MouseEvent, anchor: Position) -> bool {
        self.inner.mouse_near_screen_position(event, anchor)
    }

    fn show_tooltip(&mut self, anchor: MarkerId, content: TooltipContent) -> Result<(), HostError> {
        self.inner.show_tooltip(anchor, content)
    }

    fn take_events(&mut self) -> Vec<EditorEvent> {
        self.inner.take_events()
    }
}
