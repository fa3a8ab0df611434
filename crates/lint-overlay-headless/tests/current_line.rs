use lint_overlay::{AnnotationEngine, Config, Position};
use lint_overlay_headless::HeadlessEditor;
use pretty_assertions::assert_eq;

const CARET: &str = "line-number cursor-line linter-cursor-line cursor-line-no-selection";
const SELECTION: &str = "line-number cursor-line linter-cursor-line";

fn engine() -> AnnotationEngine<HeadlessEditor> {
    AnnotationEngine::new(
        HeadlessEditor::new("alpha\nbravo\ncharlie\ndelta\necho\n"),
        Config::default(),
    )
}

fn cursor_line_rows(engine: &AnnotationEngine<HeadlessEditor>) -> Vec<(usize, String)> {
    let lane = engine.gutter().expect("gutter lane");
    engine
        .host()
        .gutter_rows(lane)
        .into_iter()
        .filter(|row| row.item_class.contains("linter-cursor-line"))
        .map(|row| (row.line, row.item_class))
        .collect()
}

#[test]
fn test_initial_cursor_is_painted() {
    let engine = engine();
    assert_eq!(cursor_line_rows(&engine), vec![(0, CARET.to_string())]);
}

#[test]
fn test_selection_ending_at_column_zero_skips_last_line() {
    let mut engine = engine();
    let cursor = engine.host().primary_cursor().unwrap();

    engine
        .host_mut()
        .select(cursor, Position::new(0, 0), Position::new(2, 0))
        .unwrap();
    engine.pump();
    assert_eq!(
        cursor_line_rows(&engine),
        vec![(0, SELECTION.to_string()), (1, SELECTION.to_string())]
    );

    engine
        .host_mut()
        .select(cursor, Position::new(0, 0), Position::new(2, 3))
        .unwrap();
    engine.pump();
    assert_eq!(
        cursor_line_rows(&engine),
        vec![
            (0, SELECTION.to_string()),
            (1, SELECTION.to_string()),
            (2, SELECTION.to_string()),
        ]
    );
}

#[test]
fn test_reversed_selection_paints_same_lines() {
    let mut engine = engine();
    let cursor = engine.host().primary_cursor().unwrap();

    engine
        .host_mut()
        .select(cursor, Position::new(3, 2), Position::new(1, 4))
        .unwrap();
    engine.pump();

    let lines: Vec<usize> = cursor_line_rows(&engine).into_iter().map(|(l, _)| l).collect();
    assert_eq!(lines, vec![1, 2, 3]);
}

#[test]
fn test_moving_within_a_line_keeps_the_marker() {
    let mut engine = engine();
    let cursor = engine.host().primary_cursor().unwrap();
    let marker = engine.current_line_marker();

    engine.host_mut().move_cursor(cursor, Position::new(0, 3)).unwrap();
    engine.pump();
    assert_eq!(engine.current_line_marker(), marker);

    engine.host_mut().move_cursor(cursor, Position::new(2, 1)).unwrap();
    engine.pump();
    assert_ne!(engine.current_line_marker(), marker);
    assert_eq!(cursor_line_rows(&engine), vec![(2, CARET.to_string())]);
}

#[test]
fn test_only_one_current_line_marker_exists() {
    let mut engine = engine();
    let first = engine.host().primary_cursor().unwrap();
    let second = engine.host_mut().add_cursor(Position::new(3, 1)).unwrap();
    engine.pump();
    assert_eq!(cursor_line_rows(&engine), vec![(3, CARET.to_string())]);

    engine.host_mut().move_cursor(first, Position::new(1, 0)).unwrap();
    engine.pump();
    assert_eq!(cursor_line_rows(&engine), vec![(1, CARET.to_string())]);

    engine.host_mut().move_cursor(second, Position::new(4, 2)).unwrap();
    engine.pump();
    assert_eq!(cursor_line_rows(&engine), vec![(4, CARET.to_string())]);
    assert_eq!(engine.host().marker_count(), 1);
}

#[test]
fn test_destroying_the_owning_cursor_removes_the_marker() {
    let mut engine = engine();
    let first = engine.host().primary_cursor().unwrap();
    let second = engine.host_mut().add_cursor(Position::new(3, 1)).unwrap();
    engine.pump();

    engine.host_mut().remove_cursor(first).unwrap();
    engine.pump();
    assert!(engine.current_line_marker().is_some());

    engine.host_mut().remove_cursor(second).unwrap();
    engine.pump();
    assert!(engine.current_line_marker().is_none());
    assert_eq!(engine.host().marker_count(), 0);
}

#[test]
fn test_wide_characters_map_screen_columns_back_to_lines() {
    let mut engine = AnnotationEngine::new(
        HeadlessEditor::new("名前 = 1\n\tvalue\nend\n"),
        Config::default(),
    );
    let cursor = engine.host().primary_cursor().unwrap();

    engine
        .host_mut()
        .select(cursor, Position::new(0, 1), Position::new(1, 3))
        .unwrap();
    engine.pump();

    let marker = engine.current_line_marker().unwrap();
    assert_eq!(
        engine.host().marker_range(marker),
        Some(lint_overlay::Range::new((0, 0), (1, 6)))
    );
}

#[test]
fn test_marker_follows_last_cursor_on_same_line() {
    let mut engine = engine();
    let first = engine.host().primary_cursor().unwrap();
    let second = engine.host_mut().add_cursor(Position::new(0, 3)).unwrap();
    engine.pump();
    engine.host_mut().move_cursor(second, Position::new(0, 4)).unwrap();
    engine.pump();
    let marker = engine.current_line_marker();
    assert!(marker.is_some());

    engine.host_mut().remove_cursor(first).unwrap();
    engine.pump();

    assert_eq!(engine.current_line_marker(), marker);
    assert_eq!(cursor_line_rows(&engine), vec![(0, CARET.to_string())]);
}
