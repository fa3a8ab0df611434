#![warn(missing_docs)]
//! Headless host for `lint-overlay`
//!
//! [`HeadlessEditor`] is a complete [`EditorHost`](lint_overlay::EditorHost) backed by a
//! [`ropey::Rope`]. It keeps markers and cursors attached to the text across edits, records the
//! gutters, decorations and tooltips the engine paints, and queues the events a live editor would
//! emit.
//!
//! # Example
//!
//! ```rust
//! use lint_overlay::{AnnotationEngine, Config, DiagnosticMessage, Position, Range, Severity};
//! use lint_overlay_headless::HeadlessEditor;
//!
//! let editor = HeadlessEditor::new("let x = 1;\nlet y = ;\n").with_path("/src/main.rs");
//! let mut engine = AnnotationEngine::new(editor, Config::default());
//!
//! let message = DiagnosticMessage::new(
//!     "syntax",
//!     Severity::Error,
//!     "expected expression",
//!     "/src/main.rs",
//!     Range::new((1, 8), (1, 9)),
//! );
//! engine.apply(&[message], &[]);
//!
//! let lane = engine.gutter().unwrap();
//! let rows = engine.host().gutter_rows(lane);
//! assert!(rows.iter().any(|row| row.line == 1 && row.item_class.contains("linter-gutter-error")));
//!
//! // Hover the error.
//! let event = engine.host().mouse_event_at_buffer(Position::new(1, 8));
//! engine.host_mut().move_mouse(event);
//! engine.pump();
//! assert_eq!(engine.host().tooltips().len(), 1);
//! ```

pub mod editor;
pub mod metrics;

pub use editor::{GutterLane, GutterRow, HeadlessEditor, MarkerKind};
pub use metrics::PixelMetrics;
