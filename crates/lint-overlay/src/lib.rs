#![warn(missing_docs)]
//! Lint Overlay - diagnostic annotations for a live editor document
//!
//! # Overview
//!
//! `lint-overlay` keeps lint diagnostics painted on one open document while the document, its
//! cursors and the mouse keep changing. It owns the lifecycle of everything it paints:
//!
//! - one range marker per diagnostic, highlighted inline and iconed in a gutter lane
//! - at most one gutter lane, recreated when its side or visibility changes
//! - exactly one "current line" gutter marker following the most recently moved selection
//! - at most one tooltip listing the diagnostics under the cursor or the mouse
//!
//! The crate does not render. All painting goes through the [`EditorHost`] trait, and all editor
//! activity comes back as [`EditorEvent`]s. `lint-overlay-headless` provides an in-memory host.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  AnnotationEngine (apply / events / config) │  ← Public API
//! ├──────────────────────┬──────────────────────┤
//! │  Input trackers      │  Tooltip controller  │  ← Debounced motion → tooltip
//! ├──────────────────────┼──────────────────────┤
//! │  Gutter controller   │  Current-line marker │  ← Gutter painting
//! ├──────────────────────┴──────────────────────┤
//! │  Marker store (message key → markers)       │  ← Ownership
//! ├─────────────────────────────────────────────┤
//! │  EditorHost (markers, gutters, decorations) │  ← Host editor
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Threading
//!
//! Everything runs on the host's event loop. Debouncing is deadline based: the host calls
//! [`AnnotationEngine::poll`] when [`AnnotationEngine::next_deadline`] passes.
//!
//! # Module Description
//!
//! - [`position`] - positions and ranges
//! - [`message`] - diagnostic messages and position filtering
//! - [`host`] - the editor interface and its events
//! - [`markers`] - message-keyed marker ownership
//! - [`gutter`] - gutter lane and message painting
//! - [`current_line`] - current-line highlight and cursor position cache
//! - [`tooltip`] - the positional tooltip
//! - [`debounce`] - leading/trailing call coalescing
//! - [`trackers`] - mouse and keyboard trackers
//! - [`config`] - user options
//! - [`engine`] - the composed engine

pub mod config;
pub mod current_line;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod gutter;
pub mod host;
pub mod markers;
pub mod message;
pub mod position;
pub mod tooltip;
pub mod trackers;

pub use config::{Config, ConfigChange, ConfigError, GutterPosition, TooltipFollows};
pub use current_line::{CurrentLineHighlighter, CurrentLineState, CursorPositionCache};
pub use debounce::{DebounceEdge, Debouncer};
pub use engine::{AnnotationEngine, DestroyCallback, SubscriptionId};
pub use error::EngineError;
pub use gutter::{GutterController, Paint};
pub use host::{
    CursorId, CursorSnapshot, Decoration, DecorationTarget, EditorEvent, EditorHost, GutterId,
    HostError, MarkerChange, MarkerId, MouseEvent, TooltipContent, TooltipMessage,
};
pub use markers::MarkerStore;
pub use message::{DiagnosticMessage, MessageLocation, Severity, messages_at};
pub use position::{Position, Range};
pub use tooltip::{Tooltip, TooltipController};
pub use trackers::{InputTrackers, KeyboardTracker, MouseResolution, MouseTracker};
