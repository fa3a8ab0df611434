//! The annotation engine.
//!
//! [`AnnotationEngine`] ties the marker store, the gutter, the current-line highlight, the
//! tooltip and the input trackers to one editor. It is driven entirely from the host's event
//! loop:
//!
//! 1. Diagnostics arrive via [`apply`](AnnotationEngine::apply) as add/remove deltas.
//! 2. Editor activity arrives via [`handle_event`](AnnotationEngine::handle_event) (or
//!    [`pump`](AnnotationEngine::pump) for hosts that queue events).
//! 3. Debounced cursor work is flushed by [`poll`](AnnotationEngine::poll); the host schedules
//!    the next call from [`next_deadline`](AnnotationEngine::next_deadline).
//! 4. Settings change through [`configure`](AnnotationEngine::configure).
//!
//! Once [`dispose`](AnnotationEngine::dispose) ran (explicitly, or because the host reported
//! [`EditorEvent::Destroyed`]) every entry point is a no-op.

use crate::config::{Config, ConfigChange, TooltipFollows};
use crate::current_line::{CurrentLineHighlighter, CursorPositionCache};
use crate::error::EngineError;
use crate::gutter::{GutterController, Paint, paint_marker};
use crate::host::{CursorId, EditorEvent, EditorHost, GutterId, MarkerChange, MarkerId, MouseEvent};
use crate::markers::MarkerStore;
use crate::message::DiagnosticMessage;
use crate::position::{Position, Range};
use crate::tooltip::{Tooltip, TooltipController};
use crate::trackers::{InputTrackers, MouseResolution, resolve_mouse};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, trace, warn};

/// Callback fired once when the engine is disposed.
pub type DestroyCallback = Box<dyn FnOnce()>;

/// Handle returned by [`AnnotationEngine::on_did_destroy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Overlays diagnostics on one editor.
pub struct AnnotationEngine<H: EditorHost> {
    host: H,
    config: Config,
    store: MarkerStore,
    gutter: GutterController,
    current_line: CurrentLineHighlighter,
    tooltip: TooltipController,
    trackers: InputTrackers,
    cursor_positions: CursorPositionCache,
    // Markers created by `apply`, for position tracking.
    message_markers: HashMap<MarkerId, String>,
    cursor_position: Option<Position>,
    destroy_callbacks: Vec<(SubscriptionId, DestroyCallback)>,
    next_subscription: u64,
    disposed: bool,
}

impl<H: EditorHost> AnnotationEngine<H> {
    /// Bind an engine to `host`.
    ///
    /// Creates the gutter lane (if enabled), subscribes to the existing cursors and installs the
    /// input trackers for the configured mode.
    pub fn new(host: H, config: Config) -> Self {
        let mut engine = Self {
            host,
            config,
            store: MarkerStore::new(),
            gutter: GutterController::new(),
            current_line: CurrentLineHighlighter::new(),
            tooltip: TooltipController::new(),
            trackers: InputTrackers::for_mode(config.tooltip_follows),
            cursor_positions: CursorPositionCache::new(),
            message_markers: HashMap::new(),
            cursor_position: None,
            destroy_callbacks: Vec::new(),
            next_subscription: 0,
            disposed: false,
        };

        engine
            .gutter
            .update(&mut engine.host, &engine.config, &engine.store, None);
        for cursor in engine.host.cursors() {
            engine.cursor_positions.reset(cursor.id, cursor.buffer_position);
            engine.current_line.observe_cursor(
                &mut engine.host,
                engine.gutter.lane(),
                cursor.id,
                cursor.head,
                cursor.tail,
            );
        }
        engine
    }

    /// Reconcile the painted markers with a diagnostics delta.
    ///
    /// Removals are processed before additions, so a key present in both lists is replaced
    /// without ever being painted twice. Messages without a resolvable range are skipped.
    pub fn apply(&mut self, added: &[DiagnosticMessage], removed: &[DiagnosticMessage]) {
        if self.disposed {
            debug!("apply on disposed engine ignored");
            return;
        }

        for message in removed {
            self.destroy_marker(&message.key);
        }

        for message in added {
            let Some(range) = message.range() else {
                trace!(key = %message.key, "skipping message without a range");
                continue;
            };
            if self.store.message(&message.key).is_some() {
                debug!(key = %message.key, "replacing message added twice");
                self.destroy_marker(&message.key);
            }
            if let Err(err) = self.add_message(message, range) {
                warn!(key = %message.key, error = %err, "failed to mark message");
            }
        }

        self.store.check_invariants();
        debug!(
            added = added.len(),
            removed = removed.len(),
            messages = self.store.len(),
            "diagnostics applied"
        );
        self.update_tooltip(self.cursor_position);
    }

    fn add_message(&mut self, message: &DiagnosticMessage, range: Range) -> Result<(), EngineError> {
        let marker = self.host.mark_buffer_range(range)?;
        self.message_markers.insert(marker, message.key.clone());
        self.decorate_marker(message.clone(), marker, Paint::Both);
        Ok(())
    }

    /// Record `marker` for `message` and paint it in the requested channels.
    ///
    /// The gutter channel is only painted while a gutter lane exists.
    pub fn decorate_marker(&mut self, message: DiagnosticMessage, marker: MarkerId, paint: Paint) {
        if self.disposed {
            return;
        }
        paint_marker(&mut self.host, self.gutter.lane(), &message, marker, paint);
        self.store.insert(message, marker);
    }

    /// Destroy every marker of `key` (including a tooltip anchored for it) and forget the
    /// message. Absent keys are ignored.
    pub fn destroy_marker(&mut self, key: &str) {
        let destroyed = self.store.destroy(&mut self.host, key);
        for marker in &destroyed {
            self.message_markers.remove(marker);
        }
        if let Some(anchor) = self.tooltip.current().map(|tooltip| tooltip.anchor) {
            if destroyed.contains(&anchor) {
                self.store.forget_marker(anchor);
                self.tooltip.anchors_destroyed(&destroyed);
            }
        }
    }

    /// Handle an editor event now.
    pub fn handle_event(&mut self, event: EditorEvent) {
        self.handle_event_at(event, Instant::now());
    }

    /// Handle an editor event that happened at `now`.
    pub fn handle_event_at(&mut self, event: EditorEvent, now: Instant) {
        if self.disposed {
            trace!(?event, "event on disposed engine ignored");
            return;
        }
        match event {
            EditorEvent::CursorAdded {
                cursor,
                buffer_position,
                head,
                tail,
            } => {
                self.cursor_positions.reset(cursor, buffer_position);
                self.current_line.observe_cursor(
                    &mut self.host,
                    self.gutter.lane(),
                    cursor,
                    head,
                    tail,
                );
            }
            EditorEvent::SelectionChanged { cursor, head, tail } => {
                self.current_line.selection_changed(
                    &mut self.host,
                    self.gutter.lane(),
                    cursor,
                    head,
                    tail,
                );
            }
            EditorEvent::CursorPositionChanged { cursor, position } => {
                self.cursor_moved(cursor, position, now);
            }
            EditorEvent::CursorDestroyed(cursor) => {
                self.cursor_positions.remove(cursor);
                self.current_line.cursor_destroyed(&mut self.host, cursor);
            }
            EditorEvent::TextChanged => self.text_changed(),
            EditorEvent::MouseMoved(event) => self.mouse_moved(event, now),
            EditorEvent::MarkerChanged(change) => self.marker_changed(change),
            EditorEvent::Destroyed => self.dispose(),
        }
    }

    /// Drain and handle the host's queued events.
    pub fn pump(&mut self) {
        self.pump_at(Instant::now());
    }

    /// Drain and handle the host's queued events as if they happened at `now`.
    pub fn pump_at(&mut self, now: Instant) {
        if self.disposed {
            return;
        }
        for event in self.host.take_events() {
            self.handle_event_at(event, now);
        }
    }

    /// Run debounced work that is due.
    pub fn poll(&mut self) {
        self.poll_at(Instant::now());
    }

    /// Run debounced work that is due at `now`.
    pub fn poll_at(&mut self, now: Instant) {
        if self.disposed {
            return;
        }
        let settled = self
            .trackers
            .keyboard
            .as_mut()
            .and_then(|keyboard| keyboard.poll(now));
        if let Some(position) = settled {
            self.cursor_position = Some(position);
            self.update_tooltip(Some(position));
        }
    }

    /// When [`poll`](Self::poll) should run next.
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.disposed {
            return None;
        }
        self.trackers.deadline()
    }

    fn cursor_moved(&mut self, cursor: CursorId, position: Position, now: Instant) {
        if let Some(keyboard) = self.trackers.keyboard.as_mut() {
            keyboard.track(position, now);
        }
        if self.cursor_positions.observe(cursor, position) {
            self.tooltip.clear_suppression();
        }
        if self.config.tooltip_follows == TooltipFollows::Mouse {
            self.remove_tooltip();
        }
    }

    fn text_changed(&mut self) {
        for cursor in self.host.cursors() {
            self.cursor_positions
                .reset(cursor.id, cursor.buffer_position);
        }
        if self.config.tooltip_follows != TooltipFollows::Mouse {
            self.tooltip.suppress();
            self.remove_tooltip();
        }
    }

    fn mouse_moved(&mut self, event: MouseEvent, now: Instant) {
        let Some(mouse) = self.trackers.mouse.as_mut() else {
            return;
        };
        let Some(event) = mouse.track(event, now) else {
            return;
        };
        let anchor = self.tooltip.current().map(|tooltip| tooltip.anchor);
        match resolve_mouse(&self.host, anchor, &event) {
            MouseResolution::Ignore => {}
            MouseResolution::Position(position) => {
                self.cursor_position = position;
                self.tooltip.clear_suppression();
                match position {
                    Some(position) => self.update_tooltip(Some(position)),
                    None => self.remove_tooltip(),
                }
            }
        }
    }

    fn marker_changed(&mut self, change: MarkerChange) {
        if change.is_stale() {
            return;
        }
        let Some(key) = self.message_markers.get(&change.marker) else {
            return;
        };
        if let Some(message) = self.store.message_mut(key) {
            if message.sync_position(change.new_range) {
                trace!(key = %message.key, range = %change.new_range, "message position synced");
            }
        }
    }

    fn update_tooltip(&mut self, position: Option<Position>) {
        self.tooltip
            .update(&mut self.host, &mut self.store, &self.config, position);
    }

    fn remove_tooltip(&mut self) {
        self.tooltip.remove(&mut self.host, &mut self.store);
    }

    fn update_gutter(&mut self) {
        let anchor = self.tooltip.current().map(|tooltip| tooltip.anchor);
        self.gutter
            .update(&mut self.host, &self.config, &self.store, anchor);
        self.current_line.repaint(&mut self.host, self.gutter.lane());
    }

    /// Apply one configuration change synchronously.
    pub fn configure(&mut self, change: ConfigChange) {
        if self.disposed || !self.config.apply(change) {
            return;
        }
        debug!(?change, "configuration changed");
        match change {
            ConfigChange::ShowTooltip(false) => self.remove_tooltip(),
            ConfigChange::ShowTooltip(true) | ConfigChange::ShowProviderName(_) => {}
            ConfigChange::ShowDecorations(_) | ConfigChange::GutterPosition(_) => {
                self.update_gutter()
            }
            ConfigChange::TooltipFollows(follows) => {
                self.trackers = InputTrackers::for_mode(follows);
                self.remove_tooltip();
            }
        }
    }

    /// Move to `config`, applying each differing option in turn.
    pub fn reconfigure(&mut self, config: Config) {
        for change in self.config.diff(&config) {
            self.configure(change);
        }
    }

    /// Register a callback fired once when the engine is disposed.
    pub fn on_did_destroy<F>(&mut self, callback: F) -> Result<SubscriptionId, EngineError>
    where
        F: FnOnce() + 'static,
    {
        if self.disposed {
            return Err(EngineError::Disposed);
        }
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.destroy_callbacks.push((id, Box::new(callback)));
        Ok(id)
    }

    /// Unregister a destroy callback. Returns `false` if it was not registered.
    pub fn off_did_destroy(&mut self, id: SubscriptionId) -> bool {
        let before = self.destroy_callbacks.len();
        self.destroy_callbacks.retain(|(sub, _)| *sub != id);
        self.destroy_callbacks.len() != before
    }

    /// Tear everything down.
    ///
    /// Destroy callbacks run first; then the trackers, cursor subscriptions, current-line
    /// marker, tooltip, message markers and gutter lane are destroyed. Later calls are no-ops.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        for (_, callback) in std::mem::take(&mut self.destroy_callbacks) {
            callback();
        }
        self.disposed = true;

        self.trackers = InputTrackers::default();
        self.current_line.clear(&mut self.host);
        self.cursor_positions.clear();
        self.remove_tooltip();
        let destroyed = self.store.destroy_all(&mut self.host);
        self.message_markers.clear();
        self.gutter.remove(&mut self.host);
        self.cursor_position = None;
        debug!(markers = destroyed.len(), "annotation engine disposed");
    }

    /// Whether [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// The host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The host, mutably. Events it queues are picked up by [`pump`](Self::pump).
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The marker store.
    pub fn store(&self) -> &MarkerStore {
        &self.store
    }

    /// Tracked messages, ordered by key.
    pub fn messages(&self) -> impl Iterator<Item = &DiagnosticMessage> {
        self.store.messages()
    }

    /// The message stored under `key`.
    pub fn message(&self, key: &str) -> Option<&DiagnosticMessage> {
        self.store.message(key)
    }

    /// Number of markers held by the store. A tooltip anchor counts once per message it lists.
    pub fn marker_count(&self) -> usize {
        self.store.marker_count()
    }

    /// The open tooltip.
    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.current()
    }

    /// Whether tooltips are suppressed after an edit.
    pub fn is_tooltip_suppressed(&self) -> bool {
        self.tooltip.is_suppressed()
    }

    /// The gutter lane.
    pub fn gutter(&self) -> Option<GutterId> {
        self.gutter.lane()
    }

    /// The current-line marker.
    pub fn current_line_marker(&self) -> Option<MarkerId> {
        self.current_line.marker()
    }

    /// Last candidate tooltip position (from the mouse or the cursor).
    pub fn cursor_position(&self) -> Option<Position> {
        self.cursor_position
    }
}
