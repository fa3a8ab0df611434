//! Gutter lane ownership and message painting.

use crate::config::Config;
use crate::host::{Decoration, EditorHost, GutterId, MarkerId};
use crate::markers::MarkerStore;
use crate::message::DiagnosticMessage;
use tracing::{debug, warn};

/// Name of the gutter lane the engine creates.
pub const GUTTER_NAME: &str = "lint-overlay";

/// Icon used when a message does not name one.
pub const DEFAULT_ICON: &str = "primitive-dot";

/// Channels a message marker is painted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Paint {
    /// Inline highlight only.
    Text,
    /// Gutter icon only.
    Gutter,
    /// Both channels.
    #[default]
    Both,
}

impl Paint {
    fn text(self) -> bool {
        matches!(self, Paint::Text | Paint::Both)
    }

    fn gutter(self) -> bool {
        matches!(self, Paint::Gutter | Paint::Both)
    }
}

/// Inline highlight class for a message.
pub fn highlight_class(message: &DiagnosticMessage) -> String {
    format!("linter-highlight linter-{}", message.severity)
}

/// Gutter icon class for a message.
pub fn gutter_item_class(message: &DiagnosticMessage) -> String {
    format!(
        "linter-gutter linter-gutter-{} icon icon-{}",
        message.severity,
        message.icon.as_deref().unwrap_or(DEFAULT_ICON)
    )
}

/// Paint `marker` for `message` in the requested channels.
///
/// The gutter channel is skipped when there is no lane.
pub(crate) fn paint_marker<H: EditorHost + ?Sized>(
    host: &mut H,
    lane: Option<GutterId>,
    message: &DiagnosticMessage,
    marker: MarkerId,
    paint: Paint,
) {
    if paint.text() {
        if let Err(err) = host.decorate_marker(marker, Decoration::text(highlight_class(message))) {
            warn!(key = %message.key, error = %err, "failed to paint highlight");
        }
    }
    if let (true, Some(lane)) = (paint.gutter(), lane) {
        let decoration = Decoration::gutter(lane, "linter-row", gutter_item_class(message));
        if let Err(err) = host.decorate_marker(marker, decoration) {
            warn!(key = %message.key, error = %err, "failed to paint gutter icon");
        }
    }
}

/// Owns at most one gutter lane.
#[derive(Debug, Default)]
pub struct GutterController {
    lane: Option<GutterId>,
}

impl GutterController {
    /// Create a controller without a lane.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current lane.
    pub fn lane(&self) -> Option<GutterId> {
        self.lane
    }

    /// Recreate the lane from `config` and repaint every stored marker in it.
    ///
    /// Recreating the lane drops all decorations painted in the old one, so the repaint covers
    /// every marker in the store except `skip` (the open tooltip's anchor).
    pub fn update<H: EditorHost + ?Sized>(
        &mut self,
        host: &mut H,
        config: &Config,
        store: &MarkerStore,
        skip: Option<MarkerId>,
    ) {
        self.remove(host);
        if !config.show_decorations {
            return;
        }

        let priority = config.gutter_position.priority();
        let lane = match host.add_gutter(GUTTER_NAME, priority) {
            Ok(lane) => lane,
            Err(err) => {
                warn!(error = %err, "failed to add gutter lane");
                return;
            }
        };
        self.lane = Some(lane);
        debug!(?lane, priority, markers = store.marker_count(), "gutter lane created");

        for (message, marker) in store.iter_markers() {
            if Some(marker) == skip {
                continue;
            }
            paint_marker(host, self.lane, message, marker, Paint::Gutter);
        }
    }

    /// Destroy the lane, tolerating a document that is already gone.
    pub fn remove<H: EditorHost + ?Sized>(&mut self, host: &mut H) {
        if let Some(lane) = self.lane.take() {
            if let Err(err) = host.destroy_gutter(lane) {
                debug!(?lane, error = %err, "ignoring gutter destroy failure");
            }
        }
    }
}
