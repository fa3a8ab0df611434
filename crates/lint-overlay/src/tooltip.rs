//! The single positional tooltip.

use crate::config::Config;
use crate::host::{EditorHost, MarkerId, TooltipContent, TooltipMessage};
use crate::markers::MarkerStore;
use crate::message::{DiagnosticMessage, messages_at};
use crate::position::{Position, Range};
use std::path::Path;
use tracing::{debug, trace};

/// An open tooltip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    /// Marker the tooltip is anchored to.
    pub anchor: MarkerId,
    /// Buffer position the tooltip was opened for.
    pub position: Position,
    /// Keys of the listed messages, ordered.
    pub keys: Vec<String>,
}

impl Tooltip {
    /// Returns `true` if the tooltip still lists exactly the messages covering `position`.
    pub fn is_valid(&self, path: Option<&Path>, position: Position, store: &MarkerStore) -> bool {
        let covering = messages_at(store.messages(), path, position);
        covering.len() == self.keys.len()
            && covering
                .iter()
                .zip(&self.keys)
                .all(|(message, key)| message.key == *key)
    }
}

fn tooltip_message(message: &DiagnosticMessage, show_provider_name: bool) -> TooltipMessage {
    TooltipMessage {
        key: message.key.clone(),
        severity: message.severity,
        excerpt: message.excerpt.clone(),
        description: message.description.clone(),
        provider: (show_provider_name && !message.linter_name.is_empty())
            .then(|| message.linter_name.clone()),
    }
}

/// Owns at most one tooltip plus the suppression flag.
#[derive(Debug, Default)]
pub struct TooltipController {
    current: Option<Tooltip>,
    suppressed: bool,
}

impl TooltipController {
    /// Create a controller with no tooltip.
    pub fn new() -> Self {
        Self::default()
    }

    /// The open tooltip.
    pub fn current(&self) -> Option<&Tooltip> {
        self.current.as_ref()
    }

    /// Show, keep, replace or close the tooltip for a candidate `position`.
    pub fn update<H: EditorHost + ?Sized>(
        &mut self,
        host: &mut H,
        store: &mut MarkerStore,
        config: &Config,
        position: Option<Position>,
    ) {
        let Some(position) = position else {
            return;
        };
        if let Some(tooltip) = &self.current {
            if tooltip.is_valid(host.path(), position, store) {
                return;
            }
        }

        self.remove(host, store);
        if !config.show_tooltip || self.suppressed {
            return;
        }

        let content = {
            let messages = messages_at(store.messages(), host.path(), position);
            if messages.is_empty() {
                return;
            }
            TooltipContent {
                position,
                messages: messages
                    .into_iter()
                    .map(|m| tooltip_message(m, config.show_provider_name))
                    .collect(),
            }
        };

        let anchor = match host.mark_buffer_range(Range::point(position)) {
            Ok(anchor) => anchor,
            Err(err) => {
                debug!(%position, error = %err, "failed to anchor tooltip");
                return;
            }
        };
        let keys: Vec<String> = content.messages.iter().map(|m| m.key.clone()).collect();
        if let Err(err) = host.show_tooltip(anchor, content) {
            debug!(%position, error = %err, "failed to show tooltip");
            if let Err(err) = host.destroy_marker(anchor) {
                debug!(?anchor, error = %err, "ignoring anchor destroy failure");
            }
            return;
        }

        for key in &keys {
            store.save(key, anchor);
        }
        trace!(%position, messages = keys.len(), "tooltip shown");
        self.current = Some(Tooltip {
            anchor,
            position,
            keys,
        });
    }

    /// Close the tooltip by destroying its anchor.
    pub fn remove<H: EditorHost + ?Sized>(&mut self, host: &mut H, store: &mut MarkerStore) {
        let Some(tooltip) = self.current.take() else {
            return;
        };
        store.forget_marker(tooltip.anchor);
        if let Err(err) = host.destroy_marker(tooltip.anchor) {
            debug!(anchor = ?tooltip.anchor, error = %err, "ignoring anchor destroy failure");
        }
    }

    /// Forget the tooltip if its anchor is among `destroyed`.
    pub fn anchors_destroyed(&mut self, destroyed: &[MarkerId]) {
        if self
            .current
            .as_ref()
            .is_some_and(|tooltip| destroyed.contains(&tooltip.anchor))
        {
            self.current = None;
        }
    }

    /// Stop tooltips from opening until the next genuine cursor move.
    pub fn suppress(&mut self) {
        self.suppressed = true;
    }

    /// Allow tooltips to open again.
    pub fn clear_suppression(&mut self) {
        self.suppressed = false;
    }

    /// Whether tooltips are currently suppressed.
    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }
}
