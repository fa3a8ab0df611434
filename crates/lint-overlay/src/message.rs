//! Diagnostic message data model.
//!
//! Messages are produced by linter providers and handed to
//! [`AnnotationEngine::apply`](crate::AnnotationEngine::apply) as add/remove deltas. The engine
//! stores them by [`DiagnosticMessage::key`] and only ever rewrites the recorded position of
//! position-bearing messages while the document is edited.

use crate::position::{Position, Range};
use std::fmt;
use std::path::{Path, PathBuf};

/// Diagnostic severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Error diagnostics.
    Error,
    /// Warning diagnostics.
    Warning,
    /// Informational diagnostics.
    Info,
}

impl Severity {
    /// Lowercase name, used to build style classes (`linter-error`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a message points to.
///
/// The two variants track the two message shapes providers emit. Older providers may omit the
/// range entirely; such messages are still stored by callers but never painted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLocation {
    /// Version 1 shape: optional file, optional range.
    Legacy {
        /// File the message belongs to, if any.
        file_path: Option<PathBuf>,
        /// Range in buffer coordinates, if any.
        range: Option<Range>,
    },
    /// Version 2 shape: always has a file and a position.
    ///
    /// The position follows the marker created for it as the document is edited.
    Located {
        /// File the message belongs to.
        file: PathBuf,
        /// Range in buffer coordinates.
        position: Range,
    },
}

/// A single lint finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    /// Stable unique key; equal keys denote the same finding.
    pub key: String,
    /// Message severity.
    pub severity: Severity,
    /// One-line summary.
    pub excerpt: String,
    /// Optional long-form description.
    pub description: Option<String>,
    /// Optional gutter icon name (without the `icon-` prefix).
    pub icon: Option<String>,
    /// Message location.
    pub location: MessageLocation,
    /// Name of the provider that produced the message.
    pub linter_name: String,
}

impl DiagnosticMessage {
    /// Create a position-bearing (version 2) message.
    pub fn new(
        key: impl Into<String>,
        severity: Severity,
        excerpt: impl Into<String>,
        file: impl Into<PathBuf>,
        position: Range,
    ) -> Self {
        Self {
            key: key.into(),
            severity,
            excerpt: excerpt.into(),
            description: None,
            icon: None,
            location: MessageLocation::Located {
                file: file.into(),
                position,
            },
            linter_name: String::new(),
        }
    }

    /// Set the provider name.
    pub fn with_linter_name(mut self, name: impl Into<String>) -> Self {
        self.linter_name = name.into();
        self
    }

    /// Set the gutter icon name.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Set the long-form description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Message shape version (1 for legacy messages, 2 for located ones).
    pub fn version(&self) -> u8 {
        match self.location {
            MessageLocation::Legacy { .. } => 1,
            MessageLocation::Located { .. } => 2,
        }
    }

    /// The document range this message covers, if it has one.
    pub fn range(&self) -> Option<Range> {
        match &self.location {
            MessageLocation::Legacy { range, .. } => *range,
            MessageLocation::Located { position, .. } => Some(*position),
        }
    }

    /// The file this message belongs to, if it names one.
    pub fn file_path(&self) -> Option<&Path> {
        match &self.location {
            MessageLocation::Legacy { file_path, .. } => file_path.as_deref(),
            MessageLocation::Located { file, .. } => Some(file.as_path()),
        }
    }

    /// Returns `true` if the message belongs to `path` and its range covers `position`.
    pub fn covers(&self, path: Option<&Path>, position: Position) -> bool {
        if self.file_path() != path {
            return false;
        }
        self.range().is_some_and(|range| range.contains(position))
    }

    /// Overwrite the recorded position of a located message. Legacy messages are left alone.
    pub(crate) fn sync_position(&mut self, range: Range) -> bool {
        match &mut self.location {
            MessageLocation::Located { position, .. } => {
                *position = range;
                true
            }
            MessageLocation::Legacy { .. } => false,
        }
    }
}

/// Return the messages whose range covers `position`, restricted to the document at `path`.
///
/// Diagnostics reported for other files (project-wide linters) never match.
pub fn messages_at<'a>(
    messages: impl IntoIterator<Item = &'a DiagnosticMessage>,
    path: Option<&Path>,
    position: Position,
) -> Vec<&'a DiagnosticMessage> {
    messages
        .into_iter()
        .filter(|message| message.covers(path, position))
        .collect()
}
