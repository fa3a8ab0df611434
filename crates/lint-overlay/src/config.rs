//! User-facing configuration.
//!
//! The engine is created with a [`Config`] and then receives individual [`ConfigChange`]s
//! through [`AnnotationEngine::configure`](crate::AnnotationEngine::configure). Settings can be
//! loaded from the JSON blob a host stores them in:
//!
//! ```rust
//! use lint_overlay::{Config, GutterPosition, TooltipFollows};
//!
//! let config = Config::from_json_str(r#"{"gutterPosition": "Left", "tooltipFollows": "Mouse"}"#)
//!     .unwrap();
//! assert_eq!(config.gutter_position, GutterPosition::Left);
//! assert_eq!(config.tooltip_follows, TooltipFollows::Mouse);
//! assert!(config.show_tooltip);
//! ```

use serde::Deserialize;
use thiserror::Error;

/// Side of the line numbers the gutter lane is rendered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum GutterPosition {
    /// Left of the line numbers.
    Left,
    /// Right of the line numbers.
    #[default]
    Right,
}

impl GutterPosition {
    /// Gutter priority used by hosts that order lanes numerically.
    pub fn priority(&self) -> i32 {
        match self {
            GutterPosition::Left => -100,
            GutterPosition::Right => 100,
        }
    }
}

/// Which input moves the tooltip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum TooltipFollows {
    /// Only mouse hover opens tooltips.
    Mouse,
    /// Only the text cursor opens tooltips.
    Keyboard,
    /// Both mouse and cursor open tooltips.
    #[default]
    Both,
    /// Tooltips never follow input.
    Never,
}

impl TooltipFollows {
    /// Whether the mouse tracker should run.
    pub fn tracks_mouse(&self) -> bool {
        matches!(self, TooltipFollows::Mouse | TooltipFollows::Both)
    }

    /// Whether the keyboard tracker should run.
    pub fn tracks_keyboard(&self) -> bool {
        matches!(self, TooltipFollows::Keyboard | TooltipFollows::Both)
    }
}

/// Engine options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Show a tooltip for messages under the cursor or mouse.
    pub show_tooltip: bool,
    /// Paint the gutter lane.
    pub show_decorations: bool,
    /// Include the provider name in tooltips.
    pub show_provider_name: bool,
    /// Gutter side.
    pub gutter_position: GutterPosition,
    /// Tooltip trigger mode.
    pub tooltip_follows: TooltipFollows,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            show_tooltip: true,
            show_decorations: true,
            show_provider_name: true,
            gutter_position: GutterPosition::Right,
            tooltip_follows: TooltipFollows::Both,
        }
    }
}

/// Errors produced while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    /// The settings blob could not be parsed.
    Json(#[from] serde_json::Error),
}

/// A single option update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigChange {
    /// `showTooltip` changed.
    ShowTooltip(bool),
    /// `showDecorations` changed.
    ShowDecorations(bool),
    /// `showProviderName` changed.
    ShowProviderName(bool),
    /// `gutterPosition` changed.
    GutterPosition(GutterPosition),
    /// `tooltipFollows` changed.
    TooltipFollows(TooltipFollows),
}

impl Config {
    /// Parse settings from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Apply a change, returning `true` if the value actually changed.
    pub fn apply(&mut self, change: ConfigChange) -> bool {
        match change {
            ConfigChange::ShowTooltip(value) => replace(&mut self.show_tooltip, value),
            ConfigChange::ShowDecorations(value) => replace(&mut self.show_decorations, value),
            ConfigChange::ShowProviderName(value) => replace(&mut self.show_provider_name, value),
            ConfigChange::GutterPosition(value) => replace(&mut self.gutter_position, value),
            ConfigChange::TooltipFollows(value) => replace(&mut self.tooltip_follows, value),
        }
    }

    /// The changes that turn `self` into `other`.
    pub fn diff(&self, other: &Config) -> Vec<ConfigChange> {
        let mut changes = Vec::new();
        if self.show_tooltip != other.show_tooltip {
            changes.push(ConfigChange::ShowTooltip(other.show_tooltip));
        }
        if self.show_decorations != other.show_decorations {
            changes.push(ConfigChange::ShowDecorations(other.show_decorations));
        }
        if self.show_provider_name != other.show_provider_name {
            changes.push(ConfigChange::ShowProviderName(other.show_provider_name));
        }
        if self.gutter_position != other.gutter_position {
            changes.push(ConfigChange::GutterPosition(other.gutter_position));
        }
        if self.tooltip_follows != other.tooltip_follows {
            changes.push(ConfigChange::TooltipFollows(other.tooltip_follows));
        }
        changes
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}
