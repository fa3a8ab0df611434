//! Cell widths and pixel geometry.
//!
//! Screen columns count display cells: wide characters take two cells and tabs advance to the
//! next tab stop. Screen lines equal buffer lines (no soft wrapping).

use unicode_width::UnicodeWidthChar;

/// Default tab width (in cells).
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Extra pixels around the tooltip box that still count as hovering it.
pub const TOOLTIP_SLACK: f32 = 15.0;

/// Visual width of a character (UAX #11). Control characters count as one cell.
pub fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(1)
}

/// Width of `ch` when it starts at cell `x`, expanding tabs.
pub fn cell_width_at(ch: char, x: usize, tab_width: usize) -> usize {
    if ch == '\t' {
        let tab_width = tab_width.max(1);
        tab_width - x % tab_width
    } else {
        char_width(ch)
    }
}

/// Cell offset of character `column` within `line`.
pub fn visual_x_for_column(line: &str, column: usize, tab_width: usize) -> usize {
    let mut x = 0usize;
    for ch in line.chars().take(column) {
        x = x.saturating_add(cell_width_at(ch, x, tab_width));
    }
    x
}

/// Character column at cell offset `x` within `line`.
///
/// Cells inside a wide character or a tab resolve to that character. Offsets past the end of the
/// line resolve to the line length.
pub fn column_for_visual_x(line: &str, x: usize, tab_width: usize) -> usize {
    let mut cell = 0usize;
    for (column, ch) in line.chars().enumerate() {
        let width = cell_width_at(ch, cell, tab_width);
        if x < cell.saturating_add(width.max(1)) {
            return column;
        }
        cell = cell.saturating_add(width);
    }
    line.chars().count()
}

/// Pixel metrics used to resolve mouse events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelMetrics {
    /// Height of one line.
    pub line_height: f32,
    /// Width of one cell.
    pub char_width: f32,
    /// Width of a rendered tooltip.
    pub tooltip_width: f32,
    /// Height of a rendered tooltip.
    pub tooltip_height: f32,
}

impl Default for PixelMetrics {
    fn default() -> Self {
        Self {
            line_height: 20.0,
            char_width: 8.0,
            tooltip_width: 320.0,
            tooltip_height: 60.0,
        }
    }
}

impl PixelMetrics {
    /// Top-left pixel of a screen cell.
    pub fn pixel_for_cell(&self, line: usize, x: usize) -> (f32, f32) {
        (x as f32 * self.char_width, line as f32 * self.line_height)
    }

    /// Screen cell under a pixel, or `None` for negative coordinates.
    pub fn cell_for_pixel(&self, px: f32, py: f32) -> Option<(usize, usize)> {
        if px < 0.0 || py < 0.0 {
            return None;
        }
        let line = (py / self.line_height).floor() as usize;
        let x = (px / self.char_width).floor() as usize;
        Some((line, x))
    }

    /// Whether a pointer at `(px, py)` hovers the cell of an anchor at `(anchor_line, anchor_x)`
    /// or the tooltip box rendered below it.
    pub fn near_anchor(&self, px: f32, py: f32, anchor_line: usize, anchor_x: usize) -> bool {
        let (ax, ay) = self.pixel_for_cell(anchor_line, anchor_x);
        let dx = px - ax;
        let dy = py - ay;
        if dy < 0.0 || dx < -TOOLTIP_SLACK {
            return false;
        }
        if dy < self.line_height {
            return dx <= self.char_width + TOOLTIP_SLACK;
        }
        dy <= self.line_height + self.tooltip_height + TOOLTIP_SLACK
            && dx <= self.tooltip_width + TOOLTIP_SLACK
    }
}
