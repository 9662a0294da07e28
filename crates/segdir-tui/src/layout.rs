//! Screen layout and measurement.
//!
//! ```text
//! title
//!  mark  mark  mark      <- marks strip (scrolls horizontally)
//! ───────────────────
//! ┌panel┐┌panel┐┌pan      <- segment row (scrolls on both axes)
//! ━━━━━━─────────────      <- segment scrollbar
//! status
//! ```

use ratatui::layout::{Constraint, Layout, Position, Rect};
use segdir_core::directory::LayoutMetrics;

use crate::common::text::wrap_lines;
use crate::state::AppState;

/// Blank columns left and right of the whole directory.
pub const MARGIN: u16 = 1;

/// Panel border thickness on each side.
pub const PANEL_BORDER: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryLayout {
    pub title: Rect,
    pub marks: Rect,
    pub rule: Rect,
    pub segments: Rect,
    pub scrollbar: Rect,
    pub status: Rect,
}

impl DirectoryLayout {
    pub fn new(area: Rect) -> Self {
        let inner = Rect {
            x: area.x + MARGIN.min(area.width / 2),
            width: area.width.saturating_sub(MARGIN * 2),
            ..area
        };
        let [title, marks, rule, segments, scrollbar, status] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);
        Self {
            title,
            marks,
            rule,
            segments,
            scrollbar,
            status,
        }
    }

    /// Index of the mark under a terminal cell, if any.
    pub fn hit_mark(&self, app: &AppState, column: u16, row: u16) -> Option<usize> {
        if !self.marks.contains(Position::new(column, row)) {
            return None;
        }
        app.directory.mark_at(usize::from(column - self.marks.x))
    }
}

/// Measures viewports and wrapped body heights for the directory reducer.
pub fn measure(layout: &DirectoryLayout, app: &AppState) -> LayoutMetrics {
    let segments_width = usize::from(layout.segments.width);
    let width = app.directory.options().panel_width(segments_width);
    let text_width = width.saturating_sub(usize::from(PANEL_BORDER * 2));
    LayoutMetrics {
        marks_width: usize::from(layout.marks.width),
        segments_width,
        segments_height: usize::from(layout.segments.height.saturating_sub(PANEL_BORDER * 2)),
        panel_heights: app
            .bodies
            .iter()
            .map(|body| wrap_lines(body, text_width).len())
            .collect(),
    }
}
