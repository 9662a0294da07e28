//! Horizontal scrollbar with a stable thumb size.
//!
//! ratatui's built-in scrollbar rounds both thumb ends separately, so the
//! thumb grows and shrinks while scrolling. Here the thumb length is computed
//! once and only its position moves.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;

const THUMB_SYMBOL: &str = "━";
const TRACK_SYMBOL: &str = "─";

#[derive(Debug, Clone)]
pub struct Scrollbar {
    /// Content length in cells.
    content: usize,
    /// Visible length in cells.
    viewport: usize,
    /// Current scroll offset (0 = leading edge).
    offset: usize,
    thumb_style: Style,
    track_style: Style,
}

impl Scrollbar {
    pub fn new(content: usize, viewport: usize, offset: usize) -> Self {
        Self {
            content,
            viewport,
            offset,
            thumb_style: Style::default(),
            track_style: Style::default(),
        }
    }

    #[must_use]
    pub fn thumb_style(mut self, style: Style) -> Self {
        self.thumb_style = style;
        self
    }

    #[must_use]
    pub fn track_style(mut self, style: Style) -> Self {
        self.track_style = style;
        self
    }

    fn should_display(&self) -> bool {
        self.content > self.viewport
    }

    /// Thumb start and length along a track of `track_len` cells.
    fn thumb(&self, track_len: usize) -> Option<(usize, usize)> {
        let max_scroll = self.content.saturating_sub(self.viewport);
        if !self.should_display() || track_len == 0 || max_scroll == 0 {
            return None;
        }
        let viewport = self.viewport.min(track_len);

        // Matches ratatui's thumb size at the leading position.
        let denom = self.content.saturating_sub(1).saturating_add(viewport);
        let thumb_len = if denom > 0 {
            let numerator = track_len as u64 * viewport as u64;
            let rounded = (numerator + (denom as u64 / 2)) / denom as u64;
            (rounded as usize).clamp(1, track_len)
        } else {
            track_len
        };

        // Reaches the trailing edge exactly at max scroll.
        let available = track_len.saturating_sub(thumb_len);
        let offset = self.offset.min(max_scroll);
        let start = ((offset as u64 * available as u64) / max_scroll as u64) as usize;
        Some((start, thumb_len))
    }
}

impl Widget for Scrollbar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some((start, len)) = self.thumb(area.width as usize) else {
            return;
        };
        let y = area.y;
        for (idx, x) in (area.x..area.x + area.width).enumerate() {
            let (symbol, style) = if idx >= start && idx < start + len {
                (THUMB_SYMBOL, self.thumb_style)
            } else {
                (TRACK_SYMBOL, self.track_style)
            };
            buf.set_string(x, y, symbol, style);
        }
    }
}
