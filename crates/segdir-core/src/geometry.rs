//! One-dimensional scroll geometry.
//!
//! Both the marks strip and the segment row are laid out as a `Track`: a
//! sequence of spans along one axis, viewed through a viewport that scrolls
//! over the track. All offsets are in terminal cells.

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

/// Alignment of an item inside a scrolling viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    /// Leading edge of the item flush with the leading edge of the viewport.
    Start,
    /// Midpoint of the item on the midpoint of the viewport.
    #[default]
    Center,
    /// Trailing edge of the item flush with the trailing edge of the viewport.
    End,
    /// Scroll the minimum distance needed to reveal the item.
    Nearest,
}

/// A half-open interval `[start, start + len)` on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.start && pos < self.end()
    }

    /// Fraction of this span inside `[offset, offset + viewport)`.
    ///
    /// Zero-length spans count as fully visible when they sit inside the
    /// viewport (inclusive of its trailing edge).
    pub fn visible_ratio(&self, offset: usize, viewport: usize) -> f32 {
        let view_end = offset + viewport;
        if self.len == 0 {
            return if self.start >= offset && self.start <= view_end {
                1.0
            } else {
                0.0
            };
        }
        let lo = self.start.max(offset);
        let hi = self.end().min(view_end);
        if hi <= lo {
            return 0.0;
        }
        (hi - lo) as f32 / self.len as f32
    }
}

/// Largest valid scroll offset for a viewport over content.
pub fn max_offset(viewport: usize, content: usize) -> usize {
    content.saturating_sub(viewport)
}

/// Clamps an offset into `[0, max_offset]`.
pub fn clamp_offset(offset: usize, viewport: usize, content: usize) -> usize {
    offset.min(max_offset(viewport, content))
}

/// Scroll offset that places `item` inside the viewport with `align`.
///
/// `current` is only consulted by `Align::Nearest`. The result is clamped,
/// so items near the edges of the content end up as close to the requested
/// alignment as the content allows.
pub fn align_offset(
    item: Span,
    viewport: usize,
    content: usize,
    current: usize,
    align: Align,
) -> usize {
    let raw = match align {
        Align::Start => item.start,
        Align::Center => (2 * item.start + item.len).saturating_sub(viewport) / 2,
        Align::End => item.end().saturating_sub(viewport),
        Align::Nearest => {
            if item.start < current || item.len > viewport {
                item.start
            } else if item.end() > current + viewport {
                item.end() - viewport
            } else {
                current
            }
        }
    };
    clamp_offset(raw, viewport, content)
}

/// A sequence of spans laid out along one axis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Track {
    spans: Vec<Span>,
    len: usize,
}

impl Track {
    /// Lays out items of the given lengths with `gap` cells between them.
    pub fn from_lengths(lengths: impl IntoIterator<Item = usize>, gap: usize) -> Self {
        let mut spans = Vec::new();
        let mut cursor = 0usize;
        for len in lengths {
            if !spans.is_empty() {
                cursor += gap;
            }
            spans.push(Span::new(cursor, len));
            cursor += len;
        }
        Self { spans, len: cursor }
    }

    /// Lays out mark labels: each mark is its display width plus `padding`
    /// cells on both sides.
    pub fn from_marks<S: AsRef<str>>(marks: &[S], padding: usize, gap: usize) -> Self {
        Self::from_lengths(
            marks
                .iter()
                .map(|mark| UnicodeWidthStr::width(mark.as_ref()) + 2 * padding),
            gap,
        )
    }

    /// Lays out `count` equal panels back to back.
    pub fn uniform(count: usize, len: usize) -> Self {
        Self::from_lengths(std::iter::repeat_n(len, count), 0)
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn span(&self, index: usize) -> Option<Span> {
        self.spans.get(index).copied()
    }

    /// Total content length, including gaps.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Index of the item under a content-space position (gaps hit nothing).
    pub fn hit(&self, pos: usize) -> Option<usize> {
        let idx = self.spans.partition_point(|span| span.end() <= pos);
        self.spans
            .get(idx)
            .filter(|span| span.contains(pos))
            .map(|_| idx)
    }
}
