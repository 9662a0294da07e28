//! Events consumed by the directory reducer.

use crate::frame::FrameId;
use crate::transition::TransitionOutcome;

/// Measured sizes of the directory, in terminal cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutMetrics {
    /// Visible width of the marks strip.
    pub marks_width: usize,
    /// Visible width of the segment container.
    pub segments_width: usize,
    /// Visible height of the segment container.
    pub segments_height: usize,
    /// Rendered height of each segment body, index-aligned with the segments.
    pub panel_heights: Vec<usize>,
}

impl LayoutMetrics {
    /// True when any viewport dimension differs from `other`.
    pub fn resized_from(&self, other: &Self) -> bool {
        self.marks_width != other.marks_width
            || self.segments_width != other.segments_width
            || self.segments_height != other.segments_height
    }
}

#[derive(Debug, Clone)]
pub enum DirectoryEvent {
    /// User picked a mark (click or keyboard).
    Select(usize),
    /// The transition worker finished a request.
    Transition(TransitionOutcome),
    /// A requested frame was drawn.
    FrameReady(FrameId),
    /// Sizes measured for the frame about to be drawn.
    Layout(LayoutMetrics),
    /// Manual scroll of the marks strip.
    ScrollMarks(isize),
    /// Animation and observer tick.
    Tick,
    Teardown,
}
