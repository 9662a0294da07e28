use crate::config::Config;
use crate::frame::FrameScheduler;
use crate::geometry::{Align, Span, Track, align_offset, max_offset};
use crate::observer::{FULL_VISIBILITY, IntersectionObserver};
use crate::scroll::{ScrollAxis, ScrollBehavior};
use crate::transition::TransitionRequest;
use crate::window::ObservableWindow;

use super::effects::DirectoryEffect;
use super::events::LayoutMetrics;

/// Blank cells on each side of a mark label.
pub const MARK_PADDING: usize = 1;

/// Presentation settings the reducer needs from `Config`.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryOptions {
    pub align_x: Align,
    pub align_y: Align,
    pub behavior: ScrollBehavior,
    /// Panel width in cells; 0 means one panel per container width.
    pub segment_width: usize,
    pub mark_gap: usize,
    pub smooth_speed: f64,
}

impl Default for DirectoryOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl DirectoryOptions {
    /// Width of one panel inside a container `container_width` cells wide.
    pub fn panel_width(&self, container_width: usize) -> usize {
        if self.segment_width > 0 {
            self.segment_width
        } else {
            container_width
        }
    }
}

impl From<&Config> for DirectoryOptions {
    fn from(config: &Config) -> Self {
        Self {
            align_x: config.align_x,
            align_y: config.align_y,
            behavior: config.behavior,
            segment_width: usize::from(config.segment_width),
            mark_gap: usize::from(config.mark_gap),
            smooth_speed: config.effective_smooth_speed(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No segments: nothing to activate.
    Inert,
    Idle,
    Transitioning {
        from: Option<usize>,
        to: usize,
        generation: u64,
    },
    TornDown,
}

/// State of one mounted directory.
///
/// The active index held here is the only source of truth for which mark
/// and panel are styled active; segment flags merely follow it.
#[derive(Debug)]
pub struct DirectoryState {
    pub(super) options: DirectoryOptions,
    pub(super) marks: Vec<String>,
    pub(super) strip: Track,
    pub(super) panels: Track,
    pub(super) layout: Option<LayoutMetrics>,
    pub(super) marks_scroll: ScrollAxis,
    pub(super) segments_scroll: ScrollAxis,
    pub(super) segments_scroll_y: ScrollAxis,
    pub(super) active: Option<usize>,
    pub(super) interacted: bool,
    pub(super) phase: Phase,
    pub(super) generation: u64,
    pub(super) window: Option<ObservableWindow>,
    pub(super) observer: IntersectionObserver,
    pub(super) frames: FrameScheduler,
    pub(super) corrections: u64,
}

impl DirectoryState {
    /// Mounts a directory over `marks` (one per segment, in order).
    ///
    /// `preactive` holds the segments' active flags at mount time. The first
    /// flagged segment becomes active, or the first segment if none is. The
    /// returned effects activate it and clear any other pre-set flag. This
    /// initial activation does not count as user interaction.
    pub fn mount<M: AsRef<str>>(
        options: DirectoryOptions,
        marks: &[M],
        preactive: &[bool],
    ) -> (Self, Vec<DirectoryEffect>) {
        let marks: Vec<String> = marks.iter().map(|m| m.as_ref().to_string()).collect();
        let strip = Track::from_marks(&marks, MARK_PADDING, options.mark_gap);
        let speed = options.smooth_speed;
        let mut state = Self {
            options,
            marks,
            strip,
            panels: Track::default(),
            layout: None,
            marks_scroll: ScrollAxis::new(speed),
            segments_scroll: ScrollAxis::new(speed),
            segments_scroll_y: ScrollAxis::new(speed),
            active: None,
            interacted: false,
            phase: Phase::Inert,
            generation: 0,
            window: None,
            observer: IntersectionObserver::new(),
            frames: FrameScheduler::default(),
            corrections: 0,
        };

        if state.marks.is_empty() {
            tracing::debug!("directory mounted without segments");
            return (state, vec![]);
        }

        let len = state.marks.len();
        let flagged = |i: usize| preactive.get(i).copied().unwrap_or(false);
        let initial = (0..len).find(|&i| flagged(i)).unwrap_or(0);
        let deactivate: Vec<usize> = (0..len).filter(|&i| i != initial && flagged(i)).collect();
        if !deactivate.is_empty() {
            tracing::warn!(?deactivate, initial, "several segments were pre-marked active");
        }

        state.active = Some(initial);
        state.generation = 1;
        state.phase = Phase::Transitioning {
            from: None,
            to: initial,
            generation: state.generation,
        };
        tracing::debug!(initial, segments = len, "directory mounted");

        let request = TransitionRequest {
            generation: state.generation,
            deactivate,
            activate: initial,
            previous: None,
        };
        (state, vec![DirectoryEffect::Transition(request)])
    }

    pub fn options(&self) -> &DirectoryOptions {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn marks(&self) -> &[String] {
        &self.marks
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.active == Some(index)
    }

    pub fn interacted(&self) -> bool {
        self.interacted
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_torn_down(&self) -> bool {
        self.phase == Phase::TornDown
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn window(&self) -> Option<ObservableWindow> {
        self.window
    }

    pub fn observer(&self) -> &IntersectionObserver {
        &self.observer
    }

    pub fn frames(&self) -> &FrameScheduler {
        &self.frames
    }

    /// Scroll corrections applied to the marks strip so far.
    pub fn corrections(&self) -> u64 {
        self.corrections
    }

    pub fn layout(&self) -> Option<&LayoutMetrics> {
        self.layout.as_ref()
    }

    /// Layout of the marks strip in content coordinates.
    pub fn strip(&self) -> &Track {
        &self.strip
    }

    /// Layout of the segment panels in content coordinates.
    pub fn panels(&self) -> &Track {
        &self.panels
    }

    pub fn marks_offset(&self) -> usize {
        self.marks_scroll.offset()
    }

    pub fn marks_scroll(&self) -> &ScrollAxis {
        &self.marks_scroll
    }

    pub fn segments_scroll(&self) -> &ScrollAxis {
        &self.segments_scroll
    }

    pub fn segments_scroll_y(&self) -> &ScrollAxis {
        &self.segments_scroll_y
    }

    pub fn segments_offset(&self) -> (usize, usize) {
        (
            self.segments_scroll.offset(),
            self.segments_scroll_y.offset(),
        )
    }

    pub fn is_animating(&self) -> bool {
        self.marks_scroll.is_animating()
            || self.segments_scroll.is_animating()
            || self.segments_scroll_y.is_animating()
    }

    /// Mark under `column` of the visible strip, if any.
    pub fn mark_at(&self, column: usize) -> Option<usize> {
        let viewport = self.layout.as_ref().map_or(0, |l| l.marks_width);
        if column >= viewport {
            return None;
        }
        self.strip.hit(self.marks_scroll.offset() + column)
    }

    /// Scroll behavior for programmatic scrolls: animated only once the user
    /// has picked a mark.
    pub(super) fn scroll_behavior(&self) -> ScrollBehavior {
        if self.interacted {
            self.options.behavior
        } else {
            ScrollBehavior::Instant
        }
    }

    pub(super) fn marks_viewport(&self) -> usize {
        self.layout.as_ref().map_or(0, |l| l.marks_width)
    }

    pub(super) fn marks_max_offset(&self) -> usize {
        max_offset(self.marks_viewport(), self.strip.len())
    }

    /// Stops the current observation, recomputes the window around the
    /// active mark and observes it at full visibility.
    pub(super) fn arm_window(&mut self) {
        self.observer.disconnect();
        self.window = self
            .active
            .and_then(|active| ObservableWindow::around(active, self.marks.len()));
        if let Some(window) = self.window {
            self.observer.observe(&window.members(), FULL_VISIBILITY);
            tracing::trace!(members = ?window.members(), "observable window armed");
        }
    }

    /// Scrolls the segment container so the active panel sits at the
    /// configured alignment on both axes.
    pub(super) fn align_segments(&mut self, behavior: ScrollBehavior) {
        let (Some(active), Some(layout)) = (self.active, self.layout.as_ref()) else {
            return;
        };
        let Some(panel) = self.panels.span(active) else {
            return;
        };

        let x = align_offset(
            panel,
            layout.segments_width,
            self.panels.len(),
            self.segments_scroll.offset(),
            self.options.align_x,
        );

        let height = layout.panel_heights.get(active).copied().unwrap_or(0);
        let content = layout.panel_heights.iter().copied().max().unwrap_or(0);
        let y = align_offset(
            Span::new(0, height),
            layout.segments_height,
            content,
            self.segments_scroll_y.offset(),
            self.options.align_y,
        );

        self.segments_scroll.scroll_to(x, behavior);
        self.segments_scroll_y.scroll_to(y, behavior);
    }

    /// Stores new measurements and relays out the panels. Returns true when
    /// a viewport dimension changed since the previous layout.
    pub(super) fn apply_layout(&mut self, metrics: LayoutMetrics) -> bool {
        let resized = self
            .layout
            .as_ref()
            .is_some_and(|previous| metrics.resized_from(previous));

        let panel_width = self.options.panel_width(metrics.segments_width);
        self.panels = Track::uniform(self.marks.len(), panel_width);

        let content_height = metrics.panel_heights.iter().copied().max().unwrap_or(0);
        self.marks_scroll
            .clamp(max_offset(metrics.marks_width, self.strip.len()));
        self.segments_scroll
            .clamp(max_offset(metrics.segments_width, self.panels.len()));
        self.segments_scroll_y
            .clamp(max_offset(metrics.segments_height, content_height));

        self.layout = Some(metrics);
        resized
    }
}
