//! The observable window: the active mark and its immediate neighbours.
//!
//! Only these marks are watched for visibility. When one of them stops being
//! fully visible, `correction_offset` decides where the marks strip goes.

use crate::geometry::{Align, Track, align_offset, clamp_offset};

/// Position of a mark inside the observable window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowRole {
    Active,
    Previous,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservableWindow {
    pub previous: Option<usize>,
    pub active: usize,
    pub next: Option<usize>,
}

impl ObservableWindow {
    /// Window around `active` in a list of `len` marks.
    ///
    /// Returns `None` when `active` is out of range. Neighbours past either
    /// end are absent.
    pub fn around(active: usize, len: usize) -> Option<Self> {
        if active >= len {
            return None;
        }
        Some(Self {
            previous: active.checked_sub(1),
            active,
            next: (active + 1 < len).then_some(active + 1),
        })
    }

    /// Watched marks, active first, then previous, then next.
    pub fn members(&self) -> Vec<usize> {
        std::iter::once(self.active)
            .chain(self.previous)
            .chain(self.next)
            .collect()
    }

    pub fn role_of(&self, index: usize) -> Option<WindowRole> {
        if index == self.active {
            Some(WindowRole::Active)
        } else if Some(index) == self.previous {
            Some(WindowRole::Previous)
        } else if Some(index) == self.next {
            Some(WindowRole::Next)
        } else {
            None
        }
    }

    /// Marks-strip offset that brings the window back into view after the
    /// mark with `role` left the viewport.
    ///
    /// - active hidden: align the active mark with `align`;
    /// - previous hidden: previous mark flush with the leading edge, as long
    ///   as the active mark stays fully visible;
    /// - next hidden: next mark flush with the trailing edge, under the same
    ///   condition.
    pub fn correction_offset(
        &self,
        role: WindowRole,
        strip: &Track,
        viewport: usize,
        current: usize,
        align: Align,
    ) -> Option<usize> {
        let active = strip.span(self.active)?;
        let content = strip.len();
        let offset = match role {
            WindowRole::Active => align_offset(active, viewport, content, current, align),
            WindowRole::Previous => {
                let previous = strip.span(self.previous?)?;
                previous.start.max(active.end().saturating_sub(viewport))
            }
            WindowRole::Next => {
                let next = strip.span(self.next?)?;
                next.end().saturating_sub(viewport).min(active.start)
            }
        };
        Some(clamp_offset(offset, viewport, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_in_the_middle() {
        let window = ObservableWindow::around(2, 5).unwrap();
        assert_eq!(window.members(), vec![2, 1, 3]);
        assert_eq!(window.role_of(1), Some(WindowRole::Previous));
        assert_eq!(window.role_of(3), Some(WindowRole::Next));
        assert_eq!(window.role_of(0), None);
    }

    #[test]
    fn test_window_at_edges_drops_missing_neighbours() {
        let first = ObservableWindow::around(0, 3).unwrap();
        assert_eq!(first.members(), vec![0, 1]);
        assert_eq!(first.previous, None);

        let last = ObservableWindow::around(2, 3).unwrap();
        assert_eq!(last.members(), vec![2, 1]);
        assert_eq!(last.next, None);

        let single = ObservableWindow::around(0, 1).unwrap();
        assert_eq!(single.members(), vec![0]);
    }

    #[test]
    fn test_window_out_of_range() {
        assert!(ObservableWindow::around(3, 3).is_none());
        assert!(ObservableWindow::around(0, 0).is_none());
    }

    #[test]
    fn test_members_always_within_bounds() {
        for len in 1..8 {
            for active in 0..len {
                let window = ObservableWindow::around(active, len).unwrap();
                assert!(window.members().iter().all(|&i| i < len));
                assert!(window.members().len() <= 3);
            }
        }
    }

    #[test]
    fn test_correction_for_previous_aligns_leading_edge() {
        // Ten marks of width 10, no gaps; viewport shows 30 cells.
        let strip = Track::from_lengths([10; 10], 0);
        let window = ObservableWindow::around(4, 10).unwrap();
        let offset = window
            .correction_offset(WindowRole::Previous, &strip, 30, 45, Align::Center)
            .unwrap();
        assert_eq!(offset, 30);
    }

    #[test]
    fn test_correction_for_next_aligns_trailing_edge() {
        let strip = Track::from_lengths([10; 10], 0);
        let window = ObservableWindow::around(4, 10).unwrap();
        let offset = window
            .correction_offset(WindowRole::Next, &strip, 30, 0, Align::Center)
            .unwrap();
        assert_eq!(offset, 30);
    }

    #[test]
    fn test_correction_keeps_active_visible_in_narrow_viewport() {
        // Viewport narrower than previous + active: the active mark wins.
        let strip = Track::from_lengths([10; 10], 0);
        let window = ObservableWindow::around(4, 10).unwrap();
        let offset = window
            .correction_offset(WindowRole::Previous, &strip, 15, 60, Align::Center)
            .unwrap();
        assert_eq!(offset, 35);
        let offset = window
            .correction_offset(WindowRole::Next, &strip, 15, 0, Align::Center)
            .unwrap();
        assert_eq!(offset, 40);
    }

    #[test]
    fn test_correction_for_active_uses_alignment() {
        let strip = Track::from_lengths([10; 10], 0);
        let window = ObservableWindow::around(4, 10).unwrap();
        let offset = window
            .correction_offset(WindowRole::Active, &strip, 30, 0, Align::Center)
            .unwrap();
        assert_eq!(offset, 30);
        let offset = window
            .correction_offset(WindowRole::Active, &strip, 30, 0, Align::Start)
            .unwrap();
        assert_eq!(offset, 40);
    }
}
