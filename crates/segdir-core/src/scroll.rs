//! Scroll position of one axis, with optional eased animation.
//!
//! Smooth scrolls decay the distance to the target by a fixed factor each
//! tick (exponential ease-out) and snap once the remainder is below half a
//! cell.

use serde::{Deserialize, Serialize};

/// How a scroll reaches its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    /// Animate toward the target over several ticks.
    #[default]
    Smooth,
    /// Jump to the target immediately.
    Instant,
}

/// Remaining distance (in cells) under which an animation snaps to its target.
const SNAP_DISTANCE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct ScrollAxis {
    /// Current (possibly fractional) position.
    position: f64,
    /// Where the axis is heading.
    target: usize,
    /// Fraction of the remaining distance covered per tick.
    speed: f64,
}

impl Default for ScrollAxis {
    fn default() -> Self {
        Self::new(0.35)
    }
}

impl ScrollAxis {
    pub fn new(speed: f64) -> Self {
        Self {
            position: 0.0,
            target: 0,
            speed: speed.clamp(0.05, 0.95),
        }
    }

    /// Rendered offset (rounded position).
    pub fn offset(&self) -> usize {
        self.position.round().max(0.0) as usize
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn is_animating(&self) -> bool {
        (self.position - self.target as f64).abs() > f64::EPSILON
    }

    /// Starts scrolling toward `target`.
    pub fn scroll_to(&mut self, target: usize, behavior: ScrollBehavior) {
        self.target = target;
        if behavior == ScrollBehavior::Instant {
            self.position = target as f64;
        }
    }

    /// Manual scroll by `delta` cells, clamped to `[0, max]`. Always instant
    /// and cancels any running animation.
    pub fn scroll_by(&mut self, delta: isize, max: usize) {
        let next = self.offset().saturating_add_signed(delta).min(max);
        self.scroll_to(next, ScrollBehavior::Instant);
    }

    /// Re-clamps after the content or viewport changed size.
    pub fn clamp(&mut self, max: usize) {
        if self.target > max {
            self.target = max;
        }
        if self.position > max as f64 {
            self.position = max as f64;
        }
    }

    /// Advances a running animation by one tick. Returns true while moving.
    pub fn tick(&mut self) -> bool {
        if !self.is_animating() {
            return false;
        }
        let target = self.target as f64;
        self.position += (target - self.position) * self.speed;
        if (target - self.position).abs() < SNAP_DISTANCE {
            self.position = target;
        }
        self.is_animating()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instant_scroll_jumps() {
        let mut axis = ScrollAxis::new(0.5);
        axis.scroll_to(40, ScrollBehavior::Instant);
        assert_eq!(axis.offset(), 40);
        assert!(!axis.is_animating());
        assert!(!axis.tick());
    }

    #[test]
    fn test_smooth_scroll_converges() {
        let mut axis = ScrollAxis::new(0.5);
        axis.scroll_to(40, ScrollBehavior::Smooth);
        assert_eq!(axis.offset(), 0);
        assert!(axis.is_animating());

        assert!(axis.tick());
        assert_eq!(axis.offset(), 20);

        let mut ticks = 1;
        while axis.tick() {
            ticks += 1;
            assert!(ticks < 32, "animation never settled");
        }
        assert_eq!(axis.offset(), 40);
    }

    #[test]
    fn test_scroll_by_clamps_and_stops_animation() {
        let mut axis = ScrollAxis::new(0.5);
        axis.scroll_to(10, ScrollBehavior::Instant);
        axis.scroll_to(30, ScrollBehavior::Smooth);
        axis.scroll_by(-20, 50);
        assert_eq!(axis.offset(), 0);
        assert!(!axis.is_animating());
        axis.scroll_by(100, 50);
        assert_eq!(axis.offset(), 50);
    }

    #[test]
    fn test_clamp_after_shrink() {
        let mut axis = ScrollAxis::new(0.5);
        axis.scroll_to(60, ScrollBehavior::Instant);
        axis.clamp(25);
        assert_eq!(axis.offset(), 25);
        assert_eq!(axis.target(), 25);
    }
}
