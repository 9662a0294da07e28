//! Visibility observer for marks in the strip.
//!
//! Mirrors the semantics of a browser intersection observer, driven by
//! polling: `observe` starts a subscription over a set of marks, the first
//! `poll` afterwards reports every target, later polls report only targets
//! whose intersecting state flipped. `disconnect` (or cancelling the returned
//! `Subscription`) stops all delivery.

use tokio_util::sync::CancellationToken;

use crate::geometry::Track;

/// Threshold at which a mark only counts as intersecting when every cell of
/// it is inside the viewport.
pub const FULL_VISIBILITY: f32 = 1.0;

/// Cancellable handle for an active observation.
#[derive(Debug, Clone)]
pub struct Subscription {
    token: CancellationToken,
}

impl Subscription {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub target: usize,
    pub ratio: f32,
    pub is_intersecting: bool,
}

#[derive(Debug, Default)]
pub struct IntersectionObserver {
    /// Watched marks with the last state reported for each.
    targets: Vec<(usize, Option<bool>)>,
    threshold: f32,
    subscription: Option<Subscription>,
    /// Number of non-empty deliveries so far.
    deliveries: u64,
}

impl IntersectionObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts watching `targets`, replacing any previous observation.
    pub fn observe(&mut self, targets: &[usize], threshold: f32) -> Subscription {
        self.disconnect();
        let mut watched: Vec<(usize, Option<bool>)> = Vec::with_capacity(targets.len());
        for &target in targets {
            if !watched.iter().any(|(t, _)| *t == target) {
                watched.push((target, None));
            }
        }
        self.targets = watched;
        self.threshold = threshold.clamp(0.0, 1.0);
        let subscription = Subscription {
            token: CancellationToken::new(),
        };
        self.subscription = Some(subscription.clone());
        subscription
    }

    /// Stops watching everything. Safe to call when idle.
    pub fn disconnect(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }
        self.targets.clear();
    }

    pub fn is_observing(&self) -> bool {
        !self.targets.is_empty()
            && self
                .subscription
                .as_ref()
                .is_some_and(|s| !s.is_cancelled())
    }

    pub fn targets(&self) -> Vec<usize> {
        self.targets.iter().map(|(t, _)| *t).collect()
    }

    pub fn deliveries(&self) -> u64 {
        self.deliveries
    }

    /// Measures every watched mark against the viewport and returns the
    /// entries whose state changed since the last poll.
    pub fn poll(&mut self, strip: &Track, offset: usize, viewport: usize) -> Vec<IntersectionEntry> {
        if !self.is_observing() {
            if self.subscription.as_ref().is_some_and(Subscription::is_cancelled) {
                self.disconnect();
            }
            return Vec::new();
        }

        let threshold = self.threshold;
        let mut entries = Vec::new();
        for (target, last) in &mut self.targets {
            let Some(span) = strip.span(*target) else {
                continue;
            };
            let ratio = span.visible_ratio(offset, viewport);
            let is_intersecting = ratio >= threshold;
            if *last != Some(is_intersecting) {
                *last = Some(is_intersecting);
                entries.push(IntersectionEntry {
                    target: *target,
                    ratio,
                    is_intersecting,
                });
            }
        }

        if !entries.is_empty() {
            self.deliveries += 1;
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip() -> Track {
        Track::from_lengths([10; 6], 0)
    }

    #[test]
    fn test_first_poll_reports_every_target() {
        let mut observer = IntersectionObserver::new();
        observer.observe(&[2, 1, 3], FULL_VISIBILITY);

        let entries = observer.poll(&strip(), 10, 30);
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.is_intersecting));
        assert_eq!(observer.deliveries(), 1);
    }

    #[test]
    fn test_only_changes_are_reported() {
        let mut observer = IntersectionObserver::new();
        observer.observe(&[2, 1, 3], FULL_VISIBILITY);
        observer.poll(&strip(), 10, 30);

        assert!(observer.poll(&strip(), 10, 30).is_empty());

        // Shift by 5 cells: mark 1 is now half hidden.
        let entries = observer.poll(&strip(), 15, 30);
        assert_eq!(entries.len(), 1);
        let hidden = entries[0];
        assert_eq!(hidden.target, 1);
        assert!(!hidden.is_intersecting);
        assert!((hidden.ratio - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_disconnect_stops_delivery() {
        let mut observer = IntersectionObserver::new();
        observer.observe(&[0], FULL_VISIBILITY);
        observer.disconnect();
        assert!(!observer.is_observing());
        assert!(observer.poll(&strip(), 0, 5).is_empty());
        assert_eq!(observer.deliveries(), 0);
    }

    #[test]
    fn test_cancelled_subscription_stops_delivery() {
        let mut observer = IntersectionObserver::new();
        let subscription = observer.observe(&[0, 1], FULL_VISIBILITY);
        subscription.cancel();
        assert!(observer.poll(&strip(), 0, 5).is_empty());
        assert!(observer.targets().is_empty());
    }

    #[test]
    fn test_observe_replaces_previous_subscription() {
        let mut observer = IntersectionObserver::new();
        let first = observer.observe(&[0], FULL_VISIBILITY);
        observer.observe(&[4, 4, 5], FULL_VISIBILITY);
        assert!(first.is_cancelled());
        assert_eq!(observer.targets(), vec![4, 5]);
    }

    #[test]
    fn test_unknown_targets_are_skipped() {
        let mut observer = IntersectionObserver::new();
        observer.observe(&[9], FULL_VISIBILITY);
        assert!(observer.poll(&strip(), 0, 30).is_empty());
    }
}
