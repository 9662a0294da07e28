//! Terminal-independent half of the runtime: owns the state, the transition
//! worker and the frame queue, and executes effects.

use std::sync::Arc;

use segdir_core::Segment;
use segdir_core::directory::{DirectoryEffect, DirectoryEvent, DirectoryOptions, Phase};
use segdir_core::frame::FrameRequest;
use segdir_core::segment::ChangeEvent;
use segdir_core::transition::{TransitionOutcome, TransitionWorker};
use tokio::sync::{broadcast, mpsc};

use super::inbox::{UiEventReceiver, UiEventSender};
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::update;

/// Change notifications buffered per subscriber before it starts lagging.
const CHANGE_CAPACITY: usize = 64;

pub struct Driver {
    pub state: AppState,
    inbox_tx: UiEventSender,
    inbox_rx: UiEventReceiver,
    outcomes_rx: mpsc::UnboundedReceiver<TransitionOutcome>,
    worker: TransitionWorker,
    changes: broadcast::Sender<ChangeEvent>,
    /// Frames requested by the reducer, resolved after the next draw.
    pending_frames: Vec<FrameRequest>,
}

impl Driver {
    /// Mounts the directory over `segments` and starts the transition
    /// worker. Must be called inside a tokio runtime.
    pub fn new<S: Segment>(
        options: DirectoryOptions,
        title: impl Into<String>,
        segments: Vec<Arc<S>>,
    ) -> Self {
        let (state, effects) = AppState::mount(options, title, &segments);
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        let worker = TransitionWorker::spawn(segments, outcomes_tx);
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);

        let mut driver = Self {
            state,
            inbox_tx,
            inbox_rx,
            outcomes_rx,
            worker,
            changes,
            pending_frames: Vec::new(),
        };
        driver.execute_effects(effects);
        driver
    }

    /// Receives every change notification published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }

    /// True while something needs fast ticks: queued events, a transition
    /// in flight, a frame waiting to be resolved, or a scroll animation.
    pub fn is_busy(&self) -> bool {
        !self.inbox_rx.is_empty()
            || !self.outcomes_rx.is_empty()
            || matches!(self.state.directory.phase(), Phase::Transitioning { .. })
            || !self.pending_frames.is_empty()
            || self.state.directory.is_animating()
    }

    pub fn pending_frames(&self) -> usize {
        self.pending_frames.len()
    }

    /// Drains transition outcomes and the inbox into `events`.
    pub fn collect(&mut self, events: &mut Vec<UiEvent>) {
        while let Ok(outcome) = self.outcomes_rx.try_recv() {
            events.push(UiEvent::Directory(DirectoryEvent::Transition(outcome)));
        }
        while let Ok(event) = self.inbox_rx.try_recv() {
            events.push(event);
        }
    }

    pub fn dispatch(&mut self, event: UiEvent) {
        let effects = update::update(&mut self.state, event);
        if !effects.is_empty() {
            self.execute_effects(effects);
        }
    }

    /// Called after each draw: queues `FrameReady` for every request that
    /// survived until now. They are handled with the next batch of events.
    pub fn frame_drawn(&mut self) {
        for request in self.pending_frames.drain(..) {
            if request.is_cancelled() {
                continue;
            }
            let _ = self
                .inbox_tx
                .send(UiEvent::Directory(DirectoryEvent::FrameReady(request.id)));
        }
    }

    /// Tears the directory down unless that already happened.
    pub fn teardown(&mut self) {
        if !self.state.directory.is_torn_down() {
            self.dispatch(UiEvent::Directory(DirectoryEvent::Teardown));
        }
    }

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.should_quit = true;
            }
            UiEffect::Directory(DirectoryEffect::Transition(request)) => {
                let generation = request.generation;
                if !self.worker.submit(request) {
                    tracing::warn!(generation, "transition worker stopped, request dropped");
                }
            }
            UiEffect::Directory(DirectoryEffect::RequestFrame(request)) => {
                self.pending_frames.retain(|pending| !pending.is_cancelled());
                self.pending_frames.push(request);
            }
            UiEffect::Directory(DirectoryEffect::CancelFrame(request)) => {
                request.cancel.cancel();
                self.pending_frames.retain(|pending| pending.id != request.id);
            }
            UiEffect::Directory(DirectoryEffect::Notify(change)) => {
                // No subscribers is fine.
                let _ = self.changes.send(change);
            }
            UiEffect::Directory(DirectoryEffect::Shutdown) => {
                self.worker.shutdown();
                self.pending_frames.clear();
            }
        }
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use segdir_core::SegmentHandle;

    use super::*;

    fn segments(marks: &[&str]) -> Vec<Arc<SegmentHandle>> {
        marks.iter().map(|m| Arc::new(SegmentHandle::new(*m))).collect()
    }

    /// One loop iteration without a terminal: collect, dispatch, "draw".
    fn turn(driver: &mut Driver) {
        let mut events = Vec::new();
        driver.collect(&mut events);
        events.push(UiEvent::Tick);
        for event in events {
            driver.dispatch(event);
        }
        driver.frame_drawn();
    }

    async fn settle(driver: &mut Driver) {
        for _ in 0..50 {
            turn(driver);
            if !driver.is_busy() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("directory never settled");
    }

    #[tokio::test]
    async fn test_mount_activates_exactly_one_segment() {
        let segs = segments(&["A", "B", "C"]);
        segs[2].activate().await.unwrap();
        segs[1].activate().await.unwrap();

        let mut driver = Driver::new(DirectoryOptions::default(), "t", segs.clone());
        let mut changes = driver.subscribe();
        driver.dispatch(UiEvent::Frame { width: 60, height: 20 });
        settle(&mut driver).await;

        let flags: Vec<bool> = segs.iter().map(|s| s.is_active()).collect();
        assert_eq!(flags, vec![false, true, false]);
        let change = changes.try_recv().unwrap();
        assert_eq!(change.active.mark, "B");
        assert!(change.previous.is_none());
        assert!(!driver.state.directory.interacted());
    }

    #[tokio::test]
    async fn test_select_runs_through_worker_and_frame() {
        let segs = segments(&["A", "B", "C"]);
        let mut driver = Driver::new(DirectoryOptions::default(), "t", segs.clone());
        let mut changes = driver.subscribe();
        driver.dispatch(UiEvent::Frame { width: 60, height: 20 });
        settle(&mut driver).await;
        let _initial = changes.try_recv().unwrap();

        driver.dispatch(UiEvent::Directory(DirectoryEvent::Select(2)));
        settle(&mut driver).await;

        assert!(!segs[0].is_active());
        assert!(segs[2].is_active());
        let change = changes.try_recv().unwrap();
        assert_eq!(change.active.mark, "C");
        assert_eq!(change.previous.map(|p| p.mark), Some("A".to_string()));
        let window = driver.state.directory.window().unwrap();
        assert_eq!(window.members(), vec![2, 1]);
        assert_eq!(driver.state.last_change.as_ref().map(|c| c.active.index), Some(2));
    }

    #[tokio::test]
    async fn test_failed_activation_keeps_ui_interactive() {
        let segs = segments(&["A", "B", "C"]);
        let mut driver = Driver::new(DirectoryOptions::default(), "t", segs.clone());
        driver.dispatch(UiEvent::Frame { width: 60, height: 20 });
        settle(&mut driver).await;

        segs[1].detach();
        driver.dispatch(UiEvent::Directory(DirectoryEvent::Select(1)));
        settle(&mut driver).await;
        assert_eq!(driver.state.directory.active(), Some(1));
        assert!(!segs[0].is_active());
        assert!(!segs[1].is_active());

        // B cannot be deactivated either, but selection still goes through.
        driver.dispatch(UiEvent::Directory(DirectoryEvent::Select(2)));
        settle(&mut driver).await;
        assert_eq!(driver.state.directory.active(), Some(2));
        assert_eq!(driver.state.directory.phase(), Phase::Idle);
        assert!(!segs[2].is_active());
    }

    #[tokio::test]
    async fn test_teardown_with_pending_frame() {
        let segs = segments(&["A", "B"]);
        let mut driver = Driver::new(DirectoryOptions::default(), "t", segs);
        driver.dispatch(UiEvent::Frame { width: 60, height: 20 });

        // Wait for the initial completion, but do not draw.
        for _ in 0..50 {
            let mut events = Vec::new();
            driver.collect(&mut events);
            for event in events {
                driver.dispatch(event);
            }
            if driver.pending_frames() > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        assert_eq!(driver.pending_frames(), 1);

        driver.teardown();
        assert_eq!(driver.pending_frames(), 0);
        assert!(!driver.state.directory.observer().is_observing());
        let deliveries = driver.state.directory.observer().deliveries();

        for _ in 0..5 {
            turn(&mut driver);
        }
        assert_eq!(driver.state.directory.observer().deliveries(), deliveries);
        assert!(driver.state.directory.window().is_none());
        assert!(!driver.worker.submit(segdir_core::transition::TransitionRequest {
            generation: 99,
            deactivate: vec![],
            activate: 0,
            previous: None,
        }));
    }
}
