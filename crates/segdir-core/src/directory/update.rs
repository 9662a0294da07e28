//! Directory reducer.
//!
//! `update(state, event)` is the only place directory state changes. It
//! returns effects for the host runtime to execute.

use crate::scroll::ScrollBehavior;
use crate::transition::{TransitionOutcome, TransitionRequest};
use crate::window::WindowRole;

use super::effects::DirectoryEffect;
use super::events::{DirectoryEvent, LayoutMetrics};
use super::state::{DirectoryState, Phase};

pub fn update(state: &mut DirectoryState, event: DirectoryEvent) -> Vec<DirectoryEffect> {
    if state.is_torn_down() {
        tracing::trace!(?event, "directory torn down, event ignored");
        return vec![];
    }

    match event {
        DirectoryEvent::Select(index) => select(state, index),
        DirectoryEvent::Transition(outcome) => handle_outcome(state, outcome),
        DirectoryEvent::FrameReady(id) => {
            if state.frames.resolve(id) {
                sync_active(state);
            } else {
                tracing::trace!(?id, "stale frame ignored");
            }
            vec![]
        }
        DirectoryEvent::Layout(metrics) => {
            handle_layout(state, metrics);
            vec![]
        }
        DirectoryEvent::ScrollMarks(delta) => {
            let max = state.marks_max_offset();
            state.marks_scroll.scroll_by(delta, max);
            vec![]
        }
        DirectoryEvent::Tick => {
            state.marks_scroll.tick();
            state.segments_scroll.tick();
            state.segments_scroll_y.tick();
            reconcile_marks(state);
            vec![]
        }
        DirectoryEvent::Teardown => teardown(state),
    }
}

fn select(state: &mut DirectoryState, index: usize) -> Vec<DirectoryEffect> {
    if index >= state.len() {
        tracing::debug!(index, len = state.len(), "selection out of range ignored");
        return vec![];
    }
    if state.active == Some(index) {
        return vec![];
    }

    let previous = state.active;
    state.interacted = true;
    state.active = Some(index);
    state.generation += 1;
    state.phase = Phase::Transitioning {
        from: previous,
        to: index,
        generation: state.generation,
    };
    tracing::debug!(?previous, index, generation = state.generation, "segment selected");

    vec![DirectoryEffect::Transition(TransitionRequest {
        generation: state.generation,
        deactivate: previous.into_iter().collect(),
        activate: index,
        previous,
    })]
}

fn handle_outcome(state: &mut DirectoryState, outcome: TransitionOutcome) -> Vec<DirectoryEffect> {
    let current = outcome.generation() == state.generation;
    if current {
        state.phase = Phase::Idle;
    }

    match outcome {
        TransitionOutcome::Completed { generation, change } => {
            tracing::info!(
                generation,
                active = change.active.index,
                mark = %change.active.mark,
                "active segment changed"
            );
            let mut effects = vec![DirectoryEffect::Notify(change)];
            if current {
                effects.push(DirectoryEffect::RequestFrame(state.frames.request()));
            } else {
                tracing::debug!(generation, latest = state.generation, "superseded transition completed");
            }
            effects
        }
        TransitionOutcome::Failed { generation, error } => {
            tracing::error!(generation, %error, "segment transition failed");
            vec![]
        }
    }
}

/// Runs after the frame that follows a completed transition: re-arms the
/// observable window and brings the active panel into place.
fn sync_active(state: &mut DirectoryState) {
    let behavior = state.scroll_behavior();
    state.arm_window();
    state.align_segments(behavior);
}

fn handle_layout(state: &mut DirectoryState, metrics: LayoutMetrics) {
    let resized = state.apply_layout(metrics);
    if !resized || state.window.is_none() {
        return;
    }
    // The frame that follows the completed transition re-aligns with the
    // stored metrics; the new segment is not active yet.
    if matches!(state.phase, Phase::Transitioning { .. }) {
        tracing::debug!(active = ?state.active, "container resized mid-transition, deferring");
        return;
    }
    tracing::debug!(active = ?state.active, "container resized, re-aligning");
    state.align_segments(ScrollBehavior::Instant);
    state.arm_window();
}

/// Polls the observer and corrects the marks strip once if a watched mark
/// is no longer fully visible.
fn reconcile_marks(state: &mut DirectoryState) {
    let Some(window) = state.window else {
        return;
    };
    let viewport = state.marks_viewport();
    if viewport == 0 {
        return;
    }
    let offset = state.marks_scroll.offset();
    let entries = state.observer.poll(&state.strip, offset, viewport);

    let Some((role, target)) = entries
        .iter()
        .filter(|entry| !entry.is_intersecting)
        .find_map(|entry| window.role_of(entry.target).map(|role| (role, entry.target)))
    else {
        return;
    };

    // Disconnect before scrolling so the correction cannot re-trigger itself.
    state.observer.disconnect();
    let align = state.options.align_x;
    let Some(corrected) = window.correction_offset(role, &state.strip, viewport, offset, align)
    else {
        return;
    };
    let behavior = state.scroll_behavior();
    state.marks_scroll.scroll_to(corrected, behavior);
    state.corrections += 1;
    tracing::debug!(
        target,
        role = role_name(role),
        from = offset,
        to = corrected,
        "marks strip corrected"
    );
}

fn role_name(role: WindowRole) -> &'static str {
    match role {
        WindowRole::Active => "active",
        WindowRole::Previous => "previous",
        WindowRole::Next => "next",
    }
}

fn teardown(state: &mut DirectoryState) -> Vec<DirectoryEffect> {
    let mut effects = Vec::new();
    if let Some(pending) = state.frames.cancel() {
        effects.push(DirectoryEffect::CancelFrame(pending));
    }
    state.observer.disconnect();
    state.window = None;
    state.phase = Phase::TornDown;
    effects.push(DirectoryEffect::Shutdown);
    tracing::debug!("directory torn down");
    effects
}
