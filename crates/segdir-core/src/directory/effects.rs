//! Effects returned by the directory reducer.
//!
//! The reducer never awaits segments, schedules frames or publishes events
//! itself; it describes that work here and the host runtime performs it.

use crate::frame::FrameRequest;
use crate::segment::ChangeEvent;
use crate::transition::TransitionRequest;

#[derive(Debug, Clone)]
pub enum DirectoryEffect {
    /// Hand a transition to the worker.
    Transition(TransitionRequest),

    /// Resolve this request (with `DirectoryEvent::FrameReady`) after the
    /// next draw, unless its token is cancelled first.
    RequestFrame(FrameRequest),

    /// Drop a queued frame request. Its token is already cancelled.
    CancelFrame(FrameRequest),

    /// Publish a change notification to subscribers.
    Notify(ChangeEvent),

    /// Stop the transition worker.
    Shutdown,
}
