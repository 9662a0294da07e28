//! Deferred "next frame" callbacks.
//!
//! Work that depends on measured geometry waits for the next draw. The
//! reducer requests a frame, the runtime resolves it after drawing, and the
//! reducer only acts on the request that is still pending. At most one
//! request is pending; a new request cancels the previous one.

use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub u64);

#[derive(Debug, Clone)]
pub struct FrameRequest {
    pub id: FrameId,
    pub cancel: CancellationToken,
}

impl FrameRequest {
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[derive(Debug, Default)]
pub struct FrameScheduler {
    next: u64,
    pending: Option<FrameRequest>,
}

impl FrameScheduler {
    /// Requests a new frame, cancelling the one still pending (if any).
    pub fn request(&mut self) -> FrameRequest {
        self.cancel();
        let request = FrameRequest {
            id: FrameId(self.next),
            cancel: CancellationToken::new(),
        };
        self.next = self.next.wrapping_add(1);
        self.pending = Some(request.clone());
        request
    }

    /// Cancels the pending request. Returns it so callers can propagate the
    /// cancellation.
    pub fn cancel(&mut self) -> Option<FrameRequest> {
        let pending = self.pending.take()?;
        pending.cancel.cancel();
        Some(pending)
    }

    /// Consumes the pending request if `id` names it and it was not cancelled.
    pub fn resolve(&mut self, id: FrameId) -> bool {
        let matches = self
            .pending
            .as_ref()
            .is_some_and(|req| req.id == id && !req.is_cancelled());
        if matches {
            self.pending = None;
        }
        matches
    }

    pub fn pending(&self) -> Option<&FrameRequest> {
        self.pending.as_ref()
    }
}
