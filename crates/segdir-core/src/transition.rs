//! Serialized activation/deactivation of segments.
//!
//! The reducer decides *what* changes; the worker awaits the segment
//! futures on a single tokio task so that, for every request, all
//! deactivations finish before the activation starts, and requests run
//! strictly in submission order.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::segment::{ChangeEvent, Segment, SegmentDetails};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRequest {
    /// Monotonic id assigned by the reducer; used to spot stale outcomes.
    pub generation: u64,
    pub deactivate: Vec<usize>,
    pub activate: usize,
    /// Previously active index, reported in the change event.
    pub previous: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    Completed { generation: u64, change: ChangeEvent },
    Failed { generation: u64, error: String },
}

impl TransitionOutcome {
    pub fn generation(&self) -> u64 {
        match self {
            Self::Completed { generation, .. } | Self::Failed { generation, .. } => *generation,
        }
    }
}

/// Handle to the background task that runs transitions.
///
/// Dropping the handle stops the worker after the transition in flight.
#[derive(Debug)]
pub struct TransitionWorker {
    tx: mpsc::UnboundedSender<TransitionRequest>,
    cancel: CancellationToken,
}

impl TransitionWorker {
    /// Spawns the worker on the current tokio runtime.
    ///
    /// Outcomes are sent to `outcomes` in completion order.
    pub fn spawn<S: Segment>(
        segments: Vec<Arc<S>>,
        outcomes: mpsc::UnboundedSender<TransitionOutcome>,
    ) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<TransitionRequest>();
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        tokio::spawn(async move {
            loop {
                let request = tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    request = rx.recv() => match request {
                        Some(request) => request,
                        None => break,
                    },
                };

                let generation = request.generation;
                let outcome = match run_transition(&segments, &request).await {
                    Ok(change) => TransitionOutcome::Completed { generation, change },
                    Err(err) => TransitionOutcome::Failed {
                        generation,
                        error: format!("{err:#}"),
                    },
                };
                if outcomes.send(outcome).is_err() {
                    break;
                }
            }
            tracing::debug!("transition worker stopped");
        });

        Self { tx, cancel }
    }

    /// Queues a transition. Returns false once the worker has stopped.
    pub fn submit(&self, request: TransitionRequest) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        self.tx.send(request).is_ok()
    }

    /// Stops accepting requests. The transition in flight (if any) still
    /// runs to completion; queued ones are dropped.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for TransitionWorker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_transition<S: Segment>(
    segments: &[Arc<S>],
    request: &TransitionRequest,
) -> Result<ChangeEvent> {
    for &index in &request.deactivate {
        let segment = lookup(segments, index)?;
        segment
            .deactivate()
            .await
            .with_context(|| format!("Failed to deactivate segment {index}"))?;
    }

    let index = request.activate;
    let segment = lookup(segments, index)?;
    segment
        .activate()
        .await
        .with_context(|| format!("Failed to activate segment {index}"))?;
    tracing::debug!(index, mark = segment.mark(), "segment activated");

    let previous = match request.previous.and_then(|i| segments.get(i).map(|s| (i, s))) {
        Some((i, s)) => Some(SegmentDetails::capture(i, s.as_ref()).await),
        None => None,
    };
    Ok(ChangeEvent {
        active: SegmentDetails::capture(index, segment.as_ref()).await,
        previous,
    })
}

fn lookup<S>(segments: &[Arc<S>], index: usize) -> Result<&Arc<S>> {
    segments
        .get(index)
        .with_context(|| format!("segment index {index} out of range ({})", segments.len()))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::segment::SegmentHandle;

    /// Segment that records when each call starts and finishes.
    struct Recording {
        mark: String,
        log: Arc<Mutex<Vec<String>>>,
        delay: Duration,
    }

    impl Recording {
        fn new(mark: &str, log: &Arc<Mutex<Vec<String>>>, delay_ms: u64) -> Arc<Self> {
            Arc::new(Self {
                mark: mark.to_string(),
                log: Arc::clone(log),
                delay: Duration::from_millis(delay_ms),
            })
        }

        fn record(&self, entry: String) {
            self.log.lock().unwrap().push(entry);
        }
    }

    impl Segment for Recording {
        fn mark(&self) -> &str {
            &self.mark
        }

        fn is_active(&self) -> bool {
            false
        }

        async fn activate(&self) -> Result<()> {
            self.record(format!("activate {} start", self.mark));
            tokio::time::sleep(self.delay).await;
            self.record(format!("activate {} done", self.mark));
            Ok(())
        }

        async fn deactivate(&self) -> Result<()> {
            self.record(format!("deactivate {} start", self.mark));
            tokio::time::sleep(self.delay).await;
            self.record(format!("deactivate {} done", self.mark));
            Ok(())
        }
    }

    fn request(generation: u64, deactivate: &[usize], activate: usize) -> TransitionRequest {
        TransitionRequest {
            generation,
            deactivate: deactivate.to_vec(),
            activate,
            previous: deactivate.first().copied(),
        }
    }

    #[tokio::test]
    async fn test_deactivate_completes_before_activate_starts() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let segments = vec![
            Recording::new("A", &log, 20),
            Recording::new("B", &log, 0),
            Recording::new("C", &log, 0),
        ];
        let (tx, mut rx) = mpsc::unbounded_channel();
        let worker = TransitionWorker::spawn(segments, tx);

        assert!(worker.submit(request(1, &[0], 2)));
        let outcome = rx.recv().await.unwrap();

        let TransitionOutcome::Completed { generation, change } = outcome else {
            panic!("expected completion, got {outcome:?}");
        };
        assert_eq!(generation, 1);
        assert_eq!(change.active.mark, "C");
        assert_eq!(change.previous.map(|p| p.mark), Some("A".to_string()));
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "deactivate A start",
                "deactivate A done",
                "activate C start",
                "activate C done",
            ]
        );
    }

    #[tokio::test]
    async fn test_requests_run_in_submission_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let segments = vec![
            Recording::new("A", &log, 10),
            Recording::new("B", &log, 10),
            Recording::new("C", &log, 10),
        ];
        let (tx, mut rx) = mpsc::unbounded_channel();
        let worker = TransitionWorker::spawn(segments, tx);

        worker.submit(request(1, &[0], 1));
        worker.submit(request(2, &[1], 2));
        assert_eq!(rx.recv().await.unwrap().generation(), 1);
        assert_eq!(rx.recv().await.unwrap().generation(), 2);

        let log = log.lock().unwrap();
        let activate_b_done = log.iter().position(|e| e == "activate B done").unwrap();
        let deactivate_b_start = log.iter().position(|e| e == "deactivate B start").unwrap();
        assert!(activate_b_done < deactivate_b_start);
    }

    #[tokio::test]
    async fn test_failure_is_reported_not_propagated() {
        let a = Arc::new(SegmentHandle::new("A").with_active(true));
        let b = Arc::new(SegmentHandle::new("B"));
        b.detach();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let worker = TransitionWorker::spawn(vec![Arc::clone(&a), Arc::clone(&b)], tx);

        worker.submit(request(3, &[0], 1));
        let outcome = rx.recv().await.unwrap();
        let TransitionOutcome::Failed { generation, error } = outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        assert_eq!(generation, 3);
        assert!(error.contains("Failed to activate segment 1"));
        assert!(error.contains("detached"));
        // Partially applied: A was deactivated, B never became active.
        assert!(!a.is_active());
        assert!(!b.is_active());

        // The worker keeps serving requests after a failure.
        worker.submit(request(4, &[], 0));
        assert!(matches!(
            rx.recv().await.unwrap(),
            TransitionOutcome::Completed { generation: 4, .. }
        ));
    }

    #[tokio::test]
    async fn test_out_of_range_index_fails() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let worker = TransitionWorker::spawn(vec![Arc::new(SegmentHandle::new("A"))], tx);
        worker.submit(request(1, &[], 5));
        let outcome = rx.recv().await.unwrap();
        assert!(matches!(outcome, TransitionOutcome::Failed { ref error, .. } if error.contains("out of range")));
    }

    #[tokio::test]
    async fn test_shutdown_rejects_new_requests() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let worker = TransitionWorker::spawn(vec![Arc::new(SegmentHandle::new("A"))], tx);
        worker.shutdown();
        assert!(!worker.submit(request(1, &[], 0)));
        assert!(rx.recv().await.is_none());
    }
}
