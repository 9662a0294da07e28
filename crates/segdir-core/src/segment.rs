//! Segments: the navigable panels of a directory.
//!
//! The controller only talks to segments through the `Segment` trait:
//! a mark (label), a readable active flag, and two asynchronous operations
//! that flip the flag. `SegmentHandle` is the stock implementation used by
//! manifests and the TUI.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Result, bail};
use serde::Serialize;
use serde_json::Value;

/// Capability contract the directory controller relies on.
pub trait Segment: Send + Sync + 'static {
    /// Label shown in the marks strip. Empty when the segment has none.
    fn mark(&self) -> &str;

    /// Active flag as last set by `activate`/`deactivate`.
    fn is_active(&self) -> bool;

    /// Body rendered inside the segment panel.
    fn content(&self) -> &str {
        ""
    }

    /// Marks the segment active. Completes once the segment has reacted.
    fn activate(&self) -> impl Future<Output = Result<()>> + Send;

    /// Marks the segment inactive. Completes once the segment has reacted.
    fn deactivate(&self) -> impl Future<Output = Result<()>> + Send;

    /// Previously parsed payload, if any. Not used by the controller itself.
    fn data(&self) -> impl Future<Output = Option<Value>> + Send {
        std::future::ready(None)
    }
}

/// Parses a raw JSON payload.
///
/// Malformed input is logged as a warning and treated as absent.
pub fn parse_payload(raw: &str) -> Option<Value> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(error = %err, "segment data is not valid JSON, ignoring it");
            None
        }
    }
}

#[derive(Debug, Default)]
pub struct SegmentHandle {
    mark: Option<String>,
    body: String,
    data: Option<Value>,
    active: AtomicBool,
    detached: AtomicBool,
}

impl SegmentHandle {
    pub fn new(mark: impl Into<String>) -> Self {
        Self::from_parts(Some(mark.into()), None, String::new(), false)
    }

    /// Builds a handle from raw manifest fields.
    ///
    /// A missing or blank mark is logged as an error; the segment still
    /// renders, with an empty label.
    pub fn from_parts(
        mark: Option<String>,
        data: Option<&str>,
        body: String,
        active: bool,
    ) -> Self {
        let mark = mark.filter(|m| !m.trim().is_empty());
        if mark.is_none() {
            tracing::error!("segment is missing its required mark");
        }
        Self {
            mark,
            body,
            data: data.and_then(parse_payload),
            active: AtomicBool::new(active),
            detached: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn with_data(mut self, raw: &str) -> Self {
        self.data = parse_payload(raw);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub fn with_active(self, active: bool) -> Self {
        self.active.store(active, Ordering::SeqCst);
        self
    }

    pub fn has_mark(&self) -> bool {
        self.mark.is_some()
    }

    /// Detaches the handle from its host. Later activation calls fail.
    pub fn detach(&self) {
        self.detached.store(true, Ordering::SeqCst);
    }

    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::SeqCst)
    }

    fn set_active(&self, active: bool) -> Result<()> {
        if self.is_detached() {
            bail!("segment '{}' is detached", self.mark());
        }
        self.active.store(active, Ordering::SeqCst);
        tracing::trace!(mark = self.mark(), active, "segment flag updated");
        Ok(())
    }
}

impl Segment for SegmentHandle {
    fn mark(&self) -> &str {
        self.mark.as_deref().unwrap_or_default()
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn content(&self) -> &str {
        &self.body
    }

    async fn activate(&self) -> Result<()> {
        self.set_active(true)
    }

    async fn deactivate(&self) -> Result<()> {
        self.set_active(false)
    }

    async fn data(&self) -> Option<Value> {
        self.data.clone()
    }
}

/// Identity and payload of one segment, as published in change events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentDetails {
    pub index: usize,
    pub mark: String,
    pub data: Option<Value>,
}

impl SegmentDetails {
    pub async fn capture<S: Segment>(index: usize, segment: &S) -> Self {
        Self {
            index,
            mark: segment.mark().to_string(),
            data: segment.data().await,
        }
    }
}

/// Published after every completed activation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeEvent {
    #[serde(rename = "segmentActive")]
    pub active: SegmentDetails,
    #[serde(rename = "segmentPrevious", skip_serializing_if = "Option::is_none")]
    pub previous: Option<SegmentDetails>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_valid_payload_is_parsed() {
        let segment = SegmentHandle::new("A").with_data("{\"a\":1}");
        assert_eq!(segment.data().await, Some(json!({"a": 1})));
    }

    #[tokio::test]
    async fn test_invalid_payload_is_absent() {
        let segment = SegmentHandle::new("A").with_data("not json");
        assert_eq!(segment.data().await, None);
    }

    #[tokio::test]
    async fn test_activate_and_deactivate_flip_flag() {
        let segment = SegmentHandle::new("A");
        assert!(!segment.is_active());
        segment.activate().await.unwrap();
        assert!(segment.is_active());
        segment.deactivate().await.unwrap();
        assert!(!segment.is_active());
    }

    #[tokio::test]
    async fn test_detached_segment_rejects_activation() {
        let segment = SegmentHandle::new("A");
        segment.detach();
        let err = segment.activate().await.unwrap_err();
        assert!(err.to_string().contains("detached"));
        assert!(!segment.is_active());
    }

    #[test]
    fn test_missing_mark_still_builds() {
        let segment = SegmentHandle::from_parts(None, None, "body".into(), false);
        assert!(!segment.has_mark());
        assert_eq!(segment.mark(), "");
        assert_eq!(segment.content(), "body");

        let blank = SegmentHandle::from_parts(Some("  ".into()), None, String::new(), false);
        assert!(!blank.has_mark());
    }

    #[tokio::test]
    async fn test_change_event_serializes_with_camel_case_keys() {
        let a = SegmentHandle::new("A").with_data("{\"a\":1}");
        let event = ChangeEvent {
            active: SegmentDetails::capture(0, &a).await,
            previous: None,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["segmentActive"]["mark"], "A");
        assert_eq!(value["segmentActive"]["data"]["a"], 1);
        assert!(value.get("segmentPrevious").is_none());
    }
}
