//! Directory manifests: the ordered list of segments a directory is mounted
//! with.
//!
//! ```toml
//! [[segment]]
//! mark = "Overview"
//! body = "First panel"
//!
//! [[segment]]
//! mark = "Details"
//! active = true
//! data = '{"id": 7}'
//! ```
//!
//! Segment order is file order and never changes after mount.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::segment::SegmentHandle;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectoryManifest {
    #[serde(default, rename = "segment")]
    pub segments: Vec<SegmentEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentEntry {
    /// Label shown in the marks strip (required, uniqueness not enforced).
    pub mark: Option<String>,
    /// Pre-marks the segment active; the first such segment wins at mount.
    #[serde(default)]
    pub active: bool,
    /// Raw JSON payload, parsed when the segment is built.
    pub data: Option<String>,
    #[serde(default)]
    pub body: String,
}

impl DirectoryManifest {
    /// Loads a manifest from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a valid manifest.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest from {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("Failed to parse manifest from {}", path.display()))
    }

    /// Parses manifest TOML.
    ///
    /// # Errors
    /// Returns an error if the text is not a valid manifest.
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid directory manifest")
    }

    /// Builds segment handles in manifest order.
    pub fn into_segments(self) -> Vec<SegmentHandle> {
        self.segments
            .into_iter()
            .map(|entry| {
                SegmentHandle::from_parts(entry.mark, entry.data.as_deref(), entry.body, entry.active)
            })
            .collect()
    }

    /// Built-in manifest used when no file is given.
    pub fn sample() -> Self {
        let topics = [
            ("Overview", "What the directory is and how to move around it."),
            ("Marks", "Every segment has a mark in the strip above."),
            ("Selection", "Click a mark or use the arrow keys to switch."),
            ("Scrolling", "The strip follows the active mark only when it drifts out of view."),
            ("Alignment", "The active panel is aligned with align_x and align_y."),
            ("Resizing", "Resize the terminal: the active panel stays put."),
            ("Payloads", "Segments may carry a JSON payload."),
            ("Events", "Each change publishes the new and previous segment."),
            ("Errors", "A failed activation is logged and the UI stays usable."),
            ("Teardown", "Quitting cancels pending frames and observers."),
        ];
        let segments = topics
            .iter()
            .enumerate()
            .map(|(index, (mark, body))| SegmentEntry {
                mark: Some((*mark).to_string()),
                active: false,
                data: Some(format!("{{\"topic\":{index}}}")),
                body: (*body).to_string(),
            })
            .collect();
        Self { segments }
    }
}
