//! Application state for the directory TUI.

use std::sync::Arc;

use segdir_core::Segment;
use segdir_core::directory::{DirectoryOptions, DirectoryState};
use segdir_core::segment::ChangeEvent;

use crate::common::text::sanitize_for_display;
use crate::effects::UiEffect;

#[derive(Debug)]
pub struct AppState {
    pub directory: DirectoryState,
    /// Segment bodies, index-aligned with the marks.
    pub bodies: Vec<String>,
    pub title: String,
    /// Terminal size the layout was last measured for.
    pub measured: Option<(u16, u16)>,
    /// Most recent change notification, shown in the status line.
    pub last_change: Option<ChangeEvent>,
    pub should_quit: bool,
}

impl AppState {
    /// Captures what the UI needs from `segments` and mounts the directory.
    pub fn mount<S: Segment>(
        options: DirectoryOptions,
        title: impl Into<String>,
        segments: &[Arc<S>],
    ) -> (Self, Vec<UiEffect>) {
        let marks: Vec<&str> = segments.iter().map(|s| s.mark()).collect();
        let preactive: Vec<bool> = segments.iter().map(|s| s.is_active()).collect();
        let bodies = segments
            .iter()
            .map(|s| sanitize_for_display(s.content()).into_owned())
            .collect();

        let (directory, effects) = DirectoryState::mount(options, &marks, &preactive);
        let state = Self {
            directory,
            bodies,
            title: title.into(),
            measured: None,
            last_change: None,
            should_quit: false,
        };
        (state, effects.into_iter().map(UiEffect::from).collect())
    }

    /// Status line text: the last change as JSON, or key hints before any.
    pub fn status_text(&self) -> String {
        match &self.last_change {
            Some(change) => serde_json::to_string(change)
                .unwrap_or_else(|err| format!("change event not serializable: {err}")),
            None => "←/→ select · click a mark · wheel scrolls marks · q quit".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use segdir_core::SegmentHandle;
    use segdir_core::directory::DirectoryEffect;
    use segdir_core::segment::SegmentDetails;

    use super::*;

    #[test]
    fn test_mount_reads_segments() {
        let segments = vec![
            Arc::new(SegmentHandle::new("A").with_body("a\tb")),
            Arc::new(SegmentHandle::new("B").with_active(true)),
        ];
        let (state, effects) = AppState::mount(DirectoryOptions::default(), "demo", &segments);

        assert_eq!(state.directory.marks(), &["A".to_string(), "B".to_string()]);
        assert_eq!(state.bodies[0], "a    b");
        assert_eq!(state.directory.active(), Some(1));
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::Directory(DirectoryEffect::Transition(_))]
        ));
    }

    #[test]
    fn test_status_text_shows_last_change() {
        let segments = vec![Arc::new(SegmentHandle::new("A"))];
        let (mut state, _) = AppState::mount(DirectoryOptions::default(), "demo", &segments);
        assert!(state.status_text().contains("q quit"));

        state.last_change = Some(ChangeEvent {
            active: SegmentDetails {
                index: 0,
                mark: "A".into(),
                data: None,
            },
            previous: None,
        });
        assert!(state.status_text().contains("\"segmentActive\""));
    }
}
