//! Show command handler.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use segdir_core::config::Config;
use segdir_core::logging;
use segdir_core::manifest::DirectoryManifest;

const SAMPLE_TITLE: &str = "segdir";

pub async fn run(config: &Config, file: Option<&Path>, title: Option<String>) -> Result<()> {
    // The TUI owns the terminal, so logs go to a file. Keep the guard alive
    // until the view closes or buffered lines are lost.
    let _guard = logging::init_file(&config.log_level)?;

    let (manifest, default_title) = match file {
        Some(path) => {
            let manifest = DirectoryManifest::load_from(path)?;
            let stem = path
                .file_stem()
                .map_or_else(|| SAMPLE_TITLE.to_string(), |s| s.to_string_lossy().into_owned());
            (manifest, stem)
        }
        None => (DirectoryManifest::sample(), SAMPLE_TITLE.to_string()),
    };
    tracing::info!(
        manifest = %file.map_or_else(|| "<sample>".into(), |p| p.display().to_string()),
        segments = manifest.segments.len(),
        "loaded manifest"
    );

    let segments = manifest.into_segments().into_iter().map(Arc::new).collect();
    segdir_tui::run_directory(config, title.unwrap_or(default_title), segments)
        .await
        .context("directory view failed")
}
