//! Check command handler.
//!
//! Reports what `show` would mount without touching the terminal.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Result;
use segdir_core::config::Config;
use segdir_core::logging;
use segdir_core::manifest::{DirectoryManifest, SegmentEntry};

pub fn run(config: &Config, file: &Path) -> Result<()> {
    logging::init_stderr(&config.log_level)?;

    let manifest = DirectoryManifest::load_from(file)?;
    tracing::debug!(path = %file.display(), "manifest parsed");
    print!("{}", report(&manifest.segments));
    Ok(())
}

/// Index the directory activates at mount: the first pre-active entry,
/// else the first entry.
fn initial_index(entries: &[SegmentEntry]) -> Option<usize> {
    if entries.is_empty() {
        return None;
    }
    Some(entries.iter().position(|e| e.active).unwrap_or(0))
}

fn report(entries: &[SegmentEntry]) -> String {
    let mut out = String::new();
    if entries.is_empty() {
        out.push_str("0 segments: the directory stays empty\n");
        return out;
    }

    let initial = initial_index(entries);
    let _ = writeln!(out, "{} segment(s)", entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let mark = entry
            .mark
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or("(no mark)");
        let flag = if Some(index) == initial { "  [initial]" } else { "" };
        let _ = writeln!(out, "  {index:>3}  {mark}{flag}");
    }

    let mut warnings = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        if entry.mark.as_deref().is_none_or(|m| m.trim().is_empty()) {
            warnings.push(format!("segment {index} has no mark"));
        }
        if let Some(raw) = &entry.data
            && let Err(err) = serde_json::from_str::<serde_json::Value>(raw)
        {
            warnings.push(format!("segment {index} data is not valid JSON: {err}"));
        }
    }
    let preactive = entries.iter().filter(|e| e.active).count();
    if preactive > 1 {
        warnings.push(format!(
            "{preactive} segments are marked active, only the first stays active"
        ));
    }
    for warning in warnings {
        let _ = writeln!(out, "warning: {warning}");
    }
    out
}
