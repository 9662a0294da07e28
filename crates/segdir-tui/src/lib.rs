//! Full-screen terminal front end for a segment directory.

pub mod common;
pub mod effects;
pub mod events;
pub mod layout;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, Write, stderr};
use std::sync::Arc;

use anyhow::Result;
pub use runtime::TuiRuntime;
use segdir_core::SegmentHandle;
use segdir_core::config::Config;
use tokio::sync::broadcast;

/// Shows `segments` until the user quits.
///
/// Every change notification is logged as JSON under the `segdir::change`
/// target. The last one is printed to stderr once the terminal is restored.
///
/// # Errors
/// Returns an error if stderr is not a terminal or terminal I/O fails.
pub async fn run_directory(
    config: &Config,
    title: String,
    segments: Vec<Arc<SegmentHandle>>,
) -> Result<()> {
    if !stderr().is_terminal() {
        anyhow::bail!(
            "The directory view requires a terminal.\n\
             Use `segdir check <FILE>` to inspect a manifest non-interactively."
        );
    }

    let count = segments.len();
    let mut runtime = TuiRuntime::new(config, title, segments)?;
    tracing::info!(segments = count, "directory mounted");

    let mut changes = runtime.subscribe();
    let listener = tokio::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(change) => match serde_json::to_string(&change) {
                    Ok(json) => tracing::info!(target: "segdir::change", "{json}"),
                    Err(err) => tracing::warn!("change event not serializable: {err}"),
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "change listener lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let result = runtime.run();
    let last_change = runtime.driver.state.last_change.clone();
    // Dropping the runtime restores the terminal and closes the channel.
    drop(runtime);
    if let Err(err) = listener.await {
        tracing::warn!(error = %err, "change listener failed");
    }
    result?;

    let mut err = stderr();
    match last_change {
        Some(change) => writeln!(
            err,
            "Last active: {} (index {})",
            change.active.mark, change.active.index
        )?,
        None => writeln!(err, "Goodbye!")?,
    }
    Ok(())
}
