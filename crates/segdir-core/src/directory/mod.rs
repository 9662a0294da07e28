//! The directory controller: a marks strip over a row of segments, with one
//! active segment at a time.
//!
//! Elm-style split:
//! - `state`: `DirectoryState` and mounting
//! - `events`: inputs (`DirectoryEvent`)
//! - `effects`: outputs for the host runtime (`DirectoryEffect`)
//! - `update`: the reducer
//!
//! Lifecycle of a selection: `Select` writes the index and emits a
//! `Transition` effect; the worker reports back with
//! `DirectoryEvent::Transition`; the reducer then requests a frame and, once
//! it fires, re-arms the observable window and scrolls the active panel into
//! place. Later ticks poll the observer and correct the marks strip at most
//! once per armed window.

mod effects;
mod events;
mod state;
mod update;

pub use effects::DirectoryEffect;
pub use events::{DirectoryEvent, LayoutMetrics};
pub use state::{DirectoryOptions, DirectoryState, MARK_PADDING, Phase};
pub use update::update;
