//! Core of segdir: a segment directory with one active segment, a marks
//! strip that follows it, and the scroll bookkeeping that keeps both in sync.
//!
//! Nothing here touches a terminal. Hosts drive `directory::update` with
//! events and execute the effects it returns.

pub mod config;
pub mod directory;
pub mod frame;
pub mod geometry;
pub mod logging;
pub mod manifest;
pub mod observer;
pub mod scroll;
pub mod segment;
pub mod transition;
pub mod window;

pub use segment::{ChangeEvent, Segment, SegmentDetails, SegmentHandle};
