//! Events consumed by the TUI reducer.

use crossterm::event::Event;
use segdir_core::directory::DirectoryEvent;

#[derive(Debug, Clone)]
pub enum UiEvent {
    /// Animation tick. Only ticks trigger a redraw.
    Tick,
    /// Current terminal size, prepended to every batch of events.
    Frame { width: u16, height: u16 },
    Terminal(Event),
    Directory(DirectoryEvent),
}
