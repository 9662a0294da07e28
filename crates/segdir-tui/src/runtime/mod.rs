//! TUI runtime: owns the terminal, runs the event loop, executes effects.
//!
//! All side effects happen here or in [`Driver`]; the reducers stay pure.
//!
//! ## Inbox Pattern
//!
//! Async producers send `UiEvent`s to the inbox, and the loop drains it
//! once per iteration. Transition outcomes arrive on their own channel and
//! are drained first so a completion is seen before input queued after it.
//!
//! Structure:
//! - `mod.rs`: terminal ownership and the event loop
//! - `driver.rs`: state, transition worker, frame queue, effect execution
//! - `inbox.rs`: inbox channel types

mod driver;
mod inbox;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
pub use driver::Driver;
pub use inbox::{UiEventReceiver, UiEventSender};
use segdir_core::Segment;
use segdir_core::config::Config;
use segdir_core::directory::DirectoryOptions;
use segdir_core::segment::ChangeEvent;
use tokio::sync::broadcast;

use crate::events::UiEvent;
use crate::render;
use crate::terminal::{self, DirectoryTerminal};

/// Frame cadence while something is moving (~60fps).
pub const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Poll duration when idle. Longer timeout reduces CPU usage.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);

/// Full-screen directory runtime.
///
/// Terminal state is restored on drop and on panic.
pub struct TuiRuntime {
    terminal: DirectoryTerminal,
    pub driver: Driver,
    /// Last time a Tick event was emitted.
    last_tick: Instant,
    /// Last terminal input, for fast ticks during interaction.
    last_terminal_event: Instant,
}

impl TuiRuntime {
    /// Enters the alternate screen and mounts the directory.
    ///
    /// Must be called inside a multi-threaded tokio runtime: the event loop
    /// blocks its thread while the transition worker runs on another.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be set up.
    pub fn new<S: Segment>(
        config: &Config,
        title: impl Into<String>,
        segments: Vec<Arc<S>>,
    ) -> Result<Self> {
        // Panic hook goes in before the alternate screen.
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let driver = Driver::new(DirectoryOptions::from(config), title, segments);
        let now = Instant::now();
        Ok(Self {
            terminal,
            driver,
            last_tick: now,
            last_terminal_event: now,
        })
    }

    /// Receives every change notification published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.driver.subscribe()
    }

    /// Runs the event loop until the user quits.
    ///
    /// # Errors
    /// Returns an error if terminal I/O fails.
    pub fn run(&mut self) -> Result<()> {
        terminal::enable_mouse()?;
        let result = self.event_loop();
        let _ = terminal::disable_mouse();
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.driver.state.should_quit {
            let mut events = self.collect_events()?;

            // Layout is measured before anything else in the batch.
            let size = self.terminal.size()?;
            events.insert(
                0,
                UiEvent::Frame {
                    width: size.width,
                    height: size.height,
                },
            );

            for event in events {
                if matches!(&event, UiEvent::Terminal(_)) {
                    self.last_terminal_event = Instant::now();
                }
                // Only Tick renders, which caps the frame rate at tick cadence.
                if matches!(&event, UiEvent::Tick) {
                    dirty = true;
                }
                self.driver.dispatch(event);
            }

            if dirty && !self.driver.state.should_quit {
                let state = &self.driver.state;
                self.terminal.draw(|frame| render::render(state, frame))?;
                self.driver.frame_drawn();
                dirty = false;
            }
        }

        Ok(())
    }

    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        let recent_terminal_activity = self.last_terminal_event.elapsed() < IDLE_POLL_DURATION;
        let tick_interval = if self.driver.is_busy() || recent_terminal_activity {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        self.driver.collect(&mut events);

        // Block until the next tick unless there is already work queued.
        let poll_duration = if events.is_empty() {
            tick_interval.saturating_sub(self.last_tick.elapsed())
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        self.driver.teardown();
        let _ = terminal::restore_terminal();
    }
}
