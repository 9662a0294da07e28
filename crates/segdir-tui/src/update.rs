//! TUI reducer.
//!
//! Maps terminal input onto directory events and forwards everything else
//! to the directory reducer. The runtime executes the returned effects.

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;
use segdir_core::directory::{self, DirectoryEffect, DirectoryEvent};

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::layout::{self, DirectoryLayout};
use crate::state::AppState;

/// Cells the marks strip moves per wheel notch.
const WHEEL_STEP: isize = 3;

pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => dispatch(app, DirectoryEvent::Tick),
        UiEvent::Frame { width, height } => handle_frame(app, width, height),
        UiEvent::Terminal(event) => handle_terminal_event(app, event),
        UiEvent::Directory(event) => dispatch(app, event),
    }
}

/// Runs the directory reducer and keeps the last change for the status line.
fn dispatch(app: &mut AppState, event: DirectoryEvent) -> Vec<UiEffect> {
    let effects = directory::update(&mut app.directory, event);
    for effect in &effects {
        if let DirectoryEffect::Notify(change) = effect {
            app.last_change = Some(change.clone());
        }
    }
    effects.into_iter().map(UiEffect::from).collect()
}

/// Re-measures when the terminal size changed. The directory reducer
/// decides whether the change amounts to a resize.
fn handle_frame(app: &mut AppState, width: u16, height: u16) -> Vec<UiEffect> {
    if app.measured == Some((width, height)) {
        return vec![];
    }
    app.measured = Some((width, height));
    let layout = DirectoryLayout::new(Rect::new(0, 0, width, height));
    let metrics = layout::measure(&layout, app);
    dispatch(app, DirectoryEvent::Layout(metrics))
}

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(app, key),
        Event::Mouse(mouse) => handle_mouse(app, mouse),
        _ => vec![],
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
        || (ctrl && key.code == KeyCode::Char('c'))
    {
        return quit(app);
    }

    let len = app.directory.len();
    if len == 0 {
        return vec![];
    }
    let active = app.directory.active().unwrap_or(0);
    let target = match key.code {
        KeyCode::Left | KeyCode::Char('h') | KeyCode::BackTab => active.checked_sub(1),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => Some(active + 1),
        KeyCode::Home => Some(0),
        KeyCode::End => Some(len - 1),
        KeyCode::Char(c @ '1'..='9') => c.to_digit(10).map(|d| d as usize - 1),
        _ => None,
    };
    match target {
        Some(index) if index < len => dispatch(app, DirectoryEvent::Select(index)),
        _ => vec![],
    }
}

fn handle_mouse(app: &mut AppState, mouse: MouseEvent) -> Vec<UiEffect> {
    let Some((width, height)) = app.measured else {
        return vec![];
    };
    let layout = DirectoryLayout::new(Rect::new(0, 0, width, height));
    let over_marks = layout.marks.y == mouse.row;

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            match layout.hit_mark(app, mouse.column, mouse.row) {
                Some(index) => dispatch(app, DirectoryEvent::Select(index)),
                None => vec![],
            }
        }
        MouseEventKind::ScrollUp | MouseEventKind::ScrollLeft if over_marks => {
            dispatch(app, DirectoryEvent::ScrollMarks(-WHEEL_STEP))
        }
        MouseEventKind::ScrollDown | MouseEventKind::ScrollRight if over_marks => {
            dispatch(app, DirectoryEvent::ScrollMarks(WHEEL_STEP))
        }
        _ => vec![],
    }
}

/// Tears the directory down before quitting so pending frames and
/// observers are released first.
fn quit(app: &mut AppState) -> Vec<UiEffect> {
    app.should_quit = true;
    let mut effects = dispatch(app, DirectoryEvent::Teardown);
    effects.push(UiEffect::Quit);
    effects
}
