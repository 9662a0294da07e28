//! Effects returned by the TUI reducer for the runtime to execute.

use segdir_core::directory::DirectoryEffect;

#[derive(Debug)]
pub enum UiEffect {
    Quit,
    Directory(DirectoryEffect),
}

impl From<DirectoryEffect> for UiEffect {
    fn from(effect: DirectoryEffect) -> Self {
        Self::Directory(effect)
    }
}
