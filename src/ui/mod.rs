//! User interface: the main window, its shared state and the system tray.

mod fonts;
mod state;
#[cfg(any(target_os = "windows", target_os = "macos"))]
mod system_tray;
mod window;

pub use state::{Dialog, DialogKind, SharedUi, UiState};
pub use window::run_app;
