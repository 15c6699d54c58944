//! Business logic: the translation orchestrator, hotkey lifecycle and
//! permission flow.

mod clipboard;
pub(crate) mod hotkey_manager;
mod permission_controller;
pub(crate) mod translation_controller;

pub use clipboard::SystemClipboard;
pub use hotkey_manager::{HotkeyManager, ListenerState};
pub use permission_controller::{PermissionController, RetryOutcome};
pub use translation_controller::{preview, TranslationController, TARGET_LANGUAGE};
