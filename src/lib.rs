//! Clipboard Japanese Translator
//!
//! Press a global hotkey anywhere and the text on the clipboard is replaced
//! by its Japanese translation. A small window shows the before/after text.

pub mod app;
pub mod business;
pub mod data;
pub mod platform;
pub mod translation;
pub mod ui;

pub use app::App;
pub use business::{HotkeyManager, PermissionController, SystemClipboard, TranslationController};
pub use data::AppConfig;
pub use translation::{GoogleTranslator, Translator};
