//! Platform capabilities
//!
//! Everything OS-specific sits behind the traits in this module. One
//! implementation per target OS is picked by [`PlatformFactory`] at startup
//! and injected into the business layer.

mod combo;

pub use combo::{Combo, ComboTracker, ModifierSet};

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::data::HotkeyConfig;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub mod fallback;

pub type HotkeyCallback = Arc<dyn Fn() + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum HotkeyError {
    #[error("global hotkeys are not supported on this platform")]
    Unsupported,
    #[error("accessibility permission has not been granted")]
    PermissionDenied,
    #[error("invalid hotkey '{0}'")]
    InvalidCombo(String),
    #[error("failed to register hotkey: {0}")]
    Register(String),
    #[error("failed to release hotkey: {0}")]
    Release(String),
}

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("failed to write clipboard: {0}")]
    Write(String),
}

/// Accessibility permission as last observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Unknown,
    Granted,
    Denied,
}

/// Trait for platform-specific hotkey listening
pub trait HotkeyProvider: Send + Sync {
    /// Install the OS hook and invoke `callback` on every combo press
    fn start(&self, callback: HotkeyCallback) -> Result<(), HotkeyError>;
    /// Release the OS hook. Calling it twice is harmless.
    fn stop(&self) -> Result<(), HotkeyError>;
}

/// Consent gate for observing system-wide keyboard input
pub trait PermissionGate: Send + Sync {
    fn check(&self) -> PermissionState;

    /// Ask the OS to show its own permission prompt
    fn request(&self) {}

    /// Whether this platform gates the hotkey behind a permission at all
    fn is_required(&self) -> bool {
        false
    }
}

/// Best-effort system notifications. Implementations never fail outward.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str, duration: Duration);
}

/// Plain-text clipboard access
pub trait ClipboardAccess: Send + Sync {
    fn get_text(&self) -> Result<String, ClipboardError>;
    fn set_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Last-resort notifier that writes to the console
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, title: &str, message: &str, _duration: Duration) {
        println!("{}: {}", title, message);
    }
}

/// Gate for platforms where no consent is needed
pub struct AlwaysGranted;

impl PermissionGate for AlwaysGranted {
    fn check(&self) -> PermissionState {
        PermissionState::Granted
    }
}

/// Factory for creating platform-specific implementations
pub struct PlatformFactory;

impl PlatformFactory {
    pub fn create_hotkey_provider(
        config: &HotkeyConfig,
    ) -> Result<Box<dyn HotkeyProvider>, HotkeyError> {
        let combo = Combo::parse(&config.combo_key)?;
        #[cfg(target_os = "windows")]
        return Ok(Box::new(windows::WindowsHotkeyProvider::new(combo)?));
        #[cfg(target_os = "macos")]
        return Ok(Box::new(macos::MacosHotkeyProvider::new(combo)?));
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        return Ok(Box::new(fallback::UnsupportedHotkeyProvider::new(combo)));
    }

    pub fn create_permission_gate() -> Box<dyn PermissionGate> {
        #[cfg(target_os = "macos")]
        return Box::new(macos::AccessibilityGate);
        #[cfg(not(target_os = "macos"))]
        return Box::new(AlwaysGranted);
    }

    pub fn create_notifier() -> Box<dyn Notifier> {
        #[cfg(target_os = "windows")]
        return Box::new(windows::ToastNotifier);
        #[cfg(target_os = "macos")]
        return Box::new(macos::NotificationCenter);
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        return Box::new(ConsoleNotifier);
    }
}
