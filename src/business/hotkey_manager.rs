//! Hotkey Manager
//!
//! Owns the platform hotkey provider, its listener lifecycle and the
//! user-facing enabled flag.

use crate::data::HotkeyConfig;
use crate::platform::{HotkeyCallback, HotkeyError, HotkeyProvider, PlatformFactory};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Lifecycle of the OS-level listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    NotStarted,
    Listening,
    Stopped,
}

/// Hotkey manager for global hotkey handling.
///
/// The provider may be started again after a stop, which is how the
/// permission retry brings the listener up after a late grant.
pub struct HotkeyManager {
    provider: Box<dyn HotkeyProvider>,
    state: Mutex<ListenerState>,
    enabled: Arc<AtomicBool>,
    display: String,
}

impl HotkeyManager {
    /// Create a new hotkey manager based on configuration
    pub fn new(config: &HotkeyConfig) -> Result<Self, HotkeyError> {
        let provider = PlatformFactory::create_hotkey_provider(config)?;
        Ok(Self::with_provider(provider, config))
    }

    pub fn with_provider(provider: Box<dyn HotkeyProvider>, config: &HotkeyConfig) -> Self {
        Self {
            provider,
            state: Mutex::new(ListenerState::NotStarted),
            enabled: Arc::new(AtomicBool::new(config.enabled_on_start)),
            display: config.display(),
        }
    }

    /// Start listening. `on_trigger` only runs while the hotkey is enabled.
    pub fn start(&self, on_trigger: HotkeyCallback) -> Result<(), HotkeyError> {
        let mut state = self.lock_state();
        if *state == ListenerState::Listening {
            return Ok(());
        }

        let enabled = self.enabled.clone();
        let gated: HotkeyCallback = Arc::new(move || {
            if enabled.load(Ordering::SeqCst) {
                on_trigger();
            } else {
                tracing::debug!("Hotkey pressed while disabled");
            }
        });

        self.provider.start(gated)?;
        *state = ListenerState::Listening;
        tracing::info!("Hotkey {} listening", self.display);
        Ok(())
    }

    /// Release the listener. Errors are logged, never returned, so that
    /// shutdown always proceeds.
    pub fn stop(&self) {
        let mut state = self.lock_state();
        if *state != ListenerState::Listening {
            return;
        }

        if let Err(e) = self.provider.stop() {
            tracing::warn!("Error releasing keyboard hooks: {}", e);
        }
        *state = ListenerState::Stopped;
        tracing::info!("Hotkey listener stopped");
    }

    pub fn state(&self) -> ListenerState {
        *self.lock_state()
    }

    pub fn is_listening(&self) -> bool {
        self.state() == ListenerState::Listening
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Flip the enabled flag and return the new value
    pub fn toggle_enabled(&self) -> bool {
        let enabled = !self.enabled.fetch_xor(true, Ordering::SeqCst);
        tracing::info!("Hotkey {}", if enabled { "enabled" } else { "disabled" });
        enabled
    }

    /// Human readable combo, e.g. `Ctrl+J`
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Label for the toggle button, reflecting the current state
    pub fn toggle_label(&self) -> String {
        let action = if self.is_enabled() { "Disable" } else { "Enable" };
        format!("{} {} Hotkey", action, self.display)
    }

    /// Text for the status line, reflecting the current state
    pub fn status_text(&self) -> String {
        let status = if self.is_enabled() { "Active" } else { "Disabled" };
        format!("Hotkey status: {}", status)
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, ListenerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for HotkeyManager {
    fn drop(&mut self) {
        self.stop();
    }
}
