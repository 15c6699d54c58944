//! Permission Controller
//!
//! Tracks the accessibility permission and drives the
//! "Retry After Granting Permissions" flow.

use std::sync::Mutex;

use crate::business::HotkeyManager;
use crate::platform::{HotkeyCallback, PermissionGate, PermissionState};
use crate::ui::{Dialog, SharedUi};

/// What a retry ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOutcome {
    Activated,
    SetupFailed,
    StillDenied,
}

pub struct PermissionController {
    gate: Box<dyn PermissionGate>,
    state: Mutex<PermissionState>,
}

impl PermissionController {
    pub fn new(gate: Box<dyn PermissionGate>) -> Self {
        Self {
            gate,
            state: Mutex::new(PermissionState::Unknown),
        }
    }

    pub fn state(&self) -> PermissionState {
        *self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn is_required(&self) -> bool {
        self.gate.is_required()
    }

    /// Query the OS and record the answer
    pub fn check(&self) -> PermissionState {
        let observed = self.gate.check();
        *self.state.lock().unwrap_or_else(|p| p.into_inner()) = observed;
        tracing::info!("Accessibility permission: {:?}", observed);
        observed
    }

    /// Ask the OS to prompt the user for the permission
    pub fn request(&self) {
        self.gate.request();
    }

    /// Re-check the permission and bring the hotkey listener up if it is
    /// now granted. A denied check leaves listener and status untouched.
    pub fn request_retry(
        &self,
        hotkeys: &HotkeyManager,
        on_trigger: HotkeyCallback,
        ui: &SharedUi,
    ) -> RetryOutcome {
        if self.check() != PermissionState::Granted {
            ui.update(|s| {
                s.dialog = Some(Dialog::error(
                    "Permissions Required",
                    "Accessibility permissions are still not granted.\n\n\
                     Please follow the instructions to enable them.",
                ));
            });
            return RetryOutcome::StillDenied;
        }

        match hotkeys.start(on_trigger) {
            Ok(()) => {
                hotkeys.set_enabled(true);
                let status = hotkeys.status_text();
                let label = hotkeys.toggle_label();
                let message = format!(
                    "Accessibility permissions detected!\n\n\
                     You can now use {} hotkey from anywhere.",
                    hotkeys.display()
                );
                ui.update(|s| {
                    s.show_retry = false;
                    s.show_toggle = true;
                    s.hotkey_status = status;
                    s.toggle_label = label;
                    s.dialog = Some(Dialog::info("Permissions Granted", message));
                });
                RetryOutcome::Activated
            }
            Err(e) => {
                tracing::error!("Hotkey setup failed after permission grant: {}", e);
                ui.update(|s| {
                    s.hotkey_status = "Hotkey status: Setup failed".to_string();
                    s.dialog = Some(Dialog::info(
                        "Setup Issue",
                        "Permissions appear to be granted but hotkey setup failed.\n\n\
                         Please restart the application.",
                    ));
                });
                RetryOutcome::SetupFailed
            }
        }
    }
}
