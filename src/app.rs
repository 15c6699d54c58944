//! Application state
//!
//! Owns every long-lived component and ties their lifecycle to
//! application start and shutdown.

use anyhow::Result;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::business::{
    HotkeyManager, PermissionController, RetryOutcome, SystemClipboard, TranslationController,
};
use crate::data::AppConfig;
use crate::platform::{HotkeyCallback, HotkeyError, PermissionState, PlatformFactory};
use crate::translation::GoogleTranslator;
use crate::ui::{Dialog, SharedUi};

pub struct App {
    runtime: Handle,
    controller: Arc<TranslationController>,
    hotkeys: HotkeyManager,
    permissions: PermissionController,
    ui: Arc<SharedUi>,
}

impl App {
    pub fn new(
        runtime: Handle,
        controller: Arc<TranslationController>,
        hotkeys: HotkeyManager,
        permissions: PermissionController,
        ui: Arc<SharedUi>,
    ) -> Self {
        Self {
            runtime,
            controller,
            hotkeys,
            permissions,
            ui,
        }
    }

    /// Wire the production components. Must run on the main thread, since
    /// some hotkey backends bind to the thread's message loop.
    pub fn build(config: &AppConfig, runtime: Handle) -> Result<Self> {
        let ui = Arc::new(SharedUi::new());
        let translator = Arc::new(GoogleTranslator::new(&config.translation)?);
        let controller = Arc::new(TranslationController::new(
            config,
            Arc::new(SystemClipboard::new()),
            translator,
            Arc::from(PlatformFactory::create_notifier()),
            ui.clone(),
        ));
        let hotkeys = HotkeyManager::new(&config.hotkey)?;
        let permissions = PermissionController::new(PlatformFactory::create_permission_gate());

        Ok(Self::new(runtime, controller, hotkeys, permissions, ui))
    }

    pub fn ui(&self) -> &Arc<SharedUi> {
        &self.ui
    }

    pub fn controller(&self) -> &Arc<TranslationController> {
        &self.controller
    }

    pub fn hotkeys(&self) -> &HotkeyManager {
        &self.hotkeys
    }

    pub fn permissions(&self) -> &PermissionController {
        &self.permissions
    }

    /// Run one translation on the background runtime
    pub fn trigger_translation(&self) -> JoinHandle<Option<String>> {
        spawn_translation(&self.runtime, &self.controller)
    }

    fn hotkey_callback(&self) -> HotkeyCallback {
        let runtime = self.runtime.clone();
        let controller = self.controller.clone();
        Arc::new(move || {
            spawn_translation(&runtime, &controller);
        })
    }

    /// Check permissions, start the listener and fill in the initial UI.
    pub fn startup(&self) {
        let display = self.hotkeys.display().to_string();
        let label = self.hotkeys.toggle_label();

        if self.permissions.is_required()
            && self.permissions.check() != PermissionState::Granted
        {
            self.permissions.request();
            tracing::warn!("Accessibility permissions not granted. Hotkeys will not work.");
            self.ui.update(|s| {
                s.hotkey_status = "Hotkey status: Permissions required".to_string();
                s.toggle_label = label;
                s.show_toggle = false;
                s.show_retry = true;
                s.dialog = Some(Dialog::info(
                    "Accessibility Permissions Required",
                    permission_instructions(),
                ));
            });
            return;
        }

        match self.hotkeys.start(self.hotkey_callback()) {
            Ok(()) => {
                let status = self.hotkeys.status_text();
                self.ui.update(|s| {
                    s.hotkey_status = status;
                    s.toggle_label = label;
                    s.show_toggle = true;
                    s.show_retry = false;
                    s.dialog = Some(Dialog::info(
                        "Hotkey Registered",
                        format!(
                            "The application is now running!\n\n\
                             Press {} from anywhere to translate text in your clipboard to Japanese.",
                            display
                        ),
                    ));
                });
            }
            Err(HotkeyError::Unsupported) => {
                self.ui.update(|s| {
                    s.hotkey_status = "Hotkey status: Not supported".to_string();
                    s.show_toggle = false;
                    s.show_retry = false;
                    s.dialog = Some(Dialog::info(
                        "Clipboard Japanese Translator",
                        "The application is now running!\n\n\
                         Use the Translate button to translate text in your clipboard to Japanese.\n\n\
                         Note: Global hotkeys are not supported on this platform.",
                    ));
                });
            }
            Err(e) => {
                tracing::error!("Could not register hotkey: {}", e);
                let show_retry = self.permissions.is_required();
                self.ui.update(|s| {
                    s.hotkey_status = "Hotkey status: Setup failed".to_string();
                    s.show_toggle = false;
                    s.show_retry = show_retry;
                    s.dialog = Some(Dialog::error(
                        "Error",
                        format!(
                            "Could not register hotkey: {}\n\n\
                             You can still use the 'Translate Clipboard' button.",
                            e
                        ),
                    ));
                });
            }
        }
    }

    /// Flip the hotkey on or off and refresh the label and status line
    pub fn toggle_hotkey(&self) -> bool {
        let enabled = self.hotkeys.toggle_enabled();
        let label = self.hotkeys.toggle_label();
        let status = self.hotkeys.status_text();
        self.ui.update(|s| {
            s.toggle_label = label;
            s.hotkey_status = status;
        });
        enabled
    }

    pub fn retry_permissions(&self) -> RetryOutcome {
        self.permissions
            .request_retry(&self.hotkeys, self.hotkey_callback(), &self.ui)
    }

    /// Release the listener; never fails
    pub fn shutdown(&self) {
        self.ui.set_visible(false);
        self.hotkeys.stop();
    }
}

fn spawn_translation(
    runtime: &Handle,
    controller: &Arc<TranslationController>,
) -> JoinHandle<Option<String>> {
    let controller = controller.clone();
    runtime.spawn(async move { controller.translate_clipboard(true).await })
}

fn permission_instructions() -> &'static str {
    "To use keyboard shortcuts, this app needs accessibility permissions:\n\
     1. Open System Settings > Privacy & Security\n\
     2. Select 'Accessibility'\n\
     3. Add and enable this application\n\
     4. Click the 'Retry After Granting Permissions' button\n\n\
     Until then, you can still use the 'Translate Clipboard' button."
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::business::hotkey_manager::tests::FakeProvider;
    use crate::business::translation_controller::tests::{
        FakeClipboard, FakeTranslator, RecordingNotifier,
    };
    use crate::business::ListenerState;
    use crate::data::HotkeyConfig;
    use crate::platform::{AlwaysGranted, PermissionGate};
    use std::sync::atomic::Ordering;

    struct Denied;

    impl PermissionGate for Denied {
        fn check(&self) -> PermissionState {
            PermissionState::Denied
        }

        fn is_required(&self) -> bool {
            true
        }
    }

    struct Parts {
        app: App,
        provider: Arc<FakeProvider>,
        clipboard: Arc<FakeClipboard>,
    }

    fn app_with(gate: Box<dyn PermissionGate>) -> Parts {
        let config = AppConfig::default();
        let ui = Arc::new(SharedUi::new());
        ui.set_visible(true);
        let clipboard = Arc::new(FakeClipboard::with_text("Good morning"));
        let controller = Arc::new(TranslationController::new(
            &config,
            clipboard.clone(),
            Arc::new(FakeTranslator::ok("おはよう")),
            Arc::new(RecordingNotifier::default()),
            ui.clone(),
        ));
        let provider = Arc::new(FakeProvider::default());
        let hotkey_config = HotkeyConfig {
            enabled_on_start: true,
            combo_key: "Ctrl+J".to_string(),
        };
        let hotkeys = HotkeyManager::with_provider(Box::new(provider.clone()), &hotkey_config);
        let app = App::new(
            Handle::current(),
            controller,
            hotkeys,
            PermissionController::new(gate),
            ui,
        );
        Parts {
            app,
            provider,
            clipboard,
        }
    }

    #[tokio::test]
    async fn startup_without_gate_starts_listening() {
        let parts = app_with(Box::new(AlwaysGranted));
        parts.app.startup();

        assert_eq!(parts.app.hotkeys().state(), ListenerState::Listening);
        let ui = parts.app.ui().snapshot();
        assert_eq!(ui.hotkey_status, "Hotkey status: Active");
        assert_eq!(ui.toggle_label, "Disable Ctrl+J Hotkey");
        assert!(ui.show_toggle);
        assert!(!ui.show_retry);
        assert_eq!(ui.dialog.unwrap().title, "Hotkey Registered");
    }

    #[tokio::test]
    async fn startup_without_permission_shows_retry() {
        let parts = app_with(Box::new(Denied));
        parts.app.startup();

        assert_eq!(parts.app.hotkeys().state(), ListenerState::NotStarted);
        assert_eq!(parts.app.permissions().state(), PermissionState::Denied);
        let ui = parts.app.ui().snapshot();
        assert_eq!(ui.hotkey_status, "Hotkey status: Permissions required");
        assert!(ui.show_retry);
        assert!(!ui.show_toggle);
    }

    #[tokio::test]
    async fn hotkey_press_translates_clipboard() {
        let parts = app_with(Box::new(AlwaysGranted));
        parts.app.startup();

        parts.provider.fire();
        // Clipboard work hops to the blocking pool, so poll with a short sleep
        for _ in 0..200 {
            if parts.app.ui().snapshot().translated_text == "おはよう" {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(parts.clipboard.contents(), "おはよう");
        assert_eq!(parts.app.ui().snapshot().translated_text, "おはよう");
    }

    #[tokio::test]
    async fn manual_trigger_returns_translation() {
        let parts = app_with(Box::new(AlwaysGranted));
        let result = parts.app.trigger_translation().await.unwrap();
        assert_eq!(result.as_deref(), Some("おはよう"));
    }

    #[tokio::test]
    async fn toggle_updates_label_and_status() {
        let parts = app_with(Box::new(AlwaysGranted));
        parts.app.startup();

        assert!(!parts.app.toggle_hotkey());
        let ui = parts.app.ui().snapshot();
        assert_eq!(ui.toggle_label, "Enable Ctrl+J Hotkey");
        assert_eq!(ui.hotkey_status, "Hotkey status: Disabled");

        assert!(parts.app.toggle_hotkey());
        let ui = parts.app.ui().snapshot();
        assert_eq!(ui.toggle_label, "Disable Ctrl+J Hotkey");
        assert_eq!(ui.hotkey_status, "Hotkey status: Active");
    }

    #[tokio::test]
    async fn shutdown_releases_listener_once() {
        let parts = app_with(Box::new(AlwaysGranted));
        parts.app.startup();
        parts.app.shutdown();
        parts.app.shutdown();

        assert_eq!(parts.app.hotkeys().state(), ListenerState::Stopped);
        assert_eq!(parts.provider.stops.load(Ordering::SeqCst), 1);
        assert!(!parts.app.ui().is_visible());
    }
}
