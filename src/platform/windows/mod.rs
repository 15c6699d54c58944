//! Windows: `RegisterHotKey`-based global hotkey and WinRT toasts.

use global_hotkey::{
    hotkey::{Code, HotKey, Modifiers},
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use winrt_notification::Toast;

use crate::platform::{
    Combo, ConsoleNotifier, HotkeyCallback, HotkeyError, HotkeyProvider, ModifierSet, Notifier,
};

pub struct WindowsHotkeyProvider {
    manager: GlobalHotKeyManager,
    hotkey: HotKey,
    is_active: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl WindowsHotkeyProvider {
    /// Must be called on the thread that pumps window messages
    pub fn new(combo: Combo) -> Result<Self, HotkeyError> {
        let manager = GlobalHotKeyManager::new()
            .map_err(|e| HotkeyError::Register(format!("failed to create hotkey manager: {}", e)))?;

        Ok(Self {
            manager,
            hotkey: to_hotkey(combo)?,
            is_active: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
        })
    }
}

impl HotkeyProvider for WindowsHotkeyProvider {
    fn start(&self, callback: HotkeyCallback) -> Result<(), HotkeyError> {
        if self.is_active.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        if let Err(e) = self.manager.register(self.hotkey) {
            self.is_active.store(false, Ordering::SeqCst);
            return Err(HotkeyError::Register(e.to_string()));
        }

        let is_active = self.is_active.clone();
        let hotkey_id = self.hotkey.id();

        let handle = thread::spawn(move || {
            let receiver = GlobalHotKeyEvent::receiver();

            while is_active.load(Ordering::SeqCst) {
                // Poll with a timeout so stop() is observed
                if let Ok(event) = receiver.recv_timeout(Duration::from_millis(200)) {
                    if event.id == hotkey_id && event.state == HotKeyState::Pressed {
                        tracing::debug!("Hotkey pressed");
                        callback();
                    }
                }
            }
            tracing::debug!("Hotkey receiver thread exiting");
        });

        if let Ok(mut worker) = self.worker.lock() {
            *worker = Some(handle);
        }

        tracing::info!("Global hotkey registered");
        Ok(())
    }

    fn stop(&self) -> Result<(), HotkeyError> {
        if !self.is_active.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        let unregistered = self
            .manager
            .unregister(self.hotkey)
            .map_err(|e| HotkeyError::Release(e.to_string()));

        if let Ok(mut worker) = self.worker.lock() {
            if let Some(handle) = worker.take() {
                let _ = handle.join();
            }
        }

        unregistered
    }
}

impl Drop for WindowsHotkeyProvider {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::warn!("Error releasing keyboard hook: {}", e);
        }
    }
}

fn to_hotkey(combo: Combo) -> Result<HotKey, HotkeyError> {
    let mut modifiers = Modifiers::empty();
    if combo.modifiers.contains(ModifierSet::CONTROL) {
        modifiers |= Modifiers::CONTROL;
    }
    if combo.modifiers.contains(ModifierSet::SHIFT) {
        modifiers |= Modifiers::SHIFT;
    }
    if combo.modifiers.contains(ModifierSet::ALT) {
        modifiers |= Modifiers::ALT;
    }
    if combo.modifiers.contains(ModifierSet::META) {
        modifiers |= Modifiers::SUPER;
    }

    Ok(HotKey::new(Some(modifiers), key_code(combo.key)?))
}

fn key_code(key: char) -> Result<Code, HotkeyError> {
    let code = match key {
        'A' => Code::KeyA,
        'B' => Code::KeyB,
        'C' => Code::KeyC,
        'D' => Code::KeyD,
        'E' => Code::KeyE,
        'F' => Code::KeyF,
        'G' => Code::KeyG,
        'H' => Code::KeyH,
        'I' => Code::KeyI,
        'J' => Code::KeyJ,
        'K' => Code::KeyK,
        'L' => Code::KeyL,
        'M' => Code::KeyM,
        'N' => Code::KeyN,
        'O' => Code::KeyO,
        'P' => Code::KeyP,
        'Q' => Code::KeyQ,
        'R' => Code::KeyR,
        'S' => Code::KeyS,
        'T' => Code::KeyT,
        'U' => Code::KeyU,
        'V' => Code::KeyV,
        'W' => Code::KeyW,
        'X' => Code::KeyX,
        'Y' => Code::KeyY,
        'Z' => Code::KeyZ,
        '0' => Code::Digit0,
        '1' => Code::Digit1,
        '2' => Code::Digit2,
        '3' => Code::Digit3,
        '4' => Code::Digit4,
        '5' => Code::Digit5,
        '6' => Code::Digit6,
        '7' => Code::Digit7,
        '8' => Code::Digit8,
        '9' => Code::Digit9,
        _ => return Err(HotkeyError::InvalidCombo(key.to_string())),
    };

    Ok(code)
}

/// WinRT toast notifications
pub struct ToastNotifier;

impl Notifier for ToastNotifier {
    fn notify(&self, title: &str, message: &str, duration: Duration) {
        let length = if duration > Duration::from_secs(7) {
            winrt_notification::Duration::Long
        } else {
            winrt_notification::Duration::Short
        };

        let result = Toast::new(Toast::POWERSHELL_APP_ID)
            .title(title)
            .text1(message)
            .duration(length)
            .show();

        if let Err(e) = result {
            tracing::warn!("Toast notification failed: {:?}", e);
            ConsoleNotifier.notify(title, message, duration);
        }
    }
}
