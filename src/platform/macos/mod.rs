#![allow(unexpected_cfgs)]
//! macOS: accessibility-gated global key monitor, the accessibility
//! permission check and Notification Center delivery.

use block::ConcreteBlock;
use cocoa::appkit::NSEventMask;
use cocoa::base::{id, nil};
use core_foundation::base::TCFType;
use core_foundation::boolean::CFBoolean;
use core_foundation::dictionary::{CFDictionary, CFDictionaryRef};
use core_foundation::string::{CFString, CFStringRef};
use objc::runtime::Class;
use objc::{msg_send, sel, sel_impl};
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::platform::{
    Combo, ComboTracker, ConsoleNotifier, HotkeyCallback, HotkeyError, HotkeyProvider,
    ModifierSet, Notifier, PermissionGate, PermissionState,
};

#[link(name = "ApplicationServices", kind = "framework")]
extern "C" {
    fn AXIsProcessTrusted() -> bool;
    fn AXIsProcessTrustedWithOptions(options: CFDictionaryRef) -> bool;
    static kAXTrustedCheckOptionPrompt: CFStringRef;
}

const NS_KEY_DOWN: u64 = 10;

const NS_SHIFT_KEY_MASK: u64 = 1 << 17;
const NS_CONTROL_KEY_MASK: u64 = 1 << 18;
const NS_ALTERNATE_KEY_MASK: u64 = 1 << 19;
const NS_COMMAND_KEY_MASK: u64 = 1 << 20;

/// Accessibility permission via the authoritative AX API
pub struct AccessibilityGate;

impl PermissionGate for AccessibilityGate {
    fn check(&self) -> PermissionState {
        if unsafe { AXIsProcessTrusted() } {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        }
    }

    fn request(&self) {
        let key = unsafe { CFString::wrap_under_get_rule(kAXTrustedCheckOptionPrompt) };
        let options = CFDictionary::from_CFType_pairs(&[(key, CFBoolean::true_value())]);
        let trusted = unsafe { AXIsProcessTrustedWithOptions(options.as_concrete_TypeRef()) };
        tracing::info!("Accessibility prompt requested (trusted: {})", trusted);
    }

    fn is_required(&self) -> bool {
        true
    }
}

/// Global NSEvent monitor for the hotkey combo.
///
/// `start` and `stop` must run on the main thread, where AppKit delivers
/// global monitor events.
pub struct MacosHotkeyProvider {
    tracker: Arc<ComboTracker>,
    is_active: Arc<AtomicBool>,
    monitor_handle: Mutex<Option<usize>>,
}

impl MacosHotkeyProvider {
    pub fn new(combo: Combo) -> Result<Self, HotkeyError> {
        // Reject keys we cannot map to a virtual key code up front
        if keycode_for(combo.key).is_none() {
            return Err(HotkeyError::InvalidCombo(combo.key.to_string()));
        }

        Ok(Self {
            tracker: Arc::new(ComboTracker::new(combo)),
            is_active: Arc::new(AtomicBool::new(false)),
            monitor_handle: Mutex::new(None),
        })
    }
}

impl HotkeyProvider for MacosHotkeyProvider {
    fn start(&self, callback: HotkeyCallback) -> Result<(), HotkeyError> {
        if !unsafe { AXIsProcessTrusted() } {
            return Err(HotkeyError::PermissionDenied);
        }

        let mut handle = self
            .monitor_handle
            .lock()
            .map_err(|_| HotkeyError::Register("monitor state poisoned".to_string()))?;
        if handle.is_some() {
            return Ok(());
        }

        let class = Class::get("NSEvent")
            .ok_or_else(|| HotkeyError::Register("NSEvent class unavailable".to_string()))?;

        let is_active = self.is_active.clone();
        let tracker = self.tracker.clone();

        let block = ConcreteBlock::new(move |event: id| {
            if !is_active.load(Ordering::SeqCst) {
                return;
            }
            unsafe {
                let flags: u64 = msg_send![event, modifierFlags];
                tracker.set_modifiers(modifiers_from_flags(flags));

                let event_type: u64 = msg_send![event, type];
                if event_type == NS_KEY_DOWN {
                    let code: u16 = msg_send![event, keyCode];
                    if let Some(key) = key_for_keycode(code) {
                        if tracker.key_pressed(key) {
                            callback();
                        }
                    }
                }
            }
        });
        let block = block.copy();

        let mask = NSEventMask::NSKeyDownMask | NSEventMask::NSFlagsChangedMask;
        let monitor: id = unsafe {
            msg_send![class, addGlobalMonitorForEventsMatchingMask: mask.bits()
                             handler: &*block]
        };

        if monitor == nil {
            return Err(HotkeyError::Register(
                "addGlobalMonitorForEventsMatchingMask returned nil".to_string(),
            ));
        }

        self.tracker.set_modifiers(ModifierSet::NONE);
        self.is_active.store(true, Ordering::SeqCst);
        *handle = Some(monitor as usize);
        tracing::info!("Global key monitor installed");
        Ok(())
    }

    fn stop(&self) -> Result<(), HotkeyError> {
        self.is_active.store(false, Ordering::SeqCst);

        let mut handle = self
            .monitor_handle
            .lock()
            .map_err(|_| HotkeyError::Release("monitor state poisoned".to_string()))?;

        if let Some(monitor_ptr) = handle.take() {
            let class = Class::get("NSEvent")
                .ok_or_else(|| HotkeyError::Release("NSEvent class unavailable".to_string()))?;
            unsafe {
                let _: () = msg_send![class, removeMonitor: monitor_ptr as id];
            }
            tracing::info!("Global key monitor removed");
        }
        Ok(())
    }
}

impl Drop for MacosHotkeyProvider {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::warn!("Error releasing key monitor: {}", e);
        }
    }
}

fn modifiers_from_flags(flags: u64) -> ModifierSet {
    let mut set = ModifierSet::NONE;
    if flags & NS_SHIFT_KEY_MASK != 0 {
        set = set.union(ModifierSet::SHIFT);
    }
    if flags & NS_CONTROL_KEY_MASK != 0 {
        set = set.union(ModifierSet::CONTROL);
    }
    if flags & NS_ALTERNATE_KEY_MASK != 0 {
        set = set.union(ModifierSet::ALT);
    }
    if flags & NS_COMMAND_KEY_MASK != 0 {
        set = set.union(ModifierSet::META);
    }
    set
}

/// ANSI virtual key codes (kVK_ANSI_*)
const KEYCODES: [(char, u16); 36] = [
    ('A', 0),
    ('S', 1),
    ('D', 2),
    ('F', 3),
    ('H', 4),
    ('G', 5),
    ('Z', 6),
    ('X', 7),
    ('C', 8),
    ('V', 9),
    ('B', 11),
    ('Q', 12),
    ('W', 13),
    ('E', 14),
    ('R', 15),
    ('Y', 16),
    ('T', 17),
    ('1', 18),
    ('2', 19),
    ('3', 20),
    ('4', 21),
    ('6', 22),
    ('5', 23),
    ('9', 25),
    ('7', 26),
    ('8', 28),
    ('0', 29),
    ('O', 31),
    ('U', 32),
    ('I', 34),
    ('P', 35),
    ('L', 37),
    ('J', 38),
    ('K', 40),
    ('N', 45),
    ('M', 46),
];

fn keycode_for(key: char) -> Option<u16> {
    KEYCODES.iter().find(|(k, _)| *k == key).map(|(_, code)| *code)
}

fn key_for_keycode(code: u16) -> Option<char> {
    KEYCODES.iter().find(|(_, c)| *c == code).map(|(k, _)| *k)
}

/// Notification Center delivery through `osascript`
pub struct NotificationCenter;

impl Notifier for NotificationCenter {
    fn notify(&self, title: &str, message: &str, duration: Duration) {
        let script = format!(
            "display notification {} with title {}",
            applescript_string(message),
            applescript_string(title)
        );

        match Command::new("osascript").arg("-e").arg(&script).output() {
            Ok(output) if output.status.success() => {}
            Ok(output) => {
                tracing::warn!(
                    "Mac notification error: {}",
                    String::from_utf8_lossy(&output.stderr).trim()
                );
                ConsoleNotifier.notify(title, message, duration);
            }
            Err(e) => {
                tracing::warn!("Mac notification error: {}", e);
                ConsoleNotifier.notify(title, message, duration);
            }
        }
    }
}

fn applescript_string(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keycode_table_round_trips() {
        assert_eq!(keycode_for('J'), Some(38));
        assert_eq!(key_for_keycode(38), Some('J'));
        assert_eq!(keycode_for('!'), None);
    }

    #[test]
    fn command_flag_maps_to_meta() {
        assert_eq!(modifiers_from_flags(NS_COMMAND_KEY_MASK), ModifierSet::META);
        assert!(modifiers_from_flags(0).is_empty());
    }

    #[test]
    fn applescript_quotes_are_escaped() {
        assert_eq!(applescript_string(r#"say "hi""#), r#""say \"hi\"""#);
    }
}
