//! Platforms without a global hotkey backend. Translation still works
//! through the window button and CLI mode.

use crate::platform::{Combo, HotkeyCallback, HotkeyError, HotkeyProvider};

pub struct UnsupportedHotkeyProvider {
    combo: Combo,
}

impl UnsupportedHotkeyProvider {
    pub fn new(combo: Combo) -> Self {
        Self { combo }
    }
}

impl HotkeyProvider for UnsupportedHotkeyProvider {
    fn start(&self, _callback: HotkeyCallback) -> Result<(), HotkeyError> {
        tracing::info!(
            "Hotkey {:?}+{} is not available on this platform",
            self.combo.modifiers,
            self.combo.key
        );
        Err(HotkeyError::Unsupported)
    }

    fn stop(&self) -> Result<(), HotkeyError> {
        Ok(())
    }
}
