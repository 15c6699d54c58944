//! Key combination parsing and press tracking shared by the platform listeners.

use std::sync::atomic::{AtomicU8, Ordering};

use super::HotkeyError;

/// Set of modifier keys, stored as bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierSet(u8);

impl ModifierSet {
    pub const NONE: Self = Self(0);
    pub const CONTROL: Self = Self(1);
    pub const SHIFT: Self = Self(1 << 1);
    pub const ALT: Self = Self(1 << 2);
    /// Command on macOS, Windows key elsewhere
    pub const META: Self = Self(1 << 3);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// A modifier set plus one letter or digit, e.g. `Ctrl+J`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Combo {
    pub modifiers: ModifierSet,
    pub key: char,
}

impl Combo {
    /// Parse strings like `Ctrl+J`, `Cmd+J` or `⌘+Shift+T`
    pub fn parse(text: &str) -> Result<Self, HotkeyError> {
        let invalid = || HotkeyError::InvalidCombo(text.to_string());

        let mut modifiers = ModifierSet::NONE;
        let mut key = None;

        for part in text.split('+').map(str::trim) {
            let modifier = match part.to_lowercase().as_str() {
                "ctrl" | "control" => Some(ModifierSet::CONTROL),
                "shift" => Some(ModifierSet::SHIFT),
                "alt" | "option" | "opt" => Some(ModifierSet::ALT),
                "cmd" | "command" | "⌘" | "super" | "win" | "meta" => Some(ModifierSet::META),
                _ => None,
            };
            if let Some(m) = modifier {
                modifiers = modifiers.union(m);
                continue;
            }

            let mut chars = part.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphanumeric() && key.is_none() => {
                    key = Some(c.to_ascii_uppercase());
                }
                _ => return Err(invalid()),
            }
        }

        let key = key.ok_or_else(invalid)?;
        if modifiers.is_empty() {
            return Err(invalid());
        }
        Ok(Self { modifiers, key })
    }
}

/// Tracks held modifiers and reports when the combo key goes down while
/// all required modifiers are held.
pub struct ComboTracker {
    combo: Combo,
    held: AtomicU8,
}

impl ComboTracker {
    pub fn new(combo: Combo) -> Self {
        Self {
            combo,
            held: AtomicU8::new(0),
        }
    }

    pub fn combo(&self) -> Combo {
        self.combo
    }

    /// Record the full set of modifiers currently held
    pub fn set_modifiers(&self, held: ModifierSet) {
        self.held.store(held.0, Ordering::SeqCst);
    }

    pub fn modifiers(&self) -> ModifierSet {
        ModifierSet(self.held.load(Ordering::SeqCst))
    }

    /// Returns true when `key` completes the combo
    pub fn key_pressed(&self, key: char) -> bool {
        key.to_ascii_uppercase() == self.combo.key && self.modifiers().contains(self.combo.modifiers)
    }
}
