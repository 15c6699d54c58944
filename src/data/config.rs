//! Application Configuration
//!
//! Handles loading the user-editable configuration file.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub hotkey: HotkeyConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
}

impl AppConfig {
    /// Get the config file path
    pub fn config_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));
        exe_dir.join("config.toml")
    }

    /// Load configuration from file or create default
    pub fn load_or_default() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, writing the defaults there when missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = AppConfig::default();
            if let Err(e) = config.save_to(path) {
                // A read-only install directory is not fatal
                tracing::warn!("Could not write default config to {}: {}", path.display(), e);
            }
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// General configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_true")]
    pub notifications: bool,
    #[serde(default = "default_notification_duration")]
    pub notification_duration_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_notification_duration() -> u64 {
    3
}

impl GeneralConfig {
    pub fn notification_duration(&self) -> Duration {
        Duration::from_secs(self.notification_duration_secs)
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            notifications: true,
            notification_duration_secs: default_notification_duration(),
        }
    }
}

/// Hotkey configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotkeyConfig {
    #[serde(default = "default_true")]
    pub enabled_on_start: bool,
    #[serde(default = "default_combo_key")]
    pub combo_key: String,
}

fn default_combo_key() -> String {
    if cfg!(target_os = "macos") {
        "Cmd+J".to_string()
    } else {
        "Ctrl+J".to_string()
    }
}

impl HotkeyConfig {
    /// Human readable form of the combo, e.g. `⌘+J` on macOS
    pub fn display(&self) -> String {
        if cfg!(target_os = "macos") {
            self.combo_key
                .replace("Cmd", "⌘")
                .replace("Command", "⌘")
        } else {
            self.combo_key.clone()
        }
    }
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            enabled_on_start: true,
            combo_key: default_combo_key(),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_source_language")]
    pub source_language: String,
    /// Unset means the request may wait indefinitely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

fn default_endpoint() -> String {
    "https://translate.googleapis.com/translate_a/single".to_string()
}

fn default_source_language() -> String {
    "auto".to_string()
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            source_language: default_source_language(),
            request_timeout_secs: None,
        }
    }
}
