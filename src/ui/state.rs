//! Shared presentation model.
//!
//! Background tasks write here; the window reads (and edits the text
//! panels) every frame.

use std::sync::{Mutex, MutexGuard, OnceLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub kind: DialogKind,
    pub title: String,
    pub message: String,
}

impl Dialog {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: DialogKind::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: DialogKind::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// True while the window is on screen; panels are only written then
    pub visible: bool,
    pub original_text: String,
    pub translated_text: String,
    pub hotkey_status: String,
    pub result_message: String,
    pub toggle_label: String,
    pub show_toggle: bool,
    pub show_retry: bool,
    pub dialog: Option<Dialog>,
}

type RepaintFn = Box<dyn Fn() + Send + Sync + 'static>;

/// Thread-safe handle to the [`UiState`]
#[derive(Default)]
pub struct SharedUi {
    state: Mutex<UiState>,
    repaint: OnceLock<RepaintFn>,
}

impl SharedUi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the hook that wakes the window after background updates
    pub fn set_repaint<F>(&self, repaint: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        if self.repaint.set(Box::new(repaint)).is_err() {
            tracing::debug!("Repaint hook already installed");
        }
    }

    /// Lock the state for direct access (used by the window each frame)
    pub fn lock(&self) -> MutexGuard<'_, UiState> {
        // A panic elsewhere must not take the UI down with it
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Mutate the state and request a repaint
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut UiState),
    {
        {
            let mut state = self.lock();
            f(&mut state);
        }
        if let Some(repaint) = self.repaint.get() {
            repaint();
        }
    }

    pub fn snapshot(&self) -> UiState {
        self.lock().clone()
    }

    pub fn is_visible(&self) -> bool {
        self.lock().visible
    }

    pub fn set_visible(&self, visible: bool) {
        self.update(|s| s.visible = visible);
    }
}
