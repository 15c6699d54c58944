//! Translation Controller
//!
//! Coordinates one translation run: clipboard read, remote translation,
//! clipboard write, UI update and notification.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::data::AppConfig;
use crate::platform::{ClipboardAccess, ClipboardError, Notifier};
use crate::translation::{TranslationError, Translator};
use crate::ui::SharedUi;

pub const APP_TITLE: &str = "Clipboard Japanese Translator";
pub const EMPTY_CLIPBOARD: &str = "Clipboard is empty";
pub const TRANSLATED_TITLE: &str = "Text Translated to Japanese";
pub const TRANSLATED_MESSAGE: &str = "Translated and copied to clipboard!";
pub const ERROR_TITLE: &str = "Translation Error";

/// Destination language handed to the translator on every run
pub const TARGET_LANGUAGE: &str = "ja";

const PREVIEW_LIMIT: usize = 28;
const PREVIEW_KEEP: usize = 25;

/// Shorten `text` for a notification body.
///
/// Strings longer than 28 characters become their first 25 characters
/// followed by `...`.
pub fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_LIMIT {
        let head: String = text.chars().take(PREVIEW_KEEP).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// Clipboard translation orchestrator
pub struct TranslationController {
    clipboard: Arc<dyn ClipboardAccess>,
    translator: Arc<dyn Translator>,
    notifier: Arc<dyn Notifier>,
    ui: Arc<SharedUi>,
    notifications_enabled: bool,
    notification_duration: Duration,
    busy: AtomicBool,
}

/// Clears the busy flag when a run ends, however it ends
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl TranslationController {
    pub fn new(
        config: &AppConfig,
        clipboard: Arc<dyn ClipboardAccess>,
        translator: Arc<dyn Translator>,
        notifier: Arc<dyn Notifier>,
        ui: Arc<SharedUi>,
    ) -> Self {
        Self {
            clipboard,
            translator,
            notifier,
            ui,
            notifications_enabled: config.general.notifications,
            notification_duration: config.general.notification_duration(),
            busy: AtomicBool::new(false),
        }
    }

    /// Check if a translation is currently running
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn clipboard(&self) -> &Arc<dyn ClipboardAccess> {
        &self.clipboard
    }

    /// Translate the clipboard contents in place.
    ///
    /// Returns the translated text, or `None` when the clipboard was empty,
    /// the translation failed, or another run was already in flight.
    pub async fn translate_clipboard(&self, notify: bool) -> Option<String> {
        let Some(_guard) = BusyGuard::acquire(&self.busy) else {
            tracing::info!("Translation already in progress, ignoring trigger");
            return None;
        };
        let notify = notify && self.notifications_enabled;

        let original = match self.read_clipboard().await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Failed to read clipboard: {}", e);
                String::new()
            }
        };

        if original.is_empty() {
            tracing::info!("Clipboard is empty, nothing to translate");
            if notify {
                self.notify(APP_TITLE, EMPTY_CLIPBOARD).await;
            }
            self.ui.update(|s| {
                if s.visible {
                    s.result_message = EMPTY_CLIPBOARD.to_string();
                }
            });
            return None;
        }

        tracing::info!(
            "Translating {} chars to '{}'",
            original.chars().count(),
            TARGET_LANGUAGE
        );

        let result = match self.translator.translate(&original, TARGET_LANGUAGE).await {
            Ok(translated) if translated.is_empty() => Err(TranslationError::Empty.to_string()),
            Ok(translated) => self
                .write_clipboard(translated.clone())
                .await
                .map(|_| translated)
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match result {
            Ok(translated) => {
                tracing::info!("Translation copied to clipboard");
                self.ui.update(|s| {
                    if s.visible {
                        s.original_text = original.clone();
                        s.translated_text = translated.clone();
                        s.result_message = TRANSLATED_MESSAGE.to_string();
                    }
                });

                if notify {
                    let body = format!(
                        "Original: {}\nTranslated: {}",
                        preview(&original),
                        preview(&translated)
                    );
                    self.notify(TRANSLATED_TITLE, &body).await;
                }
                Some(translated)
            }
            Err(e) => {
                let message = format!("Error: {}", e);
                tracing::error!("Translation failed: {}", e);
                if notify {
                    self.notify(ERROR_TITLE, &message).await;
                }
                self.ui.update(|s| {
                    if s.visible {
                        s.result_message = message.clone();
                    }
                });
                None
            }
        }
    }

    // Clipboard and notifier backends block; keep them on the blocking pool

    async fn read_clipboard(&self) -> Result<String, ClipboardError> {
        let clipboard = self.clipboard.clone();
        tokio::task::spawn_blocking(move || clipboard.get_text())
            .await
            .unwrap_or_else(|e| Err(ClipboardError::Unavailable(e.to_string())))
    }

    async fn write_clipboard(&self, text: String) -> Result<(), ClipboardError> {
        let clipboard = self.clipboard.clone();
        tokio::task::spawn_blocking(move || clipboard.set_text(&text))
            .await
            .unwrap_or_else(|e| Err(ClipboardError::Write(e.to_string())))
    }

    async fn notify(&self, title: &str, message: &str) {
        let notifier = self.notifier.clone();
        let title = title.to_string();
        let message = message.to_string();
        let duration = self.notification_duration;
        if let Err(e) =
            tokio::task::spawn_blocking(move || notifier.notify(&title, &message, duration)).await
        {
            tracing::warn!("Notification task failed: {}", e);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    #[derive(Default)]
    pub struct FakeClipboard {
        pub text: Mutex<String>,
        pub fail_writes: bool,
    }

    impl FakeClipboard {
        pub fn with_text(text: &str) -> Self {
            Self {
                text: Mutex::new(text.to_string()),
                fail_writes: false,
            }
        }

        pub fn contents(&self) -> String {
            self.text.lock().unwrap().clone()
        }
    }

    impl ClipboardAccess for FakeClipboard {
        fn get_text(&self) -> Result<String, ClipboardError> {
            Ok(self.contents())
        }

        fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
            if self.fail_writes {
                return Err(ClipboardError::Write("locked".to_string()));
            }
            *self.text.lock().unwrap() = text.to_string();
            Ok(())
        }
    }

    pub struct FakeTranslator {
        pub reply: Result<String, String>,
        pub calls: AtomicUsize,
        pub targets: Mutex<Vec<String>>,
    }

    impl FakeTranslator {
        pub fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                calls: AtomicUsize::new(0),
                targets: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                calls: AtomicUsize::new(0),
                targets: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Translator for FakeTranslator {
        async fn translate(&self, _text: &str, target: &str) -> Result<String, TranslationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.targets.lock().unwrap().push(target.to_string());
            self.reply
                .clone()
                .map_err(TranslationError::Malformed)
        }
    }

    #[derive(Default)]
    pub struct RecordingNotifier {
        pub sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingNotifier {
        pub fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, title: &str, message: &str, _duration: Duration) {
            self.sent
                .lock()
                .unwrap()
                .push((title.to_string(), message.to_string()));
        }
    }

    struct Harness {
        clipboard: Arc<FakeClipboard>,
        translator: Arc<FakeTranslator>,
        notifier: Arc<RecordingNotifier>,
        ui: Arc<SharedUi>,
        controller: TranslationController,
    }

    fn harness(clipboard: FakeClipboard, translator: FakeTranslator) -> Harness {
        let clipboard = Arc::new(clipboard);
        let translator = Arc::new(translator);
        let notifier = Arc::new(RecordingNotifier::default());
        let ui = Arc::new(SharedUi::new());
        ui.set_visible(true);
        let controller = TranslationController::new(
            &AppConfig::default(),
            clipboard.clone(),
            translator.clone(),
            notifier.clone(),
            ui.clone(),
        );
        Harness {
            clipboard,
            translator,
            notifier,
            ui,
            controller,
        }
    }

    #[test]
    fn preview_truncates_long_text() {
        let text = "Hello, how are you today my friend?";
        assert_eq!(preview(text), "Hello, how are you today ...");
        assert_eq!(preview(text).chars().count(), 28);
    }

    #[test]
    fn preview_keeps_short_text() {
        assert_eq!(preview("Good morning"), "Good morning");
        let exactly_28 = "a".repeat(28);
        assert_eq!(preview(&exactly_28), exactly_28);
        let just_over = "a".repeat(29);
        assert_eq!(preview(&just_over), format!("{}...", "a".repeat(25)));
    }

    #[test]
    fn preview_counts_characters_not_bytes() {
        let japanese = "あ".repeat(28);
        assert_eq!(preview(&japanese), japanese);
        let longer = "あ".repeat(30);
        assert_eq!(preview(&longer), format!("{}...", "あ".repeat(25)));
    }

    #[tokio::test]
    async fn translates_and_updates_everything() {
        let h = harness(
            FakeClipboard::with_text("Good morning"),
            FakeTranslator::ok("おはよう"),
        );

        let result = h.controller.translate_clipboard(true).await;

        assert_eq!(result.as_deref(), Some("おはよう"));
        assert_eq!(h.clipboard.contents(), "おはよう");
        assert_eq!(h.translator.targets.lock().unwrap().as_slice(), ["ja"]);

        let ui = h.ui.snapshot();
        assert_eq!(ui.original_text, "Good morning");
        assert_eq!(ui.translated_text, "おはよう");
        assert_eq!(ui.result_message, TRANSLATED_MESSAGE);

        let sent = h.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, TRANSLATED_TITLE);
        assert_eq!(sent[0].1, "Original: Good morning\nTranslated: おはよう");
    }

    #[tokio::test]
    async fn empty_clipboard_skips_translation() {
        let h = harness(FakeClipboard::with_text(""), FakeTranslator::ok("unused"));

        let result = h.controller.translate_clipboard(true).await;

        assert!(result.is_none());
        assert_eq!(h.translator.calls(), 0);
        assert_eq!(h.clipboard.contents(), "");
        assert_eq!(h.ui.snapshot().result_message, EMPTY_CLIPBOARD);
        assert_eq!(
            h.notifier.sent(),
            vec![(APP_TITLE.to_string(), EMPTY_CLIPBOARD.to_string())]
        );
    }

    #[tokio::test]
    async fn whitespace_is_forwarded() {
        let h = harness(FakeClipboard::with_text("   "), FakeTranslator::ok("　"));
        assert_eq!(h.controller.translate_clipboard(false).await.as_deref(), Some("　"));
        assert_eq!(h.translator.calls(), 1);
    }

    #[tokio::test]
    async fn failure_leaves_clipboard_untouched() {
        let h = harness(
            FakeClipboard::with_text("Good morning"),
            FakeTranslator::failing("quota exceeded"),
        );

        let result = h.controller.translate_clipboard(true).await;

        assert!(result.is_none());
        assert_eq!(h.clipboard.contents(), "Good morning");

        let ui = h.ui.snapshot();
        assert!(ui.result_message.starts_with("Error: "));
        assert!(ui.result_message.contains("quota exceeded"));
        assert!(ui.translated_text.is_empty());

        let sent = h.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, ERROR_TITLE);
        assert_eq!(sent[0].1, ui.result_message);
    }

    #[tokio::test]
    async fn target_language_ignores_config() {
        let mut config = AppConfig::default();
        config.translation.source_language = "en".to_string();
        let translator = Arc::new(FakeTranslator::ok("おはよう"));
        let notifier = Arc::new(RecordingNotifier::default());
        let controller = TranslationController::new(
            &config,
            Arc::new(FakeClipboard::with_text("Good morning")),
            translator.clone(),
            notifier.clone(),
            Arc::new(SharedUi::new()),
        );

        controller.translate_clipboard(true).await;

        assert_eq!(translator.targets.lock().unwrap().as_slice(), [TARGET_LANGUAGE]);
        assert_eq!(notifier.sent()[0].0, TRANSLATED_TITLE);
    }

    #[tokio::test]
    async fn empty_translation_is_an_error() {
        let h = harness(FakeClipboard::with_text("Good morning"), FakeTranslator::ok(""));

        let result = h.controller.translate_clipboard(true).await;

        assert!(result.is_none());
        assert_eq!(h.clipboard.contents(), "Good morning");
        let ui = h.ui.snapshot();
        assert!(ui.result_message.starts_with("Error: "));
        assert!(ui.translated_text.is_empty());
        let sent = h.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, ERROR_TITLE);
    }

    /// Clipboard that records whether it was called on the runtime thread
    struct ThreadCheckingClipboard {
        inner: FakeClipboard,
        runtime_thread: std::thread::ThreadId,
        on_runtime: Mutex<Vec<bool>>,
    }

    impl ThreadCheckingClipboard {
        fn record(&self) {
            let here = std::thread::current().id() == self.runtime_thread;
            self.on_runtime.lock().unwrap().push(here);
        }
    }

    impl ClipboardAccess for ThreadCheckingClipboard {
        fn get_text(&self) -> Result<String, ClipboardError> {
            self.record();
            self.inner.get_text()
        }

        fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
            self.record();
            self.inner.set_text(text)
        }
    }

    #[tokio::test]
    async fn clipboard_runs_off_the_runtime_thread() {
        let clipboard = Arc::new(ThreadCheckingClipboard {
            inner: FakeClipboard::with_text("Good morning"),
            runtime_thread: std::thread::current().id(),
            on_runtime: Mutex::new(Vec::new()),
        });
        let controller = TranslationController::new(
            &AppConfig::default(),
            clipboard.clone(),
            Arc::new(FakeTranslator::ok("おはよう")),
            Arc::new(RecordingNotifier::default()),
            Arc::new(SharedUi::new()),
        );

        controller.translate_clipboard(false).await;

        assert_eq!(clipboard.on_runtime.lock().unwrap().as_slice(), [false, false]);
        assert_eq!(clipboard.inner.contents(), "おはよう");
    }

    #[tokio::test]
    async fn clipboard_write_failure_is_reported() {
        let clipboard = FakeClipboard {
            text: Mutex::new("Good morning".to_string()),
            fail_writes: true,
        };
        let h = harness(clipboard, FakeTranslator::ok("おはよう"));

        assert!(h.controller.translate_clipboard(false).await.is_none());
        assert_eq!(h.clipboard.contents(), "Good morning");
        assert!(h.ui.snapshot().result_message.starts_with("Error: "));
        assert!(h.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn notify_flag_suppresses_notifications() {
        let h = harness(
            FakeClipboard::with_text("Good morning"),
            FakeTranslator::ok("おはよう"),
        );
        h.controller.translate_clipboard(false).await;
        assert!(h.notifier.sent().is_empty());
        assert_eq!(h.ui.snapshot().translated_text, "おはよう");
    }

    #[tokio::test]
    async fn hidden_window_panels_are_left_alone() {
        let h = harness(
            FakeClipboard::with_text("Good morning"),
            FakeTranslator::ok("おはよう"),
        );
        h.ui.set_visible(false);

        assert_eq!(
            h.controller.translate_clipboard(false).await.as_deref(),
            Some("おはよう")
        );
        let ui = h.ui.snapshot();
        assert!(ui.original_text.is_empty());
        assert!(ui.translated_text.is_empty());
        assert_eq!(h.clipboard.contents(), "おはよう");
    }

    #[tokio::test]
    async fn disabled_notifications_in_config_win() {
        let mut config = AppConfig::default();
        config.general.notifications = false;
        let notifier = Arc::new(RecordingNotifier::default());
        let controller = TranslationController::new(
            &config,
            Arc::new(FakeClipboard::with_text("hi")),
            Arc::new(FakeTranslator::ok("やあ")),
            notifier.clone(),
            Arc::new(SharedUi::new()),
        );
        controller.translate_clipboard(true).await;
        assert!(notifier.sent().is_empty());
    }

    /// Translator that parks until released, to hold a run in flight
    struct GatedTranslator {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl Translator for GatedTranslator {
        async fn translate(&self, text: &str, _target: &str) -> Result<String, TranslationError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(format!("[{}]", text))
        }
    }

    #[tokio::test]
    async fn overlapping_trigger_is_dropped() {
        let translator = Arc::new(GatedTranslator {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let clipboard = Arc::new(FakeClipboard::with_text("hello"));
        let controller = Arc::new(TranslationController::new(
            &AppConfig::default(),
            clipboard.clone(),
            translator.clone(),
            Arc::new(RecordingNotifier::default()),
            Arc::new(SharedUi::new()),
        ));

        let first = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.translate_clipboard(false).await })
        };
        translator.entered.notified().await;
        assert!(controller.is_busy());

        assert!(controller.translate_clipboard(false).await.is_none());

        translator.release.notify_one();
        assert_eq!(first.await.unwrap().as_deref(), Some("[hello]"));
        assert!(!controller.is_busy());
        assert_eq!(clipboard.contents(), "[hello]");
    }
}
