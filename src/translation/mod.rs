//! Translation client
//!
//! The actual translation happens on a remote service. Every failure mode
//! (network, HTTP status, malformed payload) is collapsed into one error
//! type carrying a human-readable message.

mod google;

pub use google::GoogleTranslator;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("translation service returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("translation service returned an empty result")]
    Empty,
}

/// Remote text translator
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into the `target` language code (e.g. `ja`)
    async fn translate(&self, text: &str, target: &str) -> Result<String, TranslationError>;
}
