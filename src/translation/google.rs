use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use super::{TranslationError, Translator};
use crate::data::TranslationConfig;

/// Client for the public Google Translate `translate_a/single` endpoint
pub struct GoogleTranslator {
    client: reqwest::Client,
    endpoint: String,
    source_language: String,
}

impl GoogleTranslator {
    pub fn new(config: &TranslationConfig) -> Result<Self, TranslationError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: config.endpoint.clone(),
            source_language: config.source_language.clone(),
        })
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target: &str) -> Result<String, TranslationError> {
        tracing::debug!(
            "Requesting translation {} -> {} ({} chars)",
            self.source_language,
            target,
            text.chars().count()
        );

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", self.source_language.as_str()),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TranslationError::Status(response.status()));
        }

        let body: Value = response.json().await?;
        parse_response(&body)
    }
}

/// Concatenate the translated segments of a `translate_a/single` payload.
///
/// The payload looks like `[[["訳1","src1",..],["訳2","src2",..]], null, "en", ..]`.
fn parse_response(body: &Value) -> Result<String, TranslationError> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslationError::Malformed("missing segment list".to_string()))?;

    let mut translated = String::new();
    for segment in segments {
        match segment.get(0) {
            Some(Value::String(part)) => translated.push_str(part),
            Some(Value::Null) => {}
            _ => {
                return Err(TranslationError::Malformed(format!(
                    "unexpected segment: {}",
                    segment
                )))
            }
        }
    }

    if translated.is_empty() {
        return Err(TranslationError::Empty);
    }
    Ok(translated)
}
