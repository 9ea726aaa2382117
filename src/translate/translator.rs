//! Core `Translator` trait and `GoogleTranslator` implementation.
//!
//! `GoogleTranslator` calls the public Google Translate `gtx` endpoint.  The
//! source language is fixed by config (`fr`); the target comes from the
//! [`Language`] passed to each call.

use std::future::Future;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::TranslatorConfig;
use crate::model::Language;
use crate::translate::chunk::{reassemble, split_into_chunks};

// ---------------------------------------------------------------------------
// TranslationError
// ---------------------------------------------------------------------------

/// Errors that can occur while translating a notice.
#[derive(Debug, Error)]
pub enum TranslationError {
    /// Nothing to translate.
    #[error("the text to translate is empty")]
    EmptyInput,

    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("translation timed out")]
    Timeout,

    /// The backend answered with a non-success status (rate limit …).
    #[error("translation backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse translation response: {0}")]
    Parse(String),

    /// The backend returned no translated text.
    #[error("translation backend returned an empty translation")]
    EmptyResponse,
}

impl From<reqwest::Error> for TranslationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TranslationError::Timeout
        } else {
            TranslationError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Translator trait
// ---------------------------------------------------------------------------

/// Async trait for translation backends.
///
/// Implementations must keep the paragraph structure of `text`.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target: Language) -> Result<String, TranslationError>;
}

// ---------------------------------------------------------------------------
// GoogleTranslator
// ---------------------------------------------------------------------------

/// Translates through `translate_a/single?client=gtx`.
pub struct GoogleTranslator {
    client: reqwest::Client,
    config: TranslatorConfig,
}

impl GoogleTranslator {
    pub fn from_config(config: &TranslatorConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    async fn translate_chunk(
        &self,
        chunk: &str,
        target: Language,
    ) -> Result<String, TranslationError> {
        let url = format!(
            "{}/translate_a/single",
            self.config.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", self.config.source_language.as_str()),
                ("tl", target.code()),
                ("dt", "t"),
            ])
            .form(&[("q", chunk)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TranslationError::Parse(e.to_string()))?;

        extract_translation(&json)
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target: Language) -> Result<String, TranslationError> {
        log::debug!(
            "translator: {} → {}",
            self.config.source_language,
            target.code()
        );
        translate_chunked(text, self.config.max_chunk_chars, |chunk| async move {
            self.translate_chunk(&chunk, target).await
        })
        .await
    }
}

/// Translate `text` one request-sized chunk at a time, in order, and put the
/// pieces back together with the original paragraph and line breaks.
///
/// The first failing chunk aborts the whole call; no partial translation
/// is ever returned.
pub async fn translate_chunked<F, Fut>(
    text: &str,
    max_chunk_chars: usize,
    mut translate_one: F,
) -> Result<String, TranslationError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<String, TranslationError>>,
{
    let chunks = split_into_chunks(text, max_chunk_chars);
    if chunks.is_empty() {
        return Err(TranslationError::EmptyInput);
    }
    log::debug!("translator: {} chunk(s)", chunks.len());

    let mut translated = Vec::with_capacity(chunks.len());
    for chunk in &chunks {
        translated.push(translate_one(chunk.text.clone()).await?);
    }
    Ok(reassemble(&chunks, &translated))
}

/// Concatenate the translated segments of a `gtx` response.
///
/// The body looks like `[[["Hello","Bonjour",null,null,1], …], null, "fr", …]`:
/// the first array holds one entry per sentence, translated text first.
pub fn extract_translation(json: &serde_json::Value) -> Result<String, TranslationError> {
    let segments = json[0]
        .as_array()
        .ok_or_else(|| TranslationError::Parse("missing segment array".into()))?;

    let text: String = segments
        .iter()
        .filter_map(|segment| segment[0].as_str())
        .collect();

    let text = text.trim();
    if text.is_empty() {
        return Err(TranslationError::EmptyResponse);
    }
    Ok(text.to_string())
}

// ---------------------------------------------------------------------------
// MockTranslator (tests only)
// ---------------------------------------------------------------------------

/// Test double that tags text with the target code (`"[en] …"`), failing
/// for the configured languages, and records every request.
#[cfg(test)]
#[derive(Default)]
pub struct MockTranslator {
    failing: std::sync::Mutex<Vec<Language>>,
    requests: std::sync::Mutex<Vec<(String, Language)>>,
}

#[cfg(test)]
impl MockTranslator {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn failing_for(languages: &[Language]) -> Self {
        let mock = Self::default();
        mock.set_failing(languages);
        mock
    }

    pub fn set_failing(&self, languages: &[Language]) {
        *self.failing.lock().unwrap() = languages.to_vec();
    }

    /// Every `(text, target)` pair received so far.
    pub fn requests(&self) -> Vec<(String, Language)> {
        self.requests.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, text: &str, target: Language) -> Result<String, TranslationError> {
        self.requests.lock().unwrap().push((text.to_string(), target));
        if self.failing.lock().unwrap().contains(&target) {
            return Err(TranslationError::Status {
                status: 429,
                body: "too many requests".into(),
            });
        }
        if text.trim().is_empty() {
            return Err(TranslationError::EmptyInput);
        }
        Ok(format!("[{}] {}", target.code(), text))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn translator_is_object_safe() {
        let t: Box<dyn Translator> =
            Box::new(GoogleTranslator::from_config(&TranslatorConfig::default()));
        drop(t);
    }

    #[test]
    fn concatenates_sentence_segments() {
        let body = json!([
            [
                ["Jean Dupont passed away. ", "Jean Dupont nous a quittés. ", null, null, 10],
                ["\n\n", "\n\n", null, null, 3],
                ["The ceremony will take place on Friday.", "La cérémonie aura lieu vendredi.", null, null, 10]
            ],
            null,
            "fr"
        ]);
        assert_eq!(
            extract_translation(&body).unwrap(),
            "Jean Dupont passed away. \n\nThe ceremony will take place on Friday."
        );
    }

    #[test]
    fn non_array_body_is_parse_error() {
        let body = json!({ "error": "blocked" });
        assert!(matches!(
            extract_translation(&body),
            Err(TranslationError::Parse(_))
        ));
    }

    #[test]
    fn empty_segments_are_empty_response() {
        let body = json!([[], null, "fr"]);
        assert!(matches!(
            extract_translation(&body),
            Err(TranslationError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn blank_text_is_rejected_before_any_request() {
        let mut config = TranslatorConfig::default();
        // Unroutable: a request would fail with Request, not EmptyInput.
        config.base_url = "http://127.0.0.1:9".into();
        let translator = GoogleTranslator::from_config(&config);

        let err = translator.translate("  \n\n ", Language::English).await.unwrap_err();
        assert!(matches!(err, TranslationError::EmptyInput));
    }

    #[tokio::test]
    async fn oversize_paragraph_stays_one_paragraph() {
        let text = "Ligne un\nLigne deux trois quatre\n\nFin.";
        let translated = translate_chunked(text, 12, |chunk| async move {
            Ok(format!("<{chunk}>"))
        })
        .await
        .unwrap();

        assert_eq!(
            translated,
            "<Ligne un>\n<Ligne deux> <trois quatre>\n\n<Fin.>"
        );
        assert_eq!(translated.matches("\n\n").count(), 1);
    }

    #[tokio::test]
    async fn failing_chunk_fails_the_whole_text() {
        let mut calls = 0;
        let result = translate_chunked("aaaa\n\nbbbb", 4, |chunk| {
            calls += 1;
            async move {
                if chunk == "bbbb" {
                    Err(TranslationError::Timeout)
                } else {
                    Ok(chunk)
                }
            }
        })
        .await;

        assert!(matches!(result, Err(TranslationError::Timeout)));
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn mock_records_requests_and_fails_on_demand() {
        let mock = MockTranslator::failing_for(&[Language::Italian]);
        assert_eq!(
            mock.translate("Bonjour", Language::English).await.unwrap(),
            "[en] Bonjour"
        );
        assert!(mock.translate("Bonjour", Language::Italian).await.is_err());
        assert_eq!(mock.requests().len(), 2);
    }
}
