//! Core `NoticeGenerator` trait and `ClaudeGenerator` implementation.
//!
//! `ClaudeGenerator` calls the Anthropic Messages API
//! (`POST {base_url}/v1/messages`).  All connection details come from
//! [`GeneratorConfig`]; nothing is hardcoded.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::GeneratorConfig;
use crate::generate::prompt::PromptBuilder;
use crate::model::InputFacts;

// ---------------------------------------------------------------------------
// GenerationError
// ---------------------------------------------------------------------------

/// Errors that can occur while generating a notice.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No API key in the config or the environment.
    #[error("no API key configured for notice generation (set CLAUDE_API_KEY)")]
    MissingApiKey,

    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("notice generation timed out")]
    Timeout,

    /// The backend answered with a non-success status (auth, quota …).
    #[error("generation backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse generation response: {0}")]
    Parse(String),

    /// The backend returned no usable text.
    #[error("generation backend returned an empty notice")]
    EmptyResponse,
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GenerationError::Timeout
        } else {
            GenerationError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// NoticeGenerator trait
// ---------------------------------------------------------------------------

/// Async trait for notice generation backends.
///
/// Implementors must be `Send + Sync` so they can be held behind an
/// `Arc<dyn NoticeGenerator>`.
#[async_trait]
pub trait NoticeGenerator: Send + Sync {
    async fn generate(&self, facts: &InputFacts) -> Result<String, GenerationError>;
}

// ---------------------------------------------------------------------------
// ClaudeGenerator
// ---------------------------------------------------------------------------

/// Generates notices through the Anthropic Messages API.
pub struct ClaudeGenerator {
    client: reqwest::Client,
    config: GeneratorConfig,
    api_key: Option<String>,
    prompt_builder: PromptBuilder,
}

impl ClaudeGenerator {
    /// Build a generator from application config.
    ///
    /// The API key is resolved once here (config value, then
    /// `CLAUDE_API_KEY`).  A missing key is reported on the first call, not
    /// at construction, so the rest of the session stays usable.
    pub fn from_config(config: &GeneratorConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            api_key: config.resolved_api_key(),
            prompt_builder: PromptBuilder::new(&config.system_prompt),
            config: config.clone(),
        }
    }
}

#[async_trait]
impl NoticeGenerator for ClaudeGenerator {
    async fn generate(&self, facts: &InputFacts) -> Result<String, GenerationError> {
        let key = self.api_key.as_deref().ok_or(GenerationError::MissingApiKey)?;
        let (system_msg, user_msg) = self.prompt_builder.build_chat(facts);

        let url = format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'));

        let body = serde_json::json!({
            "model":       self.config.model,
            "max_tokens":  self.config.max_tokens,
            "temperature": self.config.temperature,
            "system":      system_msg,
            "messages": [
                { "role": "user", "content": user_msg }
            ]
        });

        log::debug!("generator: requesting notice for {:?}", facts.name);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", key)
            .header("anthropic-version", &self.config.api_version)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GenerationError::Parse(e.to_string()))?;

        extract_notice(&json)
    }
}

/// Pull the notice text out of a Messages API response body.
///
/// The first `text` block of `content` is used; surrounding whitespace is
/// trimmed.
pub fn extract_notice(json: &serde_json::Value) -> Result<String, GenerationError> {
    let blocks = json["content"]
        .as_array()
        .ok_or_else(|| GenerationError::Parse("missing `content` array".into()))?;

    let text = blocks
        .iter()
        .find(|block| block["type"].as_str().unwrap_or("text") == "text")
        .and_then(|block| block["text"].as_str())
        .ok_or(GenerationError::EmptyResponse)?
        .trim();

    if text.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    Ok(text.to_string())
}

// ---------------------------------------------------------------------------
// MockGenerator (tests only)
// ---------------------------------------------------------------------------

/// Test double that writes a short notice from the submitted facts, or
/// fails while switched to failing.
#[cfg(test)]
#[derive(Default)]
pub struct MockGenerator {
    fail: std::sync::atomic::AtomicBool,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockGenerator {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let mock = Self::default();
        mock.set_failing(true);
        mock
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl NoticeGenerator for MockGenerator {
    async fn generate(&self, facts: &InputFacts) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(GenerationError::Status {
                status: 529,
                body: "overloaded".into(),
            });
        }
        let mut notice = format!(
            "{} nous a quittés le {} à l'âge de {} ans.\n\n",
            facts.display_name(),
            facts.date_of_death.format("%d/%m/%Y"),
            facts.age
        );
        if !facts.profession.is_empty() {
            notice.push_str(&format!("Il fut {} toute sa vie.\n\n", facts.profession));
        }
        notice.push_str(&format!(
            "Il laisse {} enfants et {} petits-enfants.\n\n",
            facts.children, facts.grandchildren
        ));
        notice.push_str(&format!(
            "La cérémonie aura lieu le {}.",
            facts.ceremony_date.format("%d/%m/%Y")
        ));
        Ok(notice)
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
    fn from_config_keeps_configured_key() {
        let mut config = GeneratorConfig::default();
        config.api_key = Some("sk-ant-test".into());
        let generator = ClaudeGenerator::from_config(&config);
        assert_eq!(generator.api_key.as_deref(), Some("sk-ant-test"));
    }

    #[test]
    fn generator_is_object_safe() {
        let generator: Box<dyn NoticeGenerator> =
            Box::new(ClaudeGenerator::from_config(&GeneratorConfig::default()));
        drop(generator);
    }

    #[test]
    fn extracts_first_text_block() {
        let body = json!({
            "id": "msg_1",
            "content": [
                { "type": "text", "text": "  M. Jean Dupont nous a quittés.\n\n" }
            ]
        });
        assert_eq!(extract_notice(&body).unwrap(), "M. Jean Dupont nous a quittés.");
    }

    #[test]
    fn skips_non_text_blocks() {
        let body = json!({
            "content": [
                { "type": "thinking", "thinking": "..." },
                { "type": "text", "text": "Avis" }
            ]
        });
        assert_eq!(extract_notice(&body).unwrap(), "Avis");
    }

    #[test]
    fn missing_content_is_parse_error() {
        let body = json!({ "type": "error", "error": { "message": "bad" } });
        assert!(matches!(extract_notice(&body), Err(GenerationError::Parse(_))));
    }

    #[test]
    fn blank_text_is_empty_response() {
        let body = json!({ "content": [ { "type": "text", "text": "   " } ] });
        assert!(matches!(extract_notice(&body), Err(GenerationError::EmptyResponse)));

        let body = json!({ "content": [] });
        assert!(matches!(extract_notice(&body), Err(GenerationError::EmptyResponse)));
    }

    #[test]
    fn status_error_display_carries_body() {
        let e = GenerationError::Status {
            status: 401,
            body: "invalid x-api-key".into(),
        };
        assert!(e.to_string().contains("401"));
        assert!(e.to_string().contains("invalid x-api-key"));
    }
}
