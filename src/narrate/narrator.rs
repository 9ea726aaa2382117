//! Core `Narrator` trait and `ElevenLabsNarrator` implementation.
//!
//! `ElevenLabsNarrator` calls
//! `POST {base_url}/v1/text-to-speech/{voice_id}` and streams the response
//! body straight into the session's [`AudioSpool`].

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use thiserror::Error;

use crate::config::NarratorConfig;
use crate::narrate::audio::{extension_for, AudioHandle, AudioSpool};
use crate::narrate::voice::Voice;

// ---------------------------------------------------------------------------
// SynthesisError
// ---------------------------------------------------------------------------

/// Errors that can occur while synthesizing speech.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// No API key in the config or the environment.
    #[error("no API key configured for speech synthesis (set ELEVENLABS_API_KEY)")]
    MissingApiKey,

    /// Nothing to read aloud.
    #[error("the text to synthesize is empty")]
    EmptyInput,

    /// HTTP transport or connection error, including a broken stream.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("speech synthesis timed out")]
    Timeout,

    /// The backend answered with a non-success status (auth, quota …).
    #[error("speech backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The stream ended without any audio.
    #[error("speech backend returned no audio")]
    EmptyAudio,

    /// The audio file could not be written.
    #[error("could not store audio: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for SynthesisError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SynthesisError::Timeout
        } else {
            SynthesisError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Narrator trait
// ---------------------------------------------------------------------------

/// Async trait for speech synthesis backends.
///
/// `language` is an ISO-639-1 code (`"fr"`, `"en"` …).  The returned handle
/// owns the audio file; see [`AudioHandle`].
#[async_trait]
pub trait Narrator: Send + Sync {
    async fn synthesize(
        &self,
        text: &str,
        voice: &Voice,
        language: &str,
    ) -> Result<AudioHandle, SynthesisError>;
}

// ---------------------------------------------------------------------------
// ElevenLabsNarrator
// ---------------------------------------------------------------------------

/// Synthesizes speech with the ElevenLabs text-to-speech API.
pub struct ElevenLabsNarrator {
    client: reqwest::Client,
    config: NarratorConfig,
    api_key: Option<String>,
    spool: Arc<AudioSpool>,
}

impl ElevenLabsNarrator {
    /// Build a narrator writing into `spool`.
    ///
    /// As with generation, a missing API key only surfaces on the first
    /// call.
    pub fn from_config(config: &NarratorConfig, spool: Arc<AudioSpool>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            api_key: config.resolved_api_key(),
            config: config.clone(),
            spool,
        }
    }

    fn request_body(&self, text: &str, language: &str) -> serde_json::Value {
        let settings = &self.config.voice_settings;
        let mut body = serde_json::json!({
            "text":     text,
            "model_id": self.config.model_id,
            "voice_settings": {
                "stability":         settings.stability,
                "similarity_boost":  settings.similarity_boost,
                "style":             settings.style,
                "use_speaker_boost": settings.use_speaker_boost
            }
        });
        if self.config.send_language_code {
            body["language_code"] = serde_json::Value::from(language);
        }
        body
    }
}

#[async_trait]
impl Narrator for ElevenLabsNarrator {
    async fn synthesize(
        &self,
        text: &str,
        voice: &Voice,
        language: &str,
    ) -> Result<AudioHandle, SynthesisError> {
        let key = self.api_key.as_deref().ok_or(SynthesisError::MissingApiKey)?;
        if text.trim().is_empty() {
            return Err(SynthesisError::EmptyInput);
        }

        let url = format!(
            "{}/v1/text-to-speech/{}",
            self.config.base_url.trim_end_matches('/'),
            voice.id
        );

        log::debug!(
            "narrator: {} chars, voice {} ({}), language {language}",
            text.chars().count(),
            voice.name,
            voice.id
        );

        let response = self
            .client
            .post(&url)
            .query(&[("output_format", self.config.output_format.as_str())])
            .header("xi-api-key", key)
            .json(&self.request_body(text, language))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SynthesisError::Status {
                status: status.as_u16(),
                body,
            });
        }

        // The writer deletes its file if anything below returns early.
        let mut writer = self.spool.create(extension_for(&self.config.output_format))?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            writer.write_chunk(&chunk?)?;
        }

        if writer.bytes_written() == 0 {
            return Err(SynthesisError::EmptyAudio);
        }

        Ok(writer.finish()?)
    }
}

// ---------------------------------------------------------------------------
// MockNarrator (tests only)
// ---------------------------------------------------------------------------

/// Test double that writes a small fake payload per call, failing for the
/// configured language codes.
#[cfg(test)]
pub struct MockNarrator {
    spool: Arc<AudioSpool>,
    failing: Vec<&'static str>,
    calls: std::sync::Mutex<Vec<(String, String, String)>>,
}

#[cfg(test)]
impl MockNarrator {
    pub fn ok() -> Self {
        Self::failing_for(&[])
    }

    pub fn failing_for(codes: &[&'static str]) -> Self {
        Self {
            spool: Arc::new(AudioSpool::temporary().unwrap()),
            failing: codes.to_vec(),
            calls: Default::default(),
        }
    }

    pub fn spool(&self) -> &AudioSpool {
        &self.spool
    }

    /// Every `(text, voice_id, language)` triple received so far.
    pub fn calls(&self) -> Vec<(String, String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl Narrator for MockNarrator {
    async fn synthesize(
        &self,
        text: &str,
        voice: &Voice,
        language: &str,
    ) -> Result<AudioHandle, SynthesisError> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), voice.id.clone(), language.to_string()));
        if self.failing.iter().any(|code| *code == language) {
            return Err(SynthesisError::Status {
                status: 401,
                body: "quota_exceeded".into(),
            });
        }
        let mut writer = self.spool.create("mp3")?;
        writer.write_chunk(format!("{language}:{}:{text}", voice.id).as_bytes())?;
        Ok(writer.finish()?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn narrator(config: NarratorConfig) -> ElevenLabsNarrator {
        let spool = Arc::new(AudioSpool::temporary().unwrap());
        ElevenLabsNarrator::from_config(&config, spool)
    }

    #[test]
    fn narrator_is_object_safe() {
        let n: Box<dyn Narrator> = Box::new(narrator(NarratorConfig::default()));
        drop(n);
    }

    #[test]
    fn request_body_carries_model_and_settings() {
        let body = narrator(NarratorConfig::default()).request_body("Bonjour", "fr");
        assert_eq!(body["text"], "Bonjour");
        assert_eq!(body["model_id"], "eleven_multilingual_v2");
        assert_eq!(body["voice_settings"]["stability"], 1.0);
        assert_eq!(body["voice_settings"]["use_speaker_boost"], true);
        assert!(body.get("language_code").is_none());
    }

    #[test]
    fn request_body_includes_language_code_when_enabled() {
        let mut config = NarratorConfig::default();
        config.send_language_code = true;
        let body = narrator(config).request_body("Hello", "en");
        assert_eq!(body["language_code"], "en");
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let mut config = NarratorConfig::default();
        config.base_url = "http://127.0.0.1:9".into();
        let mut n = narrator(config);
        // ELEVENLABS_API_KEY may be set in the environment.
        n.api_key = None;

        let voice = Voice::new("Matilda", "XrExE9yKIg1WjnnlVkGX");
        let err = n.synthesize("Bonjour", &voice, "fr").await.unwrap_err();
        assert!(matches!(err, SynthesisError::MissingApiKey));
    }

    #[tokio::test]
    async fn blank_text_is_rejected() {
        let mut n = narrator(NarratorConfig::default());
        n.api_key = Some("test-key".into());

        let voice = Voice::new("George", "JBFqnCBsd6RMkjVDRZzb");
        let err = n.synthesize("   ", &voice, "fr").await.unwrap_err();
        assert!(matches!(err, SynthesisError::EmptyInput));
    }

    #[tokio::test]
    async fn mock_writes_one_file_per_call() {
        let mock = MockNarrator::failing_for(&["it"]);
        let voice = Voice::new("Matilda", "XrExE9yKIg1WjnnlVkGX");

        let fr = mock.synthesize("Bonjour", &voice, "fr").await.unwrap();
        assert!(mock.synthesize("Ciao", &voice, "it").await.is_err());

        assert_eq!(mock.spool().file_count().unwrap(), 1);
        assert_eq!(
            std::fs::read_to_string(fr.path()).unwrap(),
            "fr:XrExE9yKIg1WjnnlVkGX:Bonjour"
        );
        assert_eq!(mock.calls().len(), 2);
    }
}
