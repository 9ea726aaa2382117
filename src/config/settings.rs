//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files.  Every field carries a
//! serde default, so a `settings.toml` only needs the keys it overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::narrate::Voice;

/// Environment variable consulted when `generator.api_key` is unset.
pub const CLAUDE_API_KEY_ENV: &str = "CLAUDE_API_KEY";
/// Environment variable consulted when `narrator.api_key` is unset.
pub const ELEVENLABS_API_KEY_ENV: &str = "ELEVENLABS_API_KEY";

/// Config value if non-empty, else the environment variable if non-empty.
fn resolve_key(configured: Option<&str>, env_var: &str) -> Option<String> {
    configured
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .or_else(|| std::env::var(env_var).ok().filter(|k| !k.is_empty()))
}

// ---------------------------------------------------------------------------
// GeneratorConfig
// ---------------------------------------------------------------------------

/// Settings for the notice-generation backend (Anthropic Messages API).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Base URL of the API, without the `/v1/messages` suffix.
    pub base_url: String,
    /// API key; falls back to `CLAUDE_API_KEY` when `None`.
    pub api_key: Option<String>,
    /// Value of the `anthropic-version` header.
    pub api_version: String,
    pub model: String,
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 1.0).
    pub temperature: f32,
    pub system_prompt: String,
    /// Maximum seconds to wait for a generated notice.
    pub timeout_secs: u64,
}

impl GeneratorConfig {
    pub fn resolved_api_key(&self) -> Option<String> {
        resolve_key(self.api_key.as_deref(), CLAUDE_API_KEY_ENV)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.anthropic.com".into(),
            api_key: None,
            api_version: "2023-06-01".into(),
            model: "claude-3-5-sonnet-20241022".into(),
            max_tokens: 1000,
            temperature: 0.7,
            system_prompt: "You are an expert in writing heartfelt obituaries in French.".into(),
            timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// TranslatorConfig
// ---------------------------------------------------------------------------

/// Settings for the translation backend (Google Translate `gtx` endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub base_url: String,
    /// Source language code; notices are always written in French.
    pub source_language: String,
    /// Largest text sent in a single request.  Longer notices are split on
    /// paragraph boundaries.
    pub max_chunk_chars: usize,
    pub timeout_secs: u64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://translate.googleapis.com".into(),
            source_language: crate::model::SOURCE_CODE.into(),
            max_chunk_chars: 5000,
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// NarratorConfig
// ---------------------------------------------------------------------------

/// Speech synthesis tuning sent with every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 1.0,
            similarity_boost: 1.0,
            style: 1.0,
            use_speaker_boost: true,
        }
    }
}

/// Settings for the speech-synthesis backend (ElevenLabs).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarratorConfig {
    pub base_url: String,
    /// API key; falls back to `ELEVENLABS_API_KEY` when `None`.
    pub api_key: Option<String>,
    pub model_id: String,
    pub output_format: String,
    pub voice_settings: VoiceSettings,
    /// Send the target language as `language_code`.  Only some models accept
    /// it; `eleven_multilingual_v2` infers the language from the text.
    pub send_language_code: bool,
    /// Selectable voices.  At least two are expected.
    pub voices: Vec<Voice>,
    /// Directory for the per-session audio spool.  `None` uses the platform
    /// cache directory.
    pub audio_dir: Option<std::path::PathBuf>,
    /// Maximum seconds to wait for one synthesis call, stream included.
    pub timeout_secs: u64,
}

impl NarratorConfig {
    pub fn resolved_api_key(&self) -> Option<String> {
        resolve_key(self.api_key.as_deref(), ELEVENLABS_API_KEY_ENV)
    }
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.elevenlabs.io".into(),
            api_key: None,
            model_id: "eleven_multilingual_v2".into(),
            output_format: "mp3_44100_128".into(),
            voice_settings: VoiceSettings::default(),
            send_language_code: false,
            voices: vec![
                Voice::new("Matilda", "XrExE9yKIg1WjnnlVkGX"),
                Voice::new("George", "JBFqnCBsd6RMkjVDRZzb"),
            ],
            audio_dir: None,
            timeout_secs: 120,
        }
    }
}

// ---------------------------------------------------------------------------
// ConsoleConfig
// ---------------------------------------------------------------------------

/// Behaviour of the interactive console.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Voice used by `audio` when no name is given.
    pub default_voice: String,
    /// Print the notice after every successful `submit`.
    pub echo_notice: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            default_voice: "Matilda".into(),
            echo_notice: true,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use avis_deces::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub generator: GeneratorConfig,
    pub translator: TranslatorConfig,
    pub narrator: NarratorConfig,
    pub console: ConsoleConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.generator.base_url, loaded.generator.base_url);
        assert_eq!(original.generator.model, loaded.generator.model);
        assert_eq!(original.generator.max_tokens, loaded.generator.max_tokens);
        assert_eq!(original.translator.max_chunk_chars, loaded.translator.max_chunk_chars);
        assert_eq!(original.narrator.voices, loaded.narrator.voices);
        assert_eq!(original.narrator.voice_settings, loaded.narrator.voice_settings);
        assert_eq!(original.console.default_voice, loaded.console.default_voice);
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config.generator.model, GeneratorConfig::default().model);
        assert_eq!(config.narrator.voices.len(), 2);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(
            &path,
            "[generator]\nmodel = \"claude-test\"\n\n[translator]\nmax_chunk_chars = 800\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).expect("load");
        assert_eq!(config.generator.model, "claude-test");
        assert_eq!(config.generator.max_tokens, 1000);
        assert_eq!(config.translator.max_chunk_chars, 800);
        assert_eq!(config.translator.source_language, "fr");
        assert_eq!(config.narrator.model_id, "eleven_multilingual_v2");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[generator\nmodel = ").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.generator.base_url, "https://api.anthropic.com");
        assert_eq!(cfg.generator.model, "claude-3-5-sonnet-20241022");
        assert!((cfg.generator.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(cfg.translator.source_language, "fr");
        assert_eq!(cfg.narrator.output_format, "mp3_44100_128");
        assert_eq!(cfg.narrator.voices[0].name, "Matilda");
        assert_eq!(cfg.narrator.voices[1].id, "JBFqnCBsd6RMkjVDRZzb");
        assert!(cfg.narrator.voice_settings.use_speaker_boost);
    }

    #[test]
    fn configured_key_wins_over_environment() {
        let key = resolve_key(Some("from-config"), "AVIS_DECES_TEST_UNSET_VAR");
        assert_eq!(key.as_deref(), Some("from-config"));
    }

    #[test]
    fn empty_configured_key_is_ignored() {
        let key = resolve_key(Some(""), "AVIS_DECES_TEST_UNSET_VAR");
        assert!(key.is_none());
    }
}
