//! Configuration module.
//!
//! Provides `AppConfig` (top-level settings), one sub-config per backend,
//! `AppPaths` for cross-platform directories, and TOML persistence via
//! `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, ConsoleConfig, GeneratorConfig, NarratorConfig, TranslatorConfig, VoiceSettings,
    CLAUDE_API_KEY_ENV, ELEVENLABS_API_KEY_ENV,
};
