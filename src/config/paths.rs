//! Where settings and audio live on disk.
//!
//! `settings.toml` goes in the platform config directory
//! (`~/.config/avis-deces/` on Linux).  Audio spools go in
//! `<cache dir>/avis-deces/audio/`, one `session-*` directory per run, and
//! can be overridden with `narrator.audio_dir`.

use std::path::PathBuf;

const APP_DIR: &str = "avis-deces";
const SETTINGS_FILE: &str = "settings.toml";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub settings_file: PathBuf,
    /// Parent of the per-session spools.
    pub audio_dir: PathBuf,
}

impl AppPaths {
    /// Resolve the platform directories.  A missing config directory falls
    /// back to `.`, a missing cache directory to the system temp directory.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR);
        let audio_dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR)
            .join("audio");

        Self {
            settings_file: config_dir.join(SETTINGS_FILE),
            config_dir,
            audio_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_file_sits_in_config_dir() {
        let paths = AppPaths::new();
        assert!(paths.config_dir.ends_with(APP_DIR));
        assert_eq!(paths.settings_file, paths.config_dir.join("settings.toml"));
    }

    #[test]
    fn audio_goes_under_an_app_specific_cache_dir() {
        let audio_dir = AppPaths::new().audio_dir;
        assert!(audio_dir.ends_with("avis-deces/audio"));
    }
}
