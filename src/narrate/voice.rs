//! Selectable narrator voices.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::NarratorConfig;

/// A named voice of the speech backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    /// Display name (`"Matilda"`).
    pub name: String,
    /// Backend voice identifier.
    pub id: String,
}

impl Voice {
    pub fn new(name: &str, id: &str) -> Self {
        Self {
            name: name.to_string(),
            id: id.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown voice {name:?} (available: {available})")]
pub struct UnknownVoice {
    pub name: String,
    pub available: String,
}

/// The voices offered to the user, in display order.
#[derive(Debug, Clone)]
pub struct VoiceCatalogue {
    voices: Vec<Voice>,
}

impl VoiceCatalogue {
    pub fn new(voices: Vec<Voice>) -> Self {
        Self { voices }
    }

    pub fn from_config(config: &NarratorConfig) -> Self {
        Self::new(config.voices.clone())
    }

    /// Look a voice up by display name (case-insensitive) or by backend id.
    pub fn find(&self, name: &str) -> Result<&Voice, UnknownVoice> {
        let needle = name.trim();
        self.voices
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(needle) || v.id == needle)
            .ok_or_else(|| UnknownVoice {
                name: needle.to_string(),
                available: self.names().join(", "),
            })
    }

    pub fn names(&self) -> Vec<&str> {
        self.voices.iter().map(|v| v.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Voice> {
        self.voices.iter()
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalogue() -> VoiceCatalogue {
        VoiceCatalogue::from_config(&NarratorConfig::default())
    }

    #[test]
    fn default_catalogue_has_two_voices() {
        let c = catalogue();
        assert_eq!(c.len(), 2);
        assert_eq!(c.names(), vec!["Matilda", "George"]);
    }

    #[test]
    fn finds_by_name_ignoring_case() {
        let c = catalogue();
        assert_eq!(c.find("matilda").unwrap().id, "XrExE9yKIg1WjnnlVkGX");
        assert_eq!(c.find(" GEORGE ").unwrap().id, "JBFqnCBsd6RMkjVDRZzb");
    }

    #[test]
    fn finds_by_backend_id() {
        assert_eq!(catalogue().find("JBFqnCBsd6RMkjVDRZzb").unwrap().name, "George");
    }

    #[test]
    fn unknown_voice_lists_alternatives() {
        let err = catalogue().find("Bob").unwrap_err();
        assert_eq!(err.name, "Bob");
        assert!(err.to_string().contains("Matilda, George"));
    }
}
