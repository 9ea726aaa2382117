//! Target languages and the source/translation variants of a notice.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// ISO-639-1 code of the language notices are written in.
pub const SOURCE_CODE: &str = "fr";

/// Display label of the source language.
pub const SOURCE_LABEL: &str = "Français";

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// A translation target.
///
/// Ordering follows declaration order, which is also the order the UI lists
/// them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "Anglais")]
    English,
    #[serde(rename = "Espagnol")]
    Spanish,
    #[serde(rename = "Italien")]
    Italian,
    #[serde(rename = "Portugais")]
    Portuguese,
}

impl Language {
    pub const ALL: [Language; 4] = [
        Language::English,
        Language::Spanish,
        Language::Italian,
        Language::Portuguese,
    ];

    /// ISO-639-1 code sent to the translation and speech backends.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::Italian => "it",
            Language::Portuguese => "pt",
        }
    }

    /// French display label, as shown in the form.
    pub fn label(&self) -> &'static str {
        match self {
            Language::English => "Anglais",
            Language::Spanish => "Espagnol",
            Language::Italian => "Italien",
            Language::Portuguese => "Portugais",
        }
    }

    fn english_name(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Spanish => "spanish",
            Language::Italian => "italian",
            Language::Portuguese => "portuguese",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returned when a string names none of the supported languages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported language: {0:?} (expected one of Anglais, Espagnol, Italien, Portugais)")]
pub struct LanguageParseError(pub String);

impl FromStr for Language {
    type Err = LanguageParseError;

    /// Accepts the French label, the English name or the ISO code, ignoring
    /// case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Language::ALL
            .into_iter()
            .find(|lang| {
                needle == lang.label().to_lowercase()
                    || needle == lang.english_name()
                    || needle == lang.code()
            })
            .ok_or_else(|| LanguageParseError(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Variant
// ---------------------------------------------------------------------------

/// One language version of the notice: the French source or a translation.
///
/// `Source` sorts first so audio listings start with the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Variant {
    Source,
    Translation(Language),
}

impl Variant {
    pub fn code(&self) -> &'static str {
        match self {
            Variant::Source => SOURCE_CODE,
            Variant::Translation(lang) => lang.code(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Variant::Source => SOURCE_LABEL,
            Variant::Translation(lang) => lang.label(),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_french_label() {
        assert_eq!("Anglais".parse::<Language>().unwrap(), Language::English);
        assert_eq!("portugais".parse::<Language>().unwrap(), Language::Portuguese);
    }

    #[test]
    fn parses_code_and_english_name() {
        assert_eq!("es".parse::<Language>().unwrap(), Language::Spanish);
        assert_eq!(" Italian ".parse::<Language>().unwrap(), Language::Italian);
    }

    #[test]
    fn rejects_unknown_language() {
        let err = "Allemand".parse::<Language>().unwrap_err();
        assert!(err.to_string().contains("Allemand"));
    }

    #[test]
    fn source_variant_sorts_first() {
        let mut variants = vec![
            Variant::Translation(Language::Italian),
            Variant::Source,
            Variant::Translation(Language::English),
        ];
        variants.sort();
        assert_eq!(variants[0], Variant::Source);
        assert_eq!(variants[1], Variant::Translation(Language::English));
    }

    #[test]
    fn variant_codes_and_labels() {
        assert_eq!(Variant::Source.code(), "fr");
        assert_eq!(Variant::Source.label(), "Français");
        assert_eq!(Variant::Translation(Language::Spanish).code(), "es");
        assert_eq!(Variant::Translation(Language::Spanish).to_string(), "Espagnol");
    }
}
