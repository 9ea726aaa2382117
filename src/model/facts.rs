//! Submitted biographical facts and the form's fixed selectors.
//!
//! An [`InputFacts`] value is created once per submission and never mutated;
//! the next submission replaces it wholesale.  Files use ISO dates
//! (`1942-03-14`), prompts render them as `14/03/1942`.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum age accepted by the form.
pub const MAX_AGE: u8 = 120;

// ---------------------------------------------------------------------------
// Title
// ---------------------------------------------------------------------------

/// Honorific placed before the deceased's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Title {
    /// Monsieur.
    #[default]
    #[serde(rename = "M.")]
    Monsieur,
    /// Madame.
    #[serde(rename = "Mme")]
    Madame,
}

impl Title {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Title::Monsieur => "M.",
            Title::Madame => "Mme",
        }
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

// ---------------------------------------------------------------------------
// Tone
// ---------------------------------------------------------------------------

/// Writing style requested for the notice.
///
/// A tone changes the phrasing register only, never the factual content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tone {
    #[default]
    #[serde(rename = "Formel et respectueux")]
    Formal,
    #[serde(rename = "Chaleureux et empathique")]
    Warm,
    #[serde(rename = "Traditionnel")]
    Traditional,
    #[serde(rename = "Narratif")]
    Narrative,
}

impl Tone {
    pub const ALL: [Tone; 4] = [Tone::Formal, Tone::Warm, Tone::Traditional, Tone::Narrative];

    /// Label shown in the form selector.
    pub fn label(&self) -> &'static str {
        match self {
            Tone::Formal => "Formel et respectueux",
            Tone::Warm => "Chaleureux et empathique",
            Tone::Traditional => "Traditionnel",
            Tone::Narrative => "Narratif",
        }
    }

    /// Style directive injected into the generation prompt.
    pub fn directive(&self) -> &'static str {
        match self {
            Tone::Formal => {
                "Adoptez un registre formel et sobre, avec des formules de politesse \
                 consacrées et une grande retenue."
            }
            Tone::Warm => {
                "Adoptez un registre chaleureux et empathique, proche des proches, \
                 qui met en avant l'affection et les souvenirs partagés."
            }
            Tone::Traditional => {
                "Adoptez le style traditionnel des avis de décès publiés dans la presse, \
                 avec les tournures d'usage (« a la tristesse de vous faire part »)."
            }
            Tone::Narrative => {
                "Adoptez un style narratif qui retrace le parcours de vie comme un récit \
                 fluide, sans jamais inventer d'épisode."
            }
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tone {
    type Err = FactsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Tone::ALL
            .into_iter()
            .find(|tone| tone.label().to_lowercase() == needle)
            .ok_or_else(|| FactsError::UnknownTone(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// FactsError
// ---------------------------------------------------------------------------

/// Reasons a submission is rejected before any backend is contacted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FactsError {
    #[error("the full name is required")]
    MissingName,

    #[error("age {0} is out of range (0–{MAX_AGE})")]
    AgeOutOfRange(u8),

    #[error("ceremony date {ceremony} precedes the date of death {death}")]
    CeremonyBeforeDeath { death: NaiveDate, ceremony: NaiveDate },

    #[error("unknown tone: {0:?}")]
    UnknownTone(String),
}

// ---------------------------------------------------------------------------
// InputFacts
// ---------------------------------------------------------------------------

/// Everything the user supplies for one notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFacts {
    #[serde(default)]
    pub title: Title,
    pub name: String,
    pub age: u8,
    pub date_of_death: NaiveDate,
    pub ceremony_date: NaiveDate,
    #[serde(default)]
    pub children: u32,
    #[serde(default)]
    pub grandchildren: u32,
    #[serde(default)]
    pub interests: String,
    #[serde(default)]
    pub profession: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tone: Tone,
}

impl InputFacts {
    /// Check the invariants the form enforces.
    pub fn validate(&self) -> Result<(), FactsError> {
        if self.name.trim().is_empty() {
            return Err(FactsError::MissingName);
        }
        if self.age > MAX_AGE {
            return Err(FactsError::AgeOutOfRange(self.age));
        }
        if self.ceremony_date < self.date_of_death {
            return Err(FactsError::CeremonyBeforeDeath {
                death: self.date_of_death,
                ceremony: self.ceremony_date,
            });
        }
        Ok(())
    }

    /// `"M. Jean Dupont"`.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.title, self.name.trim())
    }

    /// Parse facts from a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Reference submission used across the test suites.
#[cfg(test)]
impl InputFacts {
    pub fn jean_dupont() -> Self {
        InputFacts {
            title: Title::Monsieur,
            name: "Jean Dupont".into(),
            age: 82,
            date_of_death: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            ceremony_date: NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
            children: 2,
            grandchildren: 3,
            interests: String::new(),
            profession: "enseignant".into(),
            notes: String::new(),
            tone: Tone::Traditional,
        }
    }
}
