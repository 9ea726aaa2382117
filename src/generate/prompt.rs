//! Prompt builder for obituary generation.
//!
//! [`PromptBuilder`] turns an [`InputFacts`] into the `(system, user)` pair
//! sent to the chat backend.  The user message lists only the facts that
//! were supplied, the tone's style directive, and the writing rules.  Empty
//! free-text fields are left out entirely so the model has nothing to
//! elaborate on.

use crate::generate::donation::mentions_donations;
use crate::model::InputFacts;

// ---------------------------------------------------------------------------
// Instructions
// ---------------------------------------------------------------------------

const INTRO: &str = "\
En tant que rédacteur professionnel d'avis de décès, créez un avis de décès en français pour cette personne.

Utilisez strictement ces informations, sans ajouts ni suppositions:
";

const RULES: &str = "\
Directives importantes:
1. L'avis doit être complet et final, prêt à être publié
2. Ne pas ajouter d'informations non fournies
3. Ne pas inclure de placeholders ou de texte à remplir
4. Structure en 3-4 paragraphes maximum
5. Mentionner la date de la cérémonie dans le dernier paragraphe
";

const RULE_NO_DONATIONS: &str =
    "6. Ne pas inclure de mentions de dons ou d'œuvres caritatives\n";

const RULE_DONATIONS_FROM_NOTES: &str = "\
6. Ne mentionner les dons ou œuvres caritatives que dans les termes exacts des notes\n";

const FORMAT: &str = "
Format requis:
- Premier paragraphe: Annonce du décès avec les informations principales
- Deuxième et troisième paragraphe: Description de la personne (carrière, passions, famille)
- Dernier paragraphe: Détails de la cérémonie
";

/// Date format used inside prompts (`14/03/2024`).
const DATE_FORMAT: &str = "%d/%m/%Y";

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Builds generation prompts from submitted facts.
///
/// # Example
/// ```rust
/// use avis_deces::generate::PromptBuilder;
/// # use avis_deces::model::{InputFacts, Title, Tone};
/// # use chrono::NaiveDate;
/// # let facts = InputFacts {
/// #     title: Title::Monsieur, name: "Jean Dupont".into(), age: 82,
/// #     date_of_death: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
/// #     ceremony_date: NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
/// #     children: 2, grandchildren: 3, interests: String::new(),
/// #     profession: "enseignant".into(), notes: String::new(), tone: Tone::Traditional,
/// # };
///
/// let builder = PromptBuilder::new("You write obituaries.");
/// let (system, user) = builder.build_chat(&facts);
/// assert_eq!(system, "You write obituaries.");
/// assert!(user.contains("Jean Dupont"));
/// ```
pub struct PromptBuilder {
    system_prompt: String,
}

impl PromptBuilder {
    pub fn new(system_prompt: &str) -> Self {
        Self {
            system_prompt: system_prompt.to_string(),
        }
    }

    /// Build a **(system_msg, user_msg)** pair for a chat backend.
    pub fn build_chat(&self, facts: &InputFacts) -> (String, String) {
        (self.system_prompt.clone(), self.build_user(facts))
    }

    fn build_user(&self, facts: &InputFacts) -> String {
        let mut prompt = String::with_capacity(2048);
        prompt.push_str(INTRO);
        prompt.push('\n');
        prompt.push_str(&Self::fact_lines(facts));

        prompt.push('\n');
        prompt.push_str("Ton: ");
        prompt.push_str(facts.tone.label());
        prompt.push('\n');
        prompt.push_str(facts.tone.directive());
        prompt.push_str("\n\n");

        prompt.push_str(RULES);
        if mentions_donations(&facts.notes) {
            prompt.push_str(RULE_DONATIONS_FROM_NOTES);
        } else {
            prompt.push_str(RULE_NO_DONATIONS);
        }
        prompt.push_str(FORMAT);
        prompt
    }

    fn fact_lines(facts: &InputFacts) -> String {
        let mut lines = vec![
            format!("Nom: {}", facts.display_name()),
            format!("Age: {} ans", facts.age),
            format!("Date de décès: {}", facts.date_of_death.format(DATE_FORMAT)),
            format!("Enfants: {}", facts.children),
            format!("Petits-enfants: {}", facts.grandchildren),
        ];

        let optional = [
            ("Intérêts/Passions", &facts.interests),
            ("Profession", &facts.profession),
        ];
        for (label, value) in optional {
            if !value.trim().is_empty() {
                lines.push(format!("{label}: {}", value.trim()));
            }
        }

        lines.push(format!(
            "Date de la cérémonie: {}",
            facts.ceremony_date.format(DATE_FORMAT)
        ));

        if !facts.notes.trim().is_empty() {
            lines.push(format!("Notes: {}", facts.notes.trim()));
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Title, Tone};
    use chrono::NaiveDate;

    fn facts() -> InputFacts {
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

    fn user_prompt(facts: &InputFacts) -> String {
        PromptBuilder::new("system").build_chat(facts).1
    }

    #[test]
    fn includes_every_supplied_fact() {
        let user = user_prompt(&facts());

        assert!(user.contains("Nom: M. Jean Dupont"));
        assert!(user.contains("Age: 82 ans"));
        assert!(user.contains("Date de décès: 02/03/2024"));
        assert!(user.contains("Enfants: 2"));
        assert!(user.contains("Petits-enfants: 3"));
        assert!(user.contains("Profession: enseignant"));
        assert!(user.contains("Date de la cérémonie: 08/03/2024"));
    }

    #[test]
    fn omits_empty_free_text_fields() {
        let user = user_prompt(&facts());
        assert!(!user.contains("Intérêts/Passions"));
        assert!(!user.contains("Notes:"));
    }

    #[test]
    fn carries_tone_directive() {
        let mut f = facts();
        f.tone = Tone::Narrative;
        let user = user_prompt(&f);
        assert!(user.contains("Ton: Narratif"));
        assert!(user.contains(Tone::Narrative.directive()));
        assert!(!user.contains(Tone::Traditional.directive()));
    }

    #[test]
    fn forbids_donations_without_notes() {
        let user = user_prompt(&facts());
        assert!(user.contains(RULE_NO_DONATIONS));
        assert!(!user.contains(RULE_DONATIONS_FROM_NOTES));
    }

    #[test]
    fn allows_donations_requested_in_notes() {
        let mut f = facts();
        f.notes = "La famille souhaite des dons à la Croix-Rouge.".into();
        let user = user_prompt(&f);
        assert!(user.contains(RULE_DONATIONS_FROM_NOTES));
        assert!(user.contains("Notes: La famille souhaite des dons"));
    }

    #[test]
    fn ceremony_is_requested_last() {
        let user = user_prompt(&facts());
        assert!(user.contains("Dernier paragraphe: Détails de la cérémonie"));
    }

    #[test]
    fn madame_title_is_rendered() {
        let mut f = facts();
        f.title = Title::Madame;
        f.name = "Marie Curie".into();
        assert!(user_prompt(&f).contains("Nom: Mme Marie Curie"));
    }
}
