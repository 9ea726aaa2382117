//! Keyword-based detection of donation / charity mentions in free text.
//!
//! The generated notice may only speak of donations when the family asked
//! for it, i.e. when the submitted notes mention them.  Matching is done on
//! whole words so that `pardon` or `donné` do not count as `don`.

/// Words that mention a donation when they appear verbatim.
static EXACT_WORDS: &[&str] = &["don", "dons", "offrande", "offrandes"];

/// Word prefixes covering inflected forms (`charité`, `caritative`,
/// `bienfaisance` …).
static PREFIXES: &[&str] = &["charit", "caritati", "bienfais"];

/// Returns `true` when `text` mentions donations or charities.
///
/// ```rust
/// use avis_deces::generate::mentions_donations;
///
/// assert!(mentions_donations("Dons à la Ligue contre le cancer"));
/// assert!(!mentions_donations("Il demandait pardon en souriant"));
/// ```
pub fn mentions_donations(text: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .any(|word| {
            EXACT_WORDS.contains(&word.as_str()) || PREFIXES.iter().any(|p| word.starts_with(p))
        })
}
