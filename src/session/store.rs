//! Everything one session has produced so far.
//!
//! [`ArtifactStore`] is owned by a single
//! [`WorkflowController`](super::WorkflowController).  Its mutators are
//! crate-private: only the controller moves the workflow forward, and only
//! the controller releases audio taken out of the store.

use std::collections::btree_map::{self, BTreeMap};

use crate::model::{InputFacts, Language, Variant};
use crate::narrate::AudioHandle;

// ---------------------------------------------------------------------------
// ObituaryArtifact
// ---------------------------------------------------------------------------

/// The generated notice and its edited version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObituaryArtifact {
    original: String,
    edited: String,
    revision: u64,
}

impl ObituaryArtifact {
    pub(crate) fn new(text: String) -> Self {
        Self {
            edited: text.clone(),
            original: text,
            revision: 0,
        }
    }

    /// Text as returned by the generator.  Never changes.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Current text, the one translations and audio are derived from.
    pub fn edited(&self) -> &str {
        &self.edited
    }

    /// Number of effective edits since generation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_edited(&self) -> bool {
        self.edited != self.original
    }

    /// Replace the edited text.  Returns `false`, leaving the revision
    /// alone, when the text is unchanged.
    pub(crate) fn set_edited(&mut self, text: String) -> bool {
        if text == self.edited {
            return false;
        }
        self.edited = text;
        self.revision += 1;
        true
    }
}

// ---------------------------------------------------------------------------
// Translations
// ---------------------------------------------------------------------------

/// One translated version of the edited text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
    /// Artifact revision the translation was made from.
    pub source_revision: u64,
}

/// Translations by target language, in [`Language::ALL`] order.
pub type TranslationSet = BTreeMap<Language, Translation>;

// ---------------------------------------------------------------------------
// AudioSet
// ---------------------------------------------------------------------------

/// Audio produced by one `generate_audio` pass, keyed by variant.
///
/// The set owns its handles.  Dropping it deletes the files silently; the
/// controller instead drains it with [`AudioSet::into_handles`] so release
/// failures get reported.
#[derive(Debug, Default)]
pub struct AudioSet {
    entries: BTreeMap<Variant, AudioHandle>,
    source_revision: u64,
}

impl AudioSet {
    /// Artifact revision the audio was read from.
    pub fn source_revision(&self) -> u64 {
        self.source_revision
    }

    pub(crate) fn made_from(mut self, revision: u64) -> Self {
        self.source_revision = revision;
        self
    }

    pub fn get(&self, variant: Variant) -> Option<&AudioHandle> {
        self.entries.get(&variant)
    }

    pub fn contains(&self, variant: Variant) -> bool {
        self.entries.contains_key(&variant)
    }

    /// Entries with the source first, then translations.
    pub fn iter(&self) -> impl Iterator<Item = (Variant, &AudioHandle)> {
        self.entries.iter().map(|(variant, handle)| (*variant, handle))
    }

    pub fn variants(&self) -> Vec<Variant> {
        self.entries.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_handles(self) -> impl Iterator<Item = (Variant, AudioHandle)> {
        self.entries.into_iter()
    }
}

impl FromIterator<(Variant, AudioHandle)> for AudioSet {
    fn from_iter<I: IntoIterator<Item = (Variant, AudioHandle)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
            source_revision: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// ArtifactStore
// ---------------------------------------------------------------------------

/// Facts, notice, translations and audio of the current session.
#[derive(Debug, Default)]
pub struct ArtifactStore {
    facts: Option<InputFacts>,
    artifact: Option<ObituaryArtifact>,
    translations: TranslationSet,
    audio: AudioSet,
}

impl ArtifactStore {
    /// Facts of the last successful submission.
    pub fn facts(&self) -> Option<&InputFacts> {
        self.facts.as_ref()
    }

    pub fn artifact(&self) -> Option<&ObituaryArtifact> {
        self.artifact.as_ref()
    }

    pub fn translations(&self) -> &TranslationSet {
        &self.translations
    }

    pub fn translation(&self, language: Language) -> Option<&Translation> {
        self.translations.get(&language)
    }

    pub fn audio(&self) -> &AudioSet {
        &self.audio
    }

    /// `true` when nothing at all is held.
    pub fn is_empty(&self) -> bool {
        self.facts.is_none()
            && self.artifact.is_none()
            && self.translations.is_empty()
            && self.audio.is_empty()
    }

    /// Languages whose translation predates the latest edit.
    pub fn stale_translations(&self) -> Vec<Language> {
        let Some(artifact) = &self.artifact else {
            return Vec::new();
        };
        self.translations
            .iter()
            .filter(|(_, t)| t.source_revision != artifact.revision())
            .map(|(language, _)| *language)
            .collect()
    }

    pub fn is_stale(&self, language: Language) -> bool {
        match (&self.artifact, self.translations.get(&language)) {
            (Some(artifact), Some(t)) => t.source_revision != artifact.revision(),
            _ => false,
        }
    }

    /// `true` when audio is held and the notice was edited after it was read.
    pub fn audio_is_stale(&self) -> bool {
        match &self.artifact {
            Some(artifact) if !self.audio.is_empty() => {
                self.audio.source_revision() != artifact.revision()
            }
            _ => false,
        }
    }

    // -----------------------------------------------------------------------
    // Mutators (controller only)
    // -----------------------------------------------------------------------

    pub(crate) fn artifact_mut(&mut self) -> Option<&mut ObituaryArtifact> {
        self.artifact.as_mut()
    }

    /// Start over from a freshly generated notice.  Returns the previous
    /// audio so the caller can release it.
    pub(crate) fn record_notice(&mut self, facts: InputFacts, notice: String) -> AudioSet {
        self.facts = Some(facts);
        self.artifact = Some(ObituaryArtifact::new(notice));
        self.translations.clear();
        self.take_audio()
    }

    pub(crate) fn insert_translation(
        &mut self,
        language: Language,
        translation: Translation,
    ) -> &Translation {
        match self.translations.entry(language) {
            btree_map::Entry::Occupied(mut entry) => {
                entry.insert(translation);
                entry.into_mut()
            }
            btree_map::Entry::Vacant(entry) => entry.insert(translation),
        }
    }

    pub(crate) fn take_audio(&mut self) -> AudioSet {
        std::mem::take(&mut self.audio)
    }

    pub(crate) fn install_audio(&mut self, audio: AudioSet) {
        debug_assert!(self.audio.is_empty(), "previous audio was not released");
        self.audio = audio;
    }

    /// Forget everything.  Returns the audio so the caller can release it.
    pub(crate) fn clear(&mut self) -> AudioSet {
        self.facts = None;
        self.artifact = None;
        self.translations.clear();
        self.take_audio()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
