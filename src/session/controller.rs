//! Workflow controller: drives one notice through generation, editing,
//! translation and audio synthesis.
//!
//! # Flow
//!
//! ```text
//! submit(facts)
//!   └─▶ validate → generator.generate            [Empty | Generated → Generated]
//!         ├─ Ok  → record notice, clear translations, release audio
//!         └─ Err → nothing changes
//!
//! edit_text(text)        → edited = text, revision + 1 (nothing invalidated)
//! translate(language)    → translator.translate(edited) → insert / overwrite
//! generate_audio(voice)
//!   └─▶ release current audio
//!         └─▶ narrator.synthesize × (source + each translation), concurrently
//!               └─▶ install every success as the new audio set
//!
//! reset() / logout()     → release audio, forget everything   [→ Empty]
//! ```
//!
//! A failed collaborator call never mutates the store.

use std::path::PathBuf;
use std::sync::Arc;

use futures_util::future::join_all;
use thiserror::Error;

use crate::generate::{GenerationError, NoticeGenerator};
use crate::model::{FactsError, InputFacts, Language, Variant};
use crate::narrate::{AudioHandle, Narrator, SynthesisError, Voice};
use crate::translate::{TranslationError, Translator};

use super::state::SessionState;
use super::store::{ArtifactStore, AudioSet, Translation};

// ---------------------------------------------------------------------------
// WorkflowError
// ---------------------------------------------------------------------------

/// Why a workflow operation was refused or failed.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The operation needs a generated notice.
    #[error("no notice has been generated yet")]
    NotGenerated,

    #[error("invalid facts: {0}")]
    InvalidFacts(#[from] FactsError),

    #[error("notice generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("translation failed: {0}")]
    Translation(#[from] TranslationError),
}

// ---------------------------------------------------------------------------
// Audio batch results
// ---------------------------------------------------------------------------

/// Result of synthesizing one variant within a batch.
#[derive(Debug)]
pub enum AudioOutcome {
    Synthesized(AudioHandle),
    Failed(SynthesisError),
}

/// One produced audio file, as reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioEntry {
    pub variant: Variant,
    pub path: PathBuf,
    pub bytes: u64,
}

/// Summary of a `generate_audio` pass.
#[derive(Debug, Default)]
pub struct AudioReport {
    /// Files now held in the audio set, source first.
    pub produced: Vec<AudioEntry>,
    /// Variants skipped, with the reason.
    pub failures: Vec<(Variant, SynthesisError)>,
    /// Files of the previous pass that were deleted.
    pub released: usize,
}

impl AudioReport {
    /// `true` when every requested variant produced audio.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

// ---------------------------------------------------------------------------
// WorkflowController
// ---------------------------------------------------------------------------

/// Owns the [`ArtifactStore`] of one session and the collaborators that
/// feed it.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use avis_deces::config::AppConfig;
/// use avis_deces::generate::ClaudeGenerator;
/// use avis_deces::narrate::{AudioSpool, ElevenLabsNarrator};
/// use avis_deces::session::WorkflowController;
/// use avis_deces::translate::GoogleTranslator;
///
/// let config = AppConfig::default();
/// let spool = Arc::new(AudioSpool::temporary().unwrap());
/// let controller = WorkflowController::new(
///     Arc::new(ClaudeGenerator::from_config(&config.generator)),
///     Arc::new(GoogleTranslator::from_config(&config.translator)),
///     Arc::new(ElevenLabsNarrator::from_config(&config.narrator, spool)),
/// );
/// assert!(controller.store().is_empty());
/// ```
pub struct WorkflowController {
    // Declared first so held audio is released before the narrator, and
    // with it the spool directory, goes away.
    store: ArtifactStore,
    generator: Arc<dyn NoticeGenerator>,
    translator: Arc<dyn Translator>,
    narrator: Arc<dyn Narrator>,
}

impl WorkflowController {
    pub fn new(
        generator: Arc<dyn NoticeGenerator>,
        translator: Arc<dyn Translator>,
        narrator: Arc<dyn Narrator>,
    ) -> Self {
        Self {
            store: ArtifactStore::default(),
            generator,
            translator,
            narrator,
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        SessionState::of(&self.store)
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Translations made before the latest edit.
    pub fn stale_translations(&self) -> Vec<Language> {
        self.store.stale_translations()
    }

    /// `true` when the held audio predates the latest edit.
    pub fn audio_is_stale(&self) -> bool {
        self.store.audio_is_stale()
    }

    /// Number of audio files currently held.
    pub fn live_audio_handles(&self) -> usize {
        self.store.audio().len()
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Generate a new notice from `facts`, replacing the current one.
    pub async fn submit(&mut self, facts: InputFacts) -> Result<(), WorkflowError> {
        facts.validate()?;

        log::debug!("session: generating notice for {:?}", facts.name);
        let notice = self.generator.generate(&facts).await.map_err(|e| {
            log::warn!("session: generation failed: {e}");
            e
        })?;

        let previous = self.store.record_notice(facts, notice);
        let released = release_audio(previous);
        log::debug!("session: → {} ({released} audio file(s) released)", self.state().label());
        Ok(())
    }

    /// Replace the edited text.  Returns whether anything changed.
    ///
    /// Translations and audio are kept as they are; see
    /// [`stale_translations`](Self::stale_translations).
    pub fn edit_text(&mut self, text: impl Into<String>) -> Result<bool, WorkflowError> {
        let artifact = self
            .store
            .artifact_mut()
            .ok_or(WorkflowError::NotGenerated)?;
        let changed = artifact.set_edited(text.into());
        if changed {
            log::debug!("session: notice edited (revision {})", artifact.revision());
        }
        Ok(changed)
    }

    /// Translate the current edited text into `language`.
    pub async fn translate(&mut self, language: Language) -> Result<&Translation, WorkflowError> {
        let artifact = self.store.artifact().ok_or(WorkflowError::NotGenerated)?;
        let source_revision = artifact.revision();

        log::debug!("session: translating revision {source_revision} into {language}");
        let text = self
            .translator
            .translate(artifact.edited(), language)
            .await
            .map_err(|e| {
                log::warn!("session: translation into {language} failed: {e}");
                e
            })?;

        Ok(self.store.insert_translation(
            language,
            Translation {
                text,
                source_revision,
            },
        ))
    }

    /// Read the notice and every translation aloud with `voice`.
    ///
    /// The previous audio is released before any call is made.  Variants
    /// whose synthesis fails are left out of the new set and listed in the
    /// report.
    pub async fn generate_audio(&mut self, voice: &Voice) -> Result<AudioReport, WorkflowError> {
        let artifact = self.store.artifact().ok_or(WorkflowError::NotGenerated)?;

        let revision = artifact.revision();
        let mut jobs = vec![(Variant::Source, artifact.edited().to_string())];
        jobs.extend(
            self.store
                .translations()
                .iter()
                .map(|(language, t)| (Variant::Translation(*language), t.text.clone())),
        );

        let released = release_audio(self.store.take_audio());
        log::debug!(
            "session: synthesizing {} variant(s) with {} ({released} released)",
            jobs.len(),
            voice.name
        );

        let narrator = Arc::clone(&self.narrator);
        let outcomes = join_all(jobs.iter().map(|(variant, text)| {
            let narrator = &narrator;
            async move {
                let outcome = match narrator.synthesize(text, voice, variant.code()).await {
                    Ok(handle) => AudioOutcome::Synthesized(handle),
                    Err(e) => AudioOutcome::Failed(e),
                };
                (*variant, outcome)
            }
        }))
        .await;

        let mut report = AudioReport {
            released,
            ..AudioReport::default()
        };
        let mut handles = Vec::with_capacity(outcomes.len());
        for (variant, outcome) in outcomes {
            match outcome {
                AudioOutcome::Synthesized(handle) => handles.push((variant, handle)),
                AudioOutcome::Failed(e) => {
                    log::warn!("session: audio for {variant} skipped: {e}");
                    report.failures.push((variant, e));
                }
            }
        }

        let audio = handles.into_iter().collect::<AudioSet>().made_from(revision);
        report.produced = audio
            .iter()
            .map(|(variant, handle)| AudioEntry {
                variant,
                path: handle.path().to_path_buf(),
                bytes: handle.size(),
            })
            .collect();
        self.store.install_audio(audio);

        Ok(report)
    }

    /// Forget the notice, its translations and its audio.  Returns the
    /// number of audio files released.
    pub fn reset(&mut self) -> usize {
        let released = release_audio(self.store.clear());
        log::info!("session: reset ({released} audio file(s) released)");
        released
    }

    /// Invalidate the session from outside (sign-out).
    pub fn logout(&mut self) -> usize {
        log::info!("session: logout");
        self.reset()
    }
}

impl Drop for WorkflowController {
    fn drop(&mut self) {
        let released = release_audio(self.store.take_audio());
        if released > 0 {
            log::debug!("session: closed, {released} audio file(s) released");
        }
    }
}

/// Delete every file in `audio`, logging failures.  Returns how many were
/// deleted.
fn release_audio(audio: AudioSet) -> usize {
    let mut released = 0;
    for (variant, handle) in audio.into_handles() {
        let path = handle.path().to_path_buf();
        match handle.release() {
            Ok(()) => released += 1,
            Err(e) => log::warn!(
                "session: could not release audio for {variant} ({}): {e}",
                path.display()
            ),
        }
    }
    released
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
