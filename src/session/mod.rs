//! Session workflow: the notice, what is derived from it, and the rules that
//! keep them consistent.
//!
//! * [`WorkflowController`]: runs every transition and owns the store.
//! * [`ArtifactStore`]: facts, notice, translations and audio.
//! * [`SessionState`]: `Empty` or `Generated`.

pub mod controller;
pub mod state;
pub mod store;

pub use controller::{AudioEntry, AudioOutcome, AudioReport, WorkflowController, WorkflowError};
pub use state::SessionState;
pub use store::{ArtifactStore, AudioSet, ObituaryArtifact, Translation, TranslationSet};
