//! Session state machine.
//!
//! ```text
//! Empty ──submit ok──▶ Generated
//! Generated ──submit ok──▶ Generated   (new notice, derived artifacts cleared)
//! Generated ──edit / translate / audio──▶ Generated
//! any state ──reset / logout──▶ Empty
//! ```
//!
//! Editing, translations and audio are sub-states of `Generated` and do not
//! change the label.

use super::store::ArtifactStore;

/// Top-level state of a [`WorkflowController`](super::WorkflowController).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No notice yet, or the session was reset.
    #[default]
    Empty,

    /// A notice exists and can be edited, translated and read aloud.
    Generated,
}

impl SessionState {
    /// Derive the state from what the store currently holds.
    pub fn of(store: &ArtifactStore) -> Self {
        if store.artifact().is_some() {
            SessionState::Generated
        } else {
            SessionState::Empty
        }
    }

    /// A short label for the console prompt.
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Empty => "vide",
            SessionState::Generated => "avis généré",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_empty() {
        assert_eq!(SessionState::default(), SessionState::Empty);
    }

    #[test]
    fn labels() {
        assert_eq!(SessionState::Empty.label(), "vide");
        assert_eq!(SessionState::Generated.label(), "avis généré");
    }

    #[test]
    fn empty_store_is_empty_state() {
        assert_eq!(SessionState::of(&ArtifactStore::default()), SessionState::Empty);
    }
}
