//! Speech synthesis for the notice and its translations.
//!
//! * [`Narrator`]: async trait implemented by all speech backends.
//! * [`ElevenLabsNarrator`]: ElevenLabs text-to-speech backend.
//! * [`AudioSpool`] / [`AudioHandle`]: scoped temporary audio files.
//! * [`Voice`] / [`VoiceCatalogue`]: selectable voices.
//! * [`SynthesisError`]: error variants for synthesis calls.

pub mod audio;
pub mod narrator;
pub mod voice;

pub use audio::{extension_for, AudioHandle, AudioSpool, AudioWriter};
pub use narrator::{ElevenLabsNarrator, Narrator, SynthesisError};
pub use voice::{UnknownVoice, Voice, VoiceCatalogue};

#[cfg(test)]
pub use narrator::MockNarrator;
