//! Translation of the edited notice.
//!
//! * [`Translator`]: async trait implemented by all translation backends.
//! * [`GoogleTranslator`]: Google Translate `gtx` backend.
//! * [`split_into_chunks`]: paragraph-preserving request chunking.
//! * [`TranslationError`]: error variants for translation calls.

pub mod chunk;
pub mod translator;

pub use chunk::{reassemble, split_into_chunks, Chunk, PARAGRAPH_SEPARATOR};
pub use translator::{
    extract_translation, translate_chunked, GoogleTranslator, TranslationError, Translator,
};

#[cfg(test)]
pub use translator::MockTranslator;
