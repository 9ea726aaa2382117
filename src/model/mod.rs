//! Domain types shared by every stage of the workflow.
//!
//! * [`InputFacts`]: the biographical facts submitted for one notice.
//! * [`Title`] / [`Tone`]: the fixed selectors of the submission form.
//! * [`Language`]: the enumerated translation targets.
//! * [`Variant`]: the source text or one of its translations; keys the
//!   audio set.

pub mod facts;
pub mod language;

pub use facts::{FactsError, InputFacts, Title, Tone};
pub use language::{Language, LanguageParseError, Variant, SOURCE_CODE, SOURCE_LABEL};
