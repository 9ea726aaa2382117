//! Notice generation.
//!
//! This module provides:
//! * [`NoticeGenerator`]: async trait implemented by all generation backends.
//! * [`ClaudeGenerator`]: Anthropic Messages API backend.
//! * [`PromptBuilder`]: builds the French generation prompt from facts.
//! * [`mentions_donations`]: decides whether donation wording is allowed.
//! * [`GenerationError`]: error variants for generation calls.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use avis_deces::config::AppConfig;
//! use avis_deces::generate::{ClaudeGenerator, NoticeGenerator};
//! # use avis_deces::model::InputFacts;
//!
//! # async fn example(facts: InputFacts) {
//! let config = AppConfig::default();
//! let generator = ClaudeGenerator::from_config(&config.generator);
//! let notice = generator.generate(&facts).await.unwrap();
//! println!("{notice}");
//! # }
//! ```

pub mod donation;
pub mod generator;
pub mod prompt;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use donation::mentions_donations;
pub use generator::{extract_notice, ClaudeGenerator, GenerationError, NoticeGenerator};
pub use prompt::PromptBuilder;

#[cfg(test)]
pub use generator::MockGenerator;
