//! Obituary notice workflow: generate a French notice from biographical
//! facts, edit it, translate it and read it aloud.

pub mod config;
pub mod console;
pub mod generate;
pub mod model;
pub mod narrate;
pub mod session;
pub mod translate;
