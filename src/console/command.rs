//! Console command grammar.
//!
//! One command per line: a verb, optionally followed by a single argument
//! that runs to the end of the line.

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::model::{Language, LanguageParseError};

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Generate a notice from a TOML facts file.
    Submit(PathBuf),
    /// Print the notice, its translations and audio.
    Show,
    /// Replace the edited text, from a file or (with `None`) from the lines
    /// that follow, up to a single `.`.
    Edit(Option<PathBuf>),
    Translate(Language),
    /// Synthesize audio, with the named voice or the configured default.
    Audio(Option<String>),
    Voices,
    Languages,
    Reset,
    Logout,
    Help,
    Quit,
}

/// Why a line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command {0:?} (type `help`)")]
    Unknown(String),

    #[error("`{command}` expects {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("`{0}` takes no argument")]
    UnexpectedArgument(&'static str),

    #[error(transparent)]
    Language(#[from] LanguageParseError),
}

/// Usage text printed by `help`.
pub const HELP: &str = "\
commands:
  submit <facts.toml>   generate a new notice (replaces the current one)
  show                  print the notice, translations and audio files
  edit [file]           replace the edited text (without a file: type it, end with `.`)
  translate <language>  translate the edited text (Anglais, Espagnol, Italien, Portugais)
  audio [voice]         read the notice and its translations aloud
  voices                list the available voices
  languages             list the translation languages
  reset                 forget the notice and delete its audio
  logout                end the session
  help                  show this text
  quit                  leave";

fn no_argument(
    command: &'static str,
    arg: Option<&str>,
    parsed: Command,
) -> Result<Command, CommandError> {
    match arg {
        Some(_) => Err(CommandError::UnexpectedArgument(command)),
        None => Ok(parsed),
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.is_empty() {
            return Err(CommandError::Empty);
        }

        let (verb, arg) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, Some(rest.trim()).filter(|r| !r.is_empty())),
            None => (line, None),
        };

        match verb.to_lowercase().as_str() {
            "submit" => arg
                .map(|path| Command::Submit(PathBuf::from(path)))
                .ok_or(CommandError::MissingArgument {
                    command: "submit",
                    expected: "a facts file",
                }),
            "edit" => Ok(Command::Edit(arg.map(PathBuf::from))),
            "translate" => {
                let language = arg.ok_or(CommandError::MissingArgument {
                    command: "translate",
                    expected: "a language",
                })?;
                Ok(Command::Translate(language.parse()?))
            }
            "audio" => Ok(Command::Audio(arg.map(str::to_string))),
            "show" => no_argument("show", arg, Command::Show),
            "voices" => no_argument("voices", arg, Command::Voices),
            "languages" => no_argument("languages", arg, Command::Languages),
            "reset" => no_argument("reset", arg, Command::Reset),
            "logout" => no_argument("logout", arg, Command::Logout),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => no_argument("quit", arg, Command::Quit),
            _ => Err(CommandError::Unknown(verb.to_string())),
        }
    }
}
