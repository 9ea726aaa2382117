//! Interactive line console driving a [`WorkflowController`].
//!
//! The console only parses commands and prints results.  Every workflow
//! rule lives in the controller; every failure is printed and the loop
//! carries on.

pub mod command;

pub use command::{Command, CommandError, HELP};

use std::io::{self, Write};
use std::path::Path;

use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use crate::config::ConsoleConfig;
use crate::model::{InputFacts, Language, SOURCE_LABEL};
use crate::narrate::VoiceCatalogue;
use crate::session::WorkflowController;

/// Line that ends an inline `edit`.
const END_OF_TEXT: &str = ".";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// A console session: one controller, one voice catalogue.
pub struct Console {
    controller: WorkflowController,
    voices: VoiceCatalogue,
    config: ConsoleConfig,
}

impl Console {
    pub fn new(
        controller: WorkflowController,
        voices: VoiceCatalogue,
        config: ConsoleConfig,
    ) -> Self {
        Self {
            controller,
            voices,
            config,
        }
    }

    pub fn controller(&self) -> &WorkflowController {
        &self.controller
    }

    /// Read commands from `input` until `quit`, `logout` or end of input.
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();
        writeln!(out, "type `help` for the list of commands")?;

        loop {
            write!(out, "[{}] > ", self.controller.state().label())?;
            out.flush()?;

            let Some(line) = lines.next_line().await? else {
                writeln!(out)?;
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(e) => {
                    writeln!(out, "! {e}")?;
                    continue;
                }
            };

            let flow = match command {
                Command::Edit(None) => {
                    writeln!(out, "type the new text, then a line with a single `{END_OF_TEXT}`")?;
                    let text = read_block(&mut lines).await?;
                    self.edit(text, out)?
                }
                command => self.execute(command, out).await?,
            };
            if flow == Flow::Exit {
                break;
            }
        }

        log::debug!("console: input closed");
        Ok(())
    }

    async fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> io::Result<Flow> {
        match command {
            Command::Submit(path) => self.submit_file(&path, out).await?,
            Command::Show => self.show(out)?,
            Command::Edit(Some(path)) => match read_text(&path) {
                Ok(text) => return self.edit(text, out),
                Err(e) => writeln!(out, "! {e:#}")?,
            },
            Command::Edit(None) => {
                writeln!(out, "! `edit` without a file is only available interactively")?
            }
            Command::Translate(language) => self.translate(language, out).await?,
            Command::Audio(voice) => self.audio(voice.as_deref(), out).await?,
            Command::Voices => {
                for voice in self.voices.iter() {
                    let marker = if voice.name.eq_ignore_ascii_case(&self.config.default_voice) {
                        " (default)"
                    } else {
                        ""
                    };
                    writeln!(out, "  {}  {}{marker}", voice.name, voice.id)?;
                }
            }
            Command::Languages => {
                for language in Language::ALL {
                    writeln!(out, "  {}  ({})", language.label(), language.code())?;
                }
            }
            Command::Reset => {
                let released = self.controller.reset();
                writeln!(out, "session reset ({released} audio file(s) deleted)")?;
            }
            Command::Logout => {
                let released = self.controller.logout();
                writeln!(out, "logged out ({released} audio file(s) deleted)")?;
                return Ok(Flow::Exit);
            }
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Generate a notice from the facts in `path`.
    pub async fn submit_file<W: Write>(&mut self, path: &Path, out: &mut W) -> io::Result<()> {
        let facts = match read_facts(path) {
            Ok(facts) => facts,
            Err(e) => return writeln!(out, "! {e:#}"),
        };

        writeln!(out, "generating the notice for {} …", facts.display_name())?;
        match self.controller.submit(facts).await {
            Ok(()) => {
                writeln!(out, "notice generated")?;
                if self.config.echo_notice {
                    self.show(out)?;
                }
            }
            Err(e) => writeln!(out, "! {e}")?,
        }
        Ok(())
    }

    fn edit<W: Write>(&mut self, text: String, out: &mut W) -> io::Result<Flow> {
        let text = text.trim_end().to_string();
        if text.trim().is_empty() {
            writeln!(out, "! the notice cannot be empty; nothing changed")?;
            return Ok(Flow::Continue);
        }

        match self.controller.edit_text(text) {
            Ok(true) => {
                writeln!(out, "notice updated")?;
                let stale = self.controller.stale_translations();
                if !stale.is_empty() {
                    writeln!(
                        out,
                        "translations now out of date: {} (translate again to refresh)",
                        join_labels(&stale)
                    )?;
                }
                if self.controller.audio_is_stale() {
                    writeln!(out, "audio now out of date (run `audio` again to refresh)")?;
                }
            }
            Ok(false) => writeln!(out, "no change")?,
            Err(e) => writeln!(out, "! {e}")?,
        }
        Ok(Flow::Continue)
    }

    async fn translate<W: Write>(&mut self, language: Language, out: &mut W) -> io::Result<()> {
        writeln!(out, "translating into {language} …")?;
        match self.controller.translate(language).await {
            Ok(translation) => {
                writeln!(out, "-- {language} --")?;
                writeln!(out, "{}", translation.text)?;
            }
            Err(e) => writeln!(out, "! {e}")?,
        }
        Ok(())
    }

    async fn audio<W: Write>(&mut self, voice: Option<&str>, out: &mut W) -> io::Result<()> {
        let name = voice.unwrap_or(self.config.default_voice.as_str());
        let voice = match self.voices.find(name) {
            Ok(voice) => voice,
            Err(e) => return writeln!(out, "! {e}"),
        };

        let stale = self.controller.stale_translations();
        if !stale.is_empty() {
            writeln!(out, "note: reading out-of-date translations: {}", join_labels(&stale))?;
        }

        writeln!(out, "synthesizing with {} …", voice.name)?;
        match self.controller.generate_audio(voice).await {
            Ok(report) => {
                for entry in &report.produced {
                    writeln!(
                        out,
                        "  {:<10} {} ({} bytes)",
                        entry.variant.label(),
                        entry.path.display(),
                        entry.bytes
                    )?;
                }
                for (variant, e) in &report.failures {
                    writeln!(out, "! {}: {e}", variant.label())?;
                }
            }
            Err(e) => writeln!(out, "! {e}")?,
        }
        Ok(())
    }

    fn show<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let store = self.controller.store();
        let Some(artifact) = store.artifact() else {
            return writeln!(out, "no notice yet (use `submit <facts.toml>`)");
        };

        let marker = if artifact.is_edited() { ", edited" } else { "" };
        writeln!(out, "-- {SOURCE_LABEL}{marker} --")?;
        writeln!(out, "{}", artifact.edited())?;

        for (language, translation) in store.translations() {
            let marker = if store.is_stale(*language) { ", out of date" } else { "" };
            writeln!(out, "-- {language}{marker} --")?;
            writeln!(out, "{}", translation.text)?;
        }

        if !store.audio().is_empty() {
            let marker = if store.audio_is_stale() { ", out of date" } else { "" };
            writeln!(out, "-- audio{marker} --")?;
            for (variant, handle) in store.audio().iter() {
                writeln!(out, "  {:<10} {}", variant.label(), handle.path().display())?;
            }
        }
        Ok(())
    }
}

fn join_labels(languages: &[Language]) -> String {
    languages
        .iter()
        .map(Language::label)
        .collect::<Vec<_>>()
        .join(", ")
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn read_facts(path: &Path) -> anyhow::Result<InputFacts> {
    let content = read_text(path)?;
    InputFacts::from_toml(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Collect lines up to a lone `.` or the end of input.
async fn read_block<R>(lines: &mut Lines<R>) -> io::Result<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut block = Vec::new();
    while let Some(line) = lines.next_line().await? {
        if line.trim() == END_OF_TEXT {
            break;
        }
        block.push(line);
    }
    Ok(block.join("\n"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::NarratorConfig;
    use crate::generate::MockGenerator;
    use crate::narrate::MockNarrator;
    use crate::translate::MockTranslator;

    const JEAN: &str = r#"
        title = "M."
        name = "Jean Dupont"
        age = 82
        date_of_death = "2024-03-02"
        ceremony_date = "2024-03-08"
        children = 2
        grandchildren = 3
        profession = "enseignant"
        tone = "Traditionnel"
    "#;

    fn console(narrator: Arc<MockNarrator>) -> Console {
        let controller = WorkflowController::new(
            Arc::new(MockGenerator::ok()),
            Arc::new(MockTranslator::ok()),
            narrator,
        );
        Console::new(
            controller,
            VoiceCatalogue::from_config(&NarratorConfig::default()),
            ConsoleConfig::default(),
        )
    }

    async fn run_script(console: &mut Console, script: &str) -> String {
        let mut out = Vec::new();
        console
            .run(tokio::io::BufReader::new(script.as_bytes()), &mut out)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    fn facts_file(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("jean.toml");
        std::fs::write(&path, JEAN).unwrap();
        path
    }

    #[tokio::test]
    async fn full_session() {
        let dir = tempfile::tempdir().unwrap();
        let facts = facts_file(&dir);
        let narrator = Arc::new(MockNarrator::ok());
        let mut console = console(narrator.clone());

        let script = format!(
            "submit {}\ntranslate Anglais\nedit\nAvis raccourci.\n.\naudio George\nshow\n",
            facts.display()
        );
        let out = run_script(&mut console, &script).await;

        assert!(out.contains("M. Jean Dupont"), "{out}");
        assert!(out.contains("-- Anglais --"));
        assert!(out.contains("translations now out of date: Anglais"));
        assert!(out.contains("note: reading out-of-date translations: Anglais"));
        assert!(out.contains("-- Anglais, out of date --"));
        assert!(out.contains("-- Français, edited --"));

        let store = console.controller().store();
        assert_eq!(store.artifact().unwrap().edited(), "Avis raccourci.");
        assert_eq!(store.audio().len(), 2);
        assert!(narrator
            .calls()
            .iter()
            .all(|(_, voice_id, _)| voice_id == "JBFqnCBsd6RMkjVDRZzb"));
    }

    #[tokio::test]
    async fn errors_are_reported_and_the_loop_goes_on() {
        let mut console = console(Arc::new(MockNarrator::ok()));

        let out = run_script(
            &mut console,
            "translate Anglais\nfrobnicate\naudio Nobody\nsubmit /nonexistent/facts.toml\nlanguages\n",
        )
        .await;

        assert!(out.contains("! no notice has been generated yet"));
        assert!(out.contains("! unknown command \"frobnicate\""));
        assert!(out.contains("! unknown voice \"Nobody\""));
        assert!(out.contains("! reading /nonexistent/facts.toml"));
        assert!(out.contains("Portugais  (pt)"));
    }

    #[tokio::test]
    async fn logout_releases_audio_and_ends_the_session() {
        let dir = tempfile::tempdir().unwrap();
        let facts = facts_file(&dir);
        let narrator = Arc::new(MockNarrator::ok());
        let mut console = console(narrator.clone());

        let script = format!("submit {}\naudio\nlogout\nshow\n", facts.display());
        let out = run_script(&mut console, &script).await;

        assert!(out.contains("logged out (1 audio file(s) deleted)"));
        assert!(!out.contains("no notice yet"));
        assert!(console.controller().store().is_empty());
        assert_eq!(narrator.spool().file_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn audio_read_before_an_edit_is_flagged() {
        let dir = tempfile::tempdir().unwrap();
        let facts = facts_file(&dir);
        let mut console = console(Arc::new(MockNarrator::ok()));

        let script = format!("submit {}
audio
edit
Avis court.
.
show
", facts.display());
        let out = run_script(&mut console, &script).await;

        assert!(out.contains("audio now out of date"), "{out}");
        assert!(out.contains("-- audio, out of date --"));

        let out = run_script(&mut console, "audio
show
").await;
        assert!(out.contains("-- audio --"), "{out}");
    }

    #[tokio::test]
    async fn blank_inline_edit_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let facts = facts_file(&dir);
        let mut console = console(Arc::new(MockNarrator::ok()));

        let script = format!("submit {}\nedit\n\n.\n", facts.display());
        let out = run_script(&mut console, &script).await;

        assert!(out.contains("! the notice cannot be empty"));
        assert_eq!(console.controller().store().artifact().unwrap().revision(), 0);
    }

    #[tokio::test]
    async fn edit_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let facts = facts_file(&dir);
        let text = dir.path().join("avis.txt");
        std::fs::write(&text, "Texte final.\n").unwrap();
        let mut console = console(Arc::new(MockNarrator::ok()));

        let script = format!("submit {}\nedit {}\nreset\n", facts.display(), text.display());
        let out = run_script(&mut console, &script).await;

        assert!(out.contains("notice updated"));
        assert!(out.contains("session reset (0 audio file(s) deleted)"));
        assert!(console.controller().store().is_empty());
    }
}
