//! Application entry point: obituary notice console.
//!
//! # Startup sequence
//!
//! 1. Load `.env` (API keys) if present.
//! 2. Initialise logging.
//! 3. Parse the command line.
//! 4. Load [`AppConfig`] from disk (returns default on first run).
//! 5. Open the per-session audio spool.
//! 6. Build the generator, translator and narrator from config.
//! 7. Hand them to a [`WorkflowController`] and run the [`Console`] on
//!    stdin until `quit`, `logout`, end of input or Ctrl-C.
//!
//! Held audio files are deleted when the controller is dropped, then the
//! spool directory itself.  Spools left behind by a killed process are
//! swept at the next startup.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use avis_deces::{
    config::{AppConfig, AppPaths},
    console::Console,
    generate::{ClaudeGenerator, NoticeGenerator},
    narrate::{AudioSpool, ElevenLabsNarrator, Narrator, VoiceCatalogue},
    session::WorkflowController,
    translate::{GoogleTranslator, Translator},
};

/// Spool directories untouched for this long belong to no live session.
const STALE_SPOOL_AGE: Duration = Duration::from_secs(24 * 60 * 60);

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(name = "avis-deces")]
#[command(about = "Write, translate and read aloud obituary notices", long_about = None)]
#[command(version)]
struct Args {
    /// Settings file (default: the platform config directory).
    #[arg(long, env = "AVIS_DECES_CONFIG")]
    config: Option<PathBuf>,

    /// Facts file to submit before the console starts.
    #[arg(long)]
    facts: Option<PathBuf>,

    /// Write the effective settings to the settings file and exit.
    #[arg(long)]
    init_config: bool,
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // 1. Environment
    dotenvy::dotenv().ok();

    // 2. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("avis-deces starting up");

    // 3. Command line
    let args = Args::parse();

    // 4. Configuration
    let config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load().unwrap_or_else(|e| {
            log::warn!("Failed to load config ({e:#}); using defaults");
            AppConfig::default()
        }),
    };

    if args.init_config {
        let written = match &args.config {
            Some(path) => {
                config.save_to(path)?;
                path.clone()
            }
            None => {
                config.save()?;
                AppPaths::new().settings_file
            }
        };
        println!("settings written to {}", written.display());
        return Ok(());
    }

    if config.generator.resolved_api_key().is_none() {
        log::warn!("no generation API key configured; `submit` will fail");
    }
    if config.narrator.resolved_api_key().is_none() {
        log::warn!("no speech API key configured; `audio` will fail");
    }

    // 5. Audio spool
    let audio_parent = config
        .narrator
        .audio_dir
        .clone()
        .unwrap_or_else(|| AppPaths::new().audio_dir);
    match AudioSpool::sweep(&audio_parent, STALE_SPOOL_AGE) {
        Ok(0) => {}
        Ok(n) => log::info!("removed {n} stale audio spool(s)"),
        Err(e) => log::debug!("no stale spools swept in {}: {e}", audio_parent.display()),
    }
    let spool = match AudioSpool::new_in(&audio_parent) {
        Ok(spool) => spool,
        Err(e) => {
            log::warn!(
                "Cannot use audio directory {} ({e}); falling back to the system temp dir",
                audio_parent.display()
            );
            AudioSpool::temporary().context("creating the audio spool")?
        }
    };
    log::info!("audio files go to {}", spool.path().display());
    let spool = Arc::new(spool);

    // 6. Collaborators
    let generator: Arc<dyn NoticeGenerator> =
        Arc::new(ClaudeGenerator::from_config(&config.generator));
    let translator: Arc<dyn Translator> =
        Arc::new(GoogleTranslator::from_config(&config.translator));
    let narrator: Arc<dyn Narrator> =
        Arc::new(ElevenLabsNarrator::from_config(&config.narrator, Arc::clone(&spool)));

    // 7. Console
    let controller = WorkflowController::new(generator, translator, narrator);
    let mut console = Console::new(
        controller,
        VoiceCatalogue::from_config(&config.narrator),
        config.console.clone(),
    );

    let mut stdout = std::io::stdout();
    let session = async {
        if let Some(facts) = &args.facts {
            console.submit_file(facts, &mut stdout).await?;
        }
        console
            .run(tokio::io::BufReader::new(tokio::io::stdin()), &mut stdout)
            .await
    };

    let interrupted = tokio::select! {
        result = session => {
            result?;
            false
        }
        Ok(()) = tokio::signal::ctrl_c() => {
            log::info!("interrupted");
            true
        }
    };

    drop(console);
    drop(spool);
    log::info!("session closed");

    if interrupted {
        // The blocking stdin reader would keep the runtime from shutting down.
        std::process::exit(130);
    }
    Ok(())
}
