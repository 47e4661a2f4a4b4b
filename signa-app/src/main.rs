//! Signa command-line host.
//!
//! Wires a pose source (JSON-lines file, stdin, or a synthetic `--demo`
//! word) into the engine, speaks announcements through the system TTS
//! program, and prints composer events to stdout as JSON lines.

mod cli;
mod display;
mod settings;

use std::io::Write;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use signa_core::source::{JsonLinesSource, ScriptedSource};
use signa_core::speech::{command::CommandSpeaker, stub::LogSpeaker};
use signa_core::{
    AnnouncementQueue, EngineConfig, FrequencyDictionary, PhraseCorrector, PoseSource,
    SessionEvent, SessionSnapshot, SignaEngine,
};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{error, info, warn};

use clap::Parser;

use cli::{CliArgs, Input};
use settings::{default_settings_path, load_settings, save_settings, AppSettings};

/// Upper bound on waiting for queued speech after the engine stops.
const SPEECH_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);
/// A source blocked on input (e.g. an idle stdin) cannot observe `stop()`.
const STOP_TIMEOUT: Duration = Duration::from_secs(2);

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // ── Tracing ───────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("signa=info,signa_core=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!("failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };
    let result = runtime.block_on(run(args));
    runtime.shutdown_timeout(STOP_TIMEOUT);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: CliArgs) -> Result<()> {
    let settings_path = args
        .settings
        .clone()
        .unwrap_or_else(default_settings_path);
    let mut settings = load_settings(&settings_path);
    settings.apply_env_overrides();
    settings.normalize();
    if args.save_settings {
        save_settings(&settings_path, &settings)
            .with_context(|| format!("writing {}", settings_path.display()))?;
        info!(path = %settings_path.display(), "settings saved");
    }

    info!("Signa starting");

    // ── Collaborators (all fatal on failure, before any frame is read) ────
    let corrector = build_corrector(&settings)?;
    let queue = if args.mute {
        AnnouncementQueue::spawn(LogSpeaker::new(), settings.queue_config())
    } else {
        AnnouncementQueue::spawn(
            CommandSpeaker::new(settings.speaker_config()),
            settings.queue_config(),
        )
    }
    .context("starting speech output (use --mute to run without a TTS program)")?;

    let config = EngineConfig {
        composer: settings.composer_config(),
        ..EngineConfig::default()
    };
    let source = build_source(&args, &config)?;
    let engine = SignaEngine::new(config);

    let printer = tokio::spawn(print_events(
        engine.subscribe_events(),
        settings.max_candidates_shown,
    ));
    let snapshot_printer = args
        .snapshots
        .then(|| tokio::spawn(print_snapshots(engine.subscribe_snapshots())));

    engine
        .start(source, corrector, queue.sender())
        .context("starting engine")?;

    let interrupted = {
        let join = engine.join();
        tokio::pin!(join);
        tokio::select! {
            _ = &mut join => false,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received — stopping");
                if let Err(e) = engine.stop() {
                    warn!("stop: {e}");
                }
                if tokio::time::timeout(STOP_TIMEOUT, &mut join).await.is_err() {
                    warn!("pose source still blocked on input; abandoning pipeline thread");
                }
                true
            }
        }
    };

    let diagnostics = engine.diagnostics_snapshot();
    // Dropping the engine closes its channels so the printers finish.
    drop(engine);
    finish(printer, "event printer").await;
    if let Some(handle) = snapshot_printer {
        finish(handle, "snapshot printer").await;
    }

    // After an interrupt, whatever is still queued is dropped.
    let drain = if interrupted { Duration::ZERO } else { SPEECH_DRAIN_TIMEOUT };
    let stats = tokio::task::spawn_blocking(move || {
        if !queue.flush(drain) && !interrupted {
            warn!("speech queue did not drain in time");
        }
        queue.shutdown()
    })
    .await
    .context("speech shutdown")?;

    info!(
        frames = diagnostics.frames,
        letters = diagnostics.letters,
        phrases = diagnostics.phrases,
        resets = diagnostics.resets,
        spoken = stats.spoken,
        failed = stats.failed,
        "Signa finished"
    );
    Ok(())
}

/// Wait for a printer task; an abandoned pipeline thread can keep its
/// channel open, so this is bounded.
async fn finish(handle: tokio::task::JoinHandle<()>, what: &str) {
    match tokio::time::timeout(STOP_TIMEOUT, handle).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("{what} failed: {e}"),
        Err(_) => warn!("{what} still waiting for events; detaching"),
    }
}

fn build_corrector(settings: &AppSettings) -> Result<PhraseCorrector> {
    let mut dictionary = FrequencyDictionary::italian().context("loading built-in vocabulary")?;
    if let Some(path) = &settings.word_list_path {
        let added = dictionary
            .load_word_list(path)
            .with_context(|| format!("loading word list {}", path.display()))?;
        info!(path = %path.display(), added, "word list loaded");
    }
    let mut corrector = PhraseCorrector::new(dictionary);
    corrector.add_words(settings.extra_words.iter().map(String::as_str));
    Ok(corrector)
}

fn build_source(args: &CliArgs, config: &EngineConfig) -> Result<Box<dyn PoseSource>> {
    Ok(match args.input() {
        Input::Stdin => Box::new(JsonLinesSource::from_reader(std::io::stdin())),
        Input::File(path) => Box::new(JsonLinesSource::from_path(path)),
        Input::Demo(text) => Box::new(
            ScriptedSource::spell(&text, &config.composer, args.fps)
                .context("building demo stream")?
                .realtime(args.realtime),
        ),
    })
}

async fn print_events(mut rx: broadcast::Receiver<SessionEvent>, max_candidates: usize) {
    loop {
        match rx.recv().await {
            Ok(event) => {
                if let Some(summary) = display::describe(&event.event, max_candidates) {
                    info!("{summary}");
                }
                if !print_json(&event) {
                    break;
                }
            }
            Err(RecvError::Lagged(n)) => warn!("event printer lagged, skipped {n} events"),
            Err(RecvError::Closed) => break,
        }
    }
}

#[derive(Serialize)]
struct SnapshotLine<'a> {
    snapshot: &'a SessionSnapshot,
}

async fn print_snapshots(mut rx: broadcast::Receiver<SessionSnapshot>) {
    loop {
        match rx.recv().await {
            Ok(snapshot) => {
                if !print_json(&SnapshotLine {
                    snapshot: &snapshot,
                }) {
                    break;
                }
            }
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
}

/// Returns `false` once stdout is gone (e.g. closed pipe).
fn print_json<T: Serialize>(value: &T) -> bool {
    let line = match serde_json::to_string(value) {
        Ok(line) => line,
        Err(e) => {
            warn!("failed to serialize output line: {e}");
            return true;
        }
    };
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{line}").and_then(|_| stdout.flush()).is_ok()
}
