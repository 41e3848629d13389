// playdeck - play a list of audio files in the terminal
// Validate the command line, start the playback thread, hand the terminal to the UI

use anyhow::{Context, Result};
use clap::{error::ErrorKind, CommandFactory, Parser};
use playdeck::{
    logging::init_logging,
    playback::{ControllerSettings, PlaybackWorker, RodioEngine},
    ui::App,
    Config, Playlist, TransportState,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "playdeck")]
#[command(about = "Play audio files from the terminal with pause, skip and seek")]
#[command(version)]
struct Args {
    /// How to read the paths: `file` (audio files) or `link` (accepted, builds no playlist)
    mode: String,

    /// Audio files to play, in order
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Enable developer logging (stderr + debug output)
    #[arg(long)]
    dev: bool,

    /// Config file to use instead of the per-user one
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn usage() -> String {
    Args::command().render_usage().to_string()
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            // clap's rendering already carries the usage line.
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    let playlist = match Playlist::from_cli(&args.mode, &args.paths) {
        Ok(playlist) => playlist,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("{}", usage());
            return ExitCode::FAILURE;
        }
    };

    match run(args, playlist).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("playdeck failed: {:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args, playlist: Playlist) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    let _log_guard = init_logging(&config.logging, args.dev).context("setting up logging")?;

    info!("playdeck starting, {} track(s)", playlist.len());
    for line in playlist.listing() {
        println!("{}", line);
    }

    // ALSA and friends write to fd 2 directly; keep that off the TUI.
    #[cfg(unix)]
    let _stderr = if args.dev {
        debug!("Dev mode: keeping stderr for debug output");
        None
    } else {
        match playdeck::ui::StderrSilencer::new() {
            Ok(silencer) => Some(silencer),
            Err(e) => {
                warn!("Could not silence stderr: {}", e);
                None
            }
        }
    };

    let playlist = Arc::new(playlist);
    let transport = Arc::new(TransportState::new());

    let volume = config.playback.volume;
    let worker = PlaybackWorker::spawn(
        move || RodioEngine::new(volume),
        Arc::clone(&playlist),
        Arc::clone(&transport),
        ControllerSettings::from(&config.playback),
    )
    .context("starting playback thread")?;

    let ui_result = match App::new(&config, playlist, Arc::clone(&transport), worker.waker()) {
        Ok(mut app) => {
            let result = app.run().await;
            app.shutdown(config.shutdown.timeout()).await;
            result
        }
        Err(e) => Err(e),
    };

    transport.request_quit();
    let timeout = config.shutdown.timeout();
    let stopped = tokio::task::spawn_blocking(move || worker.shutdown(timeout))
        .await
        .unwrap_or(false);
    if !stopped {
        warn!("Exiting with the playback thread still running");
    }

    info!("playdeck stopped");
    ui_result
}
