//! Twitchwall CLI: terminal dashboard for several Twitch streams

mod tui;

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use twitchwall::{DashboardCommand, Placement, Visibility};
use twitchwall_app::app::DashboardController;
use twitchwall_app::config::storage::{LOG_FILE, SETTINGS_FILE};
use twitchwall_app::data::{storage, PreferenceStore, Settings};
use twitchwall_app::error::{AppError, Result};
use twitchwall_app::providers::{
    source_for, EmbedOptions, KeyboardDragDrop, StreamerSource, TwitchEmbedProvider,
};

#[derive(Parser)]
#[command(name = "twitchwall", about = "Watch several Twitch streams side by side", version)]
struct Cli {
    /// Streamer list: a file path or an http(s) URL (overrides settings)
    #[arg(short, long, value_name = "LOCATION")]
    list: Option<String>,

    /// Directory holding settings and saved preferences
    #[arg(long, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Open the interactive dashboard (default)
    Watch,
    /// Print the tiles in render order
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Hide tiles
    Hide {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Show hidden tiles again
    Unhide {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Show every hidden tile
    UnhideAll,
    /// Show every tile and return to the default grid
    ShowAll,
    /// Move a tile before or after another
    Move {
        id: String,
        #[arg(long, value_name = "TARGET", conflicts_with = "after", required_unless_present = "after")]
        before: Option<String>,
        #[arg(long, value_name = "TARGET")]
        after: Option<String>,
    },
    /// Forget saved order and hidden tiles
    Reset,
    /// Write the settings file, filling in defaults for missing fields
    InitSettings,
}

/// A started dashboard
pub(crate) struct Session {
    pub controller: DashboardController,
    pub dragdrop: KeyboardDragDrop,
    /// Why the streamer list could not be loaded, if it couldn't
    pub fetch_error: Option<AppError>,
}

impl Session {
    pub fn start(prefs: PreferenceStore, options: EmbedOptions, source: &dyn StreamerSource) -> Self {
        let mut controller =
            DashboardController::new(prefs, Box::new(TwitchEmbedProvider::new()), options);
        let mut dragdrop = KeyboardDragDrop::new();
        let fetch_error = controller.start(source, &mut dragdrop).err();
        Self {
            controller,
            dragdrop,
            fetch_error,
        }
    }
}

fn open_session(cli: &Cli) -> Result<Session> {
    let dir = cli.config_dir.as_deref();
    let settings = Settings::load(dir)?;
    let prefs = PreferenceStore::open(dir).with_ttl(settings.preference_ttl());
    let location = cli.list.clone().unwrap_or_else(|| settings.streamers.clone());
    let source = source_for(&location)?;
    Ok(Session::start(prefs, settings.embed_options(), source.as_ref()))
}

/// Save the effective settings back to `dir` and print where they went
fn init_settings(dir: Option<&Path>) -> Result<()> {
    let settings = Settings::load(dir)?;
    settings.save(dir)?;
    println!("{}", storage::data_path(dir, SETTINGS_FILE)?.display());
    Ok(())
}

/// Open the log file for appending, creating the config dir on first run
fn open_log(dir: Option<&Path>) -> Result<File> {
    let path = storage::data_path(dir, LOG_FILE)?;
    if let Some(parent) = path.parent() {
        storage::ensure_dir(parent)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Log to `file` when given, stderr otherwise. `RUST_LOG` overrides the level.
fn init_logging(file: Option<File>, default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let fmt = tracing_subscriber::fmt::layer().with_target(false);
    match file {
        Some(file) => tracing_subscriber::registry()
            .with(filter)
            .with(fmt.with_ansi(false).with_writer(Mutex::new(file)))
            .init(),
        None => tracing_subscriber::registry()
            .with(filter)
            .with(fmt.with_writer(io::stderr))
            .init(),
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let mut cli = Cli::parse();
    let command = cli.command.take().unwrap_or(Command::Watch);

    if let Command::Watch = command {
        // stderr would corrupt the ratatui display
        match open_log(cli.config_dir.as_deref()) {
            Ok(log) => init_logging(Some(log), "info"),
            Err(e) => eprintln!("Logging disabled: {}", e),
        }
        let session = match open_session(&cli) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        };
        tui::run(session)?;
        return Ok(());
    }

    init_logging(None, "warn");
    if let Command::InitSettings = command {
        if let Err(e) = init_settings(cli.config_dir.as_deref()) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return Ok(());
    }
    if let Err(e) = open_session(&cli).and_then(|session| run_once(session, command)) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

/// Apply one subcommand and print the resulting layout
fn run_once(session: Session, command: Command) -> Result<()> {
    if let Some(e) = session.fetch_error {
        return Err(e);
    }
    let mut controller = session.controller;

    match command {
        Command::Watch | Command::InitSettings | Command::List { json: false } => {}
        Command::List { json: true } => return print_json(&controller),
        Command::Hide { ids } => {
            for id in ids {
                report(&mut controller, DashboardCommand::Hide(id.clone()), &id)?;
            }
        }
        Command::Unhide { ids } => {
            for id in ids {
                report(&mut controller, DashboardCommand::Unhide(id.clone()), &id)?;
            }
        }
        Command::UnhideAll => {
            controller.handle(DashboardCommand::UnhideAll)?;
        }
        Command::ShowAll => {
            controller.handle(DashboardCommand::ShowAll)?;
        }
        Command::Move { id, before, after } => {
            let placement = match (before, after) {
                (Some(target), _) => Placement::Before(target),
                (None, Some(target)) => Placement::After(target),
                (None, None) => return Err(AppError::Config("move needs --before or --after".into())),
            };
            let transition = controller.handle(DashboardCommand::Reorder {
                id: id.clone(),
                placement,
            })?;
            if !transition.save_order {
                eprintln!("{}: already in place", id);
            }
        }
        Command::Reset => {
            controller.handle(DashboardCommand::ResetLayout)?;
        }
    }

    print_table(&controller);
    Ok(())
}

fn report(controller: &mut DashboardController, command: DashboardCommand, id: &str) -> Result<()> {
    if controller.handle(command)?.is_noop() {
        eprintln!("{}: nothing to change", id);
    }
    Ok(())
}

#[derive(Serialize)]
struct TileRow<'a> {
    position: usize,
    id: &'a str,
    channel: &'a str,
    visibility: Visibility,
    embed: Option<&'a str>,
}

fn rows(controller: &DashboardController) -> Vec<TileRow<'_>> {
    controller
        .registry()
        .entries()
        .iter()
        .map(|e| TileRow {
            position: e.position,
            id: &e.id,
            channel: &e.channel,
            visibility: e.visibility,
            embed: controller.embed(&e.id).map(|h| h.url.as_str()),
        })
        .collect()
}

fn print_table(controller: &DashboardController) {
    for row in rows(controller) {
        let visibility = match row.visibility {
            Visibility::Visible => "visible",
            Visibility::Hidden => "hidden",
        };
        println!(
            "{:>3}  {:<32} {:<8} {}",
            row.position + 1,
            row.id,
            visibility,
            row.embed.unwrap_or("---")
        );
    }
}

fn print_json(controller: &DashboardController) -> Result<()> {
    let json = serde_json::to_string_pretty(&rows(controller))
        .map_err(|e| AppError::Config(format!("Cannot encode tiles: {e}")))?;
    println!("{}", json);
    Ok(())
}
