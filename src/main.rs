//! OpenBoard - audio mixer and soundboard for tabletop role-playing sessions.

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;
use openboard::board_app::BoardApp;
use openboard::bootstrap;
use openboard::config::Config;
use openboard::constants::{APP_NAME, WINDOW_TITLE};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// OpenBoard - trigger ambient, music, and sound effects during your sessions
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the ambient, music and effects folders
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Create the sound folders and exit without opening the board
    #[arg(long)]
    init: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().unwrap_or_else(|err| {
        warn!("{err:#}; using default settings");
        Config::new()
    });

    let root = cli.root.unwrap_or_else(|| config.sounds_root());
    let report = bootstrap::create_sample_folders(&root)
        .context(format!("Failed to prepare sound folders in {}", root.display()))?;
    if !report.is_noop() {
        info!(
            folders = report.created_folders.len(),
            readmes = report.created_readmes.len(),
            "prepared sound folders"
        );
    }

    if cli.init {
        println!("Sound folders ready in {}", root.display());
        return Ok(());
    }

    let window_options = eframe::NativeOptions {
        // Viewport is an area in which the objects are going to be rendered (i.e. native window)
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_min_inner_size([900.0, 500.0])
            .with_inner_size([config.ui.window_width, config.ui.window_height]),
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        window_options,
        Box::new(move |cc| Ok(Box::new(BoardApp::new(cc, config, root)?))),
    )
    .map_err(|err| anyhow::anyhow!("{err}"))
}
