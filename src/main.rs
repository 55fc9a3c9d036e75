// SPDX-License-Identifier: GPL-3.0-only

use capture_screen::app::CaptureScreen;
use capture_screen::backends::camera::CameraBackendType;
use capture_screen::config::Config;
use capture_screen::constants::APP_NAME;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Mutex;

mod cli;

#[derive(Parser)]
#[command(name = "capture-screen")]
#[command(about = "Take photos and record videos, preview them and save them to the gallery")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Use GStreamer test sources instead of real cameras
    #[arg(long = "virtual", global = true)]
    virtual_camera: bool,

    /// Read settings from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available cameras
    List,

    /// Take a photo and save it to the gallery
    Photo {
        /// Open the saved photo afterwards
        #[arg(long)]
        open: bool,
    },

    /// Record a video and save it to the gallery
    Video {
        /// Recording duration in seconds
        #[arg(short, long, default_value = "10")]
        duration: u64,

        /// Open the saved video afterwards
        #[arg(long)]
        open: bool,
    },

    /// Show the effective configuration
    Config {
        /// Write the default configuration file
        #[arg(long)]
        write_default: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // The terminal screen owns stdout, so its logs go to a file
    init_logging(cli.command.is_none());

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    if cli.virtual_camera {
        config.backend = CameraBackendType::Virtual;
    }

    match cli.command {
        None => capture_screen::terminal::run(CaptureScreen::from_config(config)),
        Some(Commands::List) => cli::list_cameras(&config),
        Some(Commands::Photo { open }) => cli::take_photo(config, open),
        Some(Commands::Video { duration, open }) => cli::record_video(config, duration, open),
        Some(Commands::Config { write_default }) => {
            cli::show_config(&config, cli.config, write_default)
        }
    }
}

/// Initialize logging
///
/// Set RUST_LOG to control the level, e.g. `RUST_LOG=capture_screen=debug`.
fn init_logging(to_file: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    let log_file = to_file
        .then(|| {
            let dir = dirs::cache_dir()?.join(APP_NAME);
            std::fs::create_dir_all(&dir).ok()?;
            std::fs::File::create(dir.join("capture-screen.log")).ok()
        })
        .flatten();

    match log_file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_writer(std::io::stderr)
            .init(),
    }
}
