//! Trackcut CLI: drive the timeline engine against a project bundle.
//!
//! Usage:
//!   trackcut init <NAME>                  Create an empty project bundle
//!   trackcut info <PATH>                  Show tracks, clips and assets
//!   trackcut validate <PATH>              Check model invariants
//!   trackcut upload <PATH> <FILE>         Upload media and place it
//!   trackcut place <PATH> <ASSET>         Place a library asset
//!   trackcut move <PATH> <CLIP> --dx PX   Drag a clip (and its links)
//!   trackcut split <PATH> <CLIP> <AT>     Split a clip at a timeline instant
//!   trackcut delete <PATH> <CLIP>...      Delete clips and their links
//!   trackcut volume|speed <PATH> <CLIP> <VALUE>
//!   trackcut merge <PATH> <TRACK> <CLIP>...
//!   trackcut preview|export <PATH>        Render through the backend
//!   trackcut config [--save]              Show or persist the configuration

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use trackcut_common::{AppConfig, LoggingConfig};
use trackcut_edit_core::ErrorCategory;

mod commands;

#[derive(Parser)]
#[command(
    name = "trackcut",
    about = "Non-destructive multi-track timeline editing",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Where a new clip goes.
#[derive(Args, Debug, Clone)]
pub struct Target {
    /// Track to place on (defaults to the first compatible track)
    #[arg(short, long)]
    track: Option<String>,

    /// Start time in seconds (defaults to appending after the last clip)
    #[arg(long)]
    at: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new empty project
    Init {
        /// Project name
        name: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Show project information
    Info {
        /// Path to the project directory
        path: PathBuf,

        /// Print the render description as JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Validate a project bundle
    Validate {
        /// Path to the project directory
        path: PathBuf,
    },

    /// Upload a media file to the backend and place it on the timeline
    Upload {
        /// Path to the project directory
        path: PathBuf,

        /// Media file to upload
        file: PathBuf,

        #[command(flatten)]
        target: Target,
    },

    /// Place an asset from the project library
    Place {
        /// Path to the project directory
        path: PathBuf,

        /// Asset id
        asset: String,

        #[command(flatten)]
        target: Target,
    },

    /// Drag a clip horizontally by a pixel displacement
    Move {
        /// Path to the project directory
        path: PathBuf,

        /// Clip to grab
        clip: String,

        /// Horizontal pointer displacement in pixels
        #[arg(long, allow_hyphen_values = true)]
        dx: f64,
    },

    /// Split a clip (and its linked partner) at a timeline instant
    Split {
        /// Path to the project directory
        path: PathBuf,

        /// Clip to split
        clip: String,

        /// Split instant in seconds
        at: f64,
    },

    /// Delete clips along with their linked partners
    Delete {
        /// Path to the project directory
        path: PathBuf,

        /// Clips to delete
        #[arg(required = true)]
        clips: Vec<String>,
    },

    /// Set a clip's volume
    Volume {
        /// Path to the project directory
        path: PathBuf,

        clip: String,

        /// Gain, 1.0 = unchanged
        value: f64,
    },

    /// Set a clip's playback speed (applies to its linked partner too)
    Speed {
        /// Path to the project directory
        path: PathBuf,

        clip: String,

        /// Playback rate, 1.0 = normal
        value: f64,
    },

    /// Render a run of clips into one clip
    Merge {
        /// Path to the project directory
        path: PathBuf,

        /// Track holding the clips
        track: String,

        /// Clips to merge (at least two)
        #[arg(required = true)]
        clips: Vec<String>,
    },

    /// Render a quick preview of the timeline
    Preview {
        /// Path to the project directory
        path: PathBuf,
    },

    /// Render the timeline at full quality
    Export {
        /// Path to the project directory
        path: PathBuf,
    },

    /// Print the effective configuration
    Config {
        /// Write it to the user config directory
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };
    config.editor.validate()?;

    // Initialize logging
    let logging = if cli.verbose {
        LoggingConfig {
            level: "debug".to_string(),
            ..config.logging.clone()
        }
    } else {
        config.logging.clone()
    };
    trackcut_common::logging::init_logging(&logging);

    let result = match cli.command {
        Commands::Init { name, output } => commands::init::run(name, output, &config),
        Commands::Info { path, json } => commands::info::run(path, json),
        Commands::Validate { path } => commands::validate::run(path, &config),
        Commands::Upload { path, file, target } => {
            commands::upload::run(path, file, target, &config).await
        }
        Commands::Place {
            path,
            asset,
            target,
        } => commands::edit::place(path, asset, target, &config),
        Commands::Move { path, clip, dx } => commands::edit::drag(path, clip, dx, &config),
        Commands::Split { path, clip, at } => commands::edit::split(path, clip, at, &config),
        Commands::Delete { path, clips } => commands::edit::delete(path, clips, &config),
        Commands::Volume { path, clip, value } => {
            commands::edit::volume(path, clip, value, &config)
        }
        Commands::Speed { path, clip, value } => commands::edit::speed(path, clip, value, &config),
        Commands::Merge { path, track, clips } => {
            commands::merge::run(path, track, clips, &config).await
        }
        Commands::Preview { path } => commands::render::preview(path, &config).await,
        Commands::Export { path } => commands::render::export(path, &config).await,
        Commands::Config { save } => commands::config::run(&config, save),
    };

    if let Err(err) = &result {
        if commands::edit_failure(err) == Some(ErrorCategory::Invariant) {
            tracing::error!(error = %err, "Project model is inconsistent");
            eprintln!("The project file is internally inconsistent; run `trackcut validate` on it.");
        }
    }
    result
}
