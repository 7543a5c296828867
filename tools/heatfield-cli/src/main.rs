//! Heatfield CLI: inspect match records and render heatmaps.
//!
//! Usage:
//!   heatfield init [--output PATH] [--config]  Write default heatmap settings
//!   heatfield validate <SETTINGS>        Check a settings file
//!   heatfield info <RECORDS>             Summarize a records file
//!   heatfield render <RECORDS> [OPTIONS] Render heatmaps and a manifest

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use heatfield_common::config::{AppConfig, LoggingConfig};

mod commands;

#[derive(Parser)]
#[command(
    name = "heatfield",
    about = "Positional heatmaps from match records",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a settings file with the default values
    Init {
        /// Where to write the settings
        #[arg(short, long, default_value = "heatfield.json")]
        output: PathBuf,

        /// Also make this the default settings file in the user config
        #[arg(long)]
        config: bool,
    },

    /// Load and validate a settings file
    Validate {
        /// Path to the settings file
        settings: PathBuf,
    },

    /// Show what a records file contains
    Info {
        /// Path to a JSONL records file
        records: PathBuf,
    },

    /// Render every heatmap for a records file
    Render {
        /// Path to a JSONL records file
        records: PathBuf,

        /// Settings file (defaults to the configured one, then built-in defaults)
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Output directory (defaults to the configured one)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fill heatmaps on the rayon thread pool
        #[arg(long)]
        parallel: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    let logging = if cli.verbose {
        LoggingConfig {
            json: config.logging.json,
            ..LoggingConfig::for_verbosity(true)
        }
    } else {
        config.logging.clone()
    };
    heatfield_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Init { output, config: remember } => commands::init::run(output, remember, config),
        Commands::Validate { settings } => commands::validate::run(settings),
        Commands::Info { records } => commands::info::run(records),
        Commands::Render {
            records,
            settings,
            output,
            parallel,
        } => commands::render::run(
            records,
            settings.or_else(|| config.settings_path.clone()),
            output.unwrap_or_else(|| config.output_dir.clone()),
            parallel,
        ),
    }
}
