//! vidup CLI - support utilities for the vidup desktop app.

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// vidup - support utilities for the vidup video up-scaler
#[derive(Parser)]
#[command(name = "vidup")]
#[command(version)]
#[command(about = "Support utilities for the vidup video up-scaler", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the default config file
    Init,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Send one chat-completion request to OpenRouter and print the result
    Probe {
        /// OpenRouter API key
        #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Model to query (default: from config)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Check or install FFmpeg and Real-ESRGAN
    #[command(subcommand)]
    Deps(DepsCommands),

    /// Save evenly spaced frames of a video as PNG files
    Frames {
        /// Video file
        video: PathBuf,

        /// Number of frames (default: from config)
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Save the middle frame of a video, scaled to fit a box
    Thumbnail {
        /// Video file
        video: PathBuf,

        /// Bounding box as WIDTHxHEIGHT (default: from config)
        #[arg(short, long)]
        size: Option<String>,

        /// Output PNG file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Pack a PNG into a multi-resolution .ico file
    Icon {
        /// Source image
        source: PathBuf,

        /// Output .ico file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// List the entries of an existing .ico instead of writing one
        #[arg(long)]
        inspect: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print the config file location
    Path,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., openrouter.model)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Subcommand)]
enum DepsCommands {
    /// Show which tools are installed
    Check {
        /// Directory holding ffmpeg/ and realesrgan-engine/
        #[arg(long)]
        app_dir: Option<PathBuf>,
    },

    /// Download whatever is missing
    Install {
        /// Directory holding ffmpeg/ and realesrgan-engine/
        #[arg(long)]
        app_dir: Option<PathBuf>,

        /// Download only this tool, even if present (ffmpeg, realesrgan)
        #[arg(long)]
        only: Option<String>,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vidup=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vidup=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::show(),
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::Set { key, value } => commands::config::set(&key, &value),
        },
        Commands::Probe { api_key, model } => commands::probe::run(api_key, model),
        Commands::Deps(cmd) => match cmd {
            DepsCommands::Check { app_dir } => commands::deps::check(app_dir),
            DepsCommands::Install { app_dir, only } => commands::deps::install(app_dir, only),
        },
        Commands::Frames {
            video,
            count,
            output,
        } => commands::video::frames(&video, count, &output),
        Commands::Thumbnail {
            video,
            size,
            output,
        } => commands::video::thumbnail(&video, size, output),
        Commands::Icon {
            source,
            output,
            inspect,
        } => commands::icon::run(&source, output, inspect),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
