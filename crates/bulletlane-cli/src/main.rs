use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bulletlane_core::AppConfig;

mod commands;
mod source;

#[derive(Parser)]
#[command(name = "bulletlane")]
#[command(author, version, about = "Scrolling bullet comments without overlaps")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the terminal UI
    Run {
        /// File with one bullet per line (defaults to a built-in sample)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Run the scheduler headless on a virtual clock
    Simulate {
        /// File with one bullet per line (defaults to stdin)
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Virtual seconds to simulate
        #[arg(short, long, default_value_t = 30.0)]
        seconds: f64,
        /// Frame step in milliseconds
        #[arg(long, default_value_t = 16)]
        step_ms: u64,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show or initialize the configuration
    Config {
        /// Print the config file path
        #[arg(long)]
        path: bool,
        /// Write a default config file
        #[arg(long)]
        init: bool,
    },
}

/// Install the tracing subscriber. `RUST_LOG` wins over the configured level.
///
/// The terminal UI owns the screen, so it logs to a file instead of stderr.
fn init_logging(config: &AppConfig, to_file: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
    );
    let registry = tracing_subscriber::registry().with(filter);

    if to_file {
        let log_path = config.log_path();
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load()?;

    let command = cli.command.unwrap_or(Commands::Run { file: None });
    init_logging(&config, matches!(command, Commands::Run { .. }))?;

    // Handle commands
    match command {
        Commands::Run { file } => commands::run::run(config, file).await,
        Commands::Simulate {
            file,
            seconds,
            step_ms,
            json,
        } => commands::simulate::run(&config, file, seconds, step_ms, json).await,
        Commands::Config { path, init } => commands::config::run(&config, path, init),
    }
}
