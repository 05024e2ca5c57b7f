//! Seismo CLI - seismo command

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;
mod daemon;
mod locks;
mod logging;
mod system_config;
mod util;

/// Seismo - debounced vibration sensor event log
#[derive(Parser)]
#[command(name = "seismo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (default: $SEISMO_CONFIG or the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the daemon in the foreground
    Run {
        /// Replay edges from a file instead of the GPIO chip ("-" for stdin)
        #[arg(long)]
        replay: Option<PathBuf>,
        /// Log admitted events without writing the event log
        #[arg(long)]
        dry_run: bool,
    },
    /// Start the daemon in the background
    Start,
    /// Stop the background daemon
    Stop,
    /// Show daemon and event log status
    Status,
    /// Regenerate the report from the event log now
    Report,
    /// Check whether two edge identifiers form a rising/falling pair
    Pair {
        /// Rising edge identifier, e.g. rising17
        first: String,
        /// Falling edge identifier, e.g. falling17
        second: String,
    },
    /// View and edit configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// List all configuration values
    List,
    /// Print a single value
    Get {
        /// Key such as debounce.suppress_window_ms
        key: String,
    },
    /// Set a single value
    Set {
        key: String,
        value: String,
    },
    /// Show the config file path
    Path {
        /// Write a default config file if none exists
        #[arg(long)]
        create: bool,
    },
    /// Print an example configuration
    Example,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config;

    match cli.command {
        Commands::Run { replay, dry_run } => {
            cmd::run::run(config_path.as_deref(), replay, dry_run).await
        }
        Commands::Start => {
            logging::init_console();
            cmd::start::run(config_path.as_deref()).await
        }
        Commands::Stop => {
            logging::init_console();
            cmd::stop::run(config_path.as_deref()).await
        }
        Commands::Status => {
            logging::init_console();
            cmd::status::run(config_path.as_deref()).await
        }
        Commands::Report => {
            logging::init_console();
            cmd::report::run(config_path.as_deref()).await
        }
        Commands::Pair { first, second } => cmd::pair::run(&first, &second),
        Commands::Config(config_cmd) => {
            logging::init_console();
            let path = config_path.as_deref();
            match config_cmd {
                ConfigCommands::List => cmd::config::run_list(path).await,
                ConfigCommands::Get { key } => cmd::config::run_get(path, &key).await,
                ConfigCommands::Set { key, value } => cmd::config::run_set(path, &key, &value).await,
                ConfigCommands::Path { create } => cmd::config::run_path(path, create).await,
                ConfigCommands::Example => cmd::config::run_example().await,
            }
        }
    }
}
