//! puzzlebot CLI: the main entry point.
//!
//! Commands:
//! - `run`     : Solve every open task on the challenge server
//! - `status`  : List tasks and their completion state
//! - `onboard` : Write a default config file
//! - `doctor`  : Diagnose config, sandbox project and endpoints

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "puzzlebot",
    about = "puzzlebot: LLM-driven solver for challenge-server tasks",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of ~/.puzzlebot/config.toml
    #[arg(short, long, global = true, env = "PUZZLEBOT_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch tasks and try to solve every incomplete one
    Run {
        /// Only work on the task with this id
        #[arg(short, long)]
        task: Option<String>,

        /// Override the number of attempts per task
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        max_attempts: Option<u32>,

        /// Submit trimmed program output as is instead of keeping digits only
        #[arg(long)]
        raw_output: bool,
    },

    /// Show the task list for the registered agent
    Status,

    /// Initialize configuration
    Onboard,

    /// Diagnose system health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Run {
            task,
            max_attempts,
            raw_output,
        } => {
            let overrides = commands::run::Overrides {
                task,
                max_attempts,
                raw_output,
            };
            commands::run::run(config_path, overrides).await?
        }
        Commands::Status => commands::status::run(config_path).await?,
        Commands::Onboard => commands::onboard::run(config_path).await?,
        Commands::Doctor => commands::doctor::run(config_path).await?,
    }

    Ok(())
}
