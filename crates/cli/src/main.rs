//! errand CLI: the main entry point.
//!
//! Commands:
//! - `chat`     Interactive chat or single-message mode
//! - `task`     Plan and execute a multi-step task
//! - `tools`    Print the registered tool schemas
//! - `onboard`  Write a default config file
//! - `doctor`   Diagnose configuration and provider health

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod commands;
mod terminal;

#[derive(Parser)]
#[command(
    name = "errand",
    about = "errand: a conversational task agent",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging and domain event output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the agent
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// JSON file mapping dataset names to their details
        #[arg(long)]
        datasets: Option<PathBuf>,
    },

    /// Plan and execute a task step by step
    Task {
        /// The task, in plain language
        task: String,

        /// Require a bare "yes" when verifying steps
        #[arg(long)]
        strict: bool,

        /// JSON file mapping dataset names to their details
        #[arg(long)]
        datasets: Option<PathBuf>,
    },

    /// Print the tool schemas sent to the model
    Tools,

    /// Write a default configuration file
    Onboard,

    /// Diagnose configuration and provider health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    match cli.log_format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init(),
    }

    match cli.command {
        Commands::Chat { message, datasets } => {
            commands::chat::run(message, datasets, cli.verbose).await?
        }
        Commands::Task { task, strict, datasets } => {
            commands::task::run(&task, strict, datasets, cli.verbose).await?
        }
        Commands::Tools => commands::tools::run()?,
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
