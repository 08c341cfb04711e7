//! Courier CLI
//!
//! Build an email from flags or a raw `.eml` file and deliver it through
//! Mailgun.

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{API_KEY_ENV, CourierConfig};

/// Send email through Mailgun.
#[derive(Parser, Debug)]
#[command(name = "courier", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "courier.toml", global = true)]
    config: PathBuf,

    /// Mailgun API key, used when the configuration has none.
    #[arg(long, env = API_KEY_ENV, hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Output format.
    #[arg(long, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Deliver a message.
    Send(commands::send::SendArgs),
    /// Show the fields a message would be sent with, without sending it.
    Preview(commands::preview::PreviewArgs),
    /// Show the resolved connection settings for a domain.
    Settings(commands::settings::SettingsArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = CourierConfig::load(&cli.config, cli.api_key.clone())?;

    match cli.command {
        Command::Send(args) => commands::send::run(config.mailgun, &args, &cli.format).await,
        Command::Preview(args) => commands::preview::run(&args, &cli.format),
        Command::Settings(args) => commands::settings::run(&config.mailgun, &args, &cli.format),
    }
}
