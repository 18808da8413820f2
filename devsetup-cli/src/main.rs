//! Devsetup CLI
//!
//! Command-line interface for the devsetup server.

mod commands;
mod config;
mod resolver;
mod types;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "devsetup")]
#[command(about = "Developer workstation installer CLI", long_about = None)]
struct Cli {
    /// Server URL
    #[arg(long, env = "DEVSETUP_SERVER_URL", default_value = "http://localhost:7842")]
    server_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::new(cli.server_url);

    handle_command(cli.command, &config).await
}
