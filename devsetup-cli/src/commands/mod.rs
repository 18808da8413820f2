//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod install;
mod tools;

pub use tools::ToolCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Browse the tool catalog
    Tools {
        #[command(subcommand)]
        command: ToolCommands,
    },
    /// Install tools by name or catalog id
    Install {
        /// Tool names or ids, installed in the given order
        #[arg(required = true)]
        tools: Vec<String>,

        /// Wait until every job has finished
        #[arg(short, long)]
        wait: bool,
    },
    /// Install the missing tools of a tool set
    InstallSet {
        /// Tool set name
        name: String,

        /// Wait until every job has finished
        #[arg(short, long)]
        wait: bool,
    },
    /// Show the status of a job
    Status {
        /// Job ID, or a prefix of an active job's ID
        id: String,

        /// Print the job as JSON
        #[arg(long)]
        json: bool,
    },
    /// Cancel the remaining jobs of a batch
    Cancel {
        /// Batch ID, or a prefix of it while the batch is active
        id: String,
    },
    /// List jobs still pending or running
    Active {
        /// Print the jobs as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Tools { command } => tools::handle_tool_command(command, config).await,
        Commands::Install { tools, wait } => install::install(config, &tools, wait).await,
        Commands::InstallSet { name, wait } => install::install_set(config, &name, wait).await,
        Commands::Status { id, json } => install::status(config, &id, json).await,
        Commands::Cancel { id } => install::cancel(config, &id).await,
        Commands::Active { json } => install::active(config, json).await,
    }
}
