//! Tool command handlers
//!
//! Lists catalog tools and tool sets.

use std::collections::BTreeMap;

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use devsetup_client::InstallerClient;
use devsetup_core::domain::tool::Tool;

use crate::config::Config;

/// Tool subcommands
#[derive(Subcommand)]
pub enum ToolCommands {
    /// List all tools grouped by category
    List {
        /// Only show installed tools
        #[arg(long)]
        installed: bool,
    },
    /// List tool sets
    Sets,
}

/// Handle tool commands
pub async fn handle_tool_command(command: ToolCommands, config: &Config) -> Result<()> {
    let client = InstallerClient::new(&config.server_url);

    match command {
        ToolCommands::List { installed } => list_tools(&client, installed).await,
        ToolCommands::Sets => list_tool_sets(&client).await,
    }
}

/// List tools grouped by category
async fn list_tools(client: &InstallerClient, installed_only: bool) -> Result<()> {
    let tools = if installed_only {
        client.list_installed_tools().await?
    } else {
        client.list_tools().await?
    };

    if tools.is_empty() {
        println!("{}", "No tools found.".yellow());
        return Ok(());
    }

    for (category, tools) in group_by_category(&tools) {
        println!("{}", category.bold());
        for tool in tools {
            print_tool(tool);
        }
        println!();
    }

    Ok(())
}

/// List tool sets with how many of their tools are installed
async fn list_tool_sets(client: &InstallerClient) -> Result<()> {
    let sets = client.list_tool_sets().await?;

    if sets.is_empty() {
        println!("{}", "No tool sets found.".yellow());
        return Ok(());
    }

    let tools = client.list_tools().await?;

    println!("{}", format!("Found {} tool set(s):", sets.len()).bold());
    println!();
    for set in sets {
        let installed = set
            .tools
            .iter()
            .filter(|name| tools.iter().any(|t| &t.name == *name && t.installed))
            .count();

        println!(
            "  {} {} {}",
            "▸".cyan(),
            set.display_name.bold(),
            format!("({})", set.name).dimmed()
        );
        if let Some(description) = &set.description {
            println!("    {}", description);
        }
        println!(
            "    Tools:     {}",
            set.tools.join(", ").dimmed()
        );
        println!("    Installed: {}/{}", installed, set.tools.len());
        println!();
    }

    Ok(())
}

fn group_by_category(tools: &[Tool]) -> BTreeMap<&str, Vec<&Tool>> {
    let mut groups: BTreeMap<&str, Vec<&Tool>> = BTreeMap::new();
    for tool in tools {
        groups.entry(tool.category.as_str()).or_default().push(tool);
    }
    groups
}

fn print_tool(tool: &Tool) {
    let marker = if tool.installed {
        "✓".green()
    } else {
        "·".dimmed()
    };

    println!(
        "  {} {:>3}  {:<16} {}",
        marker,
        tool.id,
        tool.name.cyan(),
        tool.description.as_deref().unwrap_or("").dimmed()
    );
}
