//! Install command handlers
//!
//! Starts batches, follows them to completion, inspects and cancels jobs.

use std::collections::HashMap;

use anyhow::{Result, bail};
use colored::*;
use devsetup_client::InstallerClient;
use devsetup_core::domain::job::{Job, JobDetails, JobStatus};
use devsetup_core::dto::install::BatchStarted;
use uuid::Uuid;

use crate::config::Config;
use crate::resolver::{resolve_job_id, resolve_tool_ids};
use crate::types::{IdOrPrefix, ToolRef};

/// Install tools by name or id
pub async fn install(config: &Config, tools: &[String], wait: bool) -> Result<()> {
    let client = InstallerClient::new(&config.server_url);

    let refs: Vec<ToolRef> = tools.iter().map(|t| ToolRef::parse(t)).collect();
    let tool_ids = resolve_tool_ids(&client, &refs).await?;

    let started = client.install_tools(tool_ids).await?;
    print_started(&started);

    if wait {
        wait_for_batch(&client, config, &started).await?;
    }

    Ok(())
}

/// Install the missing tools of a tool set
pub async fn install_set(config: &Config, name: &str, wait: bool) -> Result<()> {
    let client = InstallerClient::new(&config.server_url);

    let started = client.install_tool_set(name).await?;
    print_started(&started);

    if wait {
        wait_for_batch(&client, config, &started).await?;
    }

    Ok(())
}

/// Show one job
pub async fn status(config: &Config, id: &str, json: bool) -> Result<()> {
    let client = InstallerClient::new(&config.server_url);

    let job_id = resolve_job_id(&client, &IdOrPrefix::parse(id)).await?;
    let details = client.get_job(job_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&details)?);
    } else {
        print_job_details(&details);
    }

    Ok(())
}

/// Cancel a batch
pub async fn cancel(config: &Config, id: &str) -> Result<()> {
    let client = InstallerClient::new(&config.server_url);

    let batch_id = resolve_job_id(&client, &IdOrPrefix::parse(id)).await?;
    let response = client.cancel_batch(batch_id).await?;

    println!(
        "{} {} ({} job(s) in batch)",
        "✓".green(),
        response.message,
        response.job_ids.len()
    );
    println!(
        "  {}",
        "The running job finishes first; remaining jobs are skipped.".dimmed()
    );

    Ok(())
}

/// List jobs still pending or running
pub async fn active(config: &Config, json: bool) -> Result<()> {
    let client = InstallerClient::new(&config.server_url);

    let active = client.list_active().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&active)?);
        return Ok(());
    }

    if active.jobs.is_empty() {
        println!("{}", "No active installations.".yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!("Found {} active job(s):", active.jobs.len()).bold()
    );
    println!();
    for job in &active.jobs {
        print_job_summary(job);
    }

    Ok(())
}

// =============================================================================
// Waiting
// =============================================================================

/// Poll the jobs of a batch until all of them are terminal
///
/// Prints every status change. Fails if any job did not complete.
async fn wait_for_batch(
    client: &InstallerClient,
    config: &Config,
    started: &BatchStarted,
) -> Result<()> {
    let names: HashMap<i64, &str> = started
        .tools
        .iter()
        .map(|tool| (tool.id, tool.display_name.as_str()))
        .collect();
    let mut seen: HashMap<Uuid, JobStatus> = HashMap::new();

    println!();
    loop {
        let mut jobs = Vec::with_capacity(started.job_ids.len());
        for id in &started.job_ids {
            jobs.push(client.get_job(*id).await?.job);
        }

        for job in &jobs {
            if seen.get(&job.id) != Some(&job.status) {
                seen.insert(job.id, job.status);
                let name = names.get(&job.tool_id).copied().unwrap_or("unknown tool");
                println!("  {} {}", colorize_status(job.status), name);
                if let Some(error) = &job.error_message {
                    println!("      {}", error.red());
                }
            }
        }

        if jobs.iter().all(|job| job.status.is_terminal()) {
            return summarize(&jobs);
        }

        tokio::time::sleep(config.poll_interval).await;
    }
}

fn summarize(jobs: &[Job]) -> Result<()> {
    let count = |status: JobStatus| jobs.iter().filter(|job| job.status == status).count();
    let (completed, failed, cancelled) = (
        count(JobStatus::Completed),
        count(JobStatus::Failed),
        count(JobStatus::Cancelled),
    );

    println!();
    println!(
        "{} {} completed, {} failed, {} cancelled",
        "Done:".bold(),
        completed.to_string().green(),
        failed.to_string().red(),
        cancelled.to_string().dimmed()
    );

    if failed > 0 {
        bail!("{} installation(s) failed", failed);
    }

    Ok(())
}

// =============================================================================
// Output
// =============================================================================

fn print_started(started: &BatchStarted) {
    println!(
        "{} Started installation {}",
        "✓".green(),
        started.batch_id.to_string().cyan()
    );
    for (tool, job_id) in started.tools.iter().zip(&started.job_ids) {
        println!(
            "  {} {} {}",
            "▸".cyan(),
            tool.display_name,
            job_id.to_string().dimmed()
        );
    }
}

fn print_job_summary(job: &Job) {
    println!("  {} Job {}", "▸".cyan(), job.id.to_string().dimmed());
    println!("    Tool:     #{}", job.tool_id);
    println!("    Status:   {}", colorize_status(job.status));
    println!(
        "    Created:  {}",
        job.created_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    println!();
}

fn print_job_details(details: &JobDetails) {
    let job = &details.job;

    println!("{}", "Job Details:".bold());
    println!("  ID:        {}", job.id.to_string().cyan());
    match &details.tool {
        Some(tool) => println!("  Tool:      {} ({})", tool.display_name, tool.name.dimmed()),
        None => println!("  Tool:      #{}", job.tool_id),
    }
    println!("  Status:    {}", colorize_status(job.status));
    println!(
        "  Created:   {}",
        job.created_at.format("%Y-%m-%d %H:%M:%S")
    );

    if let Some(started) = job.started_at {
        println!("  Started:   {}", started.format("%Y-%m-%d %H:%M:%S"));
    }

    if let Some(completed) = job.completed_at {
        println!("  Completed: {}", completed.format("%Y-%m-%d %H:%M:%S"));

        if let Some(started) = job.started_at {
            let duration = completed.signed_duration_since(started);
            println!("  Duration:  {}s", duration.num_seconds());
        }
    }

    if let Some(error) = &job.error_message {
        println!("\n{}", "Error:".bold());
        println!("{}", error.red());
    }

    if let Some(log) = &job.log {
        println!("\n{}", "Output:".bold());
        println!("{}", "─".repeat(80).dimmed());
        print!("{}", log);
        if !log.ends_with('\n') {
            println!();
        }
        println!("{}", "─".repeat(80).dimmed());
    }
}

/// Colorize job status for display
fn colorize_status(status: JobStatus) -> ColoredString {
    let status_str = status.as_str();
    match status {
        JobStatus::Pending => status_str.yellow(),
        JobStatus::Running => status_str.cyan(),
        JobStatus::Completed => status_str.green(),
        JobStatus::Failed => status_str.red(),
        JobStatus::Cancelled => status_str.dimmed(),
    }
}
