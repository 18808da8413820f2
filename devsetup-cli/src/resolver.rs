//! Identifier resolution
//!
//! Turns what the user typed into the ids the server expects:
//! - Tool names or ids into catalog ids
//! - Job id prefixes into full UUIDs, matched against the active jobs

use anyhow::{Context, Result, anyhow};
use devsetup_client::InstallerClient;
use devsetup_core::domain::job::Job;
use devsetup_core::domain::tool::Tool;
use uuid::Uuid;

use crate::types::{IdOrPrefix, ToolRef};

/// Resolve tool references to catalog ids, keeping their order
///
/// # Errors
/// Returns an error naming every reference that matches no tool
pub async fn resolve_tool_ids(client: &InstallerClient, refs: &[ToolRef]) -> Result<Vec<i64>> {
    let tools = client
        .list_tools()
        .await
        .context("Failed to fetch tools for name resolution")?;

    match_tools(&tools, refs)
}

fn match_tools(tools: &[Tool], refs: &[ToolRef]) -> Result<Vec<i64>> {
    let mut ids = Vec::with_capacity(refs.len());
    let mut unknown = Vec::new();

    for tool_ref in refs {
        let found = tools.iter().find(|tool| match tool_ref {
            ToolRef::Id(id) => tool.id == *id,
            ToolRef::Name(name) => tool.name.eq_ignore_ascii_case(name),
        });

        match found {
            Some(tool) => ids.push(tool.id),
            None => unknown.push(tool_ref.to_string()),
        }
    }

    if !unknown.is_empty() {
        return Err(anyhow!("Unknown tool(s): {}", unknown.join(", ")));
    }

    Ok(ids)
}

/// Resolve a job ID or prefix to a full UUID
///
/// Full UUIDs are returned as is. Prefixes are matched against the jobs that
/// are still pending or running, since finished jobs cannot be listed.
pub async fn resolve_job_id(client: &InstallerClient, id_or_prefix: &IdOrPrefix) -> Result<Uuid> {
    if let Some(uuid) = id_or_prefix.as_uuid() {
        return Ok(uuid);
    }

    let active = client
        .list_active()
        .await
        .context("Failed to fetch active jobs for ID resolution")?;

    match_job(&active.jobs, &id_or_prefix.to_string())
}

fn match_job(jobs: &[Job], prefix: &str) -> Result<Uuid> {
    let matches: Vec<_> = jobs
        .iter()
        .filter(|job| job.id.to_string().starts_with(prefix))
        .collect();

    match matches.len() {
        0 => Err(anyhow!(
            "No active job found with ID starting with '{}'",
            prefix
        )),
        1 => Ok(matches[0].id),
        _ => {
            let ids: Vec<String> = matches.iter().map(|job| job.id.to_string()).collect();
            Err(anyhow!(
                "Ambiguous prefix '{}' matches multiple jobs: {}",
                prefix,
                ids.join(", ")
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool(id: i64, name: &str) -> Tool {
        Tool {
            id,
            name: name.to_string(),
            display_name: name.to_string(),
            category: "Development Tools".to_string(),
            description: None,
            script_path: format!("{}.sh", name),
            icon: None,
            installed: false,
            install_date: None,
        }
    }

    #[test]
    fn test_match_tools_by_name_and_id() {
        let tools = vec![tool(1, "git"), tool(2, "docker"), tool(3, "nvm")];
        let refs = vec![ToolRef::parse("Docker"), ToolRef::parse("1")];

        assert_eq!(match_tools(&tools, &refs).unwrap(), vec![2, 1]);
    }

    #[test]
    fn test_match_tools_reports_unknown() {
        let tools = vec![tool(1, "git")];
        let refs = vec![ToolRef::parse("emacs"), ToolRef::parse("9")];

        let err = match_tools(&tools, &refs).unwrap_err().to_string();
        assert!(err.contains("emacs"));
        assert!(err.contains("#9"));
    }

    #[test]
    fn test_match_job_prefix() {
        let first = Job::pending(Uuid::parse_str("3f2a0000-0000-4000-8000-000000000001").unwrap(), 1);
        let second = Job::pending(Uuid::parse_str("3f2b0000-0000-4000-8000-000000000002").unwrap(), 2);
        let jobs = vec![first.clone(), second];

        assert_eq!(match_job(&jobs, "3f2a").unwrap(), first.id);
        assert!(match_job(&jobs, "3f2").unwrap_err().to_string().contains("Ambiguous"));
        assert!(match_job(&jobs, "ffff").is_err());
    }
}
