use crate::utils::error::{Result, SweeperError};
use log::debug;
use serde::Deserialize;
use std::process::Command;

/// A merged pull request recorded by the hosting platform for a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedProposal {
    pub number: u64,
    pub title: String,
    pub merged_at: Option<String>,
}

/// Lookup of merged review proposals for a branch. Backed by the `gh` CLI in
/// production; tests substitute a canned implementation.
pub trait ReviewOperations {
    fn merged_proposal(&self, branch: &str) -> Result<Option<MergedProposal>>;
}

#[derive(Deserialize)]
struct PrRecord {
    number: u64,
    title: String,
    #[serde(rename = "mergedAt")]
    merged_at: Option<String>,
}

pub struct GhClient {
    repo: Option<String>,
}

impl GhClient {
    /// `repo` is an `owner/name` identifier forwarded to `gh`; when absent,
    /// `gh` resolves the repository from the working directory's origin.
    pub fn new(repo: Option<String>) -> Self {
        Self { repo }
    }
}

impl ReviewOperations for GhClient {
    fn merged_proposal(&self, branch: &str) -> Result<Option<MergedProposal>> {
        let mut args = vec![
            "pr",
            "list",
            "--head",
            branch,
            "--state",
            "merged",
            "--json",
            "number,title,mergedAt",
            "--limit",
            "1",
        ];
        if let Some(repo) = &self.repo {
            args.push("--repo");
            args.push(repo);
        }

        debug!("gh {}", args.join(" "));

        let output = Command::new("gh").args(&args).output().map_err(|e| {
            SweeperError::review_query(format!("Failed to execute gh: {}", e))
        })?;

        if !output.status.success() {
            return Err(SweeperError::review_query(format!(
                "gh pr list failed for branch '{}': {}",
                branch,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_merged_proposals(&String::from_utf8_lossy(&output.stdout))
    }
}

fn parse_merged_proposals(payload: &str) -> Result<Option<MergedProposal>> {
    let payload = payload.trim();
    if payload.is_empty() {
        return Ok(None);
    }

    let records: Vec<PrRecord> = serde_json::from_str(payload)?;

    Ok(records.into_iter().next().map(|r| MergedProposal {
        number: r.number,
        title: r.title,
        merged_at: r.merged_at,
    }))
}
