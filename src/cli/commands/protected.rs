use crate::cli::parser::ProtectedArgs;
use crate::utils::{Result, SweeperError};
use log::debug;
use serde::Deserialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::process::Command;

#[derive(Deserialize)]
struct BranchRecord {
    name: String,
    protected: bool,
}

pub fn execute(args: ProtectedArgs) -> Result<()> {
    let branches = match args.branches {
        Some(list) => normalize(&list),
        None => {
            let repo = resolve_repo(args.repo)?;
            fetch_protected_branches(&repo)?
        }
    };

    println!("Protected branches in the repository: {}", branches);
    export_to_workflow_env(&branches)?;
    Ok(())
}

fn resolve_repo(repo: Option<String>) -> Result<String> {
    if let Some(repo) = repo {
        return Ok(repo);
    }
    match std::env::var("GITHUB_REPOSITORY") {
        Ok(repo) if !repo.is_empty() => Ok(repo),
        _ => Err(SweeperError::invalid_args(
            "no repository given; pass --repo or set GITHUB_REPOSITORY",
        )),
    }
}

fn fetch_protected_branches(repo: &str) -> Result<String> {
    let endpoint = format!("repos/{}/branches", repo);
    debug!("gh api {}", endpoint);

    let output = Command::new("gh")
        .args(["api", &endpoint])
        .output()
        .map_err(|e| SweeperError::review_query(format!("Failed to execute gh: {}", e)))?;

    if !output.status.success() {
        return Err(SweeperError::review_query(format!(
            "gh api {} failed: {}",
            endpoint,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let records: Vec<BranchRecord> = serde_json::from_str(&String::from_utf8_lossy(&output.stdout))?;
    let names: Vec<String> = records
        .into_iter()
        .filter(|r| r.protected)
        .map(|r| r.name)
        .collect();

    Ok(names.join(" "))
}

/// Hands the list to later workflow steps through `GITHUB_ENV`. A no-op
/// outside that environment.
fn export_to_workflow_env(branches: &str) -> Result<()> {
    match std::env::var("GITHUB_ENV") {
        Ok(path) if !path.is_empty() => append_protected_branches(Path::new(&path), branches),
        _ => Ok(()),
    }
}

fn append_protected_branches(path: &Path, branches: &str) -> Result<()> {
    let mut file = OpenOptions::new().append(true).create(true).open(path)?;
    writeln!(file, "PROTECTED_BRANCHES={}", branches)?;
    Ok(())
}

fn normalize(list: &str) -> String {
    list.split_whitespace().collect::<Vec<_>>().join(" ")
}
