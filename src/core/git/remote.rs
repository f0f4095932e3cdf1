use super::repository::{execute_git_command, execute_git_command_with_status, GitRepository};
use crate::utils::error::{Result, SweeperError};
use log::{debug, warn};
use regex::Regex;
use std::process::Command;

const REMOTE: &str = "origin";

/// One remote branch as discovered by `list_branches`: the name with the
/// remote prefix stripped and the unix commit time of its tip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteBranch {
    pub name: String,
    pub last_activity: i64,
}

/// Read-side and delete-side access to the `origin` remote. All queries go
/// through the git CLI; nothing here caches ref state between calls.
pub struct RemoteInspector<'a> {
    repo: &'a GitRepository,
}

impl<'a> RemoteInspector<'a> {
    pub fn new(repo: &'a GitRepository) -> Self {
        Self { repo }
    }

    /// Enumerate remote branches with their tip commit times. The symbolic
    /// HEAD pointer and lines with unparsable timestamps are skipped, the
    /// latter with a warning.
    pub fn list_branches(&self) -> Result<Vec<RemoteBranch>> {
        let output = execute_git_command(
            self.repo,
            &[
                "for-each-ref",
                "--format=%(refname:short) %(committerdate:unix)",
                &format!("refs/remotes/{}/", REMOTE),
            ],
        )?;

        let prefix = format!("{}/", REMOTE);

        Ok(output
            .lines()
            .filter_map(|line| parse_branch_line(line, &prefix))
            .collect())
    }

    /// Whether the branch currently exists on the remote. Always asks the
    /// remote itself, never the locally fetched refs.
    pub fn branch_exists(&self, name: &str) -> Result<bool> {
        debug!("git ls-remote --exit-code --heads {} {}", REMOTE, name);

        let output = Command::new("git")
            .current_dir(&self.repo.root)
            .args(["ls-remote", "--exit-code", "--heads", REMOTE, name])
            .output()
            .map_err(|e| SweeperError::remote_query(format!("Failed to execute git: {}", e)))?;

        match output.status.code() {
            Some(0) => Ok(true),
            // ls-remote --exit-code signals "no matching refs" with 2
            Some(2) => Ok(false),
            _ => Err(SweeperError::remote_query(format!(
                "ls-remote failed for branch '{}': {}",
                name,
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
        }
    }

    pub fn tip_commit(&self, branch: &str) -> Result<Option<String>> {
        let result = execute_git_command(
            self.repo,
            &["rev-parse", &format!("{}/{}", REMOTE, branch)],
        );

        match result {
            Ok(commit) if !commit.is_empty() => Ok(Some(commit)),
            _ => Ok(None),
        }
    }

    pub fn merge_base(&self, branch: &str, other: &str) -> Result<Option<String>> {
        let result = execute_git_command(
            self.repo,
            &[
                "merge-base",
                &format!("{}/{}", REMOTE, branch),
                &format!("{}/{}", REMOTE, other),
            ],
        );

        match result {
            Ok(commit) if !commit.is_empty() => Ok(Some(commit)),
            _ => Ok(None),
        }
    }

    /// Remote refs already contained in `protected`, as reported by
    /// `git branch -r --merged`. Names keep their `origin/` prefix.
    pub fn merged_into(&self, protected: &str) -> Result<Vec<String>> {
        let output = execute_git_command(
            self.repo,
            &[
                "branch",
                "-r",
                "--merged",
                &format!("{}/{}", REMOTE, protected),
            ],
        )?;

        Ok(output
            .lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty() && !line.contains("->"))
            .map(|line| line.to_string())
            .collect())
    }

    /// Whether any commit on the protected branch's log matches the given
    /// extended-regex pattern.
    pub fn log_matches(&self, protected: &str, pattern: &str) -> Result<bool> {
        let output = execute_git_command(
            self.repo,
            &[
                "log",
                &format!("{}/{}", REMOTE, protected),
                "-E",
                &format!("--grep={}", pattern),
                "-n",
                "1",
                "--oneline",
            ],
        )?;

        Ok(!output.is_empty())
    }

    pub fn fetch_all(&self) -> Result<()> {
        execute_git_command_with_status(self.repo, &["fetch", "--all"])
    }

    pub fn fetch_prune(&self) -> Result<()> {
        execute_git_command_with_status(self.repo, &["fetch", REMOTE, "--prune"])
    }

    pub fn delete_branch(&self, name: &str) -> Result<()> {
        validate_branch_name(name)?;
        execute_git_command_with_status(self.repo, &["push", REMOTE, "--delete", name])
    }

    /// The remote's default branch. Tries the locally known symbolic HEAD
    /// first, then asks the remote, then falls back to `main`.
    pub fn default_branch(&self) -> Result<String> {
        if let Ok(branch_ref) = execute_git_command(
            self.repo,
            &["symbolic-ref", &format!("refs/remotes/{}/HEAD", REMOTE)],
        ) {
            if let Some(name) = branch_ref.strip_prefix(&format!("refs/remotes/{}/", REMOTE)) {
                return Ok(name.to_string());
            }
        }

        if let Ok(output) = execute_git_command(self.repo, &["remote", "show", REMOTE]) {
            for line in output.lines() {
                if line.contains("HEAD branch") {
                    if let Some(name) = line.split(':').next_back() {
                        let name = name.trim();
                        if !name.is_empty() {
                            return Ok(name.to_string());
                        }
                    }
                }
            }
        }

        warn!("Could not determine default branch from remote, assuming 'main'");
        Ok("main".to_string())
    }
}

/// Parse one `for-each-ref` line into a branch record. The symbolic HEAD,
/// the bare remote ref, and incomplete lines yield `None`; unparsable
/// timestamps also yield `None`, with a warning.
fn parse_branch_line(line: &str, prefix: &str) -> Option<RemoteBranch> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let mut parts = line.split_whitespace();
    let (ref_name, timestamp) = match (parts.next(), parts.next()) {
        (Some(r), Some(t)) => (r, t),
        _ => return None,
    };

    let name = match ref_name.strip_prefix(prefix) {
        Some(name) if !name.is_empty() && name != "HEAD" => name,
        _ => {
            debug!("Skipping non-branch reference: {}", ref_name);
            return None;
        }
    };

    match timestamp.parse::<i64>() {
        Ok(last_activity) => Some(RemoteBranch {
            name: name.to_string(),
            last_activity,
        }),
        Err(_) => {
            warn!(
                "Could not parse commit time '{}' for branch {}, skipping",
                timestamp, name
            );
            None
        }
    }
}

/// Reject names that git itself would refuse or that could be taken as
/// options by `git push --delete`.
pub fn validate_branch_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(SweeperError::git_operation(
            "Branch name cannot be empty".to_string(),
        ));
    }

    if name.len() > 250 {
        return Err(SweeperError::git_operation("Branch name too long".to_string()));
    }

    let invalid_patterns = [
        r"\.\.",               // Contains ..
        r"^-",                 // Starts with -
        r"/$",                 // Ends with /
        r"[ \t]",              // Contains whitespace
        r"[\x00-\x1f\x7f]",    // Contains control characters
        r"~|\^|:|\\|\*|\?|\[", // Contains special Git characters
        r"^@$",                // Exactly "@"
        r"/\.",                // Contains "/."
        r"@\{",                // Contains "@{"
    ];

    for pattern in invalid_patterns {
        let regex = Regex::new(pattern)?;
        if regex.is_match(name) {
            return Err(SweeperError::git_operation(format!(
                "Invalid branch name '{}': contains invalid characters or patterns",
                name
            )));
        }
    }

    if name.starts_with("refs/") {
        return Err(SweeperError::git_operation(
            "Branch name cannot start with 'refs/'".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn git(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .current_dir(dir)
            .args(args)
            .output()
            .expect("Failed to run git");
        assert!(
            status.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&status.stderr)
        );
    }

    fn commit_file(dir: &Path, name: &str, content: &str, message: &str) {
        fs::write(dir.join(name), content).expect("Failed to write file");
        git(dir, &["add", name]);
        git(dir, &["commit", "-m", message]);
    }

    /// A bare "remote" plus a clone with two pushed feature branches.
    fn setup_remote_fixture() -> (TempDir, GitRepository) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let remote_path = temp_dir.path().join("remote.git");
        let clone_path = temp_dir.path().join("clone");

        git(temp_dir.path(), &["init", "--bare", "-b", "main", "remote.git"]);
        git(
            temp_dir.path(),
            &["clone", remote_path.to_str().unwrap(), "clone"],
        );
        git(&clone_path, &["config", "user.name", "Test User"]);
        git(&clone_path, &["config", "user.email", "test@example.com"]);
        git(&clone_path, &["symbolic-ref", "HEAD", "refs/heads/main"]);

        commit_file(&clone_path, "README.md", "# Test", "Initial commit");
        git(&clone_path, &["push", "-u", "origin", "main"]);

        // feature-merged: fully contained in main
        git(&clone_path, &["branch", "feature-merged"]);
        git(&clone_path, &["push", "origin", "feature-merged"]);

        // feature-open: one commit ahead of main
        git(&clone_path, &["checkout", "-b", "feature-open"]);
        commit_file(&clone_path, "open.txt", "wip", "Open work");
        git(&clone_path, &["push", "origin", "feature-open"]);
        git(&clone_path, &["checkout", "main"]);

        git(&clone_path, &["remote", "set-head", "origin", "main"]);
        git(&clone_path, &["fetch", "origin"]);

        let repo = GitRepository::discover_from(&clone_path).expect("Failed to discover repo");
        (temp_dir, repo)
    }

    #[test]
    fn test_list_branches_strips_prefix_and_skips_head() {
        let (_temp_dir, repo) = setup_remote_fixture();
        let inspector = RemoteInspector::new(&repo);

        let branches = inspector.list_branches().expect("Failed to list branches");
        let names: Vec<&str> = branches.iter().map(|b| b.name.as_str()).collect();

        assert!(names.contains(&"main"));
        assert!(names.contains(&"feature-merged"));
        assert!(names.contains(&"feature-open"));
        assert!(!names.contains(&"HEAD"));
        assert!(names.iter().all(|n| !n.starts_with("origin/")));
        assert!(branches.iter().all(|b| b.last_activity > 0));
    }

    #[test]
    fn test_branch_exists_is_a_fresh_remote_query() {
        let (_temp_dir, repo) = setup_remote_fixture();
        let inspector = RemoteInspector::new(&repo);

        assert!(inspector.branch_exists("feature-open").expect("exists"));
        assert!(!inspector.branch_exists("no-such-branch").expect("exists"));
    }

    #[test]
    fn test_merge_base_containment() {
        let (_temp_dir, repo) = setup_remote_fixture();
        let inspector = RemoteInspector::new(&repo);

        let tip = inspector
            .tip_commit("feature-merged")
            .expect("tip")
            .expect("tip present");
        let base = inspector
            .merge_base("feature-merged", "main")
            .expect("merge-base")
            .expect("base present");
        assert_eq!(tip, base);

        let open_tip = inspector
            .tip_commit("feature-open")
            .expect("tip")
            .expect("tip present");
        let open_base = inspector
            .merge_base("feature-open", "main")
            .expect("merge-base")
            .expect("base present");
        assert_ne!(open_tip, open_base);
    }

    #[test]
    fn test_merge_base_of_unknown_branch_is_none() {
        let (_temp_dir, repo) = setup_remote_fixture();
        let inspector = RemoteInspector::new(&repo);

        assert!(inspector
            .merge_base("no-such-branch", "main")
            .expect("merge-base")
            .is_none());
        assert!(inspector
            .tip_commit("no-such-branch")
            .expect("tip")
            .is_none());
    }

    #[test]
    fn test_merged_into_lists_contained_refs() {
        let (_temp_dir, repo) = setup_remote_fixture();
        let inspector = RemoteInspector::new(&repo);

        let merged = inspector.merged_into("main").expect("merged list");
        assert!(merged.contains(&"origin/feature-merged".to_string()));
        assert!(!merged.contains(&"origin/feature-open".to_string()));
        assert!(merged.iter().all(|r| !r.contains("->")));
    }

    #[test]
    fn test_log_matches() {
        let (_temp_dir, repo) = setup_remote_fixture();
        let inspector = RemoteInspector::new(&repo);

        assert!(inspector
            .log_matches("main", "Initial")
            .expect("log search"));
        assert!(!inspector
            .log_matches("main", "Merge.*nonexistent")
            .expect("log search"));
    }

    #[test]
    fn test_delete_branch_removes_remote_ref() {
        let (_temp_dir, repo) = setup_remote_fixture();
        let inspector = RemoteInspector::new(&repo);

        assert!(inspector.branch_exists("feature-merged").expect("exists"));
        inspector
            .delete_branch("feature-merged")
            .expect("Failed to delete");
        assert!(!inspector.branch_exists("feature-merged").expect("exists"));
    }

    #[test]
    fn test_default_branch_detection() {
        let (_temp_dir, repo) = setup_remote_fixture();
        let inspector = RemoteInspector::new(&repo);

        assert_eq!(inspector.default_branch().expect("default branch"), "main");
    }

    #[test]
    fn test_parse_branch_line() {
        let prefix = "origin/";

        assert_eq!(
            parse_branch_line("origin/feature-x 1700000000", prefix),
            Some(RemoteBranch {
                name: "feature-x".to_string(),
                last_activity: 1_700_000_000,
            })
        );
        assert_eq!(
            parse_branch_line("  origin/release/v1.2 1700000000  ", prefix),
            Some(RemoteBranch {
                name: "release/v1.2".to_string(),
                last_activity: 1_700_000_000,
            })
        );

        // Symbolic HEAD and the bare remote ref are not branches.
        assert_eq!(parse_branch_line("origin/HEAD 1700000000", prefix), None);
        assert_eq!(parse_branch_line("origin 1700000000", prefix), None);

        // Malformed lines are skipped, not fatal.
        assert_eq!(parse_branch_line("origin/feature-x not-a-time", prefix), None);
        assert_eq!(parse_branch_line("origin/feature-x", prefix), None);
        assert_eq!(parse_branch_line("", prefix), None);
        assert_eq!(parse_branch_line("   ", prefix), None);
    }

    #[test]
    fn test_validate_branch_name() {
        assert!(validate_branch_name("valid-branch").is_ok());
        assert!(validate_branch_name("feature/test").is_ok());

        let invalid_names = [
            "",
            "branch..name",
            "-looks-like-an-option",
            "invalid/",
            "branch name",
            "@",
            "branch@{",
            "branch~1",
            "refs/heads/test",
        ];

        for invalid_name in invalid_names {
            assert!(
                validate_branch_name(invalid_name).is_err(),
                "Should reject invalid branch name: {}",
                invalid_name
            );
        }
    }
}
