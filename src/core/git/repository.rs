use crate::utils::error::{Result, SweeperError};
use log::debug;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Clone)]
pub struct GitRepository {
    pub root: PathBuf,
    pub git_dir: PathBuf,
}

impl GitRepository {
    pub fn discover() -> Result<Self> {
        let current_dir = std::env::current_dir().map_err(|e| {
            SweeperError::git_operation(format!("Failed to get current directory: {}", e))
        })?;

        Self::discover_from(&current_dir)
    }

    pub fn discover_from(path: &Path) -> Result<Self> {
        let output = Command::new("git")
            .current_dir(path)
            .args(["rev-parse", "--show-toplevel"])
            .output()
            .map_err(|e| SweeperError::git_operation(format!("Failed to execute git: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SweeperError::git_operation(format!(
                "Not a git repository or git not found: {}",
                stderr.trim()
            )));
        }

        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let root = PathBuf::from(root);
        let git_dir = Self::get_git_dir(&root)?;

        Ok(Self { root, git_dir })
    }

    /// Set the bot identity used for any commits the remote may attribute to
    /// this process (merge-ref updates on some hosts). Mirrors the identity a
    /// scheduled CI job would configure before destructive pushes.
    pub fn configure_identity(&self, name: &str, email: &str) -> Result<()> {
        execute_git_command_with_status(self, &["config", "user.name", name])?;
        execute_git_command_with_status(self, &["config", "user.email", email])
    }

    pub fn get_current_branch(&self) -> Result<String> {
        execute_git_command(self, &["rev-parse", "--abbrev-ref", "HEAD"])
    }

    /// Local branch names from `git branch`, current-branch marker stripped.
    pub fn list_local_branches(&self) -> Result<Vec<String>> {
        let output = execute_git_command(self, &["branch"])?;

        Ok(output
            .lines()
            .map(|line| line.trim().trim_start_matches("* ").to_string())
            .filter(|name| !name.is_empty())
            .collect())
    }

    pub fn local_branch_exists(&self, name: &str) -> Result<bool> {
        let result = execute_git_command(
            self,
            &["rev-parse", "--verify", &format!("refs/heads/{}", name)],
        );
        Ok(result.is_ok())
    }

    /// Unix timestamp of the tip commit of a local branch.
    pub fn branch_commit_time(&self, branch: &str) -> Result<i64> {
        let output = execute_git_command(self, &["log", "-1", "--format=%ct", branch])?;

        output.trim().parse::<i64>().map_err(|e| {
            SweeperError::git_operation(format!(
                "Failed to parse commit time for '{}': {}",
                branch, e
            ))
        })
    }

    /// Whether a local branch is listed by `git branch --merged <into>`.
    pub fn is_merged_locally(&self, branch: &str, into: &str) -> Result<bool> {
        let output = execute_git_command(self, &["branch", "--merged", into])?;

        Ok(output
            .lines()
            .map(|line| line.trim().trim_start_matches("* "))
            .any(|name| name == branch))
    }

    pub fn delete_local_branch(&self, name: &str) -> Result<()> {
        execute_git_command_with_status(self, &["branch", "-D", name])
    }

    fn get_git_dir(repo_root: &Path) -> Result<PathBuf> {
        let output = Command::new("git")
            .current_dir(repo_root)
            .args(["rev-parse", "--git-dir"])
            .output()
            .map_err(|e| SweeperError::git_operation(format!("Failed to get git dir: {}", e)))?;

        if !output.status.success() {
            return Err(SweeperError::git_operation(
                "Failed to determine git directory".to_string(),
            ));
        }

        let git_dir = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let git_dir = if git_dir.starts_with('/') {
            PathBuf::from(git_dir)
        } else {
            repo_root.join(git_dir)
        };

        Ok(git_dir)
    }
}

pub fn execute_git_command(repo: &GitRepository, args: &[&str]) -> Result<String> {
    debug!("git {}", args.join(" "));

    let output = Command::new("git")
        .current_dir(&repo.root)
        .args(args)
        .output()
        .map_err(|e| SweeperError::git_operation(format!("Failed to execute git: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SweeperError::git_operation(format!(
            "Git command failed ({}): {}",
            args.join(" "),
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout.trim().to_string())
}

pub fn execute_git_command_with_status(repo: &GitRepository, args: &[&str]) -> Result<()> {
    debug!("git {}", args.join(" "));

    let output = Command::new("git")
        .current_dir(&repo.root)
        .args(args)
        .output()
        .map_err(|e| SweeperError::git_operation(format!("Failed to execute git: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SweeperError::git_operation(format!(
            "Git command failed ({}): {}",
            args.join(" "),
            stderr.trim()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup_test_repo() -> (TempDir, GitRepository) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo_path = temp_dir.path();

        Command::new("git")
            .current_dir(repo_path)
            .args(["init", "-b", "main"])
            .status()
            .expect("Failed to init git repo");

        Command::new("git")
            .current_dir(repo_path)
            .args(["config", "user.name", "Test User"])
            .status()
            .expect("Failed to set git user name");

        Command::new("git")
            .current_dir(repo_path)
            .args(["config", "user.email", "test@example.com"])
            .status()
            .expect("Failed to set git user email");

        fs::write(repo_path.join("README.md"), "# Test Repository")
            .expect("Failed to write README");

        Command::new("git")
            .current_dir(repo_path)
            .args(["add", "README.md"])
            .status()
            .expect("Failed to add README");

        Command::new("git")
            .current_dir(repo_path)
            .args(["commit", "-m", "Initial commit"])
            .status()
            .expect("Failed to commit README");

        let repo = GitRepository::discover_from(repo_path).expect("Failed to discover repo");
        (temp_dir, repo)
    }

    #[test]
    fn test_repository_discovery() {
        let (temp_dir, repo) = setup_test_repo();
        assert_eq!(repo.root, temp_dir.path().canonicalize().unwrap());
        assert!(repo.git_dir.exists());
    }

    #[test]
    fn test_get_current_branch() {
        let (_temp_dir, repo) = setup_test_repo();
        let branch = repo
            .get_current_branch()
            .expect("Failed to get current branch");
        assert_eq!(branch, "main");
    }

    #[test]
    fn test_list_local_branches() {
        let (_temp_dir, repo) = setup_test_repo();

        execute_git_command_with_status(&repo, &["branch", "feature-a"])
            .expect("Failed to create branch");
        execute_git_command_with_status(&repo, &["branch", "feature-b"])
            .expect("Failed to create branch");

        let branches = repo.list_local_branches().expect("Failed to list branches");
        assert_eq!(branches, vec!["feature-a", "feature-b", "main"]);
    }

    #[test]
    fn test_branch_commit_time() {
        let (_temp_dir, repo) = setup_test_repo();
        let time = repo
            .branch_commit_time("main")
            .expect("Failed to get commit time");
        assert!(time > 0);
    }

    #[test]
    fn test_is_merged_locally() {
        let (temp_dir, repo) = setup_test_repo();

        // A branch pointing at main's tip is trivially merged.
        execute_git_command_with_status(&repo, &["branch", "merged-branch"])
            .expect("Failed to create branch");
        assert!(repo
            .is_merged_locally("merged-branch", "main")
            .expect("Failed to check merged"));

        // A branch with its own commit is not.
        execute_git_command_with_status(&repo, &["checkout", "-b", "unmerged-branch"])
            .expect("Failed to create branch");
        fs::write(temp_dir.path().join("extra.txt"), "extra").expect("Failed to write file");
        execute_git_command_with_status(&repo, &["add", "extra.txt"]).expect("Failed to add");
        execute_git_command_with_status(&repo, &["commit", "-m", "Extra commit"])
            .expect("Failed to commit");
        execute_git_command_with_status(&repo, &["checkout", "main"]).expect("Failed to checkout");

        assert!(!repo
            .is_merged_locally("unmerged-branch", "main")
            .expect("Failed to check merged"));
    }

    #[test]
    fn test_delete_local_branch() {
        let (_temp_dir, repo) = setup_test_repo();

        execute_git_command_with_status(&repo, &["branch", "doomed"])
            .expect("Failed to create branch");
        assert!(repo.local_branch_exists("doomed").expect("exists check"));

        repo.delete_local_branch("doomed")
            .expect("Failed to delete branch");
        assert!(!repo.local_branch_exists("doomed").expect("exists check"));
    }

    #[test]
    fn test_configure_identity() {
        let (_temp_dir, repo) = setup_test_repo();
        repo.configure_identity("Sweeper Bot", "sweeper@example.com")
            .expect("Failed to configure identity");

        let name = execute_git_command(&repo, &["config", "user.name"]).expect("read config");
        assert_eq!(name, "Sweeper Bot");
    }
}
