pub mod validation;

pub use validation::validate_config;

pub const DEFAULT_WEEKS_THRESHOLD: u32 = 4;

/// One sweep's configuration, assembled from CLI arguments and then
/// overlaid with the environment. Immutable once the sweep starts.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Suppresses destructive deletes; defaults to on.
    pub dry_run: bool,
    /// Staleness cutoff in weeks for merged branches.
    pub weeks_threshold: u32,
    /// Auto-detected from the remote's symbolic HEAD when empty.
    pub default_branch: String,
    /// Space-separated names, always unioned with the default branch.
    pub protected_branches: String,
    /// `owner/name` identifier forwarded to review-system queries.
    pub repo: Option<String>,
    /// Reduced local-branch mode without review-system queries.
    pub test_mode: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            dry_run: true,
            weeks_threshold: DEFAULT_WEEKS_THRESHOLD,
            default_branch: String::new(),
            protected_branches: String::new(),
            repo: None,
            test_mode: false,
        }
    }
}

impl SweepConfig {
    /// `GITHUB_TEST_MODE=true` switches to the fixture-friendly local mode
    /// and `GITHUB_REPOSITORY` supplies the repo identifier when none was
    /// given on the command line. Log verbosity is resolved at process
    /// start, before any config exists.
    pub fn apply_env_overrides(&mut self) {
        if env_flag("GITHUB_TEST_MODE") {
            self.test_mode = true;
        }
        if self.repo.is_none() {
            if let Ok(repo) = std::env::var("GITHUB_REPOSITORY") {
                if !repo.is_empty() {
                    self.repo = Some(repo);
                }
            }
        }
    }
}

fn env_flag(name: &str) -> bool {
    flag_enabled(std::env::var(name).ok().as_deref())
}

// The workflow passes booleans as the literal strings "true"/"false";
// anything else counts as off.
fn flag_enabled(value: Option<&str>) -> bool {
    value == Some("true")
}
