use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "branch-sweeper")]
#[command(about = "Remove merged and abandoned branches from a git remote")]
#[command(
    version,
    long_about = "Classifies every branch on origin as merged or abandoned, applies a \
staleness policy, and deletes what falls below the bar. Runs as a dry run unless told otherwise."
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify remote branches and delete the stale ones
    Sweep(SweepArgs),
    /// Show the repository's protected branches
    Protected(ProtectedArgs),
}

#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Report what would be deleted without deleting anything
    #[arg(
        long,
        value_name = "BOOL",
        default_value_t = true,
        action = ArgAction::Set,
        help = "Report what would be deleted without deleting anything"
    )]
    pub dry_run: bool,

    /// Age threshold in weeks for merged branches
    #[arg(long, default_value_t = crate::config::DEFAULT_WEEKS_THRESHOLD)]
    pub weeks: u32,

    /// Default branch name (auto-detected from the remote when omitted)
    #[arg(long)]
    pub default_branch: Option<String>,

    /// Space-separated branch names that are never deleted
    #[arg(long, default_value = "")]
    pub protected: String,

    /// Repository (owner/repo) for pull request lookups
    #[arg(long)]
    pub repo: Option<String>,

    /// Sweep local branches only, without hosting-platform queries
    #[arg(long)]
    pub test_mode: bool,
}

impl SweepArgs {
    pub fn validate(&self) -> crate::utils::Result<()> {
        if self.weeks == 0 {
            return Err(crate::utils::SweeperError::invalid_args(
                "weeks must be a positive number",
            ));
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ProtectedArgs {
    /// Repository (owner/repo) to query; defaults to GITHUB_REPOSITORY
    #[arg(long)]
    pub repo: Option<String>,

    /// Space-separated list to display instead of querying the platform
    #[arg(long)]
    pub branches: Option<String>,
}
