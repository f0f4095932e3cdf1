use crate::core::classify::MergeClassifier;
use crate::core::deletion::{DeletionExecutor, DeletionOutcome};
use crate::core::git::{GitRepository, RemoteBranch, RemoteOperations};
use crate::core::policy::{self, decide, format_date, IntegrationStatus, Thresholds, Verdict};
use crate::core::protected::ProtectedSet;
use crate::utils::error::Result;
use log::{debug, info, warn};
use std::fmt;

pub const DRY_RUN_ANNOTATION: &str = "NOT ACTUALLY DELETED - DRY RUN";
pub const ALREADY_DELETED_ANNOTATION: &str = "ALREADY DELETED";
pub const DELETION_FAILED_REASON: &str = "deletion failed after 5 attempts";

/// One line in an outcome bucket: branch, why it landed there, and its last
/// activity as a display date (empty when not applicable).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeEntry {
    pub branch: String,
    pub reason: String,
    pub last_activity: String,
    pub annotation: Option<String>,
}

impl OutcomeEntry {
    fn new(branch: &str, reason: impl Into<String>, last_activity: &str) -> Self {
        Self {
            branch: branch.to_string(),
            reason: reason.into(),
            last_activity: last_activity.to_string(),
            annotation: None,
        }
    }

    fn annotated(mut self, annotation: &str) -> Self {
        self.annotation = Some(annotation.to_string());
        self
    }
}

impl fmt::Display for OutcomeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.last_activity.is_empty() {
            write!(f, "{} ({})", self.branch, self.reason)?;
        } else {
            write!(f, "{} ({}: {})", self.branch, self.reason, self.last_activity)?;
        }
        if let Some(annotation) = &self.annotation {
            write!(f, " - [{}]", annotation)?;
        }
        Ok(())
    }
}

/// The four disjoint buckets of one sweep, built inside the engine loop and
/// returned by value. Never mutated after the sweep completes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    pub deleted: Vec<OutcomeEntry>,
    pub skipped: Vec<OutcomeEntry>,
    pub not_merged: Vec<String>,
    pub stale_unmerged: Vec<OutcomeEntry>,
}

impl SweepOutcome {
    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }
}

/// Drives inspector, classifier, policy, and executor over every discovered
/// remote branch, strictly one branch at a time.
pub struct SweepEngine<'a> {
    remote: &'a dyn RemoteOperations,
    classifier: MergeClassifier<'a>,
    executor: DeletionExecutor<'a>,
    protected: &'a ProtectedSet,
    thresholds: Thresholds,
}

impl<'a> SweepEngine<'a> {
    pub fn new(
        remote: &'a dyn RemoteOperations,
        classifier: MergeClassifier<'a>,
        executor: DeletionExecutor<'a>,
        protected: &'a ProtectedSet,
        thresholds: Thresholds,
    ) -> Self {
        Self {
            remote,
            classifier,
            executor,
            protected,
            thresholds,
        }
    }

    pub fn sweep(&self) -> Result<SweepOutcome> {
        info!("Fetching all branches...");
        // A transient remote failure here must not abort the sweep; the
        // run completes with whatever refs are available.
        if let Err(e) = self.remote.fetch_all() {
            warn!("Fetch failed, continuing with locally known refs: {}", e);
        }

        let branches = match self.remote.list_branches() {
            Ok(branches) => branches,
            Err(e) => {
                warn!("Could not enumerate remote branches: {}", e);
                Vec::new()
            }
        };
        debug!("Found {} branches to process", branches.len());

        let mut outcome = SweepOutcome::default();

        for branch in branches {
            if self.protected.contains(&branch.name) {
                info!("Skipping protected branch: {}", branch.name);
                outcome
                    .skipped
                    .push(OutcomeEntry::new(&branch.name, "protected", ""));
                continue;
            }

            // A failure on one branch must not abort the sweep.
            if let Err(e) = self.process_branch(&branch, &mut outcome) {
                warn!("Skipping branch {} after error: {}", branch.name, e);
                outcome.skipped.push(OutcomeEntry::new(
                    &branch.name,
                    format!("skipped after error: {}", e),
                    "",
                ));
            }
        }

        Ok(outcome)
    }

    fn process_branch(&self, branch: &RemoteBranch, outcome: &mut SweepOutcome) -> Result<()> {
        let status = self
            .classifier
            .classify(self.remote, &branch.name, self.protected);
        let age = format_date(branch.last_activity);

        if status == IntegrationStatus::NotIntegrated {
            info!("Branch is not merged: {}", branch.name);
            outcome.not_merged.push(branch.name.clone());
        }

        match decide(status, branch.last_activity, &self.thresholds) {
            Verdict::Delete { reason } => {
                record_deletion(
                    self.executor.delete_branch(&branch.name)?,
                    &branch.name,
                    reason,
                    &age,
                    outcome,
                );
            }
            Verdict::WarnStale => {
                info!(
                    "Branch {} is stale but within the abandonment window",
                    branch.name
                );
                outcome
                    .stale_unmerged
                    .push(OutcomeEntry::new(&branch.name, "last activity", &age));
            }
            Verdict::Keep { reason } => {
                info!("Keeping branch {} ({}: {})", branch.name, reason, age);
                if reason == policy::REASON_MERGED_NOT_STALE {
                    outcome
                        .skipped
                        .push(OutcomeEntry::new(&branch.name, reason, ""));
                }
            }
        }

        Ok(())
    }
}

fn record_deletion(
    result: DeletionOutcome,
    branch: &str,
    reason: &str,
    age: &str,
    outcome: &mut SweepOutcome,
) {
    match result {
        DeletionOutcome::DryRun => outcome.deleted.push(
            OutcomeEntry::new(branch, reason, age).annotated(DRY_RUN_ANNOTATION),
        ),
        DeletionOutcome::AlreadyGone => outcome.deleted.push(
            OutcomeEntry::new(branch, reason, age).annotated(ALREADY_DELETED_ANNOTATION),
        ),
        DeletionOutcome::Confirmed => {
            outcome.deleted.push(OutcomeEntry::new(branch, reason, age))
        }
        DeletionOutcome::Exhausted => outcome
            .skipped
            .push(OutcomeEntry::new(branch, DELETION_FAILED_REASON, "")),
    }
}

/// Reduced sweep over local branches for fixture repositories without a
/// hosting platform: mergedness comes from `git branch --merged` alone and
/// deletion is a local `branch -D`.
pub struct LocalSweep<'a> {
    repo: &'a GitRepository,
    protected: &'a ProtectedSet,
    thresholds: Thresholds,
    dry_run: bool,
}

impl<'a> LocalSweep<'a> {
    pub fn new(
        repo: &'a GitRepository,
        protected: &'a ProtectedSet,
        thresholds: Thresholds,
        dry_run: bool,
    ) -> Self {
        Self {
            repo,
            protected,
            thresholds,
            dry_run,
        }
    }

    pub fn sweep(&self) -> Result<SweepOutcome> {
        info!("Processing branches in test mode");

        let mut outcome = SweepOutcome::default();
        let current = self.repo.get_current_branch()?;

        for branch in self.repo.list_local_branches()? {
            if self.protected.contains(&branch) {
                info!("Branch {} is protected, skipping", branch);
                outcome
                    .skipped
                    .push(OutcomeEntry::new(&branch, "protected", ""));
                continue;
            }

            if let Err(e) = self.process_branch(&branch, &current, &mut outcome) {
                warn!("Skipping branch {} after error: {}", branch, e);
                outcome.skipped.push(OutcomeEntry::new(
                    &branch,
                    format!("skipped after error: {}", e),
                    "",
                ));
            }
        }

        Ok(outcome)
    }

    fn process_branch(
        &self,
        branch: &str,
        current: &str,
        outcome: &mut SweepOutcome,
    ) -> Result<()> {
        let last_activity = self.repo.branch_commit_time(branch)?;
        let age = format_date(last_activity);

        let merged = self
            .repo
            .is_merged_locally(branch, self.protected.default_branch())?;
        let status = if merged {
            IntegrationStatus::Integrated
        } else {
            IntegrationStatus::NotIntegrated
        };

        if status == IntegrationStatus::NotIntegrated {
            outcome.not_merged.push(branch.to_string());
        }

        match decide(status, last_activity, &self.thresholds) {
            Verdict::Delete { reason } => {
                if self.dry_run {
                    info!("Would delete branch {}: {} (dry run)", branch, reason);
                    outcome.deleted.push(
                        OutcomeEntry::new(branch, reason, &age).annotated(DRY_RUN_ANNOTATION),
                    );
                } else if branch == current {
                    // git refuses to delete the checked-out branch
                    warn!("Cannot delete current branch {}, skipping", branch);
                    outcome.skipped.push(OutcomeEntry::new(
                        branch,
                        "cannot delete current branch",
                        "",
                    ));
                } else {
                    info!("Deleting branch {}: {}", branch, reason);
                    self.repo.delete_local_branch(branch)?;
                    outcome.deleted.push(OutcomeEntry::new(branch, reason, &age));
                }
            }
            Verdict::WarnStale => {
                outcome
                    .stale_unmerged
                    .push(OutcomeEntry::new(branch, "last activity", &age));
            }
            Verdict::Keep { reason } => {
                info!("Keeping branch {}: {} (merged: {})", branch, reason, merged);
                if reason == policy::REASON_MERGED_NOT_STALE {
                    outcome
                        .skipped
                        .push(OutcomeEntry::new(branch, reason, ""));
                }
            }
        }

        Ok(())
    }
}
