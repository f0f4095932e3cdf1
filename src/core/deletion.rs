use crate::core::git::RemoteOperations;
use crate::utils::error::Result;
use log::{debug, info, warn};
use std::time::Duration;

/// Injectable sleep so the verification loop runs without wall-clock delay
/// in tests.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

static THREAD_SLEEPER: ThreadSleeper = ThreadSleeper;

/// Verification schedule after a remote delete: up to `max_attempts` checks,
/// sleeping `base * 2^(attempt-1)` between attempts and not at all after the
/// last one.
#[derive(Debug, Clone, Copy)]
pub struct BackoffSchedule {
    pub max_attempts: u32,
    pub base: Duration,
}

impl Default for BackoffSchedule {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base: Duration::from_secs(1),
        }
    }
}

impl BackoffSchedule {
    fn delay_after(&self, attempt: u32) -> Duration {
        self.base * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionOutcome {
    /// Dry run: the destructive call was never issued.
    DryRun,
    /// The branch was already absent; deletion is idempotent.
    AlreadyGone,
    /// The ref was confirmed gone by a fresh remote query.
    Confirmed,
    /// The ref still existed after all verification attempts; the branch is
    /// preserved, never assumed deleted.
    Exhausted,
}

impl DeletionOutcome {
    pub fn succeeded(&self) -> bool {
        !matches!(self, DeletionOutcome::Exhausted)
    }
}

/// Performs the destructive remote delete and does not trust the immediate
/// return code: remote deletes can report success asynchronously or fail
/// transiently, so existence is re-checked after a prune-fetch.
pub struct DeletionExecutor<'a> {
    remote: &'a dyn RemoteOperations,
    sleeper: &'a dyn Sleeper,
    schedule: BackoffSchedule,
    dry_run: bool,
}

impl<'a> DeletionExecutor<'a> {
    pub fn new(remote: &'a dyn RemoteOperations, dry_run: bool) -> Self {
        Self::with_sleeper(remote, dry_run, BackoffSchedule::default(), &THREAD_SLEEPER)
    }

    pub fn with_sleeper(
        remote: &'a dyn RemoteOperations,
        dry_run: bool,
        schedule: BackoffSchedule,
        sleeper: &'a dyn Sleeper,
    ) -> Self {
        Self {
            remote,
            sleeper,
            schedule,
            dry_run,
        }
    }

    pub fn delete_branch(&self, name: &str) -> Result<DeletionOutcome> {
        info!("Attempting to delete branch: {}", name);

        if self.dry_run {
            info!(
                "[DRY RUN] Would delete branch: {} - not actually deleting",
                name
            );
            return Ok(DeletionOutcome::DryRun);
        }

        if !self.remote.branch_exists(name)? {
            info!("Branch {} doesn't exist anymore, already deleted", name);
            return Ok(DeletionOutcome::AlreadyGone);
        }

        if let Err(e) = self.remote.delete_branch(name) {
            warn!("Initial deletion command failed for branch {}: {}", name, e);
        }

        let max = self.schedule.max_attempts;
        for attempt in 1..=max {
            debug!("Verifying deletion of {} (attempt {}/{})", name, attempt, max);

            if let Err(e) = self.remote.fetch_prune() {
                warn!("Prune fetch failed while verifying {}: {}", name, e);
            }

            match self.remote.branch_exists(name) {
                Ok(false) => {
                    info!("Successfully deleted branch: {}", name);
                    return Ok(DeletionOutcome::Confirmed);
                }
                Ok(true) => {}
                Err(e) => warn!("Existence check failed for branch {}: {}", name, e),
            }

            if attempt == max {
                break;
            }

            let delay = self.schedule.delay_after(attempt);
            debug!(
                "Branch {} still exists, waiting {}s before retry",
                name,
                delay.as_secs()
            );
            self.sleeper.sleep(delay);
        }

        warn!("Failed to delete branch after {} attempts: {}", max, name);
        Ok(DeletionOutcome::Exhausted)
    }
}
