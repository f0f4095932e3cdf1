use crate::cli::parser::SweepArgs;
use crate::config::{validate_config, SweepConfig};
use crate::core::classify::MergeClassifier;
use crate::core::deletion::DeletionExecutor;
use crate::core::git::{GitService, RemoteOperations};
use crate::core::policy::Thresholds;
use crate::core::protected::ProtectedSet;
use crate::core::review::GhClient;
use crate::core::sweep::{LocalSweep, SweepEngine, SweepOutcome};
use crate::report;
use crate::utils::Result;
use log::{debug, info};
use std::path::Path;

const BOT_NAME: &str = "github-actions[bot]";
const BOT_EMAIL: &str = "github-actions[bot]@users.noreply.github.com";

pub fn execute(args: SweepArgs) -> Result<()> {
    let mut config = SweepConfig {
        dry_run: args.dry_run,
        weeks_threshold: args.weeks,
        default_branch: args.default_branch.unwrap_or_default(),
        protected_branches: args.protected,
        repo: args.repo,
        test_mode: args.test_mode,
    };
    config.apply_env_overrides();
    validate_config(&config)?;
    debug!("Resolved configuration: {:?}", config);

    let service = GitService::discover()?;
    let thresholds = Thresholds::from_weeks(config.weeks_threshold);

    if !config.dry_run {
        service.repository().configure_identity(BOT_NAME, BOT_EMAIL)?;
    }

    let default_branch = resolve_default_branch(&config, &service)?;
    let protected = ProtectedSet::new(default_branch, &config.protected_branches);

    info!(
        "Sweeping with threshold {} weeks (before {}), protected: {}",
        config.weeks_threshold,
        thresholds.cutoff_date(),
        protected.to_display_string()
    );
    if config.dry_run {
        info!("Dry run mode: no branches will be deleted");
    }

    let outcome = if config.test_mode {
        LocalSweep::new(
            service.repository(),
            &protected,
            thresholds,
            config.dry_run,
        )
        .sweep()?
    } else {
        let review_client = GhClient::new(config.repo.clone());
        let classifier = MergeClassifier::standard(Some(&review_client));
        let executor = DeletionExecutor::new(&service, config.dry_run);
        let engine = SweepEngine::new(&service, classifier, executor, &protected, thresholds);
        engine.sweep()?
    };

    report::write_summary(
        Path::new(report::SUMMARY_FILE),
        &config,
        &protected,
        &thresholds,
        &outcome,
    )?;
    report::write_deleted_count(&outcome)?;

    print_completion(&config, &outcome);
    Ok(())
}

/// CLI value wins; otherwise the remote's HEAD in normal mode, or the
/// checked-out branch in test mode where no remote exists.
fn resolve_default_branch(config: &SweepConfig, service: &GitService) -> Result<String> {
    if !config.default_branch.is_empty() {
        return Ok(config.default_branch.clone());
    }
    if config.test_mode {
        return service.repository().get_current_branch();
    }
    service.default_branch()
}

fn print_completion(config: &SweepConfig, outcome: &SweepOutcome) {
    if config.dry_run {
        println!(
            "Dry run complete: {} branches would be deleted",
            outcome.deleted_count()
        );
    } else {
        println!(
            "Cleanup complete: {} branches deleted",
            outcome.deleted_count()
        );
    }
    if !outcome.stale_unmerged.is_empty() {
        println!(
            "{} stale unmerged branches may need attention (see {})",
            outcome.stale_unmerged.len(),
            report::SUMMARY_FILE
        );
    }
}
