//! Markdown report and machine-readable outputs for the invoking
//! environment. Rendering is a pure function of the finished sweep.

use crate::config::SweepConfig;
use crate::core::policy::Thresholds;
use crate::core::protected::ProtectedSet;
use crate::core::sweep::SweepOutcome;
use crate::utils::error::Result;
use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::Path;

pub const SUMMARY_FILE: &str = "summary.md";

pub fn render_markdown(
    config: &SweepConfig,
    protected: &ProtectedSet,
    thresholds: &Thresholds,
    outcome: &SweepOutcome,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "## Branch Cleanup Summary");
    if config.dry_run {
        let _ = writeln!(out, "- Mode: Dry Run");
    } else {
        let _ = writeln!(out, "- Mode: Actual Deletion");
    }
    let _ = writeln!(
        out,
        "- Threshold: {} weeks (before {})",
        config.weeks_threshold,
        thresholds.cutoff_date()
    );
    let _ = writeln!(out, "- Default branch: {}", protected.default_branch());
    let _ = writeln!(
        out,
        "- Protected branches: {}",
        protected.to_display_string()
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "### Deleted Branches");
    if outcome.deleted.is_empty() {
        let _ = writeln!(out, "- No branches deleted");
    } else {
        for entry in &outcome.deleted {
            let _ = writeln!(out, "- {}", entry);
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "### Skipped Branches");
    if outcome.skipped.is_empty() {
        let _ = writeln!(out, "- No branches skipped");
    } else {
        for entry in &outcome.skipped {
            let _ = writeln!(out, "- {}", entry);
        }
    }
    let _ = writeln!(out);

    if !outcome.stale_unmerged.is_empty() {
        let _ = writeln!(out, "### Stale Unmerged Branches");
        for entry in &outcome.stale_unmerged {
            let _ = writeln!(out, "- {}", entry);
        }
        let _ = writeln!(out);
    }

    out
}

pub fn write_summary(
    path: &Path,
    config: &SweepConfig,
    protected: &ProtectedSet,
    thresholds: &Thresholds,
    outcome: &SweepOutcome,
) -> Result<()> {
    std::fs::write(path, render_markdown(config, protected, thresholds, outcome))?;
    Ok(())
}

/// Appends `deleted_count=<n>` to the file named by `GITHUB_OUTPUT` so a
/// workflow step can consume the result. A no-op outside that environment.
pub fn write_deleted_count(outcome: &SweepOutcome) -> Result<()> {
    match std::env::var("GITHUB_OUTPUT") {
        Ok(path) if !path.is_empty() => append_deleted_count(Path::new(&path), outcome),
        _ => Ok(()),
    }
}

fn append_deleted_count(path: &Path, outcome: &SweepOutcome) -> Result<()> {
    let mut file = OpenOptions::new().append(true).create(true).open(path)?;
    writeln!(file, "deleted_count={}", outcome.deleted_count())?;
    Ok(())
}
