use super::SweepConfig;
use crate::core::git::validate_branch_name;
use crate::utils::error::{Result, SweeperError};

/// Configuration errors are the only fatal class: they abort before any
/// remote call is made.
pub fn validate_config(config: &SweepConfig) -> Result<()> {
    if config.weeks_threshold == 0 {
        return Err(SweeperError::config_error(
            "weeks_threshold must be a positive number",
        ));
    }

    if !config.default_branch.is_empty() {
        validate_branch_name(&config.default_branch)
            .map_err(|e| SweeperError::config_error(format!("invalid default branch: {}", e)))?;
    }

    for name in config.protected_branches.split_whitespace() {
        validate_branch_name(name)
            .map_err(|e| SweeperError::config_error(format!("invalid protected branch: {}", e)))?;
    }

    Ok(())
}
