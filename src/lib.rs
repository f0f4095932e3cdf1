pub mod cli;
pub mod config;
pub mod core;
pub mod report;
pub mod utils;

pub use crate::config::SweepConfig;
pub use crate::core::sweep::{SweepEngine, SweepOutcome};
pub use crate::utils::{Result, SweeperError};
