pub mod classify;
pub mod deletion;
pub mod git;
pub mod policy;
pub mod protected;
pub mod review;
pub mod sweep;
