pub mod protected;
pub mod sweep;
