use branch_sweeper::cli::{execute_command, Cli};
use clap::Parser;
use std::env;

fn main() {
    let cli = Cli::parse();

    if env::var("RUST_LOG").is_err() {
        if cli.debug || env::var("DEBUG").map(|v| v == "true").unwrap_or(false) {
            env::set_var("RUST_LOG", "debug");
        } else {
            env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    if let Err(e) = execute_command(cli) {
        eprintln!("branch-sweeper: {}", e);
        std::process::exit(1);
    }
}
