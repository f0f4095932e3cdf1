pub mod commands;
pub mod parser;

pub use parser::{Cli, Commands};

use crate::utils::Result;

pub fn execute_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Sweep(args) => {
            args.validate()?;
            commands::sweep::execute(args)
        }
        Commands::Protected(args) => commands::protected::execute(args),
    }
}
