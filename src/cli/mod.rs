//! CLI module
//!
//! Three commands: plan (read-only classification), release (run the
//! batch), status (read-only slot report).

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{plan, release, run_command, stage, status};
pub use errors::{CliError, CliResult};

/// Parse arguments, run, and return the process exit code.
pub fn run() -> i32 {
    let cli = Cli::parse_args();
    match run_command(cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            1
        }
    }
}
