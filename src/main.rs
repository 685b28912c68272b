//! portal-release CLI entry point
//!
//! Minimal: parse arguments, dispatch, exit with the command's code. All
//! logic is delegated to the CLI module.

use portal_release::cli;

fn main() {
    std::process::exit(cli::run());
}
