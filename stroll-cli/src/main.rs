//! Entry point for the `stroll` command-line interface.
#![forbid(unsafe_code)]

use stroll_cli::CliError;

fn main() {
    match stroll_cli::run() {
        Ok(()) => {}
        // Help, version and usage errors keep clap's own output and exit code.
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("stroll: {err}");
            std::process::exit(1);
        }
    }
}
