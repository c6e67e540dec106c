//! Command-line interface for generating Stroll walking routes and fetching
//! street-level images.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod gateway;
mod generate;
mod logging;
mod options;
mod output;
mod street_view;

pub use error::CliError;

use generate::GenerateArgs;
use street_view::StreetViewArgs;

const ARG_LAT: &str = "lat";
const ARG_LNG: &str = "lng";
const ARG_RADIUS: &str = "radius";
const ARG_DEST_LAT: &str = "dest-lat";
const ARG_DEST_LNG: &str = "dest-lng";
const ARG_API_KEY: &str = "api-key";
const ARG_TIMEOUT_SECS: &str = "timeout-secs";
const ARG_CACHE_CAPACITY: &str = "cache-capacity";
const ARG_LANGUAGE: &str = "language";
const ARG_SIZE: &str = "size";
const ARG_LOG_LEVEL: &str = "log-level";
const ENV_LAT: &str = "STROLL_CMDS_GENERATE_LAT";
const ENV_LNG: &str = "STROLL_CMDS_GENERATE_LNG";
const ENV_DEST_LAT: &str = "STROLL_CMDS_GENERATE_DEST_LAT";
const ENV_DEST_LNG: &str = "STROLL_CMDS_GENERATE_DEST_LNG";
const ENV_API_KEY: &str = "STROLL_CMDS_GENERATE_API_KEY";
const ENV_STREET_VIEW_LAT: &str = "STROLL_CMDS_STREET_VIEW_LAT";
const ENV_STREET_VIEW_LNG: &str = "STROLL_CMDS_STREET_VIEW_LNG";
const ENV_STREET_VIEW_API_KEY: &str = "STROLL_CMDS_STREET_VIEW_API_KEY";

/// Run the Stroll CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments or configuration are invalid, the
/// gateway cannot be built, no route or image can be produced, or output
/// fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Generate(args) => generate::run_generate(args),
        Command::StreetView(args) => street_view::run_street_view(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "stroll",
    about = "Landmark-based walking route generator",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a walking route past two landmarks with street-level images.
    Generate(GenerateArgs),
    /// Fetch the street-level image nearest to a point.
    StreetView(StreetViewArgs),
}

#[cfg(test)]
mod tests;
