//! Option validation shared by the CLI subcommands.

use std::time::Duration;

use log::LevelFilter;
use stroll_core::{Coordinate, CoordinateError};
use stroll_data::google::DEFAULT_TIMEOUT_SECS;

use crate::{ARG_API_KEY, CliError, logging};

/// Log level used when none is configured.
pub(crate) const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

pub(crate) fn require<T>(
    value: Option<T>,
    field: &'static str,
    env: &'static str,
) -> Result<T, CliError> {
    value.ok_or(CliError::MissingArgument { field, env })
}

pub(crate) fn coordinate(
    lat: f64,
    lng: f64,
    lat_field: &'static str,
    lng_field: &'static str,
) -> Result<Coordinate, CliError> {
    Coordinate::new(lat, lng).map_err(|source| CliError::InvalidCoordinate {
        field: match source {
            CoordinateError::Latitude(_) => lat_field,
            CoordinateError::Longitude(_) => lng_field,
        },
        source,
    })
}

/// Blank keys count as missing.
pub(crate) fn api_key(value: Option<String>, env: &'static str) -> Result<String, CliError> {
    require(value.filter(|key| !key.trim().is_empty()), ARG_API_KEY, env)
}

pub(crate) fn timeout(secs: Option<u64>) -> Result<Duration, CliError> {
    match secs.unwrap_or(DEFAULT_TIMEOUT_SECS) {
        0 => Err(CliError::ZeroTimeout),
        secs => Ok(Duration::from_secs(secs)),
    }
}

pub(crate) fn log_level(value: Option<&str>) -> Result<LevelFilter, CliError> {
    value.map_or(Ok(DEFAULT_LOG_LEVEL), logging::parse_level)
}
