//! Generate command implementation for the Stroll CLI.

use std::io::Write;
use std::time::Duration;

use clap::Parser;
use log::LevelFilter;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use stroll_core::{RouteGenerator, RouteRequest};
use stroll_data::GoogleMapsConfig;
use stroll_data::google::DEFAULT_CACHE_CAPACITY;

use crate::gateway::{GatewayBuilder, GoogleGatewayBuilder};
use crate::options::{api_key, coordinate, log_level, require, timeout};
use crate::{
    ARG_API_KEY, ARG_CACHE_CAPACITY, ARG_DEST_LAT, ARG_DEST_LNG, ARG_LANGUAGE, ARG_LAT, ARG_LNG,
    ARG_LOG_LEVEL, ARG_RADIUS, ARG_TIMEOUT_SECS, CliError, ENV_API_KEY, ENV_DEST_LAT, ENV_DEST_LNG,
    ENV_LAT, ENV_LNG, logging, output,
};

/// CLI arguments for the `generate` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "generate",
    long_about = "Generate a walking route from a start point either to a \
                 random landmark about --radius metres away or to an \
                 explicit --dest-lat/--dest-lng destination. The route passes \
                 a second landmark near its middle and both landmarks come \
                 with a street-level image. Options can come from CLI \
                 flags, configuration files, or environment variables.",
    about = "Generate a landmark walking route",
    allow_negative_numbers = true
)]
#[ortho_config(prefix = "STROLL")]
pub(crate) struct GenerateArgs {
    /// Latitude of the start point in degrees.
    #[arg(long = ARG_LAT, value_name = "deg")]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Longitude of the start point in degrees.
    #[arg(long = ARG_LNG, value_name = "deg")]
    #[serde(default)]
    pub(crate) lng: Option<f64>,
    /// Walk to a random landmark about this many metres away.
    #[arg(long = ARG_RADIUS, value_name = "metres")]
    #[serde(default)]
    pub(crate) radius: Option<f64>,
    /// Latitude of an explicit destination.
    #[arg(long = ARG_DEST_LAT, value_name = "deg")]
    #[serde(default)]
    pub(crate) dest_lat: Option<f64>,
    /// Longitude of an explicit destination.
    #[arg(long = ARG_DEST_LNG, value_name = "deg")]
    #[serde(default)]
    pub(crate) dest_lng: Option<f64>,
    /// Google Maps Platform API key.
    #[arg(long = ARG_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// Per-request timeout in seconds (default 15).
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// Cached results kept per provider call; 0 disables caching.
    #[arg(long = ARG_CACHE_CAPACITY, value_name = "entries")]
    #[serde(default)]
    pub(crate) cache_capacity: Option<usize>,
    /// Language for landmark names, such as "en" or "ja".
    #[arg(long = ARG_LANGUAGE, value_name = "code")]
    #[serde(default)]
    pub(crate) language: Option<String>,
    /// Log level written to stderr (off, error, warn, info, debug, trace).
    #[arg(long = ARG_LOG_LEVEL, value_name = "level")]
    #[serde(default)]
    pub(crate) log_level: Option<String>,
}

impl GenerateArgs {
    pub(crate) fn into_config(self) -> Result<GenerateConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        GenerateConfig::try_from(merged)
    }
}

/// Resolved `generate` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GenerateConfig {
    /// Validated route request.
    pub(crate) request: RouteRequest,
    /// Google Maps Platform API key.
    pub(crate) api_key: String,
    /// Per-request timeout.
    pub(crate) timeout: Duration,
    /// Per-call cache capacity.
    pub(crate) cache_capacity: usize,
    /// Preferred landmark name language.
    pub(crate) language: Option<String>,
    /// Logger level.
    pub(crate) log_level: LevelFilter,
}

impl GenerateConfig {
    /// Gateway configuration for this invocation.
    pub(crate) fn gateway_config(&self) -> GoogleMapsConfig {
        let config = GoogleMapsConfig::new(self.api_key.clone())
            .with_timeout(self.timeout)
            .with_cache_capacity(self.cache_capacity);
        match &self.language {
            Some(language) => config.with_language_code(language.clone()),
            None => config,
        }
    }
}

impl TryFrom<GenerateArgs> for GenerateConfig {
    type Error = CliError;

    fn try_from(args: GenerateArgs) -> Result<Self, Self::Error> {
        let lat = require(args.lat, ARG_LAT, ENV_LAT)?;
        let lng = require(args.lng, ARG_LNG, ENV_LNG)?;
        let current = coordinate(lat, lng, ARG_LAT, ARG_LNG)?;

        let destination = match (args.dest_lat, args.dest_lng) {
            (None, None) => None,
            (dest_lat, dest_lng) => {
                let dest_lat = require(dest_lat, ARG_DEST_LAT, ENV_DEST_LAT)?;
                let dest_lng = require(dest_lng, ARG_DEST_LNG, ENV_DEST_LNG)?;
                Some(coordinate(dest_lat, dest_lng, ARG_DEST_LAT, ARG_DEST_LNG)?)
            }
        };
        let request = RouteRequest::from_parts(current, args.radius, destination)
            .map_err(CliError::InvalidRequest)?;

        Ok(Self {
            request,
            api_key: api_key(args.api_key, ENV_API_KEY)?,
            timeout: timeout(args.timeout_secs)?,
            cache_capacity: args.cache_capacity.unwrap_or(DEFAULT_CACHE_CAPACITY),
            language: args.language,
            log_level: log_level(args.log_level.as_deref())?,
        })
    }
}

pub(crate) fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let config = args.into_config()?;
    logging::init(config.log_level);
    let mut stdout = std::io::stdout().lock();
    run_generate_with(&config, &GoogleGatewayBuilder, &mut stdout)
}

pub(crate) fn run_generate_with(
    config: &GenerateConfig,
    builder: &dyn GatewayBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let gateway = builder.build(config.gateway_config())?;
    let generator = RouteGenerator::new(gateway.as_ref());
    log::info!("generating route from {}", config.request.current());
    let route = generator.generate(config.request)?;
    output::write_route(writer, &route)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<GenerateConfig, CliError> {
    let merged = GenerateArgs::merge_from_layers(layers).map_err(CliError::from)?;
    GenerateConfig::try_from(merged)
}
