//! Street-view command implementation for the Stroll CLI.

use std::io::Write;
use std::time::Duration;

use clap::Parser;
use log::LevelFilter;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use stroll_core::{Coordinate, ImageSelector, ImageSize};
use stroll_data::GoogleMapsConfig;
use stroll_data::google::DEFAULT_CACHE_CAPACITY;

use crate::gateway::{GatewayBuilder, GoogleGatewayBuilder};
use crate::options::{api_key, coordinate, log_level, require, timeout};
use crate::{
    ARG_API_KEY, ARG_CACHE_CAPACITY, ARG_LAT, ARG_LNG, ARG_LOG_LEVEL, ARG_SIZE, ARG_TIMEOUT_SECS,
    CliError, ENV_STREET_VIEW_API_KEY, ENV_STREET_VIEW_LAT, ENV_STREET_VIEW_LNG, logging, output,
};

/// CLI arguments for the `street-view` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "street-view",
    long_about = "Fetch the street-level image nearest to --lat/--lng. The \
                 point is snapped to the nearest road first and the output \
                 reports where the image was actually taken. Options can \
                 come from CLI flags, configuration files, or environment \
                 variables.",
    about = "Fetch a street-level image near a point",
    allow_negative_numbers = true
)]
#[ortho_config(prefix = "STROLL")]
pub(crate) struct StreetViewArgs {
    /// Latitude of the point in degrees.
    #[arg(long = ARG_LAT, value_name = "deg")]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Longitude of the point in degrees.
    #[arg(long = ARG_LNG, value_name = "deg")]
    #[serde(default)]
    pub(crate) lng: Option<f64>,
    /// Image size as WIDTHxHEIGHT pixels, at most 640 each (default 600x300).
    #[arg(long = ARG_SIZE, value_name = "WxH")]
    #[serde(default)]
    pub(crate) size: Option<String>,
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
    /// Log level written to stderr (off, error, warn, info, debug, trace).
    #[arg(long = ARG_LOG_LEVEL, value_name = "level")]
    #[serde(default)]
    pub(crate) log_level: Option<String>,
}

impl StreetViewArgs {
    pub(crate) fn into_config(self) -> Result<StreetViewConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        StreetViewConfig::try_from(merged)
    }
}

/// Resolved `street-view` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StreetViewConfig {
    /// Point to find imagery near.
    pub(crate) location: Coordinate,
    /// Requested image size.
    pub(crate) size: ImageSize,
    pub(crate) api_key: String,
    pub(crate) timeout: Duration,
    pub(crate) cache_capacity: usize,
    pub(crate) log_level: LevelFilter,
}

impl StreetViewConfig {
    /// Gateway configuration for this invocation.
    pub(crate) fn gateway_config(&self) -> GoogleMapsConfig {
        GoogleMapsConfig::new(self.api_key.clone())
            .with_timeout(self.timeout)
            .with_cache_capacity(self.cache_capacity)
    }
}

impl TryFrom<StreetViewArgs> for StreetViewConfig {
    type Error = CliError;

    fn try_from(args: StreetViewArgs) -> Result<Self, Self::Error> {
        let lat = require(args.lat, ARG_LAT, ENV_STREET_VIEW_LAT)?;
        let lng = require(args.lng, ARG_LNG, ENV_STREET_VIEW_LNG)?;
        let location = coordinate(lat, lng, ARG_LAT, ARG_LNG)?;

        let size = match args.size.as_deref() {
            Some(text) => text.parse().map_err(CliError::InvalidImageSize)?,
            None => ImageSize::default(),
        };

        Ok(Self {
            location,
            size,
            api_key: api_key(args.api_key, ENV_STREET_VIEW_API_KEY)?,
            timeout: timeout(args.timeout_secs)?,
            cache_capacity: args.cache_capacity.unwrap_or(DEFAULT_CACHE_CAPACITY),
            log_level: log_level(args.log_level.as_deref())?,
        })
    }
}

pub(crate) fn run_street_view(args: StreetViewArgs) -> Result<(), CliError> {
    let config = args.into_config()?;
    logging::init(config.log_level);
    let mut stdout = std::io::stdout().lock();
    run_street_view_with(&config, &GoogleGatewayBuilder, &mut stdout)
}

pub(crate) fn run_street_view_with(
    config: &StreetViewConfig,
    builder: &dyn GatewayBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let gateway = builder.build(config.gateway_config())?;
    let selector = ImageSelector::new(gateway.as_ref(), config.size);
    log::info!("fetching street view near {}", config.location);
    let image = selector.fetch_image(config.location).map_err(|source| {
        if source.is_transport() {
            CliError::StreetView(source)
        } else {
            CliError::NoImagery {
                location: config.location,
                source,
            }
        }
    })?;
    output::write_image(writer, &image)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<StreetViewConfig, CliError> {
    let merged = StreetViewArgs::merge_from_layers(layers).map_err(CliError::from)?;
    StreetViewConfig::try_from(merged)
}
