//! Error types emitted by the Stroll CLI.

use std::sync::Arc;

use stroll_core::{
    Coordinate, CoordinateError, GatewayError, ImageSizeError, RouteGenerationError,
    RouteRequestError,
};
use stroll_data::GatewayBuildError;
use thiserror::Error;

/// Errors emitted by the Stroll CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A latitude or longitude option is out of range.
    #[error("invalid --{field}: {source}")]
    InvalidCoordinate {
        field: &'static str,
        #[source]
        source: CoordinateError,
    },
    /// The options do not describe exactly one kind of route.
    #[error("invalid route request: {0}")]
    InvalidRequest(#[source] RouteRequestError),
    /// The image size is not `WIDTHxHEIGHT` within provider limits.
    #[error("invalid --size: {0}")]
    InvalidImageSize(#[source] ImageSizeError),
    /// The request timeout was zero.
    #[error("--timeout-secs must be greater than zero")]
    ZeroTimeout,
    /// The log level is not a recognised `log` level name.
    #[error("unknown log level {value:?} (use off, error, warn, info, debug or trace)")]
    InvalidLogLevel { value: String },
    /// Constructing the Google Maps gateway failed.
    #[error("failed to build Google Maps gateway: {0}")]
    BuildGateway(#[source] GatewayBuildError),
    /// Route generation failed.
    #[error(transparent)]
    Generate(#[from] RouteGenerationError),
    /// No street-level image exists near the requested location.
    #[error("no street view imagery at {location}")]
    NoImagery {
        location: Coordinate,
        #[source]
        source: GatewayError,
    },
    /// A street view lookup failed in transport.
    #[error("street view lookup failed: {0}")]
    StreetView(#[source] GatewayError),
    /// Serialising the output document failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing the output document failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
