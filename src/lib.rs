//! Facade crate for the Stroll walking-route engine.
//!
//! This crate re-exports the core domain types and, behind the `google`
//! feature, the Google Maps Platform gateway that drives them over HTTP.

#![forbid(unsafe_code)]

pub use stroll_core::{
    Coordinate, CoordinateError, GatewayError, ImageSelector, ImageSize, Landmark,
    LandmarkSearch, MapsGateway, PathError, RankPreference, RouteGenerationError,
    RouteGenerator, RouteGeneratorConfig, RouteRequest, RouteRequestError, RouteResult,
    SearchBudget, SearchOutcome, SelectionError, Service, StreetViewImage, StreetViewMetadata,
    decode_polyline, geodesy,
};

#[cfg(feature = "google")]
pub use stroll_data::{CallCache, GatewayBuildError, GoogleMapsConfig, GoogleMapsGateway};
