//! Google Maps Platform adapter.
//!
//! [`GoogleMapsGateway`] implements [`stroll_core::MapsGateway`] with the
//! Places API (New), the Roads API, the Street View Static API and the
//! Directions API. Wire formats live in private submodules.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use stroll_core::{Coordinate, RouteGenerator, RouteRequest};
//! use stroll_data::google::{GoogleMapsConfig, GoogleMapsGateway};
//!
//! let config = GoogleMapsConfig::new("api-key")
//!     .with_timeout(Duration::from_secs(10))
//!     .with_language_code("en");
//! let gateway = GoogleMapsGateway::with_config(config)?;
//!
//! let start = Coordinate::new(35.6812, 139.7671)?;
//! let route = RouteGenerator::new(gateway).generate(RouteRequest::random(start, 1_500.0)?)?;
//! println!("{}", route.combined_polyline);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod directions;
mod gateway;
mod places;
mod roads;
mod street_view;
#[cfg(test)]
mod test_server;

pub use config::{
    DEFAULT_CACHE_CAPACITY, DEFAULT_MAPS_BASE_URL, DEFAULT_PLACES_BASE_URL,
    DEFAULT_ROADS_BASE_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, GoogleMapsConfig,
};
pub use gateway::{GatewayBuildError, GoogleMapsGateway};
