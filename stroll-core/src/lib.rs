//! Core route-generation engine for Stroll.
//!
//! Stroll picks an interesting walking destination, a landmark to pass on
//! the way and one walking route joining them, using only places where
//! street-level imagery can actually be shown.
//!
//! Responsibilities:
//! - Geodesic primitives on the WGS84 ellipsoid ([`geodesy`]).
//! - Scattered probe rings ([`circle`]) and budget-limited landmark search
//!   ([`LandmarkSearch`]).
//! - Imagery-constrained candidate selection ([`ImageSelector`]).
//! - Orchestration of a full run ([`RouteGenerator`]).
//!
//! Boundaries:
//! - No I/O. Every remote lookup goes through the [`MapsGateway`] trait,
//!   implemented over HTTP in `stroll-data`.
//!
//! Invariants:
//! - Value types validate on construction and are immutable afterwards.
//! - Searches never exceed their call budget.

#![forbid(unsafe_code)]

pub mod circle;
pub mod coordinate;
pub mod gateway;
pub mod geodesy;
pub mod landmark;
pub mod path;
pub mod route;
pub mod search;
pub mod selector;
pub mod street_view;
pub mod test_support;

pub use coordinate::{Coordinate, CoordinateError};
pub use gateway::{GatewayError, MapsGateway, RankPreference, Service};
pub use landmark::{Landmark, LandmarkError};
pub use path::{PathError, decode_polyline, path_midpoint};
pub use route::{
    RouteGenerationError, RouteGenerator, RouteGeneratorConfig, RoutePhase, RouteRequest,
    RouteRequestError, RouteResult,
};
pub use search::{LandmarkSearch, SearchBudget, SearchBudgetError, SearchOutcome};
pub use selector::{ImageSelector, SelectionError};
pub use street_view::{ImageSize, ImageSizeError, StreetViewImage, StreetViewMetadata};
