//! Seam between route generation and the external mapping provider.
//!
//! The [`MapsGateway`] trait covers the five remote lookups the engine
//! needs. It is synchronous so the engine stays embeddable anywhere;
//! network-backed implementations block on their own runtime internally.
//!
//! Errors are split into two families. Transport failures (timeouts,
//! connection problems and HTTP error statuses) abort route generation.
//! [`GatewayError::Unavailable`] means the provider answered but had
//! nothing usable, which callers usually treat as "no data here".

use std::fmt;

use thiserror::Error;

use crate::{Coordinate, ImageSize, Landmark, StreetViewMetadata};

/// Remote operations exposed by a [`MapsGateway`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// Nearby-place search.
    Places,
    /// Snap-to-road lookup.
    Roads,
    /// Street-level imagery metadata.
    StreetViewMetadata,
    /// Street-level static imagery.
    StreetViewImage,
    /// Walking directions.
    Directions,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Places => "places",
            Self::Roads => "roads",
            Self::StreetViewMetadata => "street view metadata",
            Self::StreetViewImage => "street view image",
            Self::Directions => "directions",
        };
        f.write_str(name)
    }
}

/// Errors from [`MapsGateway`] calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The request exceeded its timeout.
    #[error("{service} request timed out after {timeout_secs}s")]
    Timeout {
        /// Service that was called.
        service: Service,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The request could not be delivered or the connection failed.
    #[error("{service} request failed: {message}")]
    Transport {
        /// Service that was called.
        service: Service,
        /// Underlying error description.
        message: String,
    },
    /// The provider answered with an HTTP error status.
    #[error("{service} request returned HTTP {status}: {message}")]
    Http {
        /// Service that was called.
        service: Service,
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
    },
    /// The provider answered but returned no usable data.
    #[error("{service} returned no usable data: {message}")]
    Unavailable {
        /// Service that was called.
        service: Service,
        /// Provider status or parse failure description.
        message: String,
    },
}

impl GatewayError {
    /// Service the failed call targeted.
    pub const fn service(&self) -> Service {
        match self {
            Self::Timeout { service, .. }
            | Self::Transport { service, .. }
            | Self::Http { service, .. }
            | Self::Unavailable { service, .. } => *service,
        }
    }

    /// Whether the failure happened in transport rather than in the data.
    ///
    /// HTTP error statuses count as transport failures.
    ///
    /// # Examples
    /// ```
    /// use stroll_core::{GatewayError, Service};
    ///
    /// let timeout = GatewayError::Timeout { service: Service::Roads, timeout_secs: 15 };
    /// assert!(timeout.is_transport());
    /// let empty = GatewayError::Unavailable {
    ///     service: Service::Directions,
    ///     message: "ZERO_RESULTS".into(),
    /// };
    /// assert!(!empty.is_transport());
    /// ```
    pub const fn is_transport(&self) -> bool {
        !matches!(self, Self::Unavailable { .. })
    }

    /// Whether the failure was a timeout.
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Ordering requested from nearby-place search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RankPreference {
    /// Most popular places first.
    #[default]
    Popularity,
    /// Closest places first.
    Distance,
}

/// Mapping provider used by route generation.
///
/// Implementations must be safe to call repeatedly with the same arguments;
/// callers may cache results keyed by those arguments.
///
/// # Examples
/// ```
/// use stroll_core::{
///     Coordinate, GatewayError, ImageSize, Landmark, MapsGateway, RankPreference,
///     StreetViewMetadata,
/// };
///
/// struct Empty;
///
/// impl MapsGateway for Empty {
///     fn search_nearby(&self, _: Coordinate, _: f64, _: RankPreference)
///         -> Result<Vec<Landmark>, GatewayError> { Ok(Vec::new()) }
///     fn snap_to_road(&self, _: Coordinate) -> Result<Option<Coordinate>, GatewayError> {
///         Ok(None)
///     }
///     fn street_view_metadata(&self, _: Coordinate)
///         -> Result<StreetViewMetadata, GatewayError> {
///         Ok(StreetViewMetadata::Unavailable { status: "ZERO_RESULTS".into() })
///     }
///     fn street_view_image(&self, _: Coordinate, _: ImageSize)
///         -> Result<Vec<u8>, GatewayError> { Ok(Vec::new()) }
///     fn combined_route(&self, _: Coordinate, _: Coordinate, _: Option<Coordinate>)
///         -> Result<String, GatewayError> { Ok(String::new()) }
/// }
///
/// let here = Coordinate::new(0.0, 0.0).expect("valid");
/// assert!(Empty.search_nearby(here, 100.0, RankPreference::Popularity)?.is_empty());
/// # Ok::<(), GatewayError>(())
/// ```
pub trait MapsGateway {
    /// Places within `radius_m` metres of `center`, ranked by `rank`.
    fn search_nearby(
        &self,
        center: Coordinate,
        radius_m: f64,
        rank: RankPreference,
    ) -> Result<Vec<Landmark>, GatewayError>;

    /// Nearest point on a road network, or `None` when no road is close.
    fn snap_to_road(&self, coordinate: Coordinate) -> Result<Option<Coordinate>, GatewayError>;

    /// Whether street-level imagery exists near `coordinate`.
    fn street_view_metadata(
        &self,
        coordinate: Coordinate,
    ) -> Result<StreetViewMetadata, GatewayError>;

    /// Encoded image captured at `coordinate`.
    fn street_view_image(
        &self,
        coordinate: Coordinate,
        size: ImageSize,
    ) -> Result<Vec<u8>, GatewayError>;

    /// Encoded polyline for a walking route from `origin` to `destination`,
    /// passing through `via` when given.
    fn combined_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        via: Option<Coordinate>,
    ) -> Result<String, GatewayError>;
}

impl<G> MapsGateway for &G
where
    G: MapsGateway + ?Sized,
{
    fn search_nearby(
        &self,
        center: Coordinate,
        radius_m: f64,
        rank: RankPreference,
    ) -> Result<Vec<Landmark>, GatewayError> {
        (**self).search_nearby(center, radius_m, rank)
    }

    fn snap_to_road(&self, coordinate: Coordinate) -> Result<Option<Coordinate>, GatewayError> {
        (**self).snap_to_road(coordinate)
    }

    fn street_view_metadata(
        &self,
        coordinate: Coordinate,
    ) -> Result<StreetViewMetadata, GatewayError> {
        (**self).street_view_metadata(coordinate)
    }

    fn street_view_image(
        &self,
        coordinate: Coordinate,
        size: ImageSize,
    ) -> Result<Vec<u8>, GatewayError> {
        (**self).street_view_image(coordinate, size)
    }

    fn combined_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        via: Option<Coordinate>,
    ) -> Result<String, GatewayError> {
        (**self).combined_route(origin, destination, via)
    }
}
