//! Validated WGS84 coordinates.
//!
//! [`Coordinate`] is the value passed between every stage of route
//! generation. It is immutable once built and compares and hashes by value,
//! so it can key caches and deduplication maps.

use std::fmt;
use std::hash::{Hash, Hasher};

use geo::{Coord, Point};
use thiserror::Error;

/// Errors returned by [`Coordinate::new`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    /// Latitude fell outside `-90.0..=90.0` or was not finite.
    #[error("latitude must be between -90 and 90, got {0}")]
    Latitude(f64),
    /// Longitude fell outside `-180.0..=180.0` or was not finite.
    #[error("longitude must be between -180 and 180, got {0}")]
    Longitude(f64),
}

/// A latitude/longitude pair in degrees.
///
/// # Examples
/// ```
/// use stroll_core::Coordinate;
///
/// # fn main() -> Result<(), stroll_core::CoordinateError> {
/// let tokyo = Coordinate::new(35.6812, 139.7671)?;
/// assert_eq!(tokyo.latitude(), 35.6812);
/// assert_eq!(tokyo.to_string(), "35.6812,139.7671");
/// assert!(Coordinate::new(91.0, 0.0).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawCoordinate")
)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawCoordinate> for Coordinate {
    type Error = CoordinateError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    /// Validate and construct a coordinate.
    ///
    /// Negative zero is stored as positive zero so that equal positions
    /// always hash identically.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::Longitude(longitude));
        }
        Ok(Self {
            latitude: latitude + 0.0,
            longitude: longitude + 0.0,
        })
    }

    /// Build a coordinate from geodesic output.
    ///
    /// Latitude is clamped into range and longitude is wrapped into
    /// `-180.0..=180.0`. Callers must pass finite values.
    pub(crate) fn normalised(latitude: f64, longitude: f64) -> Self {
        let longitude = if (-180.0..=180.0).contains(&longitude) {
            longitude
        } else {
            (longitude + 180.0).rem_euclid(360.0) - 180.0
        };
        Self {
            latitude: latitude.clamp(-90.0, 90.0) + 0.0,
            longitude: longitude + 0.0,
        }
    }

    /// Latitude in degrees.
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Convert to a `geo` point (`x = longitude`, `y = latitude`).
    pub fn to_point(self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.latitude.to_bits() == other.latitude.to_bits()
            && self.longitude.to_bits() == other.longitude.to_bits()
    }
}

impl Eq for Coordinate {}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.latitude.to_bits().hash(state);
        self.longitude.to_bits().hash(state);
    }
}

/// Formats as `"lat,lng"`, the query form mapping providers expect.
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

impl From<Coordinate> for Coord<f64> {
    fn from(value: Coordinate) -> Self {
        Coord {
            x: value.longitude,
            y: value.latitude,
        }
    }
}

impl From<Coordinate> for Point<f64> {
    fn from(value: Coordinate) -> Self {
        value.to_point()
    }
}

impl TryFrom<Point<f64>> for Coordinate {
    type Error = CoordinateError;

    fn try_from(point: Point<f64>) -> Result<Self, Self::Error> {
        Self::new(point.y(), point.x())
    }
}
