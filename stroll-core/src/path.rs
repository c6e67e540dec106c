//! Decoding of provider polylines and helpers over the decoded path.

use thiserror::Error;

use crate::{Coordinate, CoordinateError};

/// Decimal places encoded by provider route polylines.
pub const POLYLINE_PRECISION: u32 = 5;

/// Errors from [`decode_polyline`] and [`path_midpoint`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    /// The path had no points.
    #[error("path has no points")]
    Empty,
    /// The encoded polyline could not be decoded.
    #[error("malformed polyline: {0}")]
    Malformed(String),
    /// A decoded vertex was not a valid coordinate.
    #[error("polyline vertex out of range: {0}")]
    Vertex(#[from] CoordinateError),
}

/// Decode a provider-encoded polyline into ordered coordinates.
///
/// # Errors
///
/// [`PathError::Malformed`] when the string is not a valid polyline and
/// [`PathError::Vertex`] when a vertex falls outside coordinate ranges.
///
/// # Examples
/// ```
/// use stroll_core::decode_polyline;
///
/// let path = decode_polyline("_p~iF~ps|U_ulLnnqC_mqNvxq`@")?;
/// assert_eq!(path.len(), 3);
/// assert!((path[0].latitude() - 38.5).abs() < 1e-9);
/// assert!((path[0].longitude() + 120.2).abs() < 1e-9);
/// # Ok::<(), stroll_core::PathError>(())
/// ```
pub fn decode_polyline(encoded: &str) -> Result<Vec<Coordinate>, PathError> {
    let line = polyline::decode_polyline(encoded, POLYLINE_PRECISION)
        .map_err(|err| PathError::Malformed(err.to_string()))?;
    line.coords()
        .map(|vertex| Coordinate::new(vertex.y, vertex.x).map_err(PathError::from))
        .collect()
}

/// The point halfway through `points` by index (`len / 2`).
///
/// This is the middle vertex of a decoded polyline, not a distance-weighted
/// midpoint.
///
/// # Errors
///
/// Returns [`PathError::Empty`] when `points` is empty.
///
/// # Examples
/// ```
/// use stroll_core::{Coordinate, PathError, path_midpoint};
///
/// let path: Vec<Coordinate> = (0..4)
///     .map(|i| Coordinate::new(0.0, f64::from(i)).expect("valid"))
///     .collect();
/// assert_eq!(path_midpoint(&path)?.longitude(), 2.0);
/// assert_eq!(path_midpoint(&[]), Err(PathError::Empty));
/// # Ok::<(), PathError>(())
/// ```
pub fn path_midpoint(points: &[Coordinate]) -> Result<Coordinate, PathError> {
    points.get(points.len() / 2).copied().ok_or(PathError::Empty)
}
