//! Roads API `nearestRoads` wire types.

use serde::Deserialize;
use stroll_core::{Coordinate, CoordinateError};

/// Response from `nearestRoads`.
///
/// `snappedPoints` is absent when no road is near the query point.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NearestRoadsResponse {
    #[serde(default)]
    pub snapped_points: Vec<SnappedPoint>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SnappedPoint {
    pub location: LatitudeLongitude,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LatitudeLongitude {
    pub latitude: f64,
    pub longitude: f64,
}

impl NearestRoadsResponse {
    /// The first snapped point, if any road was found.
    pub(crate) fn nearest(self) -> Result<Option<Coordinate>, CoordinateError> {
        self.snapped_points
            .into_iter()
            .next()
            .map(|point| Coordinate::new(point.location.latitude, point.location.longitude))
            .transpose()
    }
}
