//! In-memory [`MapsGateway`] for tests.
//!
//! [`StubGateway`] answers every call from configured data and records the
//! calls it receives, so tests can assert both outcomes and traffic.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{
    Coordinate, GatewayError, ImageSize, Landmark, MapsGateway, RankPreference,
    StreetViewMetadata, geodesy,
};

/// Polyline returned by [`StubGateway`] unless configured otherwise.
pub const STUB_POLYLINE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

/// Slack applied when deciding whether a pooled landmark is in range.
const RADIUS_SLACK_M: f64 = 1e-3;

/// A call received by [`StubGateway`].
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    /// [`MapsGateway::search_nearby`].
    SearchNearby {
        /// Probe centre.
        center: Coordinate,
        /// Probe radius in metres.
        radius_m: f64,
        /// Requested ranking.
        rank: RankPreference,
    },
    /// [`MapsGateway::snap_to_road`].
    SnapToRoad {
        /// Coordinate to snap.
        coordinate: Coordinate,
    },
    /// [`MapsGateway::street_view_metadata`].
    StreetViewMetadata {
        /// Queried coordinate.
        coordinate: Coordinate,
    },
    /// [`MapsGateway::street_view_image`].
    StreetViewImage {
        /// Queried coordinate.
        coordinate: Coordinate,
        /// Requested size.
        size: ImageSize,
    },
    /// [`MapsGateway::combined_route`].
    CombinedRoute {
        /// Route start.
        origin: Coordinate,
        /// Route end.
        destination: Coordinate,
        /// Pass-through waypoint.
        via: Option<Coordinate>,
    },
}

#[derive(Debug, Clone, Default)]
enum Imagery {
    #[default]
    Everywhere,
    Nowhere,
    Except(HashSet<Coordinate>),
}

impl Imagery {
    fn available_at(&self, coordinate: Coordinate) -> bool {
        match self {
            Self::Everywhere => true,
            Self::Nowhere => false,
            Self::Except(missing) => !missing.contains(&coordinate),
        }
    }
}

/// Deterministic gateway backed by a landmark pool and scripted failures.
///
/// By default every coordinate has imagery, no road is found near any
/// coordinate and the route request returns [`STUB_POLYLINE`].
///
/// # Examples
/// ```
/// use stroll_core::test_support::{GatewayCall, StubGateway};
/// use stroll_core::{Coordinate, MapsGateway, RankPreference};
///
/// let center = Coordinate::new(0.0, 0.0).expect("valid");
/// let gateway = StubGateway::new().with_ring_landmarks("poi", center, 500.0, 3);
/// let found = gateway.search_nearby(center, 600.0, RankPreference::Popularity)?;
/// assert_eq!(found.len(), 3);
/// assert!(matches!(gateway.calls()[0], GatewayCall::SearchNearby { .. }));
/// # Ok::<(), stroll_core::GatewayError>(())
/// ```
#[derive(Debug)]
pub struct StubGateway {
    pool: Vec<Landmark>,
    search_responses: Mutex<VecDeque<Result<Vec<Landmark>, GatewayError>>>,
    search_error: Option<GatewayError>,
    snaps: HashMap<Coordinate, Coordinate>,
    snap_error: Option<GatewayError>,
    imagery: Imagery,
    metadata_error: Option<GatewayError>,
    image_error: Option<GatewayError>,
    route: Result<String, GatewayError>,
    calls: Mutex<Vec<GatewayCall>>,
}

impl Default for StubGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl StubGateway {
    /// A gateway with an empty pool and imagery everywhere.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pool: Vec::new(),
            search_responses: Mutex::new(VecDeque::new()),
            search_error: None,
            snaps: HashMap::new(),
            snap_error: None,
            imagery: Imagery::default(),
            metadata_error: None,
            image_error: None,
            route: Ok(STUB_POLYLINE.to_owned()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Add landmarks returned by searches whose radius covers them.
    #[must_use]
    pub fn with_landmarks(mut self, landmarks: impl IntoIterator<Item = Landmark>) -> Self {
        self.pool.extend(landmarks);
        self
    }

    /// Add `count` landmarks evenly spaced on a ring around `center`.
    ///
    /// Landmarks are named `{prefix}-{i}` and start due north.
    #[must_use]
    pub fn with_ring_landmarks(
        self,
        prefix: &str,
        center: Coordinate,
        distance_m: f64,
        count: usize,
    ) -> Self {
        let landmarks = ring_landmarks(prefix, center, distance_m, count);
        self.with_landmarks(landmarks)
    }

    /// Queue responses consumed by successive searches before the pool is
    /// consulted.
    #[must_use]
    pub fn with_search_responses(
        self,
        responses: impl IntoIterator<Item = Result<Vec<Landmark>, GatewayError>>,
    ) -> Self {
        self.lock_responses().extend(responses);
        self
    }

    /// Fail every search that has no queued response.
    #[must_use]
    pub fn with_search_error(mut self, error: GatewayError) -> Self {
        self.search_error = Some(error);
        self
    }

    /// Snap `from` to `to` instead of reporting no nearby road.
    #[must_use]
    pub fn with_snap(mut self, from: Coordinate, to: Coordinate) -> Self {
        self.snaps.insert(from, to);
        self
    }

    /// Fail every road snap.
    #[must_use]
    pub fn with_snap_error(mut self, error: GatewayError) -> Self {
        self.snap_error = Some(error);
        self
    }

    /// Report no imagery anywhere.
    #[must_use]
    pub fn without_imagery(mut self) -> Self {
        self.imagery = Imagery::Nowhere;
        self
    }

    /// Report no imagery at `coordinate`.
    #[must_use]
    pub fn without_imagery_at(mut self, coordinate: Coordinate) -> Self {
        match &mut self.imagery {
            Imagery::Nowhere => {}
            Imagery::Except(missing) => {
                missing.insert(coordinate);
            }
            Imagery::Everywhere => {
                self.imagery = Imagery::Except(HashSet::from([coordinate]));
            }
        }
        self
    }

    /// Fail every metadata lookup.
    #[must_use]
    pub fn with_metadata_error(mut self, error: GatewayError) -> Self {
        self.metadata_error = Some(error);
        self
    }

    /// Fail every image download.
    #[must_use]
    pub fn with_image_error(mut self, error: GatewayError) -> Self {
        self.image_error = Some(error);
        self
    }

    /// Return `polyline` from route requests.
    #[must_use]
    pub fn with_route(mut self, polyline: impl Into<String>) -> Self {
        self.route = Ok(polyline.into());
        self
    }

    /// Fail every route request.
    #[must_use]
    pub fn with_route_error(mut self, error: GatewayError) -> Self {
        self.route = Err(error);
        self
    }

    /// Calls received so far, oldest first.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.lock_calls().clone()
    }

    /// Number of recorded calls matching `predicate`.
    pub fn count_calls(&self, predicate: impl Fn(&GatewayCall) -> bool) -> usize {
        self.lock_calls().iter().filter(|call| predicate(call)).count()
    }

    /// Bytes served for an image at `coordinate`.
    pub fn image_bytes_for(coordinate: Coordinate) -> Vec<u8> {
        format!("image@{coordinate}").into_bytes()
    }

    fn record(&self, call: GatewayCall) {
        self.lock_calls().push(call);
    }

    fn lock_calls(&self) -> MutexGuard<'_, Vec<GatewayCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_responses(
        &self,
    ) -> MutexGuard<'_, VecDeque<Result<Vec<Landmark>, GatewayError>>> {
        self.search_responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Landmarks named `{prefix}-{i}` evenly spaced on a ring, starting north.
pub fn ring_landmarks(
    prefix: &str,
    center: Coordinate,
    distance_m: f64,
    count: usize,
) -> Vec<Landmark> {
    (0..count)
        .filter_map(|i| {
            let bearing = 360.0 * i as f64 / count as f64;
            let at = geodesy::destination_point(center, distance_m, bearing);
            let id = format!("{prefix}-{i}");
            Landmark::new(id.clone(), id, at).ok()
        })
        .collect()
}

impl MapsGateway for StubGateway {
    fn search_nearby(
        &self,
        center: Coordinate,
        radius_m: f64,
        rank: RankPreference,
    ) -> Result<Vec<Landmark>, GatewayError> {
        self.record(GatewayCall::SearchNearby {
            center,
            radius_m,
            rank,
        });
        if let Some(scripted) = self.lock_responses().pop_front() {
            return scripted;
        }
        if let Some(error) = &self.search_error {
            return Err(error.clone());
        }
        let mut found: Vec<Landmark> = self
            .pool
            .iter()
            .filter(|landmark| {
                geodesy::distance(center, landmark.coordinate()) <= radius_m + RADIUS_SLACK_M
            })
            .cloned()
            .collect();
        if rank == RankPreference::Distance {
            found.sort_by(|a, b| {
                geodesy::distance(center, a.coordinate())
                    .total_cmp(&geodesy::distance(center, b.coordinate()))
            });
        }
        Ok(found)
    }

    fn snap_to_road(&self, coordinate: Coordinate) -> Result<Option<Coordinate>, GatewayError> {
        self.record(GatewayCall::SnapToRoad { coordinate });
        if let Some(error) = &self.snap_error {
            return Err(error.clone());
        }
        Ok(self.snaps.get(&coordinate).copied())
    }

    fn street_view_metadata(
        &self,
        coordinate: Coordinate,
    ) -> Result<StreetViewMetadata, GatewayError> {
        self.record(GatewayCall::StreetViewMetadata { coordinate });
        if let Some(error) = &self.metadata_error {
            return Err(error.clone());
        }
        if self.imagery.available_at(coordinate) {
            Ok(StreetViewMetadata::Available {
                location: coordinate,
            })
        } else {
            Ok(StreetViewMetadata::Unavailable {
                status: "ZERO_RESULTS".to_owned(),
            })
        }
    }

    fn street_view_image(
        &self,
        coordinate: Coordinate,
        size: ImageSize,
    ) -> Result<Vec<u8>, GatewayError> {
        self.record(GatewayCall::StreetViewImage { coordinate, size });
        if let Some(error) = &self.image_error {
            return Err(error.clone());
        }
        Ok(Self::image_bytes_for(coordinate))
    }

    fn combined_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        via: Option<Coordinate>,
    ) -> Result<String, GatewayError> {
        self.record(GatewayCall::CombinedRoute {
            origin,
            destination,
            via,
        });
        self.route.clone()
    }
}
