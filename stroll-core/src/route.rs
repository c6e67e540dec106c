//! Route generation: destination, midpoint landmark, combined route.
//!
//! [`RouteGenerator`] walks a fixed sequence of phases. It first settles a
//! destination with imagery, then a midpoint landmark with imagery near the
//! geodesic midpoint, and finally asks for one walking route passing
//! through that midpoint. Each phase consumes the previous phase's output,
//! so the run is strictly sequential.
//!
//! Failures where nothing usable was found surface as domain variants of
//! [`RouteGenerationError`]. Transport failures pass through unchanged as
//! [`RouteGenerationError::Gateway`].

use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::{
    Coordinate, GatewayError, ImageSelector, ImageSize, Landmark, LandmarkSearch, MapsGateway,
    PathError, RankPreference, SearchBudget, SelectionError, Service, StreetViewImage,
    decode_polyline, geodesy, path_midpoint,
};

/// Smallest midpoint search target, in metres.
pub const DEFAULT_MIN_MIDPOINT_RADIUS_M: f64 = 300.0;
/// Divisor applied to the route radius to size the midpoint search.
pub const DEFAULT_MIDPOINT_RADIUS_DIVISOR: f64 = 4.0;

/// Caller mistakes in a [`RouteRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum RouteRequestError {
    /// Both a radius and a destination were supplied.
    #[error("supply either a radius or a destination, not both")]
    Both,
    /// Neither a radius nor a destination was supplied.
    #[error("supply a radius or a destination")]
    Neither,
    /// The radius was not a positive finite number of metres.
    #[error("radius must be a positive number of metres, got {0}")]
    InvalidRadius(f64),
}

/// What the caller wants a route to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RouteRequest {
    /// Pick a landmark roughly `radius_m` metres from `current`.
    Random {
        /// Starting point.
        current: Coordinate,
        /// Target walking distance in metres.
        radius_m: f64,
    },
    /// Walk from `current` to `destination`.
    Explicit {
        /// Starting point.
        current: Coordinate,
        /// Requested destination.
        destination: Coordinate,
    },
}

impl RouteRequest {
    /// Random-destination request with a validated radius.
    pub fn random(current: Coordinate, radius_m: f64) -> Result<Self, RouteRequestError> {
        validate_radius(radius_m)?;
        Ok(Self::Random { current, radius_m })
    }

    /// Explicit-destination request.
    pub const fn explicit(current: Coordinate, destination: Coordinate) -> Self {
        Self::Explicit {
            current,
            destination,
        }
    }

    /// Build a request from optional caller inputs.
    ///
    /// Exactly one of `radius_m` and `destination` must be present.
    ///
    /// # Examples
    /// ```
    /// use stroll_core::{Coordinate, RouteRequest, RouteRequestError};
    ///
    /// let here = Coordinate::new(35.0, 139.0).expect("valid");
    /// assert!(RouteRequest::from_parts(here, Some(1_000.0), None).is_ok());
    /// assert_eq!(
    ///     RouteRequest::from_parts(here, Some(1_000.0), Some(here)),
    ///     Err(RouteRequestError::Both)
    /// );
    /// assert_eq!(RouteRequest::from_parts(here, None, None), Err(RouteRequestError::Neither));
    /// ```
    pub fn from_parts(
        current: Coordinate,
        radius_m: Option<f64>,
        destination: Option<Coordinate>,
    ) -> Result<Self, RouteRequestError> {
        match (radius_m, destination) {
            (Some(radius_m), None) => Self::random(current, radius_m),
            (None, Some(destination)) => Ok(Self::explicit(current, destination)),
            (Some(_), Some(_)) => Err(RouteRequestError::Both),
            (None, None) => Err(RouteRequestError::Neither),
        }
    }

    /// Starting point of the walk.
    pub const fn current(&self) -> Coordinate {
        match self {
            Self::Random { current, .. } | Self::Explicit { current, .. } => *current,
        }
    }
}

fn validate_radius(radius_m: f64) -> Result<(), RouteRequestError> {
    if radius_m.is_finite() && radius_m > 0.0 {
        Ok(())
    } else {
        Err(RouteRequestError::InvalidRadius(radius_m))
    }
}

/// Phase of route generation that searches and selects landmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutePhase {
    /// Choosing where the walk ends.
    Destination,
    /// Choosing the landmark the walk passes.
    Midpoint,
}

impl fmt::Display for RoutePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Destination => "destination",
            Self::Midpoint => "midpoint",
        })
    }
}

/// Errors from [`RouteGenerator::generate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteGenerationError {
    /// The request itself was malformed.
    #[error("could not generate a route: invalid request: {0}")]
    InvalidRequest(#[from] RouteRequestError),
    /// Landmark search found nothing in band.
    #[error("could not generate a route: no landmarks found for the {phase}")]
    NoLandmarks {
        /// Phase that searched.
        phase: RoutePhase,
    },
    /// No candidate had obtainable imagery.
    #[error("could not generate a route: no street view image for the {phase} after {tried} candidates")]
    NoImage {
        /// Phase that selected.
        phase: RoutePhase,
        /// Candidates attempted.
        tried: usize,
        /// Unavailability reported for the last candidate tried.
        #[source]
        last_failure: Option<GatewayError>,
    },
    /// The provider found no walking route.
    #[error("could not generate a route: no walking route available")]
    RouteUnavailable(#[source] GatewayError),
    /// A collaborator could not be reached.
    #[error(transparent)]
    Gateway(GatewayError),
}

impl RouteGenerationError {
    /// Whether this is a "nothing usable" failure rather than an outage.
    ///
    /// [`Self::InvalidRequest`] counts as a domain failure since no provider
    /// call is involved. Match on the variant to single out caller mistakes.
    pub const fn is_domain_failure(&self) -> bool {
        !matches!(self, Self::Gateway(_))
    }

    fn undecodable_route(err: PathError) -> Self {
        Self::RouteUnavailable(GatewayError::Unavailable {
            service: Service::Directions,
            message: format!("unusable route polyline: {err}"),
        })
    }

    fn from_selection(phase: RoutePhase, err: SelectionError) -> Self {
        match err {
            SelectionError::NoImage {
                tried,
                last_failure,
            } => Self::NoImage {
                phase,
                tried,
                last_failure,
            },
            SelectionError::Gateway(err) => Self::Gateway(err),
        }
    }
}

/// Tuning for [`RouteGenerator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteGeneratorConfig {
    /// Budget for the destination search.
    pub destination_budget: SearchBudget,
    /// Budget for the midpoint search.
    pub midpoint_budget: SearchBudget,
    /// Smallest midpoint search target in metres.
    pub min_midpoint_radius_m: f64,
    /// Route radius divisor giving the midpoint search target.
    pub midpoint_radius_divisor: f64,
    /// Size of fetched images.
    pub image_size: ImageSize,
}

impl Default for RouteGeneratorConfig {
    fn default() -> Self {
        Self {
            destination_budget: SearchBudget::default(),
            midpoint_budget: SearchBudget::default()
                .with_rank_preference(RankPreference::Distance),
            min_midpoint_radius_m: DEFAULT_MIN_MIDPOINT_RADIUS_M,
            midpoint_radius_divisor: DEFAULT_MIDPOINT_RADIUS_DIVISOR,
            image_size: ImageSize::default(),
        }
    }
}

impl RouteGeneratorConfig {
    /// Set the destination search budget.
    #[must_use]
    pub const fn with_destination_budget(mut self, budget: SearchBudget) -> Self {
        self.destination_budget = budget;
        self
    }

    /// Set the midpoint search budget.
    #[must_use]
    pub const fn with_midpoint_budget(mut self, budget: SearchBudget) -> Self {
        self.midpoint_budget = budget;
        self
    }

    /// Set the fetched image size.
    #[must_use]
    pub const fn with_image_size(mut self, size: ImageSize) -> Self {
        self.image_size = size;
        self
    }

    /// Target distance for the midpoint search given the route radius.
    ///
    /// # Examples
    /// ```
    /// use stroll_core::RouteGeneratorConfig;
    ///
    /// let config = RouteGeneratorConfig::default();
    /// assert_eq!(config.midpoint_search_radius(1_000.0), 300.0);
    /// assert_eq!(config.midpoint_search_radius(4_000.0), 1_000.0);
    /// ```
    pub fn midpoint_search_radius(&self, effective_radius_m: f64) -> f64 {
        let divisor = self.midpoint_radius_divisor;
        if divisor.is_finite() && divisor > 0.0 {
            self.min_midpoint_radius_m.max(effective_radius_m / divisor)
        } else {
            self.min_midpoint_radius_m
        }
    }
}

/// A generated walk.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    /// Starting point.
    pub departure: Coordinate,
    /// End point.
    pub destination: Coordinate,
    /// Landmark chosen as destination; `None` for explicit requests.
    pub destination_landmark: Option<Landmark>,
    /// Image looking at the destination.
    pub destination_image: Option<StreetViewImage>,
    /// Geodesic midpoint between departure and destination.
    pub geodesic_midpoint: Coordinate,
    /// Pass-through waypoint of the route.
    pub midpoint: Coordinate,
    /// Landmark at the pass-through waypoint.
    pub midpoint_landmark: Landmark,
    /// Image looking at the midpoint landmark.
    pub midpoint_image: StreetViewImage,
    /// Provider-encoded polyline for the whole walk.
    pub combined_polyline: String,
    /// Vertices of [`Self::combined_polyline`] in walking order.
    pub route_coordinates: Vec<Coordinate>,
    /// Middle vertex of the decoded route, used to centre a map view.
    pub route_center: Coordinate,
    /// In-band destination candidates found; zero for explicit requests.
    pub destination_candidates: usize,
    /// In-band midpoint candidates found.
    pub midpoint_candidates: usize,
}

#[derive(Debug)]
struct DestinationChoice {
    coordinate: Coordinate,
    landmark: Option<Landmark>,
    image: StreetViewImage,
    candidates: usize,
}

#[derive(Debug)]
struct MidpointChoice {
    geodesic: Coordinate,
    landmark: Landmark,
    image: StreetViewImage,
    candidates: usize,
}

#[derive(Debug)]
enum State {
    DetermineDestination,
    DetermineMidpoint(DestinationChoice),
    RequestRoute(DestinationChoice, MidpointChoice),
    Done(RouteResult),
}

impl State {
    const fn name(&self) -> &'static str {
        match self {
            Self::DetermineDestination => "determine-destination",
            Self::DetermineMidpoint(_) => "determine-midpoint",
            Self::RequestRoute(..) => "request-route",
            Self::Done(_) => "done",
        }
    }
}

/// Generates landmark routes through a [`MapsGateway`].
///
/// # Examples
/// ```
/// use stroll_core::test_support::StubGateway;
/// use stroll_core::{Coordinate, RouteGenerator, RouteRequest, geodesy};
///
/// let start = Coordinate::new(35.6812, 139.7671).expect("valid");
/// let end = geodesy::destination_point(start, 1_200.0, 90.0);
/// let middle = geodesy::geodesic_midpoint(start, end);
/// let gateway = StubGateway::new().with_ring_landmarks("mid", middle, 300.0, 6);
///
/// let generator = RouteGenerator::new(gateway);
/// let route = generator.generate(RouteRequest::explicit(start, end))?;
/// assert_eq!(route.destination, end);
/// assert!(route.midpoint_landmark.place_id().starts_with("mid-"));
/// # Ok::<(), stroll_core::RouteGenerationError>(())
/// ```
#[derive(Debug)]
pub struct RouteGenerator<G> {
    gateway: G,
    config: RouteGeneratorConfig,
}

impl<G> RouteGenerator<G>
where
    G: MapsGateway,
{
    /// Generator with default tuning.
    pub fn new(gateway: G) -> Self {
        Self::with_config(gateway, RouteGeneratorConfig::default())
    }

    /// Generator with explicit tuning.
    pub const fn with_config(gateway: G, config: RouteGeneratorConfig) -> Self {
        Self { gateway, config }
    }

    /// Gateway used for every call.
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Active tuning.
    pub const fn config(&self) -> &RouteGeneratorConfig {
        &self.config
    }

    /// Generate a route for `request`.
    ///
    /// # Errors
    ///
    /// Domain variants of [`RouteGenerationError`] when no usable landmark,
    /// image or route exists; [`RouteGenerationError::Gateway`] when the
    /// provider is unreachable.
    pub fn generate(&self, request: RouteRequest) -> Result<RouteResult, RouteGenerationError> {
        self.generate_with(&mut rand::thread_rng(), request)
    }

    /// [`Self::generate`] with a caller-supplied generator for probe order
    /// and candidate shuffling.
    pub fn generate_with<R>(
        &self,
        rng: &mut R,
        request: RouteRequest,
    ) -> Result<RouteResult, RouteGenerationError>
    where
        R: Rng + ?Sized,
    {
        self.run(rng, request).inspect_err(|err| {
            if err.is_domain_failure() {
                log::warn!("route generation failed: {err}");
            } else {
                log::error!("route generation aborted by provider failure: {err}");
            }
        })
    }

    fn run<R>(&self, rng: &mut R, request: RouteRequest) -> Result<RouteResult, RouteGenerationError>
    where
        R: Rng + ?Sized,
    {
        let mut state = State::DetermineDestination;
        loop {
            log::debug!("route generation: {}", state.name());
            state = match state {
                State::DetermineDestination => {
                    State::DetermineMidpoint(self.determine_destination(rng, request)?)
                }
                State::DetermineMidpoint(destination) => {
                    let midpoint = self.determine_midpoint(rng, request, &destination)?;
                    State::RequestRoute(destination, midpoint)
                }
                State::RequestRoute(destination, midpoint) => {
                    State::Done(self.request_route(request, destination, midpoint)?)
                }
                State::Done(result) => return Ok(result),
            };
        }
    }

    fn selector(&self) -> ImageSelector<'_, G> {
        ImageSelector::new(&self.gateway, self.config.image_size)
    }

    fn determine_destination<R>(
        &self,
        rng: &mut R,
        request: RouteRequest,
    ) -> Result<DestinationChoice, RouteGenerationError>
    where
        R: Rng + ?Sized,
    {
        match request {
            RouteRequest::Explicit { destination, .. } => {
                let image = self.selector().fetch_image(destination).map_err(|err| {
                    if err.is_transport() {
                        RouteGenerationError::Gateway(err)
                    } else {
                        RouteGenerationError::NoImage {
                            phase: RoutePhase::Destination,
                            tried: 1,
                            last_failure: Some(err),
                        }
                    }
                })?;
                Ok(DestinationChoice {
                    coordinate: destination,
                    landmark: None,
                    image,
                    candidates: 0,
                })
            }
            RouteRequest::Random { current, radius_m } => {
                validate_radius(radius_m)?;
                let outcome = LandmarkSearch::new(&self.gateway).search_with(
                    rng,
                    current,
                    radius_m,
                    &self.config.destination_budget,
                );
                if outcome.is_empty() {
                    return Err(RouteGenerationError::NoLandmarks {
                        phase: RoutePhase::Destination,
                    });
                }
                let candidates = outcome.landmarks.len();
                let mut shuffled = outcome.landmarks;
                shuffled.shuffle(rng);
                let (landmark, image) = self
                    .selector()
                    .select(&shuffled)
                    .map_err(|err| RouteGenerationError::from_selection(RoutePhase::Destination, err))?;
                log::info!(
                    "destination {} ({}) chosen from {candidates} candidates",
                    landmark.display_name(),
                    landmark.place_id()
                );
                Ok(DestinationChoice {
                    coordinate: landmark.coordinate(),
                    landmark: Some(landmark),
                    image,
                    candidates,
                })
            }
        }
    }

    fn determine_midpoint<R>(
        &self,
        rng: &mut R,
        request: RouteRequest,
        destination: &DestinationChoice,
    ) -> Result<MidpointChoice, RouteGenerationError>
    where
        R: Rng + ?Sized,
    {
        let current = request.current();
        let geodesic = geodesy::geodesic_midpoint(current, destination.coordinate);
        let effective_radius = match request {
            RouteRequest::Random { radius_m, .. } => radius_m,
            RouteRequest::Explicit { .. } => geodesy::distance(current, destination.coordinate),
        };
        let search_radius = self.config.midpoint_search_radius(effective_radius);
        log::debug!("midpoint search at {geodesic} with target {search_radius:.0} m");

        let outcome = LandmarkSearch::new(&self.gateway).search_with(
            rng,
            geodesic,
            search_radius,
            &self.config.midpoint_budget,
        );
        if outcome.is_empty() {
            return Err(RouteGenerationError::NoLandmarks {
                phase: RoutePhase::Midpoint,
            });
        }
        let candidates = outcome.landmarks.len();
        let mut by_distance = outcome.landmarks;
        by_distance.sort_by(|a, b| {
            geodesy::distance(geodesic, a.coordinate())
                .total_cmp(&geodesy::distance(geodesic, b.coordinate()))
        });
        let (landmark, image) = self
            .selector()
            .select(&by_distance)
            .map_err(|err| RouteGenerationError::from_selection(RoutePhase::Midpoint, err))?;
        log::info!(
            "midpoint {} ({}) chosen from {candidates} candidates",
            landmark.display_name(),
            landmark.place_id()
        );
        Ok(MidpointChoice {
            geodesic,
            landmark,
            image,
            candidates,
        })
    }

    fn request_route(
        &self,
        request: RouteRequest,
        destination: DestinationChoice,
        midpoint: MidpointChoice,
    ) -> Result<RouteResult, RouteGenerationError> {
        let current = request.current();
        let via = midpoint.landmark.coordinate();
        let combined_polyline = self
            .gateway
            .combined_route(current, destination.coordinate, Some(via))
            .map_err(|err| {
                if err.is_transport() {
                    RouteGenerationError::Gateway(err)
                } else {
                    RouteGenerationError::RouteUnavailable(err)
                }
            })?;
        let route_coordinates =
            decode_polyline(&combined_polyline).map_err(RouteGenerationError::undecodable_route)?;
        let route_center =
            path_midpoint(&route_coordinates).map_err(RouteGenerationError::undecodable_route)?;
        log::debug!(
            "route has {} vertices centred on {route_center}",
            route_coordinates.len()
        );
        Ok(RouteResult {
            departure: current,
            destination: destination.coordinate,
            destination_landmark: destination.landmark,
            destination_image: Some(destination.image),
            geodesic_midpoint: midpoint.geodesic,
            midpoint: via,
            midpoint_landmark: midpoint.landmark,
            midpoint_image: midpoint.image,
            combined_polyline,
            route_coordinates,
            route_center,
            destination_candidates: destination.candidates,
            midpoint_candidates: midpoint.candidates,
        })
    }
}
