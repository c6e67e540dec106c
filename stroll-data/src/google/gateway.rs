//! Blocking [`MapsGateway`] over the Google Maps Platform HTTP APIs.

use std::error::Error as _;
use std::future::Future;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use stroll_core::{
    Coordinate, GatewayError, ImageSize, Landmark, MapsGateway, RankPreference, Service,
    StreetViewMetadata,
};
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

use super::config::GoogleMapsConfig;
use super::directions::DirectionsResponse;
use super::places::{FIELD_MASK, SearchNearbyRequest, SearchNearbyResponse};
use super::roads::NearestRoadsResponse;
use super::street_view::MetadataResponse;
use crate::CallCache;

/// Error type for [`GoogleMapsGateway`] construction failures.
#[derive(Debug)]
pub enum GatewayBuildError {
    /// A configured base URL could not be parsed.
    BaseUrl {
        /// The rejected URL.
        url: String,
        /// Parser error.
        source: url::ParseError,
    },
    /// Failed to build the HTTP client.
    HttpClient(reqwest::Error),
    /// Failed to build the Tokio runtime.
    Runtime(std::io::Error),
}

impl std::fmt::Display for GatewayBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BaseUrl { url, source } => write!(f, "invalid base URL {url:?}: {source}"),
            Self::HttpClient(err) => write!(f, "failed to build HTTP client: {err}"),
            Self::Runtime(err) => write!(f, "failed to build Tokio runtime: {err}"),
        }
    }
}

impl std::error::Error for GatewayBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::BaseUrl { source, .. } => Some(source),
            Self::HttpClient(err) => Some(err),
            Self::Runtime(err) => Some(err),
        }
    }
}

/// Resolved endpoint URLs, without query strings.
#[derive(Debug, Clone)]
struct Endpoints {
    search_nearby: Url,
    nearest_roads: Url,
    street_view_metadata: Url,
    street_view_image: Url,
    directions: Url,
}

impl Endpoints {
    fn resolve(config: &GoogleMapsConfig) -> Result<Self, GatewayBuildError> {
        Ok(Self {
            search_nearby: endpoint(&config.places_base_url, "places:searchNearby")?,
            nearest_roads: endpoint(&config.roads_base_url, "nearestRoads")?,
            street_view_metadata: endpoint(&config.maps_base_url, "streetview/metadata")?,
            street_view_image: endpoint(&config.maps_base_url, "streetview")?,
            directions: endpoint(&config.maps_base_url, "directions/json")?,
        })
    }
}

fn endpoint(base_url: &str, path: &str) -> Result<Url, GatewayBuildError> {
    let joined = format!("{}/{path}", base_url.trim_end_matches('/'));
    Url::parse(&joined).map_err(|source| GatewayBuildError::BaseUrl {
        url: base_url.to_owned(),
        source,
    })
}

fn with_query(endpoint: &Url, pairs: &[(&str, &str)]) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut().extend_pairs(pairs);
    url
}

type SearchKey = (Coordinate, u64, RankPreference);
type RouteKey = (Coordinate, Coordinate, Option<Coordinate>);

/// Google Maps Platform implementation of [`MapsGateway`].
///
/// Each trait method blocks on an asynchronous `reqwest` call. The gateway
/// owns a Tokio runtime that is reused across calls.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime, calls run on the stored runtime. Inside a
/// multi-threaded runtime they use [`tokio::task::block_in_place`] with the
/// caller's handle. A `current_thread` runtime cannot be blocked in place,
/// so there the request runs on the stored runtime from a scoped helper
/// thread while the caller's executor waits for it.
///
/// # Caching
///
/// Successful results are memoised per method in a [`CallCache`] keyed by
/// the call arguments. Failures always reach the network again.
pub struct GoogleMapsGateway {
    client: Client,
    config: GoogleMapsConfig,
    endpoints: Endpoints,
    runtime: Runtime,
    searches: CallCache<SearchKey, Vec<Landmark>>,
    snaps: CallCache<Coordinate, Option<Coordinate>>,
    metadata: CallCache<Coordinate, StreetViewMetadata>,
    images: CallCache<(Coordinate, ImageSize), Vec<u8>>,
    routes: CallCache<RouteKey, String>,
}

impl std::fmt::Debug for GoogleMapsGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleMapsGateway")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .field("searches", &self.searches)
            .field("snaps", &self.snaps)
            .field("metadata", &self.metadata)
            .field("images", &self.images)
            .field("routes", &self.routes)
            .finish_non_exhaustive()
    }
}

impl GoogleMapsGateway {
    /// Create a gateway with default configuration for `api_key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(api_key: impl Into<String>) -> Result<Self, GatewayBuildError> {
        Self::with_config(GoogleMapsConfig::new(api_key))
    }

    /// Create a gateway with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a base URL is invalid or the HTTP client or
    /// Tokio runtime fails to build.
    pub fn with_config(config: GoogleMapsConfig) -> Result<Self, GatewayBuildError> {
        let endpoints = Endpoints::resolve(&config)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(GatewayBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(GatewayBuildError::Runtime)?;
        let capacity = config.cache_capacity;
        Ok(Self {
            client,
            endpoints,
            runtime,
            searches: CallCache::new("nearby search", capacity),
            snaps: CallCache::new("snap to road", capacity),
            metadata: CallCache::new("street view metadata", capacity),
            images: CallCache::new("street view image", capacity),
            routes: CallCache::new("directions", capacity),
            config,
        })
    }

    /// The configuration this gateway was built with.
    pub const fn config(&self) -> &GoogleMapsConfig {
        &self.config
    }

    /// Drop every memoised result.
    pub fn clear_caches(&self) {
        self.searches.clear();
        self.snaps.clear();
        self.metadata.clear();
        self.images.clear();
        self.routes.clear();
    }

    fn block_on<F>(&self, future: F) -> F::Output
    where
        F: Future + Send,
        F::Output: Send,
    {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            Ok(_) => std::thread::scope(|scope| {
                scope
                    .spawn(|| self.runtime.block_on(future))
                    .join()
                    .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
            }),
            Err(_) => self.runtime.block_on(future),
        }
    }

    async fn send(
        &self,
        service: Service,
        request: RequestBuilder,
    ) -> Result<reqwest::Response, GatewayError> {
        log::debug!("sending {service} request");
        request
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| self.convert_reqwest_error(service, err))
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        service: Service,
        request: RequestBuilder,
    ) -> Result<T, GatewayError> {
        self.send(service, request)
            .await?
            .json()
            .await
            .map_err(|err| self.convert_body_error(service, err))
    }

    /// Convert a reqwest error to a [`GatewayError`].
    ///
    /// The request URL is stripped first since it may carry the API key.
    fn convert_reqwest_error(&self, service: Service, error: reqwest::Error) -> GatewayError {
        let error = error.without_url();
        if error.is_timeout() {
            return GatewayError::Timeout {
                service,
                timeout_secs: self.config.timeout.as_secs(),
            };
        }
        if let Some(status) = error.status() {
            return GatewayError::Http {
                service,
                status: status.as_u16(),
                message: describe(&error),
            };
        }
        GatewayError::Transport {
            service,
            message: describe(&error),
        }
    }

    /// Undecodable bodies are unusable data rather than transport failures.
    fn convert_body_error(&self, service: Service, error: reqwest::Error) -> GatewayError {
        if error.is_decode() {
            GatewayError::Unavailable {
                service,
                message: describe(&error.without_url()),
            }
        } else {
            self.convert_reqwest_error(service, error)
        }
    }

    async fn search_nearby_async(
        &self,
        center: Coordinate,
        radius_m: f64,
        rank: RankPreference,
    ) -> Result<Vec<Landmark>, GatewayError> {
        let body =
            SearchNearbyRequest::new(center, radius_m, rank, self.config.language_code.clone());
        let request = self
            .client
            .post(self.endpoints.search_nearby.clone())
            .header("X-Goog-Api-Key", &self.config.api_key)
            .header("X-Goog-FieldMask", FIELD_MASK)
            .json(&body);
        let response: SearchNearbyResponse = self.fetch_json(Service::Places, request).await?;
        Ok(response.into_landmarks())
    }

    async fn snap_to_road_async(
        &self,
        coordinate: Coordinate,
    ) -> Result<Option<Coordinate>, GatewayError> {
        let point = coordinate.to_string();
        let url = with_query(
            &self.endpoints.nearest_roads,
            &[("points", point.as_str()), ("key", self.config.api_key.as_str())],
        );
        let response: NearestRoadsResponse =
            self.fetch_json(Service::Roads, self.client.get(url)).await?;
        response
            .nearest()
            .map_err(|err| GatewayError::Unavailable {
                service: Service::Roads,
                message: err.to_string(),
            })
    }

    async fn street_view_metadata_async(
        &self,
        coordinate: Coordinate,
    ) -> Result<StreetViewMetadata, GatewayError> {
        let location = coordinate.to_string();
        let url = with_query(
            &self.endpoints.street_view_metadata,
            &[
                ("location", location.as_str()),
                ("key", self.config.api_key.as_str()),
            ],
        );
        let response: MetadataResponse = self
            .fetch_json(Service::StreetViewMetadata, self.client.get(url))
            .await?;
        response.into_metadata()
    }

    async fn street_view_image_async(
        &self,
        coordinate: Coordinate,
        size: ImageSize,
    ) -> Result<Vec<u8>, GatewayError> {
        let location = coordinate.to_string();
        let size = size.to_string();
        let url = with_query(
            &self.endpoints.street_view_image,
            &[
                ("size", size.as_str()),
                ("location", location.as_str()),
                ("key", self.config.api_key.as_str()),
            ],
        );
        let service = Service::StreetViewImage;
        let bytes = self
            .send(service, self.client.get(url))
            .await?
            .bytes()
            .await
            .map_err(|err| self.convert_reqwest_error(service, err))?;
        Ok(bytes.to_vec())
    }

    async fn combined_route_async(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        via: Option<Coordinate>,
    ) -> Result<String, GatewayError> {
        let origin = origin.to_string();
        let destination = destination.to_string();
        let waypoints = via.map(|point| format!("via:{point}"));
        let mut pairs = vec![
            ("origin", origin.as_str()),
            ("destination", destination.as_str()),
            ("mode", "walking"),
        ];
        if let Some(waypoints) = &waypoints {
            pairs.push(("waypoints", waypoints.as_str()));
        }
        pairs.push(("key", self.config.api_key.as_str()));
        let url = with_query(&self.endpoints.directions, &pairs);
        let response: DirectionsResponse = self
            .fetch_json(Service::Directions, self.client.get(url))
            .await?;
        response.into_polyline()
    }
}

fn describe(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl MapsGateway for GoogleMapsGateway {
    fn search_nearby(
        &self,
        center: Coordinate,
        radius_m: f64,
        rank: RankPreference,
    ) -> Result<Vec<Landmark>, GatewayError> {
        self.searches
            .get_or_try_insert_with((center, radius_m.to_bits(), rank), || {
                self.block_on(self.search_nearby_async(center, radius_m, rank))
            })
    }

    fn snap_to_road(&self, coordinate: Coordinate) -> Result<Option<Coordinate>, GatewayError> {
        self.snaps.get_or_try_insert_with(coordinate, || {
            self.block_on(self.snap_to_road_async(coordinate))
        })
    }

    fn street_view_metadata(
        &self,
        coordinate: Coordinate,
    ) -> Result<StreetViewMetadata, GatewayError> {
        self.metadata.get_or_try_insert_with(coordinate, || {
            self.block_on(self.street_view_metadata_async(coordinate))
        })
    }

    fn street_view_image(
        &self,
        coordinate: Coordinate,
        size: ImageSize,
    ) -> Result<Vec<u8>, GatewayError> {
        self.images.get_or_try_insert_with((coordinate, size), || {
            self.block_on(self.street_view_image_async(coordinate, size))
        })
    }

    fn combined_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        via: Option<Coordinate>,
    ) -> Result<String, GatewayError> {
        self.routes
            .get_or_try_insert_with((origin, destination, via), || {
                self.block_on(self.combined_route_async(origin, destination, via))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google::test_server::{IMAGE_BYTES, POLYLINE, TestServer};
    use rstest::{fixture, rstest};
    use std::time::Duration;

    const SECRET: &str = "secret-key";

    /// Nothing listens on the discard port, so connections are refused.
    const UNREACHABLE: &str = "http://127.0.0.1:9";

    #[fixture]
    fn here() -> Coordinate {
        Coordinate::new(35.6812, 139.7671).expect("valid coordinate")
    }

    #[fixture]
    fn unreachable_gateway() -> GoogleMapsGateway {
        let config = GoogleMapsConfig::new(SECRET)
            .with_places_base_url(UNREACHABLE)
            .with_roads_base_url(UNREACHABLE)
            .with_maps_base_url(format!("{UNREACHABLE}/maps/api/"))
            .with_timeout(Duration::from_secs(2));
        GoogleMapsGateway::with_config(config).expect("gateway should build")
    }

    #[fixture]
    fn server() -> TestServer {
        TestServer::start()
    }

    fn gateway_for(server: &TestServer) -> GoogleMapsGateway {
        let base = server.base_url();
        let config = GoogleMapsConfig::new(SECRET)
            .with_places_base_url(base)
            .with_roads_base_url(base)
            .with_maps_base_url(format!("{base}/maps/api"))
            .with_language_code("ja")
            .with_timeout(Duration::from_secs(5));
        GoogleMapsGateway::with_config(config).expect("gateway should build")
    }

    #[rstest]
    fn endpoints_use_default_hosts() {
        let endpoints = Endpoints::resolve(&GoogleMapsConfig::new(SECRET)).expect("valid URLs");

        assert_eq!(
            endpoints.search_nearby.as_str(),
            "https://places.googleapis.com/v1/places:searchNearby"
        );
        assert_eq!(
            endpoints.nearest_roads.as_str(),
            "https://roads.googleapis.com/v1/nearestRoads"
        );
        assert_eq!(
            endpoints.street_view_metadata.as_str(),
            "https://maps.googleapis.com/maps/api/streetview/metadata"
        );
        assert_eq!(
            endpoints.directions.as_str(),
            "https://maps.googleapis.com/maps/api/directions/json"
        );
    }

    #[rstest]
    fn endpoints_strip_trailing_slash() {
        let config = GoogleMapsConfig::new(SECRET).with_maps_base_url("http://proxy.local/api/");
        let endpoints = Endpoints::resolve(&config).expect("valid URLs");

        assert_eq!(
            endpoints.street_view_image.as_str(),
            "http://proxy.local/api/streetview"
        );
    }

    #[rstest]
    fn invalid_base_url_is_rejected() {
        let config = GoogleMapsConfig::new(SECRET).with_roads_base_url("not a url");

        let err = GoogleMapsGateway::with_config(config).expect_err("should fail");

        assert!(matches!(err, GatewayBuildError::BaseUrl { ref url, .. } if url == "not a url"));
    }

    #[rstest]
    fn query_pairs_are_encoded(here: Coordinate) {
        let endpoints = Endpoints::resolve(&GoogleMapsConfig::new(SECRET)).expect("valid URLs");
        let location = here.to_string();

        let url = with_query(
            &endpoints.directions,
            &[("location", location.as_str()), ("waypoints", "via:1,2")],
        );

        assert_eq!(
            url.query(),
            Some("location=35.6812%2C139.7671&waypoints=via%3A1%2C2")
        );
    }

    #[rstest]
    fn refused_connection_is_a_transport_failure(
        unreachable_gateway: GoogleMapsGateway,
        here: Coordinate,
    ) {
        let err = unreachable_gateway
            .snap_to_road(here)
            .expect_err("nothing is listening");

        assert!(err.is_transport());
        assert_eq!(err.service(), Service::Roads);
        assert!(!err.to_string().contains(SECRET));
    }

    #[rstest]
    fn failures_are_not_cached(unreachable_gateway: GoogleMapsGateway, here: Coordinate) {
        let first = unreachable_gateway.street_view_metadata(here);
        let second = unreachable_gateway.street_view_metadata(here);

        assert!(first.is_err());
        assert!(second.is_err());
        assert!(unreachable_gateway.metadata.is_empty());
    }

    #[rstest]
    fn blocks_inside_multi_threaded_runtime(
        unreachable_gateway: GoogleMapsGateway,
        here: Coordinate,
    ) {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .expect("runtime should build");

        let result =
            runtime.block_on(async { unreachable_gateway.combined_route(here, here, Some(here)) });

        let err = result.expect_err("nothing is listening");

        assert_eq!(err.service(), Service::Directions);
    }

    #[rstest]
    fn debug_output_hides_the_key(unreachable_gateway: GoogleMapsGateway) {
        let rendered = format!("{unreachable_gateway:?}");
        assert!(!rendered.contains(SECRET));
    }

    #[rstest]
    fn blocks_inside_current_thread_runtime(server: TestServer, here: Coordinate) {
        let gateway = gateway_for(&server);
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime should build");

        let snapped = runtime
            .block_on(async { gateway.snap_to_road(here) })
            .expect("server answers");

        assert_eq!(
            snapped,
            Some(Coordinate::new(35.6813, 139.7672).expect("valid coordinate"))
        );
    }

    #[rstest]
    fn nearby_search_posts_body_with_field_mask(server: TestServer, here: Coordinate) {
        let gateway = gateway_for(&server);

        let first = gateway
            .search_nearby(here, 800.0, RankPreference::Distance)
            .expect("search succeeds");
        let second = gateway
            .search_nearby(here, 800.0, RankPreference::Distance)
            .expect("cached search succeeds");

        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].place_id(), "tower");
        assert_eq!(first[0].display_name(), "Clock Tower");

        let requests = server.requests_to("places:searchNearby");
        assert_eq!(requests.len(), 1, "second search should come from the cache");
        let request = &requests[0];
        assert_eq!(request.method, "POST");
        assert_eq!(request.header("x-goog-api-key"), Some(SECRET));
        assert_eq!(request.header("x-goog-fieldmask"), Some(FIELD_MASK));
        let body: serde_json::Value =
            serde_json::from_slice(&request.body).expect("JSON request body");
        assert_eq!(body["maxResultCount"], 20);
        assert_eq!(body["rankPreference"], "DISTANCE");
        assert_eq!(body["languageCode"], "ja");
        let circle = &body["locationRestriction"]["circle"];
        assert_eq!(circle["radius"], 800.0);
        assert_eq!(circle["center"]["latitude"], here.latitude());
        assert_eq!(circle["center"]["longitude"], here.longitude());
    }

    #[rstest]
    fn directions_pass_the_midpoint_as_a_via_waypoint(server: TestServer, here: Coordinate) {
        let gateway = gateway_for(&server);
        let destination = Coordinate::new(35.6895, 139.6917).expect("valid coordinate");
        let via = Coordinate::new(35.6852, 139.7528).expect("valid coordinate");

        let polyline = gateway
            .combined_route(here, destination, Some(via))
            .expect("route succeeds");

        assert_eq!(polyline, POLYLINE);
        let requests = server.requests_to("directions/json");
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, "GET");
        assert_eq!(request.query("origin"), Some(here.to_string()));
        assert_eq!(request.query("destination"), Some(destination.to_string()));
        assert_eq!(request.query("mode").as_deref(), Some("walking"));
        assert_eq!(request.query("waypoints"), Some(format!("via:{via}")));
        assert_eq!(request.query("key").as_deref(), Some(SECRET));
    }

    #[rstest]
    fn street_view_returns_metadata_and_raw_image_bytes(server: TestServer, here: Coordinate) {
        let gateway = gateway_for(&server);
        let size = ImageSize::new(320, 240).expect("valid size");

        let metadata = gateway.street_view_metadata(here).expect("metadata");
        let first = gateway.street_view_image(here, size).expect("image");
        let second = gateway.street_view_image(here, size).expect("cached image");

        assert_eq!(
            metadata,
            StreetViewMetadata::Available {
                location: Coordinate::new(35.6814, 139.7673).expect("valid coordinate"),
            }
        );
        assert_eq!(first, IMAGE_BYTES);
        assert_eq!(second, IMAGE_BYTES);
        let requests = server.requests_to("/streetview");
        assert_eq!(requests.len(), 1, "second image should come from the cache");
        assert_eq!(requests[0].query("size").as_deref(), Some("320x240"));
        assert_eq!(requests[0].query("location"), Some(here.to_string()));
    }

    #[rstest]
    fn cleared_caches_reach_the_network_again(server: TestServer, here: Coordinate) {
        let gateway = gateway_for(&server);

        gateway.snap_to_road(here).expect("snap succeeds");
        gateway.clear_caches();
        gateway.snap_to_road(here).expect("snap succeeds again");

        assert_eq!(server.requests_to("nearestRoads").len(), 2);
    }
}
