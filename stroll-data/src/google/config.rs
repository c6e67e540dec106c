//! Configuration for [`GoogleMapsGateway`](super::GoogleMapsGateway).

use std::time::Duration;

/// Default user agent for Google Maps Platform requests.
pub const DEFAULT_USER_AGENT: &str = "stroll/0.1";

/// Default Places API (New) endpoint.
pub const DEFAULT_PLACES_BASE_URL: &str = "https://places.googleapis.com/v1";

/// Default Roads API endpoint.
pub const DEFAULT_ROADS_BASE_URL: &str = "https://roads.googleapis.com/v1";

/// Default endpoint shared by Directions and Street View Static.
pub const DEFAULT_MAPS_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Default number of cached results per gateway method.
pub const DEFAULT_CACHE_CAPACITY: usize = 128;

/// Configuration for [`GoogleMapsGateway`](super::GoogleMapsGateway).
///
/// Base URLs are overridable so requests can be routed through a proxy or a
/// local fake.
#[derive(Clone)]
pub struct GoogleMapsConfig {
    /// Google Maps Platform API key.
    pub api_key: String,
    /// Base URL of the Places API (New).
    pub places_base_url: String,
    /// Base URL of the Roads API.
    pub roads_base_url: String,
    /// Base URL of the Directions and Street View Static APIs.
    pub maps_base_url: String,
    /// Connect and request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Cached results kept per gateway method; zero disables caching.
    pub cache_capacity: usize,
    /// Preferred language for place names, such as `"ja"`.
    pub language_code: Option<String>,
}

impl std::fmt::Debug for GoogleMapsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleMapsConfig")
            .field("api_key", &"<redacted>")
            .field("places_base_url", &self.places_base_url)
            .field("roads_base_url", &self.roads_base_url)
            .field("maps_base_url", &self.maps_base_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("cache_capacity", &self.cache_capacity)
            .field("language_code", &self.language_code)
            .finish()
    }
}

impl GoogleMapsConfig {
    /// Create a configuration with default endpoints for `api_key`.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            places_base_url: DEFAULT_PLACES_BASE_URL.to_owned(),
            roads_base_url: DEFAULT_ROADS_BASE_URL.to_owned(),
            maps_base_url: DEFAULT_MAPS_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            language_code: None,
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the per-method cache capacity.
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Request place names in the given language.
    #[must_use]
    pub fn with_language_code(mut self, language_code: impl Into<String>) -> Self {
        self.language_code = Some(language_code.into());
        self
    }

    /// Override the Places API base URL.
    #[must_use]
    pub fn with_places_base_url(mut self, url: impl Into<String>) -> Self {
        self.places_base_url = url.into();
        self
    }

    /// Override the Roads API base URL.
    #[must_use]
    pub fn with_roads_base_url(mut self, url: impl Into<String>) -> Self {
        self.roads_base_url = url.into();
        self
    }

    /// Override the Directions and Street View base URL.
    #[must_use]
    pub fn with_maps_base_url(mut self, url: impl Into<String>) -> Self {
        self.maps_base_url = url.into();
        self
    }
}
