//! Directions API wire types.

use serde::Deserialize;
use serde::de::IgnoredAny;
use stroll_core::street_view::STATUS_OK;
use stroll_core::{GatewayError, Service};

/// Response from `directions/json`.
#[derive(Debug, Deserialize)]
pub(crate) struct DirectionsResponse {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Route {
    pub overview_polyline: Option<Polyline>,
    #[serde(default)]
    pub legs: Vec<IgnoredAny>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Polyline {
    pub points: String,
}

impl DirectionsResponse {
    /// Encoded overview polyline of the first route.
    pub(crate) fn into_polyline(self) -> Result<String, GatewayError> {
        let unavailable = |message: String| GatewayError::Unavailable {
            service: Service::Directions,
            message,
        };
        if self.status != STATUS_OK {
            return Err(unavailable(match self.error_message {
                Some(detail) => format!("{}: {detail}", self.status),
                None => self.status,
            }));
        }
        let route = self
            .routes
            .into_iter()
            .next()
            .filter(|route| !route.legs.is_empty())
            .ok_or_else(|| unavailable("no route found".to_owned()))?;
        route
            .overview_polyline
            .map(|polyline| polyline.points)
            .ok_or_else(|| unavailable("route has no overview polyline".to_owned()))
    }
}
