//! Places API (New) nearby-search wire types.

use serde::{Deserialize, Serialize};
use stroll_core::{Coordinate, Landmark, RankPreference};

/// Field mask naming the place attributes a search returns.
pub(crate) const FIELD_MASK: &str =
    "places.id,places.displayName,places.location,places.primaryType,places.types,places.rating";

/// Most results a single nearby search may return.
pub(crate) const MAX_RESULT_COUNT: u32 = 20;

/// Largest circle radius the API accepts, in metres.
pub(crate) const MAX_RADIUS_M: f64 = 50_000.0;

/// Body of a `places:searchNearby` request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchNearbyRequest {
    max_result_count: u32,
    rank_preference: &'static str,
    location_restriction: LocationRestriction,
    #[serde(skip_serializing_if = "Option::is_none")]
    language_code: Option<String>,
}

#[derive(Debug, Serialize)]
struct LocationRestriction {
    circle: Circle,
}

#[derive(Debug, Serialize)]
struct Circle {
    center: LatLng,
    radius: f64,
}

#[derive(Debug, Serialize)]
struct LatLng {
    latitude: f64,
    longitude: f64,
}

impl SearchNearbyRequest {
    /// Build a request for places within `radius_m` of `center`.
    ///
    /// The radius is capped at [`MAX_RADIUS_M`].
    pub(crate) fn new(
        center: Coordinate,
        radius_m: f64,
        rank: RankPreference,
        language_code: Option<String>,
    ) -> Self {
        Self {
            max_result_count: MAX_RESULT_COUNT,
            rank_preference: match rank {
                RankPreference::Popularity => "POPULARITY",
                RankPreference::Distance => "DISTANCE",
            },
            location_restriction: LocationRestriction {
                circle: Circle {
                    center: LatLng {
                        latitude: center.latitude(),
                        longitude: center.longitude(),
                    },
                    radius: radius_m.min(MAX_RADIUS_M),
                },
            },
            language_code,
        }
    }
}

/// Response from `places:searchNearby`.
///
/// The API omits `places` entirely when nothing matched.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchNearbyResponse {
    #[serde(default)]
    pub places: Vec<Place>,
}

/// A single place in a nearby-search response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Place {
    #[serde(default)]
    pub id: String,
    pub display_name: Option<LocalizedText>,
    pub location: Option<LatLngLiteral>,
    pub primary_type: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
    pub rating: Option<f32>,
}

/// Localised text such as a display name.
#[derive(Debug, Deserialize)]
pub(crate) struct LocalizedText {
    pub text: String,
}

/// Position of a place.
#[derive(Debug, Deserialize)]
pub(crate) struct LatLngLiteral {
    pub latitude: f64,
    pub longitude: f64,
}

impl SearchNearbyResponse {
    /// Convert places into landmarks, skipping malformed entries.
    pub(crate) fn into_landmarks(self) -> Vec<Landmark> {
        self.places
            .into_iter()
            .filter_map(|place| {
                let id = place.id.clone();
                place
                    .into_landmark()
                    .inspect_err(|reason| log::warn!("skipping place {id}: {reason}"))
                    .ok()
            })
            .collect()
    }
}

impl Place {
    fn into_landmark(self) -> Result<Landmark, String> {
        let location = self.location.ok_or("missing location")?;
        let coordinate = Coordinate::new(location.latitude, location.longitude)
            .map_err(|err| err.to_string())?;
        let name = self.display_name.map(|name| name.text).unwrap_or_default();
        let mut landmark =
            Landmark::new(self.id, name, coordinate).map_err(|err| err.to_string())?;
        if let Some(primary_type) = self.primary_type {
            landmark = landmark.with_primary_type(primary_type);
        }
        if !self.types.is_empty() {
            landmark = landmark.with_types(self.types);
        }
        match self.rating {
            Some(rating) => landmark.with_rating(rating).map_err(|err| err.to_string()),
            None => Ok(landmark),
        }
    }
}
