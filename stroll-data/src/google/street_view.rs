//! Street View Static API metadata wire types.

use serde::Deserialize;
use stroll_core::{Coordinate, GatewayError, Service, StreetViewMetadata};

/// Response from `streetview/metadata`.
#[derive(Debug, Deserialize)]
pub(crate) struct MetadataResponse {
    pub status: String,
    pub location: Option<LatLng>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl MetadataResponse {
    /// Interpret the status and panorama location.
    pub(crate) fn into_metadata(self) -> Result<StreetViewMetadata, GatewayError> {
        let location = self
            .location
            .map(|at| Coordinate::new(at.lat, at.lng))
            .transpose()
            .map_err(|err| GatewayError::Unavailable {
                service: Service::StreetViewMetadata,
                message: err.to_string(),
            })?;
        StreetViewMetadata::from_status(self.status, location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn convert(json: &str) -> Result<StreetViewMetadata, GatewayError> {
        serde_json::from_str::<MetadataResponse>(json)
            .expect("valid JSON")
            .into_metadata()
    }

    #[rstest]
    fn ok_status_carries_panorama_location() {
        let metadata = convert(
            r#"{"status": "OK", "location": {"lat": 35.68, "lng": 139.76},
                "pano_id": "abc", "date": "2023-04", "copyright": "Google"}"#,
        )
        .expect("complete metadata");

        assert_eq!(
            metadata.location(),
            Some(Coordinate::new(35.68, 139.76).expect("valid"))
        );
    }

    #[rstest]
    #[case("ZERO_RESULTS")]
    #[case("NOT_FOUND")]
    fn other_statuses_are_unavailable(#[case] status: &str) {
        let metadata =
            convert(&format!(r#"{{"status": "{status}"}}"#)).expect("valid metadata");

        assert_eq!(
            metadata,
            StreetViewMetadata::Unavailable {
                status: status.to_owned()
            }
        );
    }

    #[rstest]
    #[case::missing(r#"{"status": "OK"}"#)]
    #[case::out_of_range(r#"{"status": "OK", "location": {"lat": 120.0, "lng": 0.0}}"#)]
    fn ok_without_usable_location_is_an_error(#[case] json: &str) {
        let err = convert(json).expect_err("location is required");
        assert!(!err.is_transport());
        assert_eq!(err.service(), Service::StreetViewMetadata);
    }
}
