//! Test helpers for building subcommand arguments and stub gateways.

use super::*;
use crate::gateway::GatewayBuilder;
use crate::street_view::StreetViewArgs;
use stroll_core::test_support::StubGateway;
use stroll_core::{Coordinate, MapsGateway, geodesy};
use stroll_data::GoogleMapsConfig;

pub(super) const API_KEY: &str = "test-key";

/// Tokyo Station.
pub(super) fn start() -> Coordinate {
    Coordinate::new(35.6812, 139.7671).expect("valid coordinate")
}

/// Explicit destination 1.2 km east of [`start`].
pub(super) fn destination() -> Coordinate {
    geodesy::destination_point(start(), 1_200.0, 90.0)
}

/// Arguments for an explicit route from [`start`] to [`destination`].
pub(super) fn explicit_args() -> GenerateArgs {
    GenerateArgs {
        lat: Some(start().latitude()),
        lng: Some(start().longitude()),
        dest_lat: Some(destination().latitude()),
        dest_lng: Some(destination().longitude()),
        api_key: Some(API_KEY.to_owned()),
        ..GenerateArgs::default()
    }
}

/// Arguments for a street view lookup at [`start`].
pub(super) fn street_view_args() -> StreetViewArgs {
    StreetViewArgs {
        lat: Some(start().latitude()),
        lng: Some(start().longitude()),
        api_key: Some(API_KEY.to_owned()),
        ..StreetViewArgs::default()
    }
}

/// Gateway with landmarks ringing the midpoint of the explicit route.
pub(super) fn midpoint_gateway() -> StubGateway {
    let middle = geodesy::geodesic_midpoint(start(), destination());
    StubGateway::new().with_ring_landmarks("mid", middle, 300.0, 6)
}

/// Builds a fresh stub gateway for every invocation.
pub(super) struct StubBuilder(pub(super) fn() -> StubGateway);

impl GatewayBuilder for StubBuilder {
    fn build(&self, _config: GoogleMapsConfig) -> Result<Box<dyn MapsGateway>, CliError> {
        Ok(Box::new((self.0)()))
    }
}
