//! Behaviour-driven step definitions driving the street-view CLI scenarios.

use super::helpers::{API_KEY, StubBuilder, start};
use super::*;
use crate::street_view::{StreetViewConfig, run_street_view_with};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::{Cell, RefCell};
use stroll_core::test_support::StubGateway;
use stroll_core::{Coordinate, ImageSizeError};

/// Street-view CLI scenario state.
#[derive(Debug, Default)]
struct StreetViewWorld {
    cli_args: RefCell<Vec<String>>,
    without_imagery: Cell<bool>,
    output: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl StreetViewWorld {
    fn push_flag(&self, flag: &str, value: impl ToString) {
        self.cli_args
            .borrow_mut()
            .extend([format!("--{flag}"), value.to_string()]);
    }

    fn document(&self) -> serde_json::Value {
        serde_json::from_slice(&self.output.borrow()).expect("valid JSON")
    }
}

#[fixture]
fn world() -> StreetViewWorld {
    StreetViewWorld::default()
}

/// Nearest road point to [`start`] in the stub gateway.
fn road_point() -> Coordinate {
    Coordinate::new(35.6813, 139.7672).expect("valid coordinate")
}

fn gateway_with_road() -> StubGateway {
    StubGateway::new().with_snap(start(), road_point())
}

fn gateway_without_imagery() -> StubGateway {
    gateway_with_road().without_imagery()
}

#[given("a point near Tokyo Station with a street view API key")]
fn given_point(#[from(world)] world: &StreetViewWorld) {
    world.push_flag(ARG_LAT, start().latitude());
    world.push_flag(ARG_LNG, start().longitude());
    world.push_flag(ARG_API_KEY, API_KEY);
}

#[given("an image size of {size}")]
fn given_size(#[from(world)] world: &StreetViewWorld, size: String) {
    world.push_flag(ARG_SIZE, size);
}

#[given("no street view imagery nearby")]
fn given_no_imagery(#[from(world)] world: &StreetViewWorld) {
    world.without_imagery.set(true);
}

#[when("I run the street-view command")]
fn run_street_view(#[from(world)] world: &StreetViewWorld) {
    let mut invocation = vec!["stroll".to_owned(), "street-view".to_owned()];
    invocation.extend(world.cli_args.borrow().iter().cloned());
    let builder = if world.without_imagery.get() {
        StubBuilder(gateway_without_imagery)
    } else {
        StubBuilder(gateway_with_road)
    };
    let mut output = world.output.borrow_mut();
    let outcome = Cli::try_parse_from(invocation)
        .map_err(CliError::ArgumentParsing)
        .and_then(|cli| match cli.command {
            Command::StreetView(args) => StreetViewConfig::try_from(args),
            other => panic!("expected street-view, found {other:?}"),
        })
        .and_then(|config| run_street_view_with(&config, &builder, &mut *output));
    world.result.replace(Some(outcome));
}

#[then("an image document is written")]
fn document_written(#[from(world)] world: &StreetViewWorld) {
    assert!(
        matches!(world.result.borrow().as_ref(), Some(Ok(()))),
        "expected success"
    );
    let document = world.document();
    assert!(
        document["image_base64"]
            .as_str()
            .is_some_and(|encoded| !encoded.is_empty())
    );
    assert_eq!(document["original_location"]["latitude"], start().latitude());
}

#[then("the image was taken at the snapped location")]
fn taken_at_road(#[from(world)] world: &StreetViewWorld) {
    let document = world.document();
    assert_eq!(
        document["metadata_location"]["latitude"],
        road_point().latitude()
    );
    assert_eq!(
        document["metadata_location"]["longitude"],
        road_point().longitude()
    );
}

#[then("the CLI reports an invalid image size")]
fn reports_invalid_size(#[from(world)] world: &StreetViewWorld) {
    let borrowed = world.result.borrow();
    match borrowed.as_ref().expect("result recorded") {
        Err(CliError::InvalidImageSize(source)) => assert_eq!(*source, ImageSizeError::Format),
        other => panic!("expected InvalidImageSize, found {other:?}"),
    }
}

#[then("the CLI reports that no imagery exists there")]
fn reports_no_imagery(#[from(world)] world: &StreetViewWorld) {
    let borrowed = world.result.borrow();
    match borrowed.as_ref().expect("result recorded") {
        Err(CliError::NoImagery { location, .. }) => assert_eq!(*location, start()),
        other => panic!("expected NoImagery, found {other:?}"),
    }
    assert!(world.output.borrow().is_empty());
}

macro_rules! register_street_view_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/street_view_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: StreetViewWorld) {
            let _ = world;
        }
    };
}

register_street_view_scenario!(image_near_point, "fetching an image near a point");
register_street_view_scenario!(malformed_size, "rejecting a malformed image size");
register_street_view_scenario!(point_without_imagery, "reporting a point without imagery");
