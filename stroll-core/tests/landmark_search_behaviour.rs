//! Behavioural tests for budget-limited landmark search.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use stroll_core::test_support::{GatewayCall, StubGateway};
use stroll_core::{Coordinate, GatewayError, LandmarkSearch, SearchBudget, SearchOutcome, Service};

/// World state shared by search steps.
#[derive(Debug, Default)]
struct SearchWorld {
    gateway: RefCell<StubGateway>,
    outcome: RefCell<Option<SearchOutcome>>,
}

impl SearchWorld {
    fn configure(&self, f: impl FnOnce(StubGateway) -> StubGateway) {
        let gateway = self.gateway.take();
        self.gateway.replace(f(gateway));
    }

    fn outcome(&self) -> SearchOutcome {
        self.outcome
            .borrow()
            .clone()
            .expect("search must run before checking the outcome")
    }
}

#[fixture]
fn world() -> SearchWorld {
    SearchWorld::default()
}

fn centre() -> Coordinate {
    Coordinate::new(51.5074, -0.1278).expect("valid coordinate")
}

#[given("a centre with {count} landmarks on a {distance} metre ring")]
fn given_ring(world: &SearchWorld, count: usize, distance: f64) {
    world.configure(|gateway| gateway.with_ring_landmarks("poi", centre(), distance, count));
}

#[given("nearby search is unreachable")]
fn given_unreachable(world: &SearchWorld) {
    world.configure(|gateway| {
        gateway.with_search_error(GatewayError::Transport {
            service: Service::Places,
            message: "connection refused".to_owned(),
        })
    });
}

#[when("I search for {target} landmarks at {distance} metres with {calls} calls")]
fn when_search(world: &SearchWorld, target: usize, distance: f64, calls: usize) {
    let budget = SearchBudget::new(target, calls, 10.0, 100.0).expect("valid budget");
    let gateway = world.gateway.borrow();
    let outcome = LandmarkSearch::new(&*gateway).search(centre(), distance, &budget);
    world.outcome.replace(Some(outcome));
}

#[then("{count} landmarks are returned")]
fn then_landmarks(world: &SearchWorld, count: usize) {
    assert_eq!(world.outcome().landmarks.len(), count);
}

#[then("{count} search call was made")]
fn then_one_call(world: &SearchWorld, count: usize) {
    assert_calls(world, count);
}

#[then("{count} search calls were made")]
fn then_calls(world: &SearchWorld, count: usize) {
    assert_calls(world, count);
}

fn assert_calls(world: &SearchWorld, expected: usize) {
    assert_eq!(world.outcome().calls, expected);
    let recorded = world
        .gateway
        .borrow()
        .count_calls(|call| matches!(call, GatewayCall::SearchNearby { .. }));
    assert_eq!(recorded, expected);
}

#[scenario(path = "tests/features/landmark_search.feature", index = 0)]
fn stops_when_target_reached(world: SearchWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/landmark_search.feature", index = 1)]
fn sweeps_until_budget_spent(world: SearchWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/landmark_search.feature", index = 2)]
fn centre_failure_is_quiet(world: SearchWorld) {
    let _ = world;
}
