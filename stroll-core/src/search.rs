//! Budget-limited landmark discovery around a target distance.
//!
//! A search first probes the centre with a radius equal to the target
//! distance, then sweeps a ring of scattered probe points until enough
//! in-band landmarks are found or the call budget is spent. Only landmarks
//! whose geodesic distance from the centre falls inside the tolerance band
//! are kept, deduplicated by `place_id` in discovery order.

use std::collections::HashSet;

use rand::Rng;
use thiserror::Error;

use crate::{Coordinate, Landmark, MapsGateway, RankPreference, circle, geodesy};

/// Default number of landmarks a search aims for.
pub const DEFAULT_TARGET_COUNT: usize = 20;
/// Default ceiling on nearby-search calls per search.
pub const DEFAULT_MAX_CALLS: usize = 5;
/// Default half-width of the acceptance band, in percent.
pub const DEFAULT_TOLERANCE_PERCENT: f64 = 10.0;
/// Default lower bound on ring probe radii, in metres.
pub const DEFAULT_MIN_SEARCH_RADIUS_M: f64 = 100.0;

/// Errors returned by [`SearchBudget::new`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SearchBudgetError {
    /// `target_count` was zero.
    #[error("target count must be at least 1")]
    ZeroTargetCount,
    /// `max_calls` was zero.
    #[error("max calls must be at least 1")]
    ZeroMaxCalls,
    /// Tolerance was not strictly between 0 and 100 percent.
    #[error("tolerance must be between 0 and 100 percent exclusive, got {0}")]
    Tolerance(f64),
    /// Minimum radius was not a positive finite number.
    #[error("minimum search radius must be positive, got {0}")]
    MinRadius(f64),
}

/// Stop conditions and probe sizing for one search.
///
/// # Examples
/// ```
/// use stroll_core::{RankPreference, SearchBudget};
///
/// let budget = SearchBudget::new(5, 3, 15.0, 250.0)?
///     .with_rank_preference(RankPreference::Distance);
/// assert_eq!(budget.max_calls(), 3);
/// assert_eq!(SearchBudget::default().target_count(), 20);
/// # Ok::<(), stroll_core::SearchBudgetError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SearchBudget {
    target_count: usize,
    max_calls: usize,
    tolerance_percent: f64,
    min_search_radius_m: f64,
    rank: RankPreference,
}

impl SearchBudget {
    /// Validate and build a budget ranked by popularity.
    pub fn new(
        target_count: usize,
        max_calls: usize,
        tolerance_percent: f64,
        min_search_radius_m: f64,
    ) -> Result<Self, SearchBudgetError> {
        if target_count == 0 {
            return Err(SearchBudgetError::ZeroTargetCount);
        }
        if max_calls == 0 {
            return Err(SearchBudgetError::ZeroMaxCalls);
        }
        if !(tolerance_percent > 0.0 && tolerance_percent < 100.0) {
            return Err(SearchBudgetError::Tolerance(tolerance_percent));
        }
        if !min_search_radius_m.is_finite() || min_search_radius_m <= 0.0 {
            return Err(SearchBudgetError::MinRadius(min_search_radius_m));
        }
        Ok(Self {
            target_count,
            max_calls,
            tolerance_percent,
            min_search_radius_m,
            rank: RankPreference::Popularity,
        })
    }

    /// Use a different ranking for every nearby-search call.
    #[must_use]
    pub const fn with_rank_preference(mut self, rank: RankPreference) -> Self {
        self.rank = rank;
        self
    }

    /// Landmarks wanted before stopping.
    pub const fn target_count(&self) -> usize {
        self.target_count
    }

    /// Most nearby-search calls a search may issue.
    pub const fn max_calls(&self) -> usize {
        self.max_calls
    }

    /// Band half-width in percent of the target distance.
    pub const fn tolerance_percent(&self) -> f64 {
        self.tolerance_percent
    }

    /// Smallest ring probe radius in metres.
    pub const fn min_search_radius_m(&self) -> f64 {
        self.min_search_radius_m
    }

    /// Ranking passed to the gateway.
    pub const fn rank(&self) -> RankPreference {
        self.rank
    }

    fn tolerance(&self) -> f64 {
        self.tolerance_percent / 100.0
    }

    /// Inclusive distance band `[t·(1-tol), t·(1+tol)]` around `target_m`.
    pub fn acceptance_band(&self, target_m: f64) -> (f64, f64) {
        let tolerance = self.tolerance();
        (target_m * (1.0 - tolerance), target_m * (1.0 + tolerance))
    }

    /// Radius used for each ring probe.
    pub fn probe_radius(&self, target_m: f64) -> f64 {
        self.min_search_radius_m.max(target_m * self.tolerance())
    }
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self {
            target_count: DEFAULT_TARGET_COUNT,
            max_calls: DEFAULT_MAX_CALLS,
            tolerance_percent: DEFAULT_TOLERANCE_PERCENT,
            min_search_radius_m: DEFAULT_MIN_SEARCH_RADIUS_M,
            rank: RankPreference::Popularity,
        }
    }
}

/// Landmarks found by a search and the calls spent finding them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutcome {
    /// In-band landmarks in discovery order, unique by `place_id`.
    pub landmarks: Vec<Landmark>,
    /// Nearby-search calls issued, failed ones included.
    pub calls: usize,
}

impl SearchOutcome {
    /// Whether nothing in band was found.
    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }
}

struct Accumulator {
    center: Coordinate,
    band: (f64, f64),
    seen: HashSet<String>,
    outcome: SearchOutcome,
}

impl Accumulator {
    fn new(center: Coordinate, band: (f64, f64)) -> Self {
        Self {
            center,
            band,
            seen: HashSet::new(),
            outcome: SearchOutcome::default(),
        }
    }

    /// Admit unseen in-band landmarks and return how many were added.
    fn merge(&mut self, landmarks: Vec<Landmark>) -> usize {
        let before = self.outcome.landmarks.len();
        let (low, high) = self.band;
        for landmark in landmarks {
            if self.seen.contains(landmark.place_id()) {
                continue;
            }
            let metres = geodesy::distance(self.center, landmark.coordinate());
            if !(low..=high).contains(&metres) {
                log::trace!(
                    "dropping {} at {metres:.1} m, outside {low:.1}..={high:.1} m",
                    landmark.place_id()
                );
                continue;
            }
            self.seen.insert(landmark.place_id().to_owned());
            self.outcome.landmarks.push(landmark);
        }
        self.outcome.landmarks.len() - before
    }

    fn should_stop(&self, budget: &SearchBudget) -> bool {
        self.outcome.landmarks.len() >= budget.target_count()
            || self.outcome.calls >= budget.max_calls()
    }
}

/// Runs landmark searches against a [`MapsGateway`].
///
/// # Examples
/// ```
/// use stroll_core::test_support::StubGateway;
/// use stroll_core::{Coordinate, LandmarkSearch, SearchBudget};
///
/// let center = Coordinate::new(35.6812, 139.7671).expect("valid");
/// let gateway = StubGateway::new().with_ring_landmarks("poi", center, 1_000.0, 4);
/// let outcome = LandmarkSearch::new(&gateway).search(center, 1_000.0, &SearchBudget::default());
/// assert_eq!(outcome.landmarks.len(), 4);
/// assert!(outcome.calls <= SearchBudget::default().max_calls());
/// ```
#[derive(Debug)]
pub struct LandmarkSearch<'a, G: ?Sized> {
    gateway: &'a G,
}

impl<'a, G> LandmarkSearch<'a, G>
where
    G: MapsGateway + ?Sized,
{
    /// Search through `gateway`.
    pub const fn new(gateway: &'a G) -> Self {
        Self { gateway }
    }

    /// Find landmarks roughly `target_distance_m` metres from `center`.
    ///
    /// Never issues more than `budget.max_calls()` gateway calls. A failed
    /// centre probe yields an empty outcome; failed ring probes are skipped.
    pub fn search(
        &self,
        center: Coordinate,
        target_distance_m: f64,
        budget: &SearchBudget,
    ) -> SearchOutcome {
        self.search_with(&mut rand::thread_rng(), center, target_distance_m, budget)
    }

    /// [`Self::search`] with a caller-supplied generator for ring order.
    pub fn search_with<R>(
        &self,
        rng: &mut R,
        center: Coordinate,
        target_distance_m: f64,
        budget: &SearchBudget,
    ) -> SearchOutcome
    where
        R: Rng + ?Sized,
    {
        let mut acc = Accumulator::new(center, budget.acceptance_band(target_distance_m));

        log::info!("searching landmarks around {center} at {target_distance_m:.0} m");
        acc.outcome.calls += 1;
        match self
            .gateway
            .search_nearby(center, target_distance_m, budget.rank())
        {
            Ok(found) => {
                let added = acc.merge(found);
                log::debug!("centre probe at {center} added {added} landmarks");
            }
            Err(err) => {
                log::warn!("centre probe at {center} failed, abandoning search: {err}");
                return SearchOutcome {
                    landmarks: Vec::new(),
                    calls: acc.outcome.calls,
                };
            }
        }
        if acc.should_stop(budget) {
            return acc.outcome;
        }

        let probe_radius = budget.probe_radius(target_distance_m);
        let ring = circle::generate_points_with(rng, center, target_distance_m, probe_radius);
        log::debug!(
            "sweeping {} ring points with probe radius {probe_radius:.0} m",
            ring.len()
        );
        for point in ring {
            acc.outcome.calls += 1;
            match self.gateway.search_nearby(point, probe_radius, budget.rank()) {
                Ok(found) => {
                    let added = acc.merge(found);
                    log::debug!("ring probe at {point} added {added} landmarks");
                }
                Err(err) => log::warn!("ring probe at {point} failed, skipping: {err}"),
            }
            if acc.should_stop(budget) {
                break;
            }
        }

        log::info!(
            "found {} landmarks in {} calls",
            acc.outcome.landmarks.len(),
            acc.outcome.calls
        );
        acc.outcome
    }
}
