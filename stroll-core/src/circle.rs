//! Probe points scattered around a ring.
//!
//! [`generate_points`] places `n` points evenly on a circle of the target
//! radius, then visits them in a full-cycle permutation `(o + k·s) mod n`
//! with a random offset `o` and a step `s` coprime to `n`. Every point is
//! visited exactly once, and a consumer that stops early has still sampled
//! the whole perimeter rather than one arc of it.

use std::f64::consts::PI;

use rand::Rng;

use crate::{Coordinate, geodesy};

/// Fewest points ever placed on a ring.
pub const MIN_POINTS: usize = 6;

const STEP_ATTEMPTS: usize = 64;

/// Number of points needed so probes of `probe_radius_m` cover a ring of
/// `target_distance_m`.
///
/// Returns `None` when either radius is not a positive finite number.
///
/// # Examples
/// ```
/// use stroll_core::circle::point_count;
///
/// assert_eq!(point_count(1_000.0, 100.0), Some(63));
/// assert_eq!(point_count(100.0, 1_000.0), Some(6));
/// assert_eq!(point_count(1_000.0, 0.0), None);
/// ```
pub fn point_count(target_distance_m: f64, probe_radius_m: f64) -> Option<usize> {
    let valid = |value: f64| value.is_finite() && value > 0.0;
    if !valid(target_distance_m) || !valid(probe_radius_m) {
        return None;
    }
    let raw = (2.0 * PI * target_distance_m / probe_radius_m).ceil();
    // Float-to-int casts saturate, so absurd ratios cap at usize::MAX.
    Some((raw as usize).max(MIN_POINTS))
}

/// Lazily generated probe points in scattered order.
///
/// Created by [`generate_points`] or [`generate_points_with`].
#[derive(Debug, Clone)]
pub struct CirclePoints {
    center: Coordinate,
    distance_m: f64,
    count: usize,
    offset: usize,
    step: usize,
    next: usize,
}

impl CirclePoints {
    fn empty(center: Coordinate) -> Self {
        Self {
            center,
            distance_m: 0.0,
            count: 0,
            offset: 0,
            step: 1,
            next: 0,
        }
    }

    /// Total number of points on the ring.
    pub const fn ring_size(&self) -> usize {
        self.count
    }

    fn index_at(&self, k: usize) -> usize {
        // Widened so offset + k * step cannot overflow.
        let slot = (self.offset as u128 + k as u128 * self.step as u128) % self.count as u128;
        usize::try_from(slot).unwrap_or(0)
    }

    fn point_at(&self, index: usize) -> Coordinate {
        let bearing = 360.0 * index as f64 / self.count as f64;
        geodesy::destination_point(self.center, self.distance_m, bearing)
    }
}

impl Iterator for CirclePoints {
    type Item = Coordinate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        let index = self.index_at(self.next);
        self.next += 1;
        Some(self.point_at(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CirclePoints {}

impl std::iter::FusedIterator for CirclePoints {}

/// Probe points on a ring of `target_distance_m` around `center`.
///
/// Randomness comes from the thread-local generator. Invalid radii yield
/// an empty sequence.
///
/// # Examples
/// ```
/// use stroll_core::{Coordinate, circle, geodesy};
///
/// let center = Coordinate::new(35.6812, 139.7671).expect("valid");
/// let points: Vec<_> = circle::generate_points(center, 1_000.0, 400.0).collect();
/// assert_eq!(points.len(), 16);
/// for point in &points {
///     assert!((geodesy::distance(center, *point) - 1_000.0).abs() < 0.01);
/// }
/// ```
pub fn generate_points(
    center: Coordinate,
    target_distance_m: f64,
    probe_radius_m: f64,
) -> CirclePoints {
    generate_points_with(&mut rand::thread_rng(), center, target_distance_m, probe_radius_m)
}

/// [`generate_points`] with a caller-supplied generator.
pub fn generate_points_with<R>(
    rng: &mut R,
    center: Coordinate,
    target_distance_m: f64,
    probe_radius_m: f64,
) -> CirclePoints
where
    R: Rng + ?Sized,
{
    let Some(count) = point_count(target_distance_m, probe_radius_m) else {
        log::warn!(
            "cannot place ring points for target {target_distance_m} m with probe radius {probe_radius_m} m"
        );
        return CirclePoints::empty(center);
    };
    let offset = rng.gen_range(0..count);
    let step = coprime_step(rng, count);
    log::debug!("ring of {count} points around {center}: offset {offset}, step {step}");
    CirclePoints {
        center,
        distance_m: target_distance_m,
        count,
        offset,
        step,
        next: 0,
    }
}

fn coprime_step<R>(rng: &mut R, count: usize) -> usize
where
    R: Rng + ?Sized,
{
    if count < 2 {
        return 1;
    }
    (0..STEP_ATTEMPTS)
        .map(|_| rng.gen_range(1..count))
        .find(|&step| gcd(step, count) == 1)
        .unwrap_or(1)
}

const fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}
