//! Geodesic primitives on the WGS84 ellipsoid.
//!
//! Every function here is pure and total over valid [`Coordinate`]s:
//! identical points, antipodal pairs, paths over a pole or across the
//! antimeridian and zero distances all produce a result rather than an
//! error. Calculations delegate to `geo`'s Karney geodesic implementation,
//! which stays accurate from metres to thousands of kilometres.

use geo::{Bearing, Destination, Distance, Geodesic};
use rand::Rng;
use rand::rngs::OsRng;

use crate::Coordinate;

/// Geodesic distance between two coordinates in metres.
///
/// # Examples
/// ```
/// use stroll_core::{Coordinate, geodesy};
///
/// let a = Coordinate::new(0.0, 0.0).expect("valid");
/// let b = Coordinate::new(0.0, 1.0).expect("valid");
/// let metres = geodesy::distance(a, b);
/// assert!((metres - 111_319.49).abs() < 0.1);
/// assert_eq!(geodesy::distance(a, a), 0.0);
/// ```
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    Geodesic.distance(a.to_point(), b.to_point())
}

/// Initial azimuth from `a` towards `b` in degrees within `[0, 360)`.
pub fn bearing(a: Coordinate, b: Coordinate) -> f64 {
    normalise_bearing(Geodesic.bearing(a.to_point(), b.to_point()))
}

/// Point reached by travelling `distance_m` metres from `origin` along the
/// geodesic with initial azimuth `bearing_deg`.
///
/// Negative distances travel backwards along the same geodesic. A
/// non-finite distance or bearing leaves the traveller at `origin`.
///
/// # Examples
/// ```
/// use stroll_core::{Coordinate, geodesy};
///
/// let origin = Coordinate::new(35.6812, 139.7671).expect("valid");
/// let north = geodesy::destination_point(origin, 1_000.0, 0.0);
/// assert!(north.latitude() > origin.latitude());
/// assert!((geodesy::distance(origin, north) - 1_000.0).abs() < 1e-6);
/// ```
pub fn destination_point(origin: Coordinate, distance_m: f64, bearing_deg: f64) -> Coordinate {
    if !distance_m.is_finite() || !bearing_deg.is_finite() {
        log::warn!(
            "non-finite geodesic step from {origin} (distance {distance_m}, bearing {bearing_deg}); staying put"
        );
        return origin;
    }
    let point = Geodesic.destination(origin.to_point(), bearing_deg, distance_m);
    if !point.x().is_finite() || !point.y().is_finite() {
        log::warn!("geodesic step from {origin} produced a non-finite point; staying put");
        return origin;
    }
    Coordinate::normalised(point.y(), point.x())
}

/// Midpoint of the geodesic joining `a` and `b`.
///
/// This is half the geodesic distance travelled from `a` along the initial
/// bearing towards `b`, not the arithmetic mean of the two coordinates.
///
/// # Examples
/// ```
/// use stroll_core::{Coordinate, geodesy};
///
/// let a = Coordinate::new(0.0, 0.0).expect("valid");
/// let b = Coordinate::new(0.0, 10.0).expect("valid");
/// let mid = geodesy::geodesic_midpoint(a, b);
/// assert!((mid.longitude() - 5.0).abs() < 1e-6);
/// assert!(mid.latitude().abs() < 1e-6);
/// ```
pub fn geodesic_midpoint(a: Coordinate, b: Coordinate) -> Coordinate {
    destination_point(a, distance(a, b) / 2.0, bearing(a, b))
}

/// Random point exactly `radius_m` metres from `center`.
///
/// The bearing is drawn uniformly from `[0, 360)` using the operating
/// system's cryptographically secure generator so generated destinations
/// cannot be predicted. Negative radii are passed through to
/// [`destination_point`] unchanged.
pub fn random_point_at_distance(center: Coordinate, radius_m: f64) -> Coordinate {
    random_point_at_distance_with(&mut OsRng, center, radius_m)
}

/// [`random_point_at_distance`] with a caller-supplied generator.
pub fn random_point_at_distance_with<R>(rng: &mut R, center: Coordinate, radius_m: f64) -> Coordinate
where
    R: Rng + ?Sized,
{
    let bearing_deg = rng.gen_range(0.0..360.0);
    destination_point(center, radius_m, bearing_deg)
}

fn normalise_bearing(raw: f64) -> f64 {
    let wrapped = raw.rem_euclid(360.0);
    // rem_euclid of a tiny negative value rounds up to 360.0.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}
