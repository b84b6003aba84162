//! Great-circle distance between coordinates.

use findx_core::Report;
use geo::Coord;

/// Mean Earth radius used by the haversine formula, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Return the haversine distance between `a` and `b` in kilometres.
///
/// Coordinates follow the `geo` convention: `x` is longitude and `y` is
/// latitude, both in degrees. NaN inputs propagate to the result.
///
/// # Examples
/// ```
/// use findx_matcher::haversine_km;
/// use geo::Coord;
///
/// let a = Coord { x: 77.5946, y: 12.9716 };
/// assert_eq!(haversine_km(a, a), 0.0);
/// ```
#[expect(
    clippy::float_arithmetic,
    reason = "the haversine formula is floating-point trigonometry"
)]
#[must_use]
pub fn haversine_km(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let lat_a = a.y.to_radians();
    let lat_b = b.y.to_radians();
    let half_d_lat = (b.y - a.y).to_radians() / 2.0;
    let half_d_lng = (b.x - a.x).to_radians() / 2.0;

    // Rounding can push `h` just past 1 for antipodal points.
    let h = (half_d_lat.sin().powi(2) + lat_a.cos() * lat_b.cos() * half_d_lng.sin().powi(2))
        .clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Distance between two reports, or `None` when either withheld a usable
/// location.
pub(crate) fn report_distance_km(a: &Report, b: &Report) -> Option<f64> {
    Some(haversine_km(a.valid_location()?, b.valid_location()?))
}

#[cfg(test)]
#[expect(
    clippy::float_arithmetic,
    reason = "assertions compare floating point values"
)]
mod tests {
    use super::*;
    use rstest::rstest;

    const TOLERANCE_KM: f64 = 1e-9;

    #[rstest]
    fn identical_points_are_zero_apart() {
        let p = Coord { x: -0.1276, y: 51.5072 };
        assert!(haversine_km(p, p).abs() < TOLERANCE_KM);
    }

    #[rstest]
    #[case(Coord { x: 77.5946, y: 12.9716 }, Coord { x: 77.5946, y: 12.9761 }, 0.5004)]
    // London to Paris.
    #[case(Coord { x: -0.1276, y: 51.5072 }, Coord { x: 2.3522, y: 48.8566 }, 343.53)]
    // One degree of longitude on the equator.
    #[case(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 0.0 }, 111.195)]
    fn known_distances(#[case] a: Coord<f64>, #[case] b: Coord<f64>, #[case] expected: f64) {
        let d = haversine_km(a, b);
        assert!((d - expected).abs() < 0.01, "expected ~{expected}km, got {d}km");
    }

    #[rstest]
    fn distance_is_symmetric() {
        let a = Coord { x: 151.2093, y: -33.8688 };
        let b = Coord { x: -118.2437, y: 34.0522 };
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < TOLERANCE_KM);
    }

    #[rstest]
    fn nan_propagates() {
        let a = Coord { x: f64::NAN, y: 0.0 };
        let b = Coord { x: 0.0, y: 0.0 };
        assert!(haversine_km(a, b).is_nan());
    }
}
