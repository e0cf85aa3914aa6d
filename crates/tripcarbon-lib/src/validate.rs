use geo_types::MultiLineString;
use tracing::warn;

use crate::error::{Error, Result};
use crate::geodesy::{first_coord, geodesic_distance_km, last_coord, Coordinate};

/// Check that a routed geometry starts near `start` and ends near `end`.
///
/// The last point of a multi-part geometry is the last point of its last part.
/// An empty geometry never validates.
pub fn validate(
    start: Coordinate,
    end: Coordinate,
    path: &MultiLineString<f64>,
    tolerance_km: f64,
) -> bool {
    check_endpoints(start, end, path, tolerance_km).is_ok()
}

/// Same check as [`validate`], reporting which end was rejected.
pub fn check_endpoints(
    start: Coordinate,
    end: Coordinate,
    path: &MultiLineString<f64>,
    tolerance_km: f64,
) -> Result<()> {
    let (Some(first), Some(last)) = (first_coord(path), last_coord(path)) else {
        return Err(Error::routing("validator", "route geometry is empty"));
    };

    for (endpoint, requested, actual) in [("start", start, first), ("end", end, last)] {
        let distance_km = geodesic_distance_km(requested, actual.into());
        if distance_km > tolerance_km {
            warn!(
                endpoint,
                distance_km, tolerance_km, "route endpoint too far from requested point"
            );
            return Err(Error::GeometryRejected {
                endpoint,
                distance_km,
                tolerance_km,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use geo_types::LineString;

    use super::*;

    fn path(points: &[(f64, f64)]) -> MultiLineString<f64> {
        MultiLineString::new(vec![LineString::from(points.to_vec())])
    }

    #[test]
    fn accepts_route_ending_at_requested_points() {
        let a = Coordinate::new(2.35, 48.85);
        let b = Coordinate::new(4.83, 45.76);
        assert!(validate(a, b, &path(&[(2.36, 48.86), (4.82, 45.75)]), 100.0));
    }

    #[test]
    fn rejects_route_snapped_far_away() {
        let a = Coordinate::new(2.35, 48.85);
        let b = Coordinate::new(4.83, 45.76);
        let err = check_endpoints(a, b, &path(&[(2.35, 48.85), (7.26, 43.70)]), 100.0)
            .expect_err("end is in Nice");
        assert!(matches!(err, Error::GeometryRejected { endpoint: "end", .. }));
    }

    #[test]
    fn reversed_route_validates_the_same_way() {
        let a = Coordinate::new(2.35, 48.85);
        let b = Coordinate::new(4.83, 45.76);
        let forward = [(2.40, 48.80), (3.5, 47.0), (4.83, 45.76)];
        let mut backward = forward;
        backward.reverse();

        for tolerance_km in [1.0, 10.0] {
            assert_eq!(
                validate(a, b, &path(&forward), tolerance_km),
                validate(b, a, &path(&backward), tolerance_km)
            );
        }
        assert!(!validate(a, b, &path(&forward), 1.0));
        assert!(validate(b, a, &path(&backward), 10.0));
    }

    #[test]
    fn rejects_empty_geometry() {
        let a = Coordinate::new(0.0, 0.0);
        assert!(!validate(a, a, &MultiLineString::new(vec![]), 100.0));
    }
}
