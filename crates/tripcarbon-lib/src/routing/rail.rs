use tracing::{debug, info, warn};

use super::{RailNodeLocator, RoutedPath, Router};
use crate::error::{Error, Result};
use crate::geodesy::Coordinate;
use crate::validate::check_endpoints;

/// States of the rail routing search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RailSearchState {
    /// Route between the requested coordinates.
    TryDirect,
    /// Snap the departure onto the rail network and route from there.
    TrySnapDeparture,
    /// Also snap the arrival, keeping the snapped departure.
    TrySnapArrival { departure: Coordinate },
    /// Nothing left to try.
    Failed,
}

/// Rail routing with fallback snapping onto the rail network.
///
/// Every attempt is validated against the coordinates the user asked for, so a
/// snapped route that drifts beyond the tolerance is still rejected.
pub struct RailRouting<'a> {
    router: &'a dyn Router,
    locator: &'a dyn RailNodeLocator,
    perimeters_km: &'a [f64],
    tolerance_km: f64,
}

impl<'a> RailRouting<'a> {
    pub fn new(
        router: &'a dyn Router,
        locator: &'a dyn RailNodeLocator,
        perimeters_km: &'a [f64],
        tolerance_km: f64,
    ) -> Self {
        Self {
            router,
            locator,
            perimeters_km,
            tolerance_km,
        }
    }

    pub fn route(&self, start: Coordinate, end: Coordinate) -> Result<RoutedPath> {
        let mut state = RailSearchState::TryDirect;
        let mut last_error = Error::routing(self.router.name(), "no attempt made");

        loop {
            debug!(?state, "rail search");
            state = match state {
                RailSearchState::TryDirect => match self.attempt(start, end, start, end) {
                    Ok(path) => return Ok(path),
                    Err(err) => {
                        last_error = err;
                        RailSearchState::TrySnapDeparture
                    }
                },
                RailSearchState::TrySnapDeparture => match self.snap(start) {
                    None => {
                        last_error = Error::RailNodeNotFound {
                            lon: start.lon,
                            lat: start.lat,
                        };
                        RailSearchState::Failed
                    }
                    Some(departure) => match self.attempt(departure, end, start, end) {
                        Ok(path) => return Ok(path),
                        Err(err) => {
                            last_error = err;
                            RailSearchState::TrySnapArrival { departure }
                        }
                    },
                },
                RailSearchState::TrySnapArrival { departure } => match self.snap(end) {
                    None => {
                        last_error = Error::RailNodeNotFound {
                            lon: end.lon,
                            lat: end.lat,
                        };
                        RailSearchState::Failed
                    }
                    Some(arrival) => match self.attempt(departure, arrival, start, end) {
                        Ok(path) => return Ok(path),
                        Err(err) => {
                            last_error = err;
                            RailSearchState::Failed
                        }
                    },
                },
                RailSearchState::Failed => {
                    warn!(%start, %end, error = %last_error, "rail routing exhausted");
                    return Err(last_error);
                }
            };
        }
    }

    fn attempt(
        &self,
        from: Coordinate,
        to: Coordinate,
        requested_start: Coordinate,
        requested_end: Coordinate,
    ) -> Result<RoutedPath> {
        let path = self.router.route(from, to)?;
        check_endpoints(requested_start, requested_end, &path.geometry, self.tolerance_km)?;
        Ok(path)
    }

    /// First rail node found, trying each perimeter from the smallest.
    fn snap(&self, around: Coordinate) -> Option<Coordinate> {
        for &perimeter_km in self.perimeters_km {
            match self.locator.nearest_rail_node(around, perimeter_km) {
                Ok(Some(node)) => {
                    info!(%around, %node, perimeter_km, "snapped to rail network");
                    return Some(node);
                }
                Ok(None) => continue,
                Err(err) => {
                    warn!(%around, perimeter_km, error = %err, "rail node lookup failed");
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use geo_types::{LineString, MultiLineString};

    use super::*;

    /// Succeeds only when routing from one of the `accepted` departures.
    struct PickyRouter {
        accepted: Vec<(Coordinate, Coordinate)>,
        calls: Mutex<Vec<(Coordinate, Coordinate)>>,
    }

    impl Router for PickyRouter {
        fn name(&self) -> &'static str {
            "picky"
        }

        fn route(&self, start: Coordinate, end: Coordinate) -> Result<RoutedPath> {
            self.calls.lock().expect("lock").push((start, end));
            if self.accepted.contains(&(start, end)) {
                Ok(RoutedPath {
                    geometry: MultiLineString::new(vec![LineString::from(vec![
                        start.coord(),
                        end.coord(),
                    ])]),
                    length_km: 10.0,
                })
            } else {
                Err(Error::routing("picky", "no route"))
            }
        }
    }

    struct OffsetLocator {
        found_at_km: Option<f64>,
    }

    impl RailNodeLocator for OffsetLocator {
        fn nearest_rail_node(
            &self,
            around: Coordinate,
            perimeter_km: f64,
        ) -> Result<Option<Coordinate>> {
            Ok(self
                .found_at_km
                .filter(|found| *found <= perimeter_km)
                .map(|_| Coordinate::new(around.lon + 0.01, around.lat)))
        }
    }

    const A: Coordinate = Coordinate::new(2.0, 48.0);
    const B: Coordinate = Coordinate::new(3.0, 47.0);

    #[test]
    fn direct_route_needs_no_lookup() {
        let router = PickyRouter {
            accepted: vec![(A, B)],
            calls: Mutex::new(Vec::new()),
        };
        let locator = OffsetLocator { found_at_km: None };
        let rail = RailRouting::new(&router, &locator, &[0.2, 5.0], 100.0);
        assert!(rail.route(A, B).is_ok());
        assert_eq!(router.calls.lock().expect("lock").len(), 1);
    }

    #[test]
    fn snaps_both_ends_when_needed() {
        let departure = Coordinate::new(A.lon + 0.01, A.lat);
        let arrival = Coordinate::new(B.lon + 0.01, B.lat);
        let router = PickyRouter {
            accepted: vec![(departure, arrival)],
            calls: Mutex::new(Vec::new()),
        };
        let locator = OffsetLocator {
            found_at_km: Some(5.0),
        };
        let rail = RailRouting::new(&router, &locator, &[0.2, 5.0], 100.0);
        assert!(rail.route(A, B).is_ok());
        assert_eq!(
            *router.calls.lock().expect("lock"),
            vec![(A, B), (departure, B), (departure, arrival)]
        );
    }

    #[test]
    fn fails_when_departure_cannot_be_snapped() {
        let router = PickyRouter {
            accepted: vec![],
            calls: Mutex::new(Vec::new()),
        };
        let locator = OffsetLocator { found_at_km: None };
        let rail = RailRouting::new(&router, &locator, &[0.2, 5.0], 100.0);
        let err = rail.route(A, B).expect_err("no rail");
        assert!(matches!(err, Error::RailNodeNotFound { .. }));
        assert_eq!(router.calls.lock().expect("lock").len(), 1);
    }
}
