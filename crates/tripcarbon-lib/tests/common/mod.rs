//! Common test utilities and fixture helpers.
//!
//! Integration tests never reach the network: routers are replaced by
//! in-memory fakes and the reference layers come from `docs/fixtures`.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use geo_types::{LineString, MultiLineString};
use tripcarbon_lib::routing::RailNodeLocator;
use tripcarbon_lib::{
    geodesic_distance_km, Coordinate, EmissionEngine, Error, ReferenceData, Result, RoutedPath,
    Router, RoutingServices, Settings,
};

pub const PARIS: Coordinate = Coordinate::new(2.35, 48.85);
#[allow(dead_code)]
pub const LYON: Coordinate = Coordinate::new(4.83, 45.76);
#[allow(dead_code)]
pub const FRANKFURT: Coordinate = Coordinate::new(8.68, 50.11);
#[allow(dead_code)]
pub const LONDON: Coordinate = Coordinate::new(-0.12, 51.5);
#[allow(dead_code)]
pub const DUBLIN: Coordinate = Coordinate::new(-6.3, 53.35);
#[allow(dead_code)]
pub const HOLYHEAD: Coordinate = Coordinate::new(-4.6, 53.3);

/// Path to fixtures directory used by tests (reference layers).
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

/// Reference layers loaded from the fixtures directory.
pub fn fixture_reference() -> Arc<ReferenceData> {
    Arc::new(ReferenceData::load(&fixtures_dir()).expect("load fixture reference layers"))
}

/// Router answering with the straight line between the two points.
///
/// The reported length is the geodesic distance times `detour`, and every
/// request is recorded.
pub struct StraightRouter {
    pub detour: f64,
    pub calls: Mutex<Vec<(Coordinate, Coordinate)>>,
}

#[allow(dead_code)]
impl StraightRouter {
    pub fn new(detour: f64) -> Self {
        Self {
            detour,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn boxed(detour: f64) -> Box<dyn Router> {
        Box::new(Self::new(detour))
    }
}

impl Router for StraightRouter {
    fn name(&self) -> &'static str {
        "straight"
    }

    fn route(&self, start: Coordinate, end: Coordinate) -> Result<RoutedPath> {
        self.calls.lock().expect("lock").push((start, end));
        Ok(RoutedPath {
            geometry: MultiLineString::new(vec![LineString::new(vec![start.coord(), end.coord()])]),
            length_km: geodesic_distance_km(start, end) * self.detour,
        })
    }
}

/// Router that always fails.
pub struct FailingRouter;

impl Router for FailingRouter {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn route(&self, _start: Coordinate, _end: Coordinate) -> Result<RoutedPath> {
        Err(Error::RoutingFailed {
            service: "failing",
            reason: "no route".to_string(),
        })
    }
}

/// Locator that never finds any rail infrastructure.
pub struct NoRailNodes;

impl RailNodeLocator for NoRailNodes {
    fn nearest_rail_node(&self, _around: Coordinate, _perimeter_km: f64) -> Result<Option<Coordinate>> {
        Ok(None)
    }
}

/// Engine over the fixture layers with the given road and rail routers.
#[allow(dead_code)]
pub fn engine_with(road: Box<dyn Router>, rail: Box<dyn Router>) -> EmissionEngine {
    let services = RoutingServices {
        road,
        rail,
        cycling: StraightRouter::boxed(1.1),
        rail_nodes: Box::new(NoRailNodes),
    };
    EmissionEngine::new(services, fixture_reference(), Settings::default())
}

/// Engine whose road and rail routers both succeed.
#[allow(dead_code)]
pub fn working_engine() -> EmissionEngine {
    engine_with(StraightRouter::boxed(1.2), StraightRouter::boxed(1.15))
}
