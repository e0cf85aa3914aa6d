//! Routing adapters for the network-routed modes.
//!
//! This module provides:
//! - [`Router`] - the `route(start, end)` contract shared by every adapter
//! - [`RailNodeLocator`] - nearest rail infrastructure lookup used by rail retries
//! - [`RoutedPath`] - the normalized routing result
//! - [`RoutingServices`] - the set of adapters a calculator works with
//!
//! # Strategy Pattern
//!
//! Each third-party service is wrapped in its own struct implementing
//! [`Router`], so calculators never depend on a concrete provider and tests
//! can substitute in-memory fakes. Failures are reported as
//! [`Error::RoutingFailed`](crate::Error::RoutingFailed); a returned
//! [`RoutedPath`] is always usable.

mod cycling;
mod http;
mod osrm;
mod overpass;
mod rail;
mod trainmap;

pub use cycling::CyclingRouter;
pub use http::build_client;
pub use osrm::OsrmRouter;
pub use overpass::OverpassLocator;
pub use rail::{RailRouting, RailSearchState};
pub use trainmap::TrainmapRouter;

use geo_types::{Coord, LineString, MultiLineString};

use crate::config::{RailProvider, RoutingConfig};
use crate::error::{Error, Result};
use crate::geodesy::Coordinate;

/// Geometry and authoritative length of a successful route.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedPath {
    pub geometry: MultiLineString<f64>,
    /// Distance reported by the routing service, in kilometres.
    pub length_km: f64,
}

/// A routing service answering `route(start, end)`.
pub trait Router: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &'static str;

    fn route(&self, start: Coordinate, end: Coordinate) -> Result<RoutedPath>;
}

/// Lookup of the nearest point on the rail network.
pub trait RailNodeLocator: Send + Sync {
    /// Closest rail node within `perimeter_km` of `around`, if any.
    fn nearest_rail_node(&self, around: Coordinate, perimeter_km: f64)
        -> Result<Option<Coordinate>>;
}

/// Adapters used by the calculators, one per routed mode.
pub struct RoutingServices {
    pub road: Box<dyn Router>,
    pub rail: Box<dyn Router>,
    pub cycling: Box<dyn Router>,
    pub rail_nodes: Box<dyn RailNodeLocator>,
}

impl RoutingServices {
    /// Build the HTTP-backed adapters described by `config`.
    pub fn from_config(config: &RoutingConfig) -> Result<Self> {
        let client = build_client(config)?;
        let rail: Box<dyn Router> = match config.rail_provider {
            RailProvider::Signal => Box::new(OsrmRouter::rail(config, client.clone())),
            RailProvider::Trainmap => Box::new(TrainmapRouter::new(config, client.clone())),
        };

        Ok(Self {
            road: Box::new(OsrmRouter::road(config, client.clone())),
            rail,
            cycling: Box::new(CyclingRouter::new(config, client.clone())),
            rail_nodes: Box::new(OverpassLocator::new(config, client)),
        })
    }
}

/// Convert GeoJSON positions (`[lon, lat, ...]`) into a line.
pub(crate) fn line_from_positions(
    service: &'static str,
    positions: &[Vec<f64>],
) -> Result<LineString<f64>> {
    let coords = positions
        .iter()
        .map(|position| match position.as_slice() {
            [lon, lat, ..] => Ok(Coord { x: *lon, y: *lat }),
            _ => Err(Error::routing(service, "position with fewer than two values")),
        })
        .collect::<Result<Vec<_>>>()?;

    if coords.len() < 2 {
        return Err(Error::routing(service, "route geometry has fewer than two points"));
    }

    Ok(LineString::new(coords))
}
