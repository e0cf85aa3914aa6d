use geo_types::MultiLineString;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info};

use super::http::fetch_json;
use super::{line_from_positions, RoutedPath, Router};
use crate::config::RoutingConfig;
use crate::error::{Error, Result};
use crate::geodesy::{path_length_km, Coordinate};

const SERVICE: &str = "trainmap";

/// Rail router backed by the trainmap API.
///
/// The provider returns no distance, so the authoritative length is the
/// geodesic length of the returned geometry.
#[derive(Debug, Clone)]
pub struct TrainmapRouter {
    base_url: String,
    simplified: bool,
    client: Client,
}

impl TrainmapRouter {
    pub fn new(config: &RoutingConfig, client: Client) -> Self {
        Self {
            base_url: config.trainmap_url.clone(),
            simplified: config.simplified,
            client,
        }
    }
}

impl Router for TrainmapRouter {
    fn name(&self) -> &'static str {
        SERVICE
    }

    fn route(&self, start: Coordinate, end: Coordinate) -> Result<RoutedPath> {
        let simplify = if self.simplified { "1" } else { "0" };
        let request = self.client.get(&self.base_url).query(&[
            ("dep", start.to_string()),
            ("arr", end.to_string()),
            ("simplify", simplify.to_string()),
        ]);
        debug!(service = SERVICE, %start, %end, "requesting route");
        let body: TrainmapResponse = fetch_json(SERVICE, request)?;
        let path = parse_response(body)?;
        info!(service = SERVICE, length_km = path.length_km, "route found");
        Ok(path)
    }
}

#[derive(Debug, Deserialize)]
struct TrainmapResponse {
    geometry: Option<MultiLineGeometry>,
}

#[derive(Debug, Deserialize)]
struct MultiLineGeometry {
    coordinates: Vec<Vec<Vec<f64>>>,
}

fn parse_response(body: TrainmapResponse) -> Result<RoutedPath> {
    let geometry = body
        .geometry
        .ok_or_else(|| Error::routing(SERVICE, "response has no geometry"))?;
    let lines = geometry
        .coordinates
        .iter()
        .map(|part| line_from_positions(SERVICE, part))
        .collect::<Result<Vec<_>>>()?;
    if lines.is_empty() {
        return Err(Error::routing(SERVICE, "empty geometry"));
    }

    let geometry = MultiLineString::new(lines);
    let length_km = path_length_km(&geometry);
    Ok(RoutedPath {
        geometry,
        length_km,
    })
}
