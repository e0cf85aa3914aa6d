use geo::Simplify;
use geo_types::MultiLineString;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info};

use super::http::fetch_json;
use super::{line_from_positions, RoutedPath, Router};
use crate::config::RoutingConfig;
use crate::error::{Error, Result};
use crate::geodesy::Coordinate;

const SERVICE: &str = "cycling";

/// OpenRouteService cycling directions.
///
/// The returned geometry is simplified before use; the authoritative length
/// stays the one reported by the service.
#[derive(Debug, Clone)]
pub struct CyclingRouter {
    base_url: String,
    api_key: Option<String>,
    simplify_tolerance: f64,
    client: Client,
}

impl CyclingRouter {
    pub fn new(config: &RoutingConfig, client: Client) -> Self {
        Self {
            base_url: config.cycling_url.clone(),
            api_key: config.cycling_api_key.clone(),
            simplify_tolerance: config.cycling_simplify_tolerance,
            client,
        }
    }
}

impl Router for CyclingRouter {
    fn name(&self) -> &'static str {
        SERVICE
    }

    fn route(&self, start: Coordinate, end: Coordinate) -> Result<RoutedPath> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::routing(SERVICE, "no API key configured (BICYCLE_API_KEY)"))?;

        let request = self.client.get(&self.base_url).query(&[
            ("api_key", api_key.to_string()),
            ("start", start.to_string()),
            ("end", end.to_string()),
        ]);
        debug!(service = SERVICE, %start, %end, "requesting route");
        let body: DirectionsResponse = fetch_json(SERVICE, request)?;
        let path = parse_response(body, self.simplify_tolerance)?;
        info!(service = SERVICE, length_km = path.length_km, "route found");
        Ok(path)
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    features: Vec<DirectionsFeature>,
}

#[derive(Debug, Deserialize)]
struct DirectionsFeature {
    geometry: LineGeometry,
    properties: DirectionsProperties,
}

#[derive(Debug, Deserialize)]
struct LineGeometry {
    coordinates: Vec<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
struct DirectionsProperties {
    summary: Summary,
}

#[derive(Debug, Deserialize)]
struct Summary {
    /// Metres.
    #[serde(default)]
    distance: f64,
}

fn parse_response(body: DirectionsResponse, tolerance: f64) -> Result<RoutedPath> {
    let feature = body
        .features
        .into_iter()
        .next()
        .ok_or_else(|| Error::routing(SERVICE, "no route in response"))?;
    let line = line_from_positions(SERVICE, &feature.geometry.coordinates)?;

    Ok(RoutedPath {
        geometry: MultiLineString::new(vec![line.simplify(&tolerance)]),
        length_km: feature.properties.summary.distance / 1e3,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simplifies_geometry_but_keeps_reported_length() {
        let body: DirectionsResponse = serde_json::from_str(
            r#"{"features":[{"geometry":{"coordinates":[[0,0],[0.5,0.001],[1,0]]},
                "properties":{"summary":{"distance":111000.0}}}]}"#,
        )
        .expect("body");
        let path = parse_response(body, 0.05).expect("route");
        assert_eq!(path.geometry.0[0].0.len(), 2);
        assert!((path.length_km - 111.0).abs() < 1e-9);
    }

    #[test]
    fn missing_api_key_fails_without_network() {
        let router = CyclingRouter::new(&RoutingConfig::default(), Client::new());
        let err = router
            .route(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0))
            .expect_err("no key");
        assert!(err.is_routing_failure());
    }
}
