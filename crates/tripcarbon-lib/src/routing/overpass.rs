use std::f64::consts::TAU;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use super::http::fetch_json;
use super::RailNodeLocator;
use crate::config::RoutingConfig;
use crate::error::Result;
use crate::geodesy::{km_to_degrees, Coordinate};

const SERVICE: &str = "overpass";
const CIRCLE_SEGMENTS: usize = 32;

/// Nearest rail node lookup through the Overpass API.
#[derive(Debug, Clone)]
pub struct OverpassLocator {
    url: String,
    client: Client,
}

impl OverpassLocator {
    pub fn new(config: &RoutingConfig, client: Client) -> Self {
        Self {
            url: config.overpass_url.clone(),
            client,
        }
    }
}

impl RailNodeLocator for OverpassLocator {
    fn nearest_rail_node(
        &self,
        around: Coordinate,
        perimeter_km: f64,
    ) -> Result<Option<Coordinate>> {
        let query = rail_query(around, perimeter_km);
        debug!(service = SERVICE, %around, perimeter_km, "searching rail node");
        let body: OverpassResponse =
            fetch_json(SERVICE, self.client.get(&self.url).query(&[("data", query)]))?;
        Ok(first_node(body))
    }
}

/// Overpass QL selecting rail ways inside a circle around `center`.
///
/// Overpass polygons are written as `lat lon` pairs.
pub(crate) fn rail_query(center: Coordinate, perimeter_km: f64) -> String {
    let radius = km_to_degrees(perimeter_km);
    let ring: Vec<String> = (0..=CIRCLE_SEGMENTS)
        .map(|i| {
            let angle = TAU * i as f64 / CIRCLE_SEGMENTS as f64;
            format!(
                "{} {}",
                center.lat + radius * angle.sin(),
                center.lon + radius * angle.cos()
            )
        })
        .collect();

    format!(
        "[out:json][timeout:300];(way(poly : \"{}\")[\"railway\"=\"rail\"];);out geom;",
        ring.join(" ")
    )
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(default)]
    geometry: Vec<OverpassNode>,
}

#[derive(Debug, Deserialize)]
struct OverpassNode {
    lat: f64,
    lon: f64,
}

fn first_node(body: OverpassResponse) -> Option<Coordinate> {
    body.elements
        .into_iter()
        .next()
        .and_then(|element| element.geometry.into_iter().next())
        .map(|node| Coordinate::new(node.lon, node.lat))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_is_a_closed_lat_lon_ring() {
        let query = rail_query(Coordinate::new(2.0, 48.0), 5.0);
        assert!(query.starts_with("[out:json][timeout:300];(way(poly : \""));
        assert!(query.ends_with("[\"railway\"=\"rail\"];);out geom;"));

        let ring = query.split('"').nth(1).expect("polygon");
        let values: Vec<f64> = ring
            .split_whitespace()
            .map(|v| v.parse().expect("number"))
            .collect();
        assert_eq!(values.len(), 2 * (CIRCLE_SEGMENTS + 1));
        // first value is a latitude close to the centre
        assert!((values[0] - 48.0).abs() < 0.1);
        assert!((values[0] - values[values.len() - 2]).abs() < 1e-9);
    }

    #[test]
    fn empty_result_has_no_node() {
        let body: OverpassResponse = serde_json::from_str(r#"{"elements":[]}"#).expect("body");
        assert_eq!(first_node(body), None);

        let body: OverpassResponse = serde_json::from_str(
            r#"{"elements":[{"type":"way","geometry":[{"lat":48.1,"lon":2.1},{"lat":48.2,"lon":2.2}]}]}"#,
        )
        .expect("body");
        assert_eq!(first_node(body), Some(Coordinate::new(2.1, 48.1)));
    }
}
