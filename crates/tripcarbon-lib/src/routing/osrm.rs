use geo_types::MultiLineString;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info};

use super::http::fetch_json;
use super::{line_from_positions, RoutedPath, Router};
use crate::config::RoutingConfig;
use crate::error::{Error, Result};
use crate::geodesy::Coordinate;

/// OSRM-compatible router (`/route/v1/{profile}` with GeoJSON geometries).
///
/// Serves road routing and the signal rail provider.
#[derive(Debug, Clone)]
pub struct OsrmRouter {
    service: &'static str,
    base_url: String,
    simplified: bool,
    client: Client,
}

impl OsrmRouter {
    pub fn road(config: &RoutingConfig, client: Client) -> Self {
        Self {
            service: "road",
            base_url: config.road_url.clone(),
            simplified: config.simplified,
            client,
        }
    }

    pub fn rail(config: &RoutingConfig, client: Client) -> Self {
        Self {
            service: "rail",
            base_url: config.rail_url.clone(),
            simplified: config.simplified,
            client,
        }
    }

    fn url(&self, start: Coordinate, end: Coordinate) -> String {
        let overview = if self.simplified { "simplified" } else { "full" };
        format!(
            "{base}/{start};{end}?overview={overview}&geometries=geojson",
            base = self.base_url.trim_end_matches('/'),
        )
    }
}

impl Router for OsrmRouter {
    fn name(&self) -> &'static str {
        self.service
    }

    fn route(&self, start: Coordinate, end: Coordinate) -> Result<RoutedPath> {
        let url = self.url(start, end);
        debug!(service = self.service, %url, "requesting route");
        let body: OsrmResponse = fetch_json(self.service, self.client.get(&url))?;
        let path = parse_response(self.service, body)?;
        info!(service = self.service, length_km = path.length_km, "route found");
        Ok(path)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OsrmResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    /// Metres.
    distance: f64,
    geometry: LineGeometry,
}

#[derive(Debug, Deserialize)]
struct LineGeometry {
    coordinates: Vec<Vec<f64>>,
}

pub(crate) fn parse_response(service: &'static str, body: OsrmResponse) -> Result<RoutedPath> {
    if let Some(code) = body.code.as_deref() {
        if code != "Ok" {
            return Err(Error::routing(service, format!("service answered '{code}'")));
        }
    }

    let route = body
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| Error::routing(service, "no route in response"))?;
    let line = line_from_positions(service, &route.geometry.coordinates)?;

    Ok(RoutedPath {
        geometry: MultiLineString::new(vec![line]),
        length_km: route.distance / 1e3,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_route() {
        let body: OsrmResponse = serde_json::from_str(
            r#"{"code":"Ok","routes":[
                {"distance": 465123.0, "geometry": {"type":"LineString","coordinates":[[2.35,48.85],[3.1,47.2],[4.83,45.76]]}},
                {"distance": 1.0, "geometry": {"type":"LineString","coordinates":[[0,0],[1,1]]}}
            ]}"#,
        )
        .expect("body");
        let path = parse_response("road", body).expect("route");
        assert!((path.length_km - 465.123).abs() < 1e-9);
        assert_eq!(path.geometry.0[0].0.len(), 3);
    }

    #[test]
    fn empty_route_list_is_a_routing_failure() {
        let body: OsrmResponse = serde_json::from_str(r#"{"code":"NoRoute","routes":[]}"#)
            .expect("body");
        let err = parse_response("rail", body).expect_err("no route");
        assert!(err.is_routing_failure());
    }

    #[test]
    fn url_orders_coordinates_lon_lat() {
        let config = RoutingConfig::default();
        let router = OsrmRouter::road(&config, Client::new());
        let url = router.url(Coordinate::new(2.35, 48.85), Coordinate::new(4.83, 45.76));
        assert!(url.ends_with("/2.35,48.85;4.83,45.76?overview=simplified&geometries=geojson"));
    }
}
