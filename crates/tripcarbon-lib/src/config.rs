//! Immutable configuration passed to routers and calculators.
//!
//! Every struct here deserializes with defaults for missing fields, so an
//! override file only has to name the values it changes:
//!
//! ```json
//! { "routing": { "validation_tolerance_km": 50 }, "factors": { "plane": { "detour": 1.05 } } }
//! ```

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::emissions::EmissionFactors;
use crate::error::{Error, Result};
use crate::sea::SeaLaneOptions;

const ROAD_URL_ENV: &str = "TRIPCARBON_ROAD_URL";
const RAIL_URL_ENV: &str = "TRIPCARBON_RAIL_URL";
const CYCLING_URL_ENV: &str = "TRIPCARBON_CYCLING_URL";
const OVERPASS_URL_ENV: &str = "TRIPCARBON_OVERPASS_URL";
const CYCLING_API_KEY_ENV: &str = "BICYCLE_API_KEY";

/// Rail routing backend; both answer the same `route(start, end)` contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RailProvider {
    /// OSRM instance with a train profile.
    #[default]
    Signal,
    /// trainmap routing API.
    Trainmap,
}

/// Endpoints and tolerances for the routing layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub road_url: String,
    pub rail_url: String,
    pub rail_provider: RailProvider,
    /// Endpoint used when `rail_provider` is `trainmap`.
    pub trainmap_url: String,
    pub cycling_url: String,
    pub cycling_api_key: Option<String>,
    pub overpass_url: String,
    /// Ask routers for simplified geometries.
    pub simplified: bool,
    /// Upper bound for every outbound call.
    pub timeout_secs: u64,
    pub validation_tolerance_km: f64,
    /// Radii tried in order when snapping to the rail network.
    pub search_perimeters_km: Vec<f64>,
    /// Minimum length of an unmatched gap worth attributing to a region.
    pub sea_threshold_km: f64,
    /// Below this great-circle distance the plane is not offered as a comparison.
    pub min_plane_distance_km: f64,
    pub great_circle_points: usize,
    /// Douglas-Peucker tolerance in degrees applied to cycling geometries.
    pub cycling_simplify_tolerance: f64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            road_url: "http://router.project-osrm.org/route/v1/driving".to_string(),
            rail_url: "https://signal.eu.org/osm/eu/route/v1/train".to_string(),
            rail_provider: RailProvider::Signal,
            trainmap_url: "https://trainmap.ntag.fr/api/route".to_string(),
            cycling_url: "https://api.openrouteservice.org/v2/directions/cycling-regular"
                .to_string(),
            cycling_api_key: None,
            overpass_url: "http://overpass-api.de/api/interpreter".to_string(),
            simplified: true,
            timeout_secs: 30,
            validation_tolerance_km: 100.0,
            search_perimeters_km: vec![0.2, 5.0],
            sea_threshold_km: 5.0,
            min_plane_distance_km: 300.0,
            great_circle_points: 100,
            cycling_simplify_tolerance: 0.05,
        }
    }
}

impl RoutingConfig {
    /// Apply `TRIPCARBON_*_URL` and `BICYCLE_API_KEY` overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = env::var(ROAD_URL_ENV) {
            self.road_url = url;
        }
        if let Ok(url) = env::var(RAIL_URL_ENV) {
            self.rail_url = url;
        }
        if let Ok(url) = env::var(CYCLING_URL_ENV) {
            self.cycling_url = url;
        }
        if let Ok(url) = env::var(OVERPASS_URL_ENV) {
            self.overpass_url = url;
        }
        if let Ok(key) = env::var(CYCLING_API_KEY_ENV) {
            if !key.is_empty() {
                self.cycling_api_key = Some(key);
            }
        }
        self
    }
}

/// Colors assigned to emission components and geometries of one trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    /// Usage components (fuel, kerosene, per-region usage) and path geometries.
    pub usage: String,
    pub construction: String,
    pub infra: String,
    /// Non-CO2 effects.
    pub contrails: String,
}

impl Palette {
    fn from_colors(usage: &str, construction: &str, infra: &str, contrails: &str) -> Self {
        Self {
            usage: usage.to_string(),
            construction: construction.to_string(),
            infra: infra.to_string(),
            contrails: contrails.to_string(),
        }
    }

    /// Main user trip.
    pub fn custom() -> Self {
        Self::from_colors("#27A4B2", "#7de4f0", "#b3eef5", "#006773")
    }

    /// Direct-trip comparisons.
    pub fn direct() -> Self {
        Self::from_colors("#E69138", "#febc78", "#cd781f", "#B45E06")
    }

    /// Second user trip.
    pub fn alternative() -> Self {
        Self::from_colors("#ec7d92", "#f9b5c1", "#ffd1d9", "#df4562")
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::custom()
    }
}

/// Complete override file layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub routing: RoutingConfig,
    pub factors: EmissionFactors,
    pub sea: SeaLaneOptions,
}

impl Settings {
    /// Read a JSON override file; missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|err| Error::InvalidSettings {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn partial_override_keeps_defaults() {
        let mut file = NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{"routing": {{"validation_tolerance_km": 50, "rail_provider": "trainmap"}}}}"#
        )
        .expect("write");

        let settings = Settings::load(file.path()).expect("settings");
        assert_eq!(settings.routing.validation_tolerance_km, 50.0);
        assert_eq!(settings.routing.rail_provider, RailProvider::Trainmap);
        assert_eq!(settings.routing.search_perimeters_km, vec![0.2, 5.0]);
        assert_eq!(settings.factors, EmissionFactors::default());
    }

    #[test]
    fn malformed_override_reports_path() {
        let mut file = NamedTempFile::new().expect("temp file");
        write!(file, "not json").expect("write");
        let err = Settings::load(file.path()).expect_err("invalid json");
        assert!(matches!(err, Error::InvalidSettings { .. }));
    }
}
