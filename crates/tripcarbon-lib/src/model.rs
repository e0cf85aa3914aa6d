use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use geo_types::MultiLineString;
use geojson::{Feature, FeatureCollection, JsonObject, JsonValue};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geodesy::Coordinate;

/// Transport mode used to reach a trip step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportMode {
    Train,
    Car,
    #[serde(rename = "Ecar")]
    ElectricCar,
    Bus,
    Bicycle,
    Plane,
    Ferry,
    Sail,
}

impl TransportMode {
    /// Label used in results and error messages.
    pub fn label(self) -> &'static str {
        match self {
            TransportMode::Train => "Train",
            TransportMode::Car => "Car",
            TransportMode::ElectricCar => "Ecar",
            TransportMode::Bus => "Bus",
            TransportMode::Bicycle => "Bicycle",
            TransportMode::Plane => "Plane",
            TransportMode::Ferry => "Ferry",
            TransportMode::Sail => "Sail",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TransportMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mode = match s.trim().to_ascii_lowercase().as_str() {
            "train" | "rail" => TransportMode::Train,
            "car" => TransportMode::Car,
            "ecar" | "electric-car" | "electric_car" => TransportMode::ElectricCar,
            "bus" => TransportMode::Bus,
            "bicycle" | "bike" => TransportMode::Bicycle,
            "plane" | "flight" => TransportMode::Plane,
            "ferry" => TransportMode::Ferry,
            "sail" | "sailboat" => TransportMode::Sail,
            _ => {
                return Err(Error::InvalidStep {
                    input: s.to_string(),
                    reason: "unknown transport mode".to_string(),
                })
            }
        };
        Ok(mode)
    }
}

/// Who shares the vehicle on a car leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Passengers {
    /// Driver plus passengers.
    Count(NonZeroU32),
    /// A rider joining a car that would have made the trip anyway.
    HitchHiking,
}

impl Passengers {
    pub fn count(n: u32) -> Result<Self> {
        NonZeroU32::new(n)
            .map(Passengers::Count)
            .ok_or_else(|| Error::InvalidStep {
                input: n.to_string(),
                reason: "passenger count must be at least 1".to_string(),
            })
    }

    /// Label attached to car geometries.
    pub fn label(self) -> String {
        match self {
            Passengers::Count(n) => format!("{n} pass."),
            Passengers::HitchHiking => "Hitch-hiking".to_string(),
        }
    }
}

impl Default for Passengers {
    fn default() -> Self {
        Passengers::Count(NonZeroU32::MIN)
    }
}

/// On-board options for a ferry crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FerryOption {
    #[default]
    None,
    Cabin,
    Vehicle,
    CabinVehicle,
}

impl FerryOption {
    pub fn label(self) -> &'static str {
        match self {
            FerryOption::None => "None",
            FerryOption::Cabin => "Cabin",
            FerryOption::Vehicle => "Vehicle",
            FerryOption::CabinVehicle => "CabinVehicle",
        }
    }
}

impl FromStr for FerryOption {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "seat" => Ok(FerryOption::None),
            "cabin" => Ok(FerryOption::Cabin),
            "vehicle" | "car" => Ok(FerryOption::Vehicle),
            "cabinvehicle" | "cabin+vehicle" | "cabin-vehicle" => Ok(FerryOption::CabinVehicle),
            _ => Err(Error::InvalidStep {
                input: s.to_string(),
                reason: "unknown ferry option".to_string(),
            }),
        }
    }
}

/// One waypoint of a user-defined trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripStep {
    pub coordinate: Coordinate,
    /// Mode used to reach this step; ignored on the first step.
    pub mode: Option<TransportMode>,
    #[serde(default)]
    pub passengers: Passengers,
    #[serde(default)]
    pub ferry_option: FerryOption,
}

impl TripStep {
    pub fn origin(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            mode: None,
            passengers: Passengers::default(),
            ferry_option: FerryOption::default(),
        }
    }

    pub fn reached_by(coordinate: Coordinate, mode: TransportMode) -> Self {
        Self {
            mode: Some(mode),
            ..Self::origin(coordinate)
        }
    }

    pub fn with_passengers(mut self, passengers: Passengers) -> Self {
        self.passengers = passengers;
        self
    }

    pub fn with_ferry_option(mut self, option: FerryOption) -> Self {
        self.ferry_option = option;
        self
    }
}

impl FromStr for TripStep {
    type Err = Error;

    /// Parse `lon,lat` or `MODE[:PARAM]@lon,lat`.
    ///
    /// `PARAM` is a passenger count or `hitchhiking` for car-like modes and a
    /// ferry option for ferries.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidStep {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let Some((mode_part, coordinate)) = s.split_once('@') else {
            return Ok(TripStep::origin(s.parse()?));
        };

        let coordinate: Coordinate = coordinate.parse()?;
        let (mode, param) = match mode_part.split_once(':') {
            Some((mode, param)) => (mode.parse::<TransportMode>()?, Some(param.trim())),
            None => (mode_part.parse::<TransportMode>()?, None),
        };

        let mut step = TripStep::reached_by(coordinate, mode);
        let Some(param) = param else {
            return Ok(step);
        };

        match mode {
            TransportMode::Car | TransportMode::ElectricCar => {
                let lowered = param.to_ascii_lowercase();
                step.passengers = if matches!(lowered.as_str(), "hitchhiking" | "hitch-hiking") {
                    Passengers::HitchHiking
                } else {
                    let n: u32 = param
                        .parse()
                        .map_err(|_| invalid("passenger count is not a number"))?;
                    Passengers::count(n)?
                };
            }
            TransportMode::Ferry => step.ferry_option = param.parse()?,
            _ => return Err(invalid("this mode takes no parameter")),
        }

        Ok(step)
    }
}

/// One named contributor to a leg's footprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionComponent {
    pub name: String,
    pub kg_co2_eq: f64,
    /// Emission factor in kgCO2eq per km used to compute the mass.
    pub ef_tot: f64,
    pub color: String,
}

impl EmissionComponent {
    pub fn new(name: impl Into<String>, kg_co2_eq: f64, ef_tot: f64, color: &str) -> Self {
        Self {
            name: name.into(),
            kg_co2_eq,
            ef_tot,
            color: color.to_string(),
        }
    }

    /// Distance-proportional component: `ef × length_km`.
    pub fn per_km(name: impl Into<String>, ef: f64, length_km: f64, color: &str) -> Self {
        Self::new(name, ef * length_km, ef, color)
    }
}

/// Per-leg emissions breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepData {
    pub transport_means: TransportMode,
    pub emissions: Vec<EmissionComponent>,
    pub path_length: f64,
}

impl StepData {
    pub fn total_kg_co2_eq(&self) -> f64 {
        self.emissions.iter().map(|c| c.kg_co2_eq).sum()
    }
}

/// Renderable path fragment with display metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathGeometry {
    pub coordinates: Vec<Vec<[f64; 2]>>,
    pub transport_means: String,
    pub length: f64,
    pub color: String,
    pub country_label: Option<String>,
}

impl PathGeometry {
    pub fn from_path(
        path: &MultiLineString<f64>,
        transport_means: impl Into<String>,
        length: f64,
        color: &str,
    ) -> Self {
        let coordinates = path
            .0
            .iter()
            .map(|line| line.0.iter().map(|c| [c.x, c.y]).collect())
            .collect();
        Self {
            coordinates,
            transport_means: transport_means.into(),
            length,
            color: color.to_string(),
            country_label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.country_label = Some(label.into());
        self
    }

    pub fn to_geojson_feature(&self) -> Feature {
        let lines: Vec<Vec<Vec<f64>>> = self
            .coordinates
            .iter()
            .map(|line| line.iter().map(|c| vec![c[0], c[1]]).collect())
            .collect();

        let mut properties = JsonObject::new();
        properties.insert(
            "transport_means".to_string(),
            JsonValue::from(self.transport_means.clone()),
        );
        properties.insert("length".to_string(), JsonValue::from(self.length));
        properties.insert("color".to_string(), JsonValue::from(self.color.clone()));
        properties.insert(
            "country_label".to_string(),
            self.country_label
                .clone()
                .map(JsonValue::from)
                .unwrap_or(JsonValue::Null),
        );

        Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::MultiLineString(
                lines,
            ))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

/// Result of computing one leg.
#[derive(Debug, Clone, PartialEq)]
pub struct LegOutcome {
    pub step: StepData,
    pub geometries: Vec<PathGeometry>,
}

/// Named collection of leg results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripResult {
    pub name: String,
    pub steps: Vec<StepData>,
}

impl TripResult {
    pub fn total_kg_co2_eq(&self) -> f64 {
        self.steps.iter().map(StepData::total_kg_co2_eq).sum()
    }

    pub fn total_length_km(&self) -> f64 {
        self.steps.iter().map(|s| s.path_length).sum()
    }
}

/// Every trip computed for a request plus their geometries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripOutcome {
    pub trips: Vec<TripResult>,
    pub geometries: Vec<PathGeometry>,
}

impl TripOutcome {
    pub fn trip(&self, name: &str) -> Option<&TripResult> {
        self.trips.iter().find(|t| t.name == name)
    }

    pub fn to_feature_collection(&self) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: self
                .geometries
                .iter()
                .map(PathGeometry::to_geojson_feature)
                .collect(),
            foreign_members: None,
        }
    }
}
