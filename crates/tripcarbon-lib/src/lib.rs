//! Tripcarbon library entry points.
//!
//! This crate estimates the greenhouse-gas emissions of multi-modal trips. A
//! trip is a list of steps; each leg between two steps is routed with the
//! adapter for its mode (road, rail, cycling, great circle or sea lanes),
//! split across the regions it crosses when the emission factor depends on
//! the country, and turned into per-component emissions. Higher-level
//! consumers (the CLI) should only depend on the functions exported here
//! instead of reimplementing behavior.

pub mod config;
pub mod emissions;
pub mod error;
pub mod geodesy;
pub mod graph;
pub mod model;
pub mod path;
pub mod reference;
pub mod routing;
pub mod sea;
pub mod split;
pub mod trip;
pub mod validate;

pub use config::{Palette, RailProvider, RoutingConfig, Settings};
pub use emissions::{EmissionEngine, EmissionFactors, Leg, LegCalculator};
pub use error::{Error, Result};
pub use geodesy::{geodesic_distance_km, great_circle, Coordinate};
pub use model::{
    EmissionComponent, FerryOption, LegOutcome, Passengers, PathGeometry, StepData, TransportMode,
    TripOutcome, TripResult, TripStep,
};
pub use reference::{resolve_data_dir, Landmass, ReferenceData, Region, RegionLayer};
pub use routing::{RoutedPath, Router, RoutingServices};
pub use sea::{sea_path, SeaLaneOptions, SeaPath};
pub use split::{split_by_region, RegionSegment};
pub use trip::{compute_custom_trip, compute_direct_trips, compute_request, ComputedTrip};
