//! Per-mode emission calculators.
//!
//! This module provides:
//! - [`EmissionFactors`] - factor tables for every mode
//! - [`EmissionEngine`] - routes a leg with the right adapter and applies the
//!   mode's emission model
//! - [`LegCalculator`] - the seam used by the trip orchestrator
//!
//! The mode-specific models (`car_leg`, `train_leg`, ...) are pure functions
//! of an already routed path, so they can be exercised without any network.
//! [`EmissionEngine`] is where routing, validation and region splitting
//! happen; every failure there is logged and turned into `None` at the
//! [`LegCalculator`] boundary.

mod bicycle;
mod factors;
mod ferry;
mod plane;
mod road;
mod train;

pub use bicycle::bicycle_leg;
pub use factors::{
    BicycleFactors, BusFactors, CarFactors, ElectricCarFactors, EmissionFactors, FerryFactors,
    FlightBand, PlaneFactors, PlaneTier, SailFactors, TrainFactors,
};
pub use ferry::{ferry_leg, sail_leg};
pub use plane::plane_leg;
pub use road::{bus_leg, car_leg, electric_car_leg};
pub use train::train_leg;

use std::sync::Arc;

use tracing::warn;

use crate::config::{Palette, RoutingConfig, Settings};
use crate::error::Result;
use crate::geodesy::Coordinate;
use crate::model::{FerryOption, LegOutcome, Passengers, TransportMode};
use crate::reference::ReferenceData;
use crate::routing::{RailRouting, RoutedPath, RoutingServices};
use crate::sea::{sea_path, SeaLaneOptions};
use crate::split::split_by_region;
use crate::validate::check_endpoints;

/// One leg to compute: two consecutive trip steps and the arrival's mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg {
    pub start: Coordinate,
    pub end: Coordinate,
    pub mode: TransportMode,
    pub passengers: Passengers,
    pub ferry_option: FerryOption,
}

impl Leg {
    pub fn new(start: Coordinate, end: Coordinate, mode: TransportMode) -> Self {
        Self {
            start,
            end,
            mode,
            passengers: Passengers::default(),
            ferry_option: FerryOption::default(),
        }
    }
}

/// Computes the emissions of a single leg.
pub trait LegCalculator {
    /// `None` when the leg could not be routed or validated.
    fn compute_leg(&self, leg: &Leg, palette: &Palette) -> Option<LegOutcome>;
}

/// Road pair computed from a single routing call.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadPair {
    pub car: LegOutcome,
    pub bus: LegOutcome,
}

/// Routing adapters, reference layers and factors bundled for calculation.
///
/// Built once at start-up and only read afterwards.
pub struct EmissionEngine {
    services: RoutingServices,
    reference: Arc<ReferenceData>,
    routing: RoutingConfig,
    factors: EmissionFactors,
    sea: SeaLaneOptions,
}

impl EmissionEngine {
    pub fn new(services: RoutingServices, reference: Arc<ReferenceData>, settings: Settings) -> Self {
        Self {
            services,
            reference,
            routing: settings.routing,
            factors: settings.factors,
            sea: settings.sea,
        }
    }

    pub fn routing_config(&self) -> &RoutingConfig {
        &self.routing
    }

    pub fn factors(&self) -> &EmissionFactors {
        &self.factors
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    /// Compute a leg, keeping the failure reason.
    pub fn try_compute_leg(&self, leg: &Leg, palette: &Palette) -> Result<LegOutcome> {
        match leg.mode {
            TransportMode::Car => self.car(leg.start, leg.end, leg.passengers, palette),
            TransportMode::ElectricCar => {
                self.electric_car(leg.start, leg.end, leg.passengers, palette)
            }
            TransportMode::Bus => self.bus(leg.start, leg.end, palette),
            TransportMode::Train => self.train(leg.start, leg.end, palette),
            TransportMode::Bicycle => self.bicycle(leg.start, leg.end, palette),
            TransportMode::Plane => Ok(self.plane(leg.start, leg.end, palette)),
            TransportMode::Ferry => self.ferry(leg.start, leg.end, leg.ferry_option, palette),
            TransportMode::Sail => self.sail(leg.start, leg.end, palette),
        }
    }

    pub fn car(
        &self,
        start: Coordinate,
        end: Coordinate,
        passengers: Passengers,
        palette: &Palette,
    ) -> Result<LegOutcome> {
        let path = self.road_route(start, end)?;
        Ok(car_leg(&path, passengers, &self.factors.car, palette))
    }

    pub fn bus(&self, start: Coordinate, end: Coordinate, palette: &Palette) -> Result<LegOutcome> {
        let path = self.road_route(start, end)?;
        Ok(bus_leg(&path, &self.factors.bus, palette))
    }

    /// Car (single driver) and bus over the same road route.
    pub fn car_and_bus(
        &self,
        start: Coordinate,
        end: Coordinate,
        palette: &Palette,
    ) -> Result<RoadPair> {
        let path = self.road_route(start, end)?;
        Ok(RoadPair {
            car: car_leg(&path, Passengers::default(), &self.factors.car, palette),
            bus: bus_leg(&path, &self.factors.bus, palette),
        })
    }

    pub fn electric_car(
        &self,
        start: Coordinate,
        end: Coordinate,
        passengers: Passengers,
        palette: &Palette,
    ) -> Result<LegOutcome> {
        let path = self.road_route(start, end)?;
        let segments = split_by_region(
            &path.geometry,
            &self.reference.electricity,
            path.length_km,
            self.routing.sea_threshold_km,
        )?;
        Ok(electric_car_leg(
            &path,
            &segments,
            passengers,
            &self.factors.car,
            &self.factors.electric_car,
            palette,
        ))
    }

    pub fn train(&self, start: Coordinate, end: Coordinate, palette: &Palette) -> Result<LegOutcome> {
        let rail = RailRouting::new(
            self.services.rail.as_ref(),
            self.services.rail_nodes.as_ref(),
            &self.routing.search_perimeters_km,
            self.routing.validation_tolerance_km,
        );
        let path = rail.route(start, end)?;
        let segments = split_by_region(
            &path.geometry,
            &self.reference.rail,
            path.length_km,
            self.routing.sea_threshold_km,
        )?;
        Ok(train_leg(&path, &segments, &self.factors.train, palette))
    }

    pub fn bicycle(&self, start: Coordinate, end: Coordinate, palette: &Palette) -> Result<LegOutcome> {
        let path = self.services.cycling.route(start, end)?;
        check_endpoints(start, end, &path.geometry, self.routing.validation_tolerance_km)?;
        Ok(bicycle_leg(&path, &self.factors.bicycle, palette))
    }

    pub fn plane(&self, start: Coordinate, end: Coordinate, palette: &Palette) -> LegOutcome {
        plane_leg(
            start,
            end,
            self.routing.great_circle_points,
            &self.factors.plane,
            palette,
        )
    }

    pub fn ferry(
        &self,
        start: Coordinate,
        end: Coordinate,
        option: FerryOption,
        palette: &Palette,
    ) -> Result<LegOutcome> {
        let route = sea_path(self.reference.land(), start, end, &self.sea)?;
        Ok(ferry_leg(&route, option, &self.factors.ferry, palette))
    }

    pub fn sail(&self, start: Coordinate, end: Coordinate, palette: &Palette) -> Result<LegOutcome> {
        let route = sea_path(self.reference.land(), start, end, &self.sea)?;
        Ok(sail_leg(&route, &self.factors.sail, palette))
    }

    fn road_route(&self, start: Coordinate, end: Coordinate) -> Result<RoutedPath> {
        let path = self.services.road.route(start, end)?;
        check_endpoints(start, end, &path.geometry, self.routing.validation_tolerance_km)?;
        Ok(path)
    }
}

impl LegCalculator for EmissionEngine {
    fn compute_leg(&self, leg: &Leg, palette: &Palette) -> Option<LegOutcome> {
        match self.try_compute_leg(leg, palette) {
            Ok(outcome) => Some(outcome),
            Err(error) => {
                warn!(mode = %leg.mode, start = %leg.start, end = %leg.end, %error, "leg computation failed");
                None
            }
        }
    }
}
