//! Trip-level composition of leg results.
//!
//! A custom trip fails as a whole as soon as one leg cannot be computed, and
//! the error names that leg. Direct-trip comparisons are best effort: a mode
//! that cannot be computed is simply left out.

use tracing::{info, warn};

use crate::config::Palette;
use crate::emissions::{EmissionEngine, Leg, LegCalculator};
use crate::error::{Error, Result};
use crate::geodesy::geodesic_distance_km;
use crate::model::{PathGeometry, TransportMode, TripOutcome, TripResult, TripStep};

pub const MAIN_TRIP: &str = "MAIN_TRIP";
pub const SECOND_TRIP: &str = "SECOND_TRIP";
pub const DIRECT_TRAIN: &str = "DIRECT_TRAIN";
pub const DIRECT_CAR: &str = "DIRECT_CAR";
pub const DIRECT_BUS: &str = "DIRECT_BUS";
pub const DIRECT_PLANE: &str = "DIRECT_PLANE";

/// A computed trip and the geometries of its legs.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedTrip {
    pub result: TripResult,
    pub geometries: Vec<PathGeometry>,
}

/// Legs described by consecutive steps, numbered from 1.
pub fn legs(steps: &[TripStep]) -> Result<Vec<Leg>> {
    if steps.len() < 2 {
        return Err(Error::InvalidTrip {
            reason: format!("a trip needs at least two steps, got {}", steps.len()),
        });
    }

    steps
        .windows(2)
        .enumerate()
        .map(|(idx, pair)| {
            let (from, to) = (&pair[0], &pair[1]);
            let mode = to.mode.ok_or_else(|| Error::InvalidTrip {
                reason: format!("step {} has no transport mode", idx + 2),
            })?;
            Ok(Leg {
                start: from.coordinate,
                end: to.coordinate,
                mode,
                passengers: to.passengers,
                ferry_option: to.ferry_option,
            })
        })
        .collect()
}

/// Compute every leg of `steps` in order.
///
/// Stops at the first leg the calculator cannot compute and reports it as
/// [`Error::LegFailed`] with its 1-based index; no partial result is returned.
pub fn compute_custom_trip(
    calculator: &dyn LegCalculator,
    name: &str,
    steps: &[TripStep],
    palette: &Palette,
) -> Result<ComputedTrip> {
    let legs = legs(steps)?;
    let mut result = TripResult {
        name: name.to_string(),
        steps: Vec::with_capacity(legs.len()),
    };
    let mut geometries = Vec::new();

    for (idx, leg) in legs.iter().enumerate() {
        let outcome = calculator
            .compute_leg(leg, palette)
            .ok_or(Error::LegFailed {
                leg: idx + 1,
                mode: leg.mode,
            })?;
        result.steps.push(outcome.step);
        geometries.extend(outcome.geometries);
    }

    info!(
        trip = name,
        legs = result.steps.len(),
        kg_co2_eq = result.total_kg_co2_eq(),
        "trip computed"
    );
    Ok(ComputedTrip { result, geometries })
}

/// Alternative modes for a single origin/destination pair.
///
/// The mode actually used by `destination` is skipped, as is the plane when
/// the two points are closer than the configured minimum. Ferry and sail are
/// never offered.
pub fn compute_direct_trips(
    engine: &EmissionEngine,
    origin: &TripStep,
    destination: &TripStep,
    palette: &Palette,
) -> TripOutcome {
    let actual = destination.mode;
    let (start, end) = (origin.coordinate, destination.coordinate);
    let mut outcome = TripOutcome::default();

    let push = |outcome: &mut TripOutcome, name: &str, leg: crate::model::LegOutcome| {
        outcome.trips.push(TripResult {
            name: name.to_string(),
            steps: vec![leg.step],
        });
        outcome.geometries.extend(leg.geometries);
    };

    if actual != Some(TransportMode::Train) {
        match engine.train(start, end, palette) {
            Ok(leg) => push(&mut outcome, DIRECT_TRAIN, leg),
            Err(error) => warn!(%error, "omitting train from comparison"),
        }
    }

    let want_car = actual != Some(TransportMode::Car);
    let want_bus = actual != Some(TransportMode::Bus);
    if want_car || want_bus {
        match engine.car_and_bus(start, end, palette) {
            Ok(pair) => {
                let mut bus = pair.bus;
                if want_car {
                    push(&mut outcome, DIRECT_CAR, pair.car);
                    // same road as the car
                    bus.geometries.clear();
                }
                if want_bus {
                    push(&mut outcome, DIRECT_BUS, bus);
                }
            }
            Err(error) => warn!(%error, "omitting car and bus from comparison"),
        }
    }

    let distance_km = geodesic_distance_km(start, end);
    let min_km = engine.routing_config().min_plane_distance_km;
    if actual == Some(TransportMode::Plane) {
        // already the main trip
    } else if distance_km < min_km {
        info!(distance_km, min_km, "too short for a plane comparison");
    } else {
        push(&mut outcome, DIRECT_PLANE, engine.plane(start, end, palette));
    }

    outcome
}

/// Compute the main trip, then either the alternative trip or, for a single
/// leg trip, the direct comparisons.
pub fn compute_request(
    engine: &EmissionEngine,
    main: &[TripStep],
    alternative: Option<&[TripStep]>,
) -> Result<TripOutcome> {
    let main_trip = compute_custom_trip(engine, MAIN_TRIP, main, &Palette::custom())?;
    let mut outcome = TripOutcome {
        trips: vec![main_trip.result],
        geometries: main_trip.geometries,
    };

    if let Some(steps) = alternative {
        let second = compute_custom_trip(engine, SECOND_TRIP, steps, &Palette::alternative())?;
        outcome.trips.push(second.result);
        outcome.geometries.extend(second.geometries);
    } else if let [origin, destination] = main {
        let direct = compute_direct_trips(engine, origin, destination, &Palette::direct());
        outcome.trips.extend(direct.trips);
        outcome.geometries.extend(direct.geometries);
    }

    Ok(outcome)
}
