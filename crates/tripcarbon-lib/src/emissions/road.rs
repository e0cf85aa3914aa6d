use crate::config::Palette;
use crate::model::{EmissionComponent, LegOutcome, Passengers, PathGeometry, StepData, TransportMode};
use crate::routing::RoutedPath;
use crate::split::RegionSegment;

use super::factors::{BusFactors, CarFactors, ElectricCarFactors};

/// Combustion car shared by `passengers`.
pub fn car_leg(
    path: &RoutedPath,
    passengers: Passengers,
    factors: &CarFactors,
    palette: &Palette,
) -> LegOutcome {
    let (usage_share, construction_share) = factors.shares(passengers);
    let length = path.length_km;

    let emissions = vec![
        EmissionComponent::per_km(
            "Construction",
            factors.construction * construction_share,
            length,
            &palette.construction,
        ),
        EmissionComponent::per_km("Fuel", factors.fuel * usage_share, length, &palette.usage),
    ];

    LegOutcome {
        step: StepData {
            transport_means: TransportMode::Car,
            emissions,
            path_length: length,
        },
        geometries: vec![
            PathGeometry::from_path(&path.geometry, TransportMode::Car.label(), length, &palette.usage)
                .with_label(passengers.label()),
        ],
    }
}

/// Electric car; usage depends on the electricity mix of each crossed region.
///
/// `segments` come from the electricity layer, with `factor` in gCO2/kWh.
pub fn electric_car_leg(
    path: &RoutedPath,
    segments: &[RegionSegment],
    passengers: Passengers,
    car: &CarFactors,
    factors: &ElectricCarFactors,
    palette: &Palette,
) -> LegOutcome {
    let (usage_share, construction_share) = car.shares(passengers);
    let label = TransportMode::ElectricCar.label();

    let mut emissions = vec![EmissionComponent::per_km(
        "Construction",
        factors.construction * construction_share,
        path.length_km,
        &palette.construction,
    )];
    let mut geometries = Vec::with_capacity(segments.len());
    for segment in segments {
        let ef = segment.factor * factors.energy_kwh_per_km * usage_share / 1e3;
        emissions.push(EmissionComponent::per_km(
            segment.name.clone(),
            ef,
            segment.length_km,
            &palette.usage,
        ));
        geometries.push(
            PathGeometry::from_path(&segment.geometry, label, segment.length_km, &palette.usage)
                .with_label(format!("{} ({})", segment.name, passengers.label())),
        );
    }

    LegOutcome {
        step: StepData {
            transport_means: TransportMode::ElectricCar,
            emissions,
            path_length: path.length_km,
        },
        geometries,
    }
}

pub fn bus_leg(path: &RoutedPath, factors: &BusFactors, palette: &Palette) -> LegOutcome {
    let length = path.length_km;
    LegOutcome {
        step: StepData {
            transport_means: TransportMode::Bus,
            emissions: vec![
                EmissionComponent::per_km(
                    "Construction",
                    factors.construction,
                    length,
                    &palette.construction,
                ),
                EmissionComponent::per_km("Fuel", factors.fuel, length, &palette.usage),
            ],
            path_length: length,
        },
        geometries: vec![PathGeometry::from_path(
            &path.geometry,
            TransportMode::Bus.label(),
            length,
            &palette.usage,
        )],
    }
}
