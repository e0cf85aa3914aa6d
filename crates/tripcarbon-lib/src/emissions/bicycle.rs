use crate::config::Palette;
use crate::model::{EmissionComponent, LegOutcome, PathGeometry, StepData, TransportMode};
use crate::routing::RoutedPath;

use super::factors::BicycleFactors;

pub fn bicycle_leg(path: &RoutedPath, factors: &BicycleFactors, palette: &Palette) -> LegOutcome {
    let length = path.length_km;
    LegOutcome {
        step: StepData {
            transport_means: TransportMode::Bicycle,
            emissions: vec![EmissionComponent::per_km(
                "Construction",
                factors.construction,
                length,
                &palette.construction,
            )],
            path_length: length,
        },
        geometries: vec![PathGeometry::from_path(
            &path.geometry,
            TransportMode::Bicycle.label(),
            length,
            &palette.usage,
        )],
    }
}
