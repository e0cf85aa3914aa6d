use geo_types::MultiLineString;

use crate::config::Palette;
use crate::model::{EmissionComponent, FerryOption, LegOutcome, PathGeometry, StepData, TransportMode};
use crate::sea::SeaPath;

use super::factors::{FerryFactors, SailFactors};

pub fn ferry_leg(
    route: &SeaPath,
    option: FerryOption,
    factors: &FerryFactors,
    palette: &Palette,
) -> LegOutcome {
    let name = format!("Ferry ({})", option.label());
    sea_leg(route, TransportMode::Ferry, name, factors.factor(option), palette)
}

pub fn sail_leg(route: &SeaPath, factors: &SailFactors, palette: &Palette) -> LegOutcome {
    sea_leg(route, TransportMode::Sail, "Sail".to_string(), factors.usage, palette)
}

fn sea_leg(
    route: &SeaPath,
    mode: TransportMode,
    component: String,
    ef: f64,
    palette: &Palette,
) -> LegOutcome {
    let length = route.length_km;
    LegOutcome {
        step: StepData {
            transport_means: mode,
            emissions: vec![EmissionComponent::per_km(component, ef, length, &palette.usage)],
            path_length: length,
        },
        geometries: vec![PathGeometry::from_path(
            &MultiLineString::new(vec![route.geometry.clone()]),
            mode.label(),
            length,
            &palette.usage,
        )],
    }
}
