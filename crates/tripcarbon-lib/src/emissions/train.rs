use crate::config::Palette;
use crate::model::{EmissionComponent, LegOutcome, PathGeometry, StepData, TransportMode};
use crate::routing::RoutedPath;
use crate::split::RegionSegment;

use super::factors::TrainFactors;

/// Rail leg: flat infrastructure share plus per-country usage.
///
/// `segments` come from the rail layer, with `factor` in gCO2/pkm.
pub fn train_leg(
    path: &RoutedPath,
    segments: &[RegionSegment],
    factors: &TrainFactors,
    palette: &Palette,
) -> LegOutcome {
    let label = TransportMode::Train.label();
    let mut emissions = vec![EmissionComponent::per_km(
        "Infra",
        factors.infra,
        path.length_km,
        &palette.infra,
    )];
    let mut geometries = Vec::with_capacity(segments.len());

    for segment in segments {
        emissions.push(EmissionComponent::per_km(
            segment.name.clone(),
            segment.factor / 1e3,
            segment.length_km,
            &palette.usage,
        ));
        geometries.push(
            PathGeometry::from_path(&segment.geometry, label, segment.length_km, &palette.usage)
                .with_label(segment.name.clone()),
        );
    }

    LegOutcome {
        step: StepData {
            transport_means: TransportMode::Train,
            emissions,
            path_length: path.length_km,
        },
        geometries,
    }
}
