use geo_types::MultiLineString;

use crate::config::Palette;
use crate::geodesy::{great_circle, Coordinate};
use crate::model::{EmissionComponent, LegOutcome, PathGeometry, StepData, TransportMode};

use super::factors::PlaneFactors;

/// Flight along the great circle, lengthened by the detour coefficient.
///
/// The distance band is chosen on the undetoured distance. Kerosene covers
/// combustion and upstream emissions plus the holding addend; contrails are a
/// multiple of combustion only.
pub fn plane_leg(
    start: Coordinate,
    end: Coordinate,
    points: usize,
    factors: &PlaneFactors,
    palette: &Palette,
) -> LegOutcome {
    let route = great_circle(start, end, points);
    let (_, tier) = factors.tier(route.distance_km);
    let length = route.distance_km * factors.detour;

    let kerosene_ef = tier.combustion + tier.upstream;
    let contrails_ef = tier.combustion * factors.contrails_multiplier;

    let emissions = vec![
        EmissionComponent::new(
            "Kerosene",
            kerosene_ef * length + factors.holding_kg,
            kerosene_ef,
            &palette.usage,
        ),
        EmissionComponent::per_km("Contrails", contrails_ef, length, &palette.contrails),
    ];

    LegOutcome {
        step: StepData {
            transport_means: TransportMode::Plane,
            emissions,
            path_length: length,
        },
        geometries: vec![PathGeometry::from_path(
            &MultiLineString::new(vec![route.path]),
            TransportMode::Plane.label(),
            length,
            &palette.usage,
        )],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paris_new_york_is_long_haul() {
        let factors = PlaneFactors::default();
        let leg = plane_leg(
            Coordinate::new(2.55, 49.01),
            Coordinate::new(-73.78, 40.64),
            100,
            &factors,
            &Palette::custom(),
        );
        let kerosene = &leg.step.emissions[0];
        let contrails = &leg.step.emissions[1];
        assert!((kerosene.ef_tot - (0.0687 + 0.0143)).abs() < 1e-12);
        assert!((contrails.ef_tot - 0.0687 * 2.0).abs() < 1e-12);
        assert!((kerosene.kg_co2_eq - (kerosene.ef_tot * leg.step.path_length + 3.81)).abs() < 1e-9);
        // ~5840 km great circle
        assert!((leg.step.path_length / 1.076 - 5840.0).abs() < 60.0);
    }

    #[test]
    fn crossing_the_date_line_keeps_longitudes_continuous() {
        let leg = plane_leg(
            Coordinate::new(179.0, -17.0),
            Coordinate::new(-179.0, -16.0),
            20,
            &PlaneFactors::default(),
            &Palette::custom(),
        );
        let lons: Vec<f64> = leg.geometries[0].coordinates[0].iter().map(|c| c[0]).collect();
        assert!(lons.windows(2).all(|w| w[1] >= w[0]));
        assert!((lons[lons.len() - 1] - 181.0).abs() < 1e-9);
    }
}
