mod common;

use geo_types::{Coord, LineString, MultiLineString, MultiPolygon, Rect};
use tripcarbon_lib::geodesy::path_length_km;
use tripcarbon_lib::{
    geodesic_distance_km, split_by_region, Coordinate, Region, RegionLayer, RegionSegment,
};

use common::{fixture_reference, FRANKFURT, LONDON, PARIS};

fn straight(a: Coordinate, b: Coordinate) -> MultiLineString<f64> {
    MultiLineString::new(vec![LineString::new(vec![a.coord(), b.coord()])])
}

#[test]
fn border_crossing_is_split_and_rescaled() {
    let reference = fixture_reference();
    let segments = split_by_region(&straight(PARIS, FRANKFURT), &reference.rail, 570.0, 5.0)
        .expect("split Paris to Frankfurt");

    let ids: Vec<&str> = segments.iter().map(|s| s.region_id.as_str()).collect();
    assert_eq!(ids, vec!["DE", "FR"]);

    let total: f64 = segments.iter().map(|s| s.length_km).sum();
    assert!((total - 570.0).abs() < 1e-6, "total {total}");

    let france = &segments[1];
    let germany = &segments[0];
    assert_eq!(france.name, "France");
    assert!(france.length_km > germany.length_km);
    assert_eq!(france.factor, 5.0);
}

/// Geodesic length of the segment geometries, before rescaling.
fn attributed_km(segments: &[RegionSegment]) -> f64 {
    segments.iter().map(|s| path_length_km(&s.geometry)).sum()
}

#[test]
fn sea_gap_is_attributed_to_a_neighbouring_region() {
    let reference = fixture_reference();
    let path = straight(LONDON, PARIS);
    let full = path_length_km(&path);
    // GB and FR fixture polygons leave a ~0.2 degree strait between them
    let segments = split_by_region(&path, &reference.rail, 460.0, 5.0)
        .expect("split London to Paris");

    let attributed = attributed_km(&segments);
    assert!((attributed - full).abs() < 0.5, "attributed {attributed} of {full}");

    let total: f64 = segments.iter().map(|s| s.length_km).sum();
    assert!((total - 460.0).abs() < 1e-6, "total {total}");
    let ids: Vec<&str> = segments.iter().map(|s| s.region_id.as_str()).collect();
    assert_eq!(ids, vec!["FR", "GB"]);
}

#[test]
fn short_gap_below_threshold_is_ignored() {
    let reference = fixture_reference();
    let path = straight(LONDON, PARIS);
    let full = path_length_km(&path);
    let segments = split_by_region(&path, &reference.rail, 460.0, 50.0)
        .expect("split with a large threshold");

    // the ~26 km strait is dropped before rescaling
    let attributed = attributed_km(&segments);
    assert!(attributed < full - 20.0, "attributed {attributed} of {full}");
    assert!(attributed > full - 30.0, "attributed {attributed} of {full}");

    let total: f64 = segments.iter().map(|s| s.length_km).sum();
    assert!((total - 460.0).abs() < 1e-6);
    assert_eq!(segments.len(), 2);
}

/// One-degree squares along the equator separated by `gap` degrees.
fn island_chain(count: usize, gap: f64) -> RegionLayer {
    let regions = (0..count)
        .map(|i| {
            let west = i as f64 * (1.0 + gap);
            let square = Rect::new(Coord { x: west, y: -0.5 }, Coord { x: west + 1.0, y: 0.5 });
            Region::new(
                format!("I{i}"),
                None,
                10.0,
                MultiPolygon::new(vec![square.to_polygon()]),
            )
            .expect("non-empty square")
        })
        .collect();
    RegionLayer::new(regions)
}

#[test]
fn many_short_gaps_are_dropped_even_when_they_add_up() {
    // four gaps of ~11 km each, 44 km together, against a 20 km threshold
    let layer = island_chain(5, 0.1);
    let path = straight(Coordinate::new(0.0, 0.0), Coordinate::new(5.4, 0.0));
    let segments = split_by_region(&path, &layer, 600.0, 20.0).expect("split chain");

    assert_eq!(segments.len(), 5);
    let land = geodesic_distance_km(Coordinate::new(0.0, 0.0), Coordinate::new(5.0, 0.0));
    let attributed = attributed_km(&segments);
    assert!((attributed - land).abs() < 1e-3, "attributed {attributed}, land {land}");

    let total: f64 = segments.iter().map(|s| s.length_km).sum();
    assert!((total - 600.0).abs() < 1e-6);
}

#[test]
fn long_gap_among_short_ones_is_kept() {
    let mut layer_regions: Vec<Region> = island_chain(3, 0.1).regions().to_vec();
    // a 0.5 degree (~56 km) gap before the last island
    let square = Rect::new(Coord { x: 3.7, y: -0.5 }, Coord { x: 4.7, y: 0.5 });
    layer_regions.push(
        Region::new("FAR", None, 10.0, MultiPolygon::new(vec![square.to_polygon()]))
            .expect("non-empty square"),
    );
    let layer = RegionLayer::new(layer_regions);
    let path = straight(Coordinate::new(0.0, 0.0), Coordinate::new(4.7, 0.0));
    let segments = split_by_region(&path, &layer, 500.0, 20.0).expect("split chain");

    let short_gaps = geodesic_distance_km(Coordinate::new(0.0, 0.0), Coordinate::new(0.2, 0.0));
    let full = path_length_km(&path);
    let attributed = attributed_km(&segments);
    assert!(
        (attributed - (full - short_gaps)).abs() < 1e-3,
        "attributed {attributed}, expected {}",
        full - short_gaps
    );
}

#[test]
fn unattributed_path_fails() {
    let reference = fixture_reference();
    let mid_atlantic = straight(Coordinate::new(-40.0, 30.0), Coordinate::new(-39.0, 31.0));
    let err = split_by_region(&mid_atlantic, &reference.rail, 150.0, 500.0).expect_err("no region");
    assert!(matches!(err, tripcarbon_lib::Error::EmptyRegionSplit));
}
