//! Approximate sea routes for ferry and sail legs.
//!
//! No ferry router exists, so a navigable-water graph is synthesized for each
//! request: coastlines of the landmass, two canals, a grid of meridians and
//! parallels clipped to the sea, the direct line between the endpoints, and
//! connectors from each endpoint to the closest coast. The shortest path over
//! that graph is a plausible minimal-length sea path, not a shipping lane.

use geo::{BooleanOps, ClosestPoint, Closest};
use geo_types::{Coord, LineString, MultiLineString, MultiPolygon, Rect};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::geodesy::{line_length_km, Coordinate};
use crate::graph::Graph;
use crate::path::find_route_dijkstra;
use crate::reference::{rect_around, Landmass};

/// Panama and Suez canals as polylines.
static CANALS: Lazy<Vec<LineString<f64>>> = Lazy::new(|| {
    vec![
        LineString::from(vec![
            (-79.51006995072298, 8.872893100443669),
            (-80.05324567583347, 9.517999845306024),
        ]),
        LineString::from(vec![
            (33.91896382986125, 27.263740326941672),
            (32.505571710241114, 29.64748606563672),
            (32.42803964605657, 32.58754502651166),
        ]),
    ]
});

/// Shape of the synthesized sea-lane graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeaLaneOptions {
    /// Number of meridians and of parallels in the grid.
    pub grid_lines: usize,
    /// Margin in degrees added around the endpoints' bounding box.
    pub margin_deg: f64,
    /// How far grid lines run past the expanded box, in degrees.
    pub overshoot_deg: f64,
    /// Fraction of a line's direction vector added when extending it.
    pub extension: f64,
    pub include_canals: bool,
}

impl Default for SeaLaneOptions {
    fn default() -> Self {
        Self {
            grid_lines: 20,
            margin_deg: 10.0,
            overshoot_deg: 10.0,
            extension: 0.001,
            include_canals: true,
        }
    }
}

/// Shortest sea path between two points.
#[derive(Debug, Clone, PartialEq)]
pub struct SeaPath {
    pub geometry: LineString<f64>,
    /// Geodesic length of `geometry`, in kilometres.
    pub length_km: f64,
}

/// Compute a sea path from `start` to `end` avoiding the polygons of `land`.
pub fn sea_path(
    land: &Landmass,
    start: Coordinate,
    end: Coordinate,
    options: &SeaLaneOptions,
) -> Result<SeaPath> {
    let lines = sea_lanes(land, start, end, options);
    let graph = Graph::from_lines(&lines);
    debug!(
        lines = lines.len(),
        nodes = graph.node_count(),
        "sea-lane graph built"
    );

    let source = graph.node_at(start.coord()).ok_or(Error::SeaPathNotFound)?;
    let target = graph.node_at(end.coord()).ok_or(Error::SeaPathNotFound)?;
    let route = find_route_dijkstra(&graph, source, target).ok_or(Error::SeaPathNotFound)?;

    let geometry = LineString::new(route.into_iter().map(|node| graph.coord(node)).collect());
    let length_km = line_length_km(&geometry);
    info!(%start, %end, length_km, "sea path found");
    Ok(SeaPath {
        geometry,
        length_km,
    })
}

/// Every candidate line of the sea-lane graph.
pub fn sea_lanes(
    land: &Landmass,
    start: Coordinate,
    end: Coordinate,
    options: &SeaLaneOptions,
) -> Vec<LineString<f64>> {
    let reach = options.margin_deg + options.overshoot_deg;
    let area = rect_around(start.coord(), end.coord(), reach);
    let land_shape = land.within(area);

    let coast = coastline(&land_shape);
    let mut lines: Vec<LineString<f64>> = coast.0.clone();
    if options.include_canals {
        lines.extend(CANALS.iter().cloned());
    }

    for endpoint in [start, end] {
        if let Some(connector) = connector(&coast, endpoint, options.extension) {
            lines.push(connector);
        }
    }

    let grid = grid(rect_around(start.coord(), end.coord(), options.margin_deg), options);
    let direct = MultiLineString::new(vec![LineString::from(vec![start.coord(), end.coord()])]);
    let (grid, direct) = if land_shape.0.is_empty() {
        (grid, direct)
    } else {
        (land_shape.clip(&grid, true), land_shape.clip(&direct, true))
    };

    lines.extend(
        grid.0
            .iter()
            .map(|line| extend_line(line, options.extension, true)),
    );
    lines.extend(direct.0);
    lines
}

fn coastline(land: &MultiPolygon<f64>) -> MultiLineString<f64> {
    MultiLineString::new(
        land.0
            .iter()
            .flat_map(|polygon| {
                std::iter::once(polygon.exterior().clone()).chain(polygon.interiors().iter().cloned())
            })
            .collect(),
    )
}

/// Segment from `endpoint` to the closest coast point, pushed slightly past
/// the coast so that it crosses it.
fn connector(coast: &MultiLineString<f64>, endpoint: Coordinate, extension: f64) -> Option<LineString<f64>> {
    if coast.0.is_empty() {
        return None;
    }
    match coast.closest_point(&endpoint.point()) {
        Closest::SinglePoint(point) => {
            let line = LineString::from(vec![endpoint.coord(), point.0]);
            Some(extend_line(&line, extension, false))
        }
        Closest::Intersection(_) | Closest::Indeterminate => None,
    }
}

/// Meridians and parallels spanning `bounds`, each running `overshoot_deg`
/// further on both sides.
fn grid(bounds: Rect<f64>, options: &SeaLaneOptions) -> MultiLineString<f64> {
    let count = options.grid_lines.max(2);
    let (min, max) = (bounds.min(), bounds.max());
    let low_lat = (min.y - options.overshoot_deg).max(-90.0);
    let high_lat = (max.y + options.overshoot_deg).min(90.0);
    let low_lon = min.x - options.overshoot_deg;
    let high_lon = max.x + options.overshoot_deg;

    let steps = |from: f64, to: f64| {
        (0..count).map(move |i| from + (to - from) * i as f64 / (count - 1) as f64)
    };

    let meridians = steps(min.x, max.x)
        .map(|lon| LineString::from(vec![(lon, low_lat), (lon, high_lat)]));
    let parallels = steps(min.y.max(-90.0), max.y.min(90.0))
        .map(|lat| LineString::from(vec![(low_lon, lat), (high_lon, lat)]));

    MultiLineString::new(meridians.chain(parallels).collect())
}

/// Push the last point (and the first when `both_ends`) outward by
/// `factor` times the line's overall direction vector.
fn extend_line(line: &LineString<f64>, factor: f64, both_ends: bool) -> LineString<f64> {
    let mut coords = line.0.clone();
    let (Some(first), Some(last)) = (coords.first().copied(), coords.last().copied()) else {
        return line.clone();
    };
    if coords.len() < 2 {
        return line.clone();
    }

    let delta = Coord {
        x: (last.x - first.x) * factor,
        y: (last.y - first.y) * factor,
    };
    let n = coords.len();
    coords[n - 1] = last + delta;
    if both_ends {
        coords[0] = first - delta;
    }
    LineString::new(coords)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_keeps_direction() {
        let line = LineString::from(vec![(0.0, 0.0), (10.0, 0.0)]);
        let extended = extend_line(&line, 0.001, true);
        assert!((extended.0[0].x + 0.01).abs() < 1e-12);
        assert!((extended.0[1].x - 10.01).abs() < 1e-12);
        assert_eq!(extended.0[1].y, 0.0);

        let one_sided = extend_line(&line, 0.001, false);
        assert_eq!(one_sided.0[0], Coord { x: 0.0, y: 0.0 });
    }

    #[test]
    fn grid_spans_the_box_plus_overshoot() {
        let options = SeaLaneOptions::default();
        let bounds = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 19.0, y: 19.0 });
        let lines = grid(bounds, &options);
        assert_eq!(lines.0.len(), 40);
        assert_eq!(lines.0[0].0[0], Coord { x: 0.0, y: -10.0 });
        assert_eq!(lines.0[1].0[0].x, 1.0);
    }

    #[test]
    fn open_sea_route_is_the_direct_line() {
        let land = Landmass::new(Vec::new());
        let a = Coordinate::new(-30.0, 40.0);
        let b = Coordinate::new(-20.0, 42.0);
        let path = sea_path(&land, a, b, &SeaLaneOptions::default()).expect("route");
        assert_eq!(path.geometry.0.first(), Some(&a.coord()));
        assert_eq!(path.geometry.0.last(), Some(&b.coord()));
        let direct = crate::geodesy::geodesic_distance_km(a, b);
        assert!((path.length_km - direct).abs() < 1e-2 * direct);
    }

    const ISLAND_WITHOUT_FACTOR: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature",
             "properties": {"ISO2": "XX", "NAME": "Isle", "EF_tot": null},
             "geometry": {"type": "Polygon",
                          "coordinates": [[[-25,38],[-23,38],[-23,44],[-25,44],[-25,38]]]}}
        ]
    }"#;

    #[test]
    fn island_without_rail_factor_still_blocks_the_sea() {
        let land = Landmass::from_geojson_str(ISLAND_WITHOUT_FACTOR, std::path::Path::new("inline"))
            .expect("land");
        assert_eq!(land.len(), 1);

        // slightly inside the coast, which the path may follow
        let inland = Rect::new(Coord { x: -24.9, y: 38.1 }, Coord { x: -23.1, y: 43.9 }).to_polygon();
        let a = Coordinate::new(-30.0, 41.0);
        let b = Coordinate::new(-18.0, 41.0);
        let path = sea_path(&land, a, b, &SeaLaneOptions::default()).expect("route");

        assert_eq!(path.geometry.0.first(), Some(&a.coord()));
        assert_eq!(path.geometry.0.last(), Some(&b.coord()));
        assert!(!geo::Intersects::intersects(&path.geometry, &inland));
        let direct = crate::geodesy::geodesic_distance_km(a, b);
        assert!(path.length_km > direct * 1.05);
    }
}
