//! Geodesic helpers on the WGS84 ellipsoid.
//!
//! Distances are computed with [`geo::Geodesic`] (Karney's algorithm), which
//! is what authoritative lengths and validation tolerances are expressed in.
//! Planar helpers working in raw degrees are only used for thresholds and
//! graph weights over unprojected geometry.

use std::fmt;
use std::str::FromStr;

use geo::{Distance, Geodesic, InterpolatePoint};
use geo_types::{Coord, LineString, MultiLineString, Point};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Mean Earth radius used for small-angle conversions.
pub const EARTH_MEAN_RADIUS_KM: f64 = 6371.0;

/// A WGS84 position expressed as longitude/latitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn point(self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }

    pub fn coord(self) -> Coord<f64> {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }
}

impl From<Coord<f64>> for Coordinate {
    fn from(coord: Coord<f64>) -> Self {
        Self::new(coord.x, coord.y)
    }
}

impl From<Point<f64>> for Coordinate {
    fn from(point: Point<f64>) -> Self {
        Self::new(point.x(), point.y())
    }
}

impl From<Coordinate> for Coord<f64> {
    fn from(value: Coordinate) -> Self {
        value.coord()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lon, self.lat)
    }
}

impl FromStr for Coordinate {
    type Err = Error;

    /// Parse `"lon,lat"`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidStep {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let (lon, lat) = s
            .split_once(',')
            .ok_or_else(|| invalid("expected 'lon,lat'"))?;
        let lon: f64 = lon
            .trim()
            .parse()
            .map_err(|_| invalid("longitude is not a number"))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| invalid("latitude is not a number"))?;

        if !(-180.0..=180.0).contains(&lon) {
            return Err(invalid("longitude must be within [-180, 180]"));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(invalid("latitude must be within [-90, 90]"));
        }

        Ok(Self::new(lon, lat))
    }
}

/// Ellipsoidal distance between two coordinates, in kilometres.
pub fn geodesic_distance_km(a: Coordinate, b: Coordinate) -> f64 {
    Geodesic.distance(a.point(), b.point()) / 1e3
}

/// Geodesic length of a polyline, in kilometres.
pub fn line_length_km(line: &LineString<f64>) -> f64 {
    line.lines()
        .map(|segment| Geodesic.distance(Point::from(segment.start), Point::from(segment.end)))
        .sum::<f64>()
        / 1e3
}

/// Geodesic length of every part of a multi-part path, in kilometres.
pub fn path_length_km(path: &MultiLineString<f64>) -> f64 {
    path.0.iter().map(line_length_km).sum()
}

/// Length of a polyline measured in raw degrees.
pub fn planar_length(line: &LineString<f64>) -> f64 {
    line.lines()
        .map(|segment| segment.dx().hypot(segment.dy()))
        .sum()
}

/// Approximate conversion from kilometres to degrees of arc.
///
/// Only suitable for search radii and thresholds, never for distances that
/// end up in an emission total.
pub fn km_to_degrees(km: f64) -> f64 {
    km * 180.0 / (std::f64::consts::PI * EARTH_MEAN_RADIUS_KM)
}

/// Sampled geodesic between two points.
#[derive(Debug, Clone, PartialEq)]
pub struct GreatCircle {
    /// Equally spaced points including both ends, antimeridian-adjusted.
    pub path: LineString<f64>,
    /// Geodesic distance between the ends, in kilometres.
    pub distance_km: f64,
}

/// Sample `points` equally spaced positions along the geodesic from `a` to `b`.
///
/// When the sampled longitudes spread over more than 180°, the path crosses
/// the antimeridian: negative longitudes are shifted by +360° so the rendered
/// line stays continuous instead of wrapping around the map.
pub fn great_circle(a: Coordinate, b: Coordinate, points: usize) -> GreatCircle {
    let points = points.max(2);
    let start = a.point();
    let end = b.point();
    let last = (points - 1) as f64;

    let mut sampled: Vec<Coord<f64>> = (0..points)
        .map(|i| {
            let ratio = i as f64 / last;
            let point = match i {
                0 => start,
                i if i == points - 1 => end,
                _ => Geodesic.point_at_ratio_between(start, end, ratio),
            };
            point.0
        })
        .collect();

    let (min_lon, max_lon) = sampled
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
            (lo.min(c.x), hi.max(c.x))
        });
    if max_lon - min_lon > 180.0 {
        for coord in &mut sampled {
            if coord.x < 0.0 {
                coord.x += 360.0;
            }
        }
    }

    GreatCircle {
        path: LineString::new(sampled),
        distance_km: geodesic_distance_km(a, b),
    }
}

/// First coordinate of a multi-part path.
pub fn first_coord(path: &MultiLineString<f64>) -> Option<Coord<f64>> {
    path.0.first().and_then(|line| line.0.first()).copied()
}

/// Last coordinate of the last part of a multi-part path.
pub fn last_coord(path: &MultiLineString<f64>) -> Option<Coord<f64>> {
    path.0.last().and_then(|line| line.0.last()).copied()
}
