//! Attribution of a routed path to the regions it crosses.
//!
//! The path is clipped against every region polygon; the part outside all
//! polygons (usually sea crossings) is attributed to the nearest region when
//! it is long enough to matter. Per-region geodesic lengths are finally scaled
//! so that they add up to the authoritative length reported by the router.

use std::collections::BTreeMap;

use geo::{BooleanOps, BoundingRect};
use geo_types::{Coord, LineString, MultiLineString};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::geodesy::{km_to_degrees, path_length_km, planar_length};
use crate::reference::RegionLayer;

const JOIN_EPSILON: f64 = 1e-9;

/// Part of a route lying in one region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSegment {
    pub region_id: String,
    /// First non-empty name seen for the region, or its identifier.
    pub name: String,
    /// Raw layer factor (gCO2/pkm for rail, gCO2/kWh for electricity).
    pub factor: f64,
    pub geometry: MultiLineString<f64>,
    /// Rescaled length in kilometres.
    pub length_km: f64,
}

struct RegionGroup {
    name: String,
    factor: f64,
    lines: Vec<LineString<f64>>,
}

/// Split `path` by the regions of `layer`.
///
/// Gaps outside every region are only considered when their total length
/// exceeds `sea_threshold_km`, and then only the individual gaps that are
/// themselves longer than the threshold are kept. A route made of many short
/// gaps can therefore lose them all.
pub fn split_by_region(
    path: &MultiLineString<f64>,
    layer: &RegionLayer,
    authoritative_length_km: f64,
    sea_threshold_km: f64,
) -> Result<Vec<RegionSegment>> {
    let bbox = path.bounding_rect().ok_or(Error::EmptyRegionSplit)?;
    let candidates = layer.candidates(bbox);

    let mut fragments: Vec<(usize, LineString<f64>)> = Vec::new();
    let mut residue = path.clone();
    for &idx in &candidates {
        let shape = &layer.region(idx).shape;
        let inside = shape.clip(path, false);
        fragments.extend(
            inside
                .0
                .into_iter()
                .filter(|line| line.0.len() >= 2)
                .map(|line| (idx, line)),
        );
        if !residue.0.is_empty() {
            residue = shape.clip(&residue, true);
        }
    }

    let threshold = km_to_degrees(sea_threshold_km);
    let residue_length: f64 = residue.0.iter().map(planar_length).sum();
    if residue_length > threshold {
        for gap in residue.0 {
            if planar_length(&gap) <= threshold {
                continue;
            }
            if let Some(idx) = layer.nearest(&gap) {
                debug!(region = %layer.region(idx).id, "attributing unmatched gap to nearest region");
                fragments.push((idx, gap));
            }
        }
    } else if residue_length > 0.0 {
        debug!(residue_length, "ignoring short unmatched residue");
    }

    let mut groups: BTreeMap<String, RegionGroup> = BTreeMap::new();
    for (idx, line) in fragments {
        let region = layer.region(idx);
        groups
            .entry(region.id.clone())
            .or_insert_with(|| RegionGroup {
                name: region.label().to_string(),
                factor: region.factor,
                lines: Vec::new(),
            })
            .lines
            .push(line);
    }

    let mut segments: Vec<RegionSegment> = groups
        .into_iter()
        .map(|(region_id, group)| {
            let geometry = merge_lines(group.lines);
            let length_km = path_length_km(&geometry);
            RegionSegment {
                region_id,
                name: group.name,
                factor: group.factor,
                geometry,
                length_km,
            }
        })
        .collect();

    let measured: f64 = segments.iter().map(|s| s.length_km).sum();
    if segments.is_empty() || measured <= 0.0 {
        return Err(Error::EmptyRegionSplit);
    }

    let scale = authoritative_length_km / measured;
    info!(
        regions = segments.len(),
        measured_km = measured,
        authoritative_km = authoritative_length_km,
        scale,
        "rescaled region segments"
    );
    for segment in &mut segments {
        segment.length_km *= scale;
    }

    Ok(segments)
}

/// Join lines sharing an endpoint into longer lines.
pub(crate) fn merge_lines(mut lines: Vec<LineString<f64>>) -> MultiLineString<f64> {
    let mut merged = Vec::new();
    while !lines.is_empty() {
        let mut chain = lines.remove(0);
        while let Some(pos) = lines.iter().position(|line| touches(&chain, line)) {
            let next = lines.remove(pos);
            chain = join(chain, next);
        }
        merged.push(chain);
    }
    MultiLineString::new(merged)
}

fn same(a: Option<&Coord<f64>>, b: Option<&Coord<f64>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => (a.x - b.x).abs() < JOIN_EPSILON && (a.y - b.y).abs() < JOIN_EPSILON,
        _ => false,
    }
}

fn touches(chain: &LineString<f64>, line: &LineString<f64>) -> bool {
    let (head, tail) = (chain.0.first(), chain.0.last());
    let (start, end) = (line.0.first(), line.0.last());
    same(tail, start) || same(tail, end) || same(head, start) || same(head, end)
}

fn join(chain: LineString<f64>, line: LineString<f64>) -> LineString<f64> {
    let mut chain = chain.0;
    let mut line = line.0;

    if same(chain.last(), line.first()) {
        chain.extend(line.into_iter().skip(1));
        return LineString::new(chain);
    }
    if same(chain.last(), line.last()) {
        line.reverse();
        chain.extend(line.into_iter().skip(1));
        return LineString::new(chain);
    }
    if same(chain.first(), line.first()) {
        line.reverse();
    }
    line.extend(chain.into_iter().skip(1));
    LineString::new(line)
}
