use std::collections::HashMap;
use std::sync::Arc;

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo_types::{Coord, Line, LineString};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};

/// Coordinates closer than this (in degrees) are the same node.
const NODE_TOLERANCE: f64 = 1e-9;

/// Dense node identifier within a [`Graph`].
pub type NodeId = usize;

/// Edge within the planar graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub target: NodeId,
    /// Planar length in degrees.
    pub distance: f64,
}

/// Undirected planar graph built from a set of noded lines.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Coord<f64>>,
    adjacency: Arc<HashMap<NodeId, Vec<Edge>>>,
}

impl Graph {
    /// Build a graph from lines, adding a node at every crossing so that lines
    /// which intersect are connected.
    pub fn from_lines(lines: &[LineString<f64>]) -> Self {
        let segments: Vec<Line<f64>> = lines
            .iter()
            .flat_map(|line| line.lines())
            .filter(|segment| segment.dx() != 0.0 || segment.dy() != 0.0)
            .collect();

        let splits = split_points(&segments);
        let mut builder = GraphBuilder::default();
        for (segment, mut points) in segments.iter().zip(splits) {
            points.push((0.0, segment.start));
            points.push((1.0, segment.end));
            points.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut previous: Option<NodeId> = None;
            for (_, point) in points {
                let node = builder.node(point);
                if let Some(prev) = previous {
                    builder.connect(prev, node);
                }
                previous = Some(node);
            }
        }

        builder.finish()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn coord(&self, node: NodeId) -> Coord<f64> {
        self.nodes[node]
    }

    /// Node lying at `coord`, if any.
    pub fn node_at(&self, coord: Coord<f64>) -> Option<NodeId> {
        let key = node_key(coord);
        self.nodes.iter().position(|c| node_key(*c) == key)
    }

    /// Return the neighbours of a node.
    pub fn neighbours(&self, node: NodeId) -> &[Edge] {
        self.adjacency
            .get(&node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Default)]
struct GraphBuilder {
    nodes: Vec<Coord<f64>>,
    lookup: HashMap<(i64, i64), NodeId>,
    adjacency: HashMap<NodeId, Vec<Edge>>,
}

impl GraphBuilder {
    fn node(&mut self, coord: Coord<f64>) -> NodeId {
        let nodes = &mut self.nodes;
        *self.lookup.entry(node_key(coord)).or_insert_with(|| {
            nodes.push(coord);
            nodes.len() - 1
        })
    }

    fn connect(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            return;
        }
        let (pa, pb) = (self.nodes[a], self.nodes[b]);
        let distance = (pb.x - pa.x).hypot(pb.y - pa.y);
        for (from, to) in [(a, b), (b, a)] {
            let edges = self.adjacency.entry(from).or_default();
            match edges.iter_mut().find(|edge| edge.target == to) {
                Some(existing) if existing.distance <= distance => {}
                Some(existing) => existing.distance = distance,
                None => edges.push(Edge {
                    target: to,
                    distance,
                }),
            }
        }
    }

    fn finish(self) -> Graph {
        Graph {
            nodes: self.nodes,
            adjacency: Arc::new(self.adjacency),
        }
    }
}

fn node_key(coord: Coord<f64>) -> (i64, i64) {
    (
        (coord.x / NODE_TOLERANCE).round() as i64,
        (coord.y / NODE_TOLERANCE).round() as i64,
    )
}

type SegmentEnvelope = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// Interior points at which each segment must be split, as `(t, point)` with
/// `t` the position along the segment.
///
/// Each crossing is computed once and shared by both segments so that they
/// agree on the node coordinate.
fn split_points(segments: &[Line<f64>]) -> Vec<Vec<(f64, Coord<f64>)>> {
    let envelopes: Vec<SegmentEnvelope> = segments
        .iter()
        .enumerate()
        .map(|(idx, segment)| GeomWithData::new(envelope_rect(segment), idx))
        .collect();
    let tree = RTree::bulk_load(envelopes);

    let mut splits: Vec<Vec<(f64, Coord<f64>)>> = vec![Vec::new(); segments.len()];
    for (i, segment) in segments.iter().enumerate() {
        let query = padded_envelope(segment);
        for candidate in tree.locate_in_envelope_intersecting(&query) {
            let j = candidate.data;
            if j <= i {
                continue;
            }
            let other = &segments[j];
            for point in crossings(segment, other) {
                splits[i].push((position_along(segment, point), point));
                splits[j].push((position_along(other, point), point));
            }
        }
    }
    splits
}

fn crossings(a: &Line<f64>, b: &Line<f64>) -> Vec<Coord<f64>> {
    match line_intersection(*a, *b) {
        Some(LineIntersection::SinglePoint { intersection, .. }) => vec![intersection],
        Some(LineIntersection::Collinear { intersection }) => {
            vec![intersection.start, intersection.end]
        }
        // endpoints sitting on the other segment within rounding noise
        None => [(a.start, b), (a.end, b), (b.start, a), (b.end, a)]
            .into_iter()
            .filter(|(point, segment)| distance_to_segment(*point, segment) < NODE_TOLERANCE)
            .map(|(point, _)| point)
            .collect(),
    }
}

fn position_along(segment: &Line<f64>, point: Coord<f64>) -> f64 {
    let (dx, dy) = (segment.dx(), segment.dy());
    let t = ((point.x - segment.start.x) * dx + (point.y - segment.start.y) * dy)
        / (dx * dx + dy * dy);
    t.clamp(0.0, 1.0)
}

fn distance_to_segment(point: Coord<f64>, segment: &Line<f64>) -> f64 {
    let t = position_along(segment, point);
    let x = segment.start.x + t * segment.dx();
    let y = segment.start.y + t * segment.dy();
    (point.x - x).hypot(point.y - y)
}

fn envelope_rect(segment: &Line<f64>) -> Rectangle<[f64; 2]> {
    Rectangle::from_corners(
        [segment.start.x.min(segment.end.x), segment.start.y.min(segment.end.y)],
        [segment.start.x.max(segment.end.x), segment.start.y.max(segment.end.y)],
    )
}

fn padded_envelope(segment: &Line<f64>) -> AABB<[f64; 2]> {
    AABB::from_corners(
        [
            segment.start.x.min(segment.end.x) - NODE_TOLERANCE,
            segment.start.y.min(segment.end.y) - NODE_TOLERANCE,
        ],
        [
            segment.start.x.max(segment.end.x) + NODE_TOLERANCE,
            segment.start.y.max(segment.end.y) + NODE_TOLERANCE,
        ],
    )
}
