//! Deterministic uniform-cost search over the visibility graph.
//!
//! Plain Dijkstra with Euclidean edge weights, plus the tie-break that gives
//! routed connections their "rubber band pulled taut" look: candidates of
//! equal length are ranked by the sharpness of the bend they introduce
//! (straighter first, via the turn-cosine magnitude), then by the canonical
//! order of the predecessor position, then by slope sign and vertex id. The
//! frontier ordering is total, so equal-weight expansion order (and with it
//! the returned route) is identical for identical input.
//!
//! Ranking bends by magnitude and breaking exact mirror ties by position
//! (rather than by the signed cosine) keeps the choice stable under path
//! reversal: routing B to A returns the A-to-B points backwards even when
//! two corridors have exactly equal length.

use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeSet, BinaryHeap};

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Segment};
use crate::graph::{ObstacleId, VertexId, VisibilityGraph};

/// An ordered point sequence from the start anchor to the end anchor.
///
/// Invariants: at least two points, first == start, last == end, and every
/// consecutive pair was mutually visible under the obstacle state the route
/// was computed against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    points: Vec<Point>,
}

impl Route {
    fn new(points: Vec<Point>) -> Self {
        debug_assert!(points.len() >= 2, "a route spans at least two points");
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    pub fn start(&self) -> Point {
        self.points[0]
    }

    pub fn end(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// Total Euclidean length of the polyline.
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .sum()
    }
}

pub(crate) struct SearchResult {
    pub route: Route,
    /// Obstacles whose corner vertices appear in the route.
    pub dependencies: BTreeSet<ObstacleId>,
}

/// Frontier entry; the ordering doubles as the determinism contract.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    dist: f64,
    bend: f64,
    prev_pos: Point,
    slope: i64,
    vertex: VertexId,
    prev: Option<VertexId>,
}

impl Candidate {
    fn key_cmp(&self, other: &Self) -> Ordering {
        self.dist
            .total_cmp(&other.dist)
            .then_with(|| self.bend.abs().total_cmp(&other.bend.abs()))
            .then_with(|| self.prev_pos.cmp(&other.prev_pos))
            .then_with(|| self.slope.cmp(&other.slope))
            .then_with(|| self.vertex.cmp(&other.vertex))
            .then_with(|| self.prev.cmp(&other.prev))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.key_cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key_cmp(other)
    }
}

struct BestEntry {
    dist: f64,
    bend: f64,
    prev_pos: Point,
    slope: i64,
    prev: Option<VertexId>,
}

/// Runs the search between two endpoint vertices. Returns `None` when the
/// frontier drains without settling `end`: the endpoints are unreachable
/// under the current obstacle set.
pub(crate) fn shortest_path(
    graph: &VisibilityGraph,
    start: VertexId,
    end: VertexId,
    tie_epsilon: f64,
) -> Option<SearchResult> {
    debug_assert!(start != end, "search endpoints must be distinct vertices");

    let start_pos = graph.vertex(start)?.position();
    let mut best: FxHashMap<VertexId, BestEntry> = FxHashMap::default();
    let mut settled: FxHashSet<VertexId> = FxHashSet::default();
    let mut frontier = BinaryHeap::new();

    best.insert(
        start,
        BestEntry {
            dist: 0.0,
            bend: 0.0,
            prev_pos: start_pos,
            slope: 0,
            prev: None,
        },
    );
    frontier.push(Reverse(Candidate {
        dist: 0.0,
        bend: 0.0,
        prev_pos: start_pos,
        slope: 0,
        vertex: start,
        prev: None,
    }));

    while let Some(Reverse(current)) = frontier.pop() {
        if !settled.insert(current.vertex) {
            continue;
        }
        if current.vertex == end {
            break;
        }
        let Some(vertex) = graph.vertex(current.vertex) else {
            continue;
        };
        let incoming = current
            .prev
            .and_then(|p| graph.vertex(p))
            .map(|pv| Segment::new(pv.position(), vertex.position()));

        for &n in vertex.neighbors() {
            if settled.contains(&n) {
                continue;
            }
            let Some(neighbor) = graph.vertex(n) else {
                continue;
            };
            let edge = Segment::new(vertex.position(), neighbor.position());
            let dist = current.dist + edge.length();
            let bend = incoming.as_ref().map_or(0.0, |inc| inc.cosine(&edge));
            let slope = edge.slope_sign();

            let better = match best.get(&n) {
                None => true,
                Some(b) => {
                    if (dist - b.dist).abs() <= tie_epsilon {
                        match bend
                            .abs()
                            .total_cmp(&b.bend.abs())
                            .then_with(|| vertex.position().cmp(&b.prev_pos))
                            .then_with(|| slope.cmp(&b.slope))
                        {
                            Ordering::Less => true,
                            Ordering::Equal => Some(current.vertex) < b.prev,
                            Ordering::Greater => false,
                        }
                    } else {
                        dist < b.dist
                    }
                }
            };
            if better {
                best.insert(
                    n,
                    BestEntry {
                        dist,
                        bend,
                        prev_pos: vertex.position(),
                        slope,
                        prev: Some(current.vertex),
                    },
                );
                frontier.push(Reverse(Candidate {
                    dist,
                    bend,
                    prev_pos: vertex.position(),
                    slope,
                    vertex: n,
                    prev: Some(current.vertex),
                }));
            }
        }
    }

    if !settled.contains(&end) {
        return None;
    }

    let mut points = Vec::new();
    let mut dependencies = BTreeSet::new();
    let mut cursor = Some(end);
    while let Some(v) = cursor {
        let vertex = graph.vertex(v)?;
        points.push(vertex.position());
        if let Some(owner) = vertex.owner() {
            dependencies.insert(owner);
        }
        cursor = best.get(&v).and_then(|b| b.prev);
    }
    points.reverse();

    Some(SearchResult {
        route: Route::new(points),
        dependencies,
    })
}
