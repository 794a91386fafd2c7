//! Mutable visibility graph over clearance-expanded obstacle corners.
//!
//! Vertices are the corners of registered obstacles pushed outward by the
//! clearance margin, plus transient path endpoints. An edge connects two
//! vertices whenever the straight segment between them stays clear of every
//! obstacle's clearance zone. Mutations keep the edge set consistent
//! incrementally: registering an obstacle severs the edges it now blocks,
//! removing one re-links pairs through the vacated region.
//!
//! Iteration orders are deterministic throughout (`IndexMap` for obstacles,
//! `BTreeMap`/`BTreeSet` for vertices and adjacency), which the search layer
//! relies on for reproducible routes.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::{Point, Rect, Segment};

/// Identifier for a registered obstacle, allocated by the graph.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ObstacleId(u32);

impl fmt::Display for ObstacleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "o{}", self.0)
    }
}

/// Identifier for a graph vertex (obstacle corner or path endpoint).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct VertexId(u64);

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A corner or endpoint together with its visible neighbors.
///
/// Vertices are exclusively owned by the graph; search scratch state
/// (distances, predecessors) lives in per-search tables, not here.
#[derive(Debug, Clone)]
pub struct Vertex {
    position: Point,
    owner: Option<ObstacleId>,
    neighbors: BTreeSet<VertexId>,
}

impl Vertex {
    pub fn position(&self) -> Point {
        self.position
    }

    /// The obstacle contributing this corner; `None` for path endpoints.
    pub fn owner(&self) -> Option<ObstacleId> {
        self.owner
    }

    pub fn neighbors(&self) -> &BTreeSet<VertexId> {
        &self.neighbors
    }
}

/// A registered rectangle and the four corner vertices it contributes.
#[derive(Debug, Clone)]
pub struct Obstacle {
    bounds: Rect,
    expanded: Rect,
    blocking: Rect,
    corners: [VertexId; 4],
}

impl Obstacle {
    /// The host rectangle as registered.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// The rectangle expanded outward by the clearance margin; its corners
    /// are this obstacle's vertices.
    pub fn expanded(&self) -> Rect {
        self.expanded
    }

    /// The zone segments may not enter: the bounds expanded by clearance − 1.
    /// Closed intersection with this rectangle is exact in integer
    /// arithmetic and never catches the obstacle's own expanded outline.
    pub(crate) fn blocking(&self) -> Rect {
        self.blocking
    }

    pub fn corners(&self) -> [VertexId; 4] {
        self.corners
    }
}

#[derive(Debug, Clone)]
pub struct VisibilityGraph {
    clearance: i32,
    obstacles: IndexMap<ObstacleId, Obstacle>,
    vertices: BTreeMap<VertexId, Vertex>,
    next_obstacle: u32,
    next_vertex: u64,
}

impl VisibilityGraph {
    /// Creates an empty graph. `clearance` must be ≥ 1; the router validates
    /// this before construction.
    pub fn new(clearance: i32) -> Self {
        Self {
            clearance,
            obstacles: IndexMap::new(),
            vertices: BTreeMap::new(),
            next_obstacle: 0,
            next_vertex: 0,
        }
    }

    pub fn clearance(&self) -> i32 {
        self.clearance
    }

    pub fn obstacle(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.get(&id)
    }

    pub fn obstacles(&self) -> impl Iterator<Item = (ObstacleId, &Obstacle)> {
        self.obstacles.iter().map(|(&id, ob)| (id, ob))
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.vertices.iter().map(|(&id, v)| (id, v))
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.vertices.values().map(|v| v.neighbors.len()).sum::<usize>() / 2
    }

    /// Drops all obstacles and vertices while keeping id allocation
    /// monotonic, so handles from before a bulk replacement stay unique.
    pub fn clear(&mut self) {
        self.obstacles.clear();
        self.vertices.clear();
    }

    /// Registers a rectangle, creating its four clearance-expanded corner
    /// vertices and updating the visibility edge set.
    pub fn register_obstacle(&mut self, bounds: Rect) -> Result<ObstacleId> {
        if bounds.width <= 0 || bounds.height <= 0 {
            return Err(Error::DegenerateObstacle {
                width: bounds.width,
                height: bounds.height,
            });
        }
        let id = ObstacleId(self.next_obstacle);
        self.next_obstacle += 1;
        self.insert_obstacle(id, bounds);
        Ok(id)
    }

    /// Deletes an obstacle's vertices and every edge referencing them, then
    /// re-links vertex pairs whose corridor the obstacle was blocking.
    pub fn remove_obstacle(&mut self, id: ObstacleId) -> Result<()> {
        let Some(ob) = self.obstacles.shift_remove(&id) else {
            return Err(Error::UnknownObstacle(id));
        };
        for corner in ob.corners {
            self.drop_vertex(corner);
        }
        self.relink_through(ob.blocking);
        Ok(())
    }

    /// Moves or resizes an obstacle, keeping its id stable. Equivalent to
    /// remove + register; visibility edges unrelated to either footprint are
    /// untouched.
    pub fn update_obstacle(&mut self, id: ObstacleId, bounds: Rect) -> Result<()> {
        if bounds.width <= 0 || bounds.height <= 0 {
            return Err(Error::DegenerateObstacle {
                width: bounds.width,
                height: bounds.height,
            });
        }
        let Some(old) = self.obstacles.shift_remove(&id) else {
            return Err(Error::UnknownObstacle(id));
        };
        for corner in old.corners {
            self.drop_vertex(corner);
        }
        self.relink_through(old.blocking);
        self.insert_obstacle(id, bounds);
        Ok(())
    }

    /// Adds a path endpoint vertex and links it to everything it can see.
    ///
    /// A point strictly inside an obstacle's expanded bounds is an anchor
    /// placement error and is reported, never clamped.
    pub fn add_endpoint(&mut self, point: Point) -> Result<VertexId> {
        for (&id, ob) in &self.obstacles {
            if ob.expanded.contains_strict(point) {
                return Err(Error::EndpointInsideObstacle {
                    x: point.x,
                    y: point.y,
                    obstacle: id,
                });
            }
        }
        let v = self.alloc_vertex(point, None);
        self.link_visible(v);
        Ok(v)
    }

    /// Removes an endpoint vertex. Endpoints block nothing, so no re-linking
    /// is needed.
    pub fn remove_endpoint(&mut self, id: VertexId) {
        self.drop_vertex(id);
    }

    /// True when the straight segment between `a` and `b` avoids every
    /// obstacle's clearance zone. Distinct coincident points see nothing.
    pub fn is_visible(&self, a: Point, b: Point) -> bool {
        if a == b {
            return false;
        }
        let seg = Segment::new(a, b);
        self.obstacles
            .values()
            .all(|ob| !ob.blocking.intersects_segment(&seg))
    }

    fn insert_obstacle(&mut self, id: ObstacleId, bounds: Rect) {
        let expanded = bounds.expanded(self.clearance);
        let blocking = bounds.expanded(self.clearance - 1);
        self.unlink_through(blocking);
        let corners = expanded.corners().map(|p| self.alloc_vertex(p, Some(id)));
        self.obstacles.insert(
            id,
            Obstacle {
                bounds,
                expanded,
                blocking,
                corners,
            },
        );
        for corner in corners {
            self.link_visible(corner);
        }
    }

    fn alloc_vertex(&mut self, position: Point, owner: Option<ObstacleId>) -> VertexId {
        let id = VertexId(self.next_vertex);
        self.next_vertex += 1;
        self.vertices.insert(
            id,
            Vertex {
                position,
                owner,
                neighbors: BTreeSet::new(),
            },
        );
        id
    }

    fn drop_vertex(&mut self, id: VertexId) {
        let Some(vertex) = self.vertices.remove(&id) else {
            return;
        };
        for n in vertex.neighbors {
            if let Some(other) = self.vertices.get_mut(&n) {
                other.neighbors.remove(&id);
            }
        }
    }

    fn link(&mut self, a: VertexId, b: VertexId) {
        if let Some(v) = self.vertices.get_mut(&a) {
            v.neighbors.insert(b);
        }
        if let Some(v) = self.vertices.get_mut(&b) {
            v.neighbors.insert(a);
        }
    }

    /// Links `v` to every existing vertex it can see under the current
    /// obstacle set. Vertices sharing a position are never linked (a segment
    /// needs two distinct points).
    fn link_visible(&mut self, v: VertexId) {
        let Some(pos) = self.vertices.get(&v).map(|vx| vx.position) else {
            return;
        };
        let mut visible = Vec::new();
        for (&other, vx) in &self.vertices {
            if other == v || vx.position == pos {
                continue;
            }
            if self.is_visible(pos, vx.position) {
                visible.push(other);
            }
        }
        for other in visible {
            self.link(v, other);
        }
    }

    /// Severs existing edges whose segment enters `region`. Used when a new
    /// clearance zone appears: every such edge is blocked by construction,
    /// no re-test needed.
    fn unlink_through(&mut self, region: Rect) {
        let mut cut = Vec::new();
        for (&a, vertex) in &self.vertices {
            for &b in &vertex.neighbors {
                if b <= a {
                    continue;
                }
                let seg = Segment::new(vertex.position, self.vertices[&b].position);
                if region.intersects_segment(&seg) {
                    cut.push((a, b));
                }
            }
        }
        for (a, b) in cut {
            if let Some(v) = self.vertices.get_mut(&a) {
                v.neighbors.remove(&b);
            }
            if let Some(v) = self.vertices.get_mut(&b) {
                v.neighbors.remove(&a);
            }
        }
    }

    /// Re-tests currently-non-adjacent vertex pairs whose segment passes
    /// through a vacated region and links the now-visible ones.
    fn relink_through(&mut self, region: Rect) {
        let ids: Vec<VertexId> = self.vertices.keys().copied().collect();
        let mut add = Vec::new();
        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[i + 1..] {
                let pa = self.vertices[&a].position;
                let pb = self.vertices[&b].position;
                if pa == pb || self.vertices[&a].neighbors.contains(&b) {
                    continue;
                }
                let seg = Segment::new(pa, pb);
                if region.intersects_segment(&seg) && self.is_visible(pa, pb) {
                    add.push((a, b));
                }
            }
        }
        for (a, b) in add {
            self.link(a, b);
        }
    }
}
