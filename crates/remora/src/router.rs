//! Session-level routing state: obstacle registry, persistent routes with a
//! dirty-tracking lifecycle, and batch recomputation.
//!
//! The router is the single owner of all routing state for one diagram
//! session. Obstacle mutations and invalidations only *mark* affected routes
//! stale; one [`Router::solve`] per interaction tick recomputes each stale
//! route exactly once, so a group drag costs one recompute per affected
//! connection rather than one per obstacle move.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::RouterOptions;
use crate::error::{Error, Result};
use crate::geometry::{Point, Rect, Segment};
use crate::graph::{ObstacleId, VisibilityGraph};
use crate::search::{Route, shortest_path};

/// Identifier for a persistent route, allocated by the router.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RouteId(u64);

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Lifecycle of a persistent route.
///
/// `Routed -> Stale` fires when a depended-on obstacle changes or an endpoint
/// moves; `Stale -> Routed` only through [`Router::solve`]. A stale route is
/// never handed out as authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteStatus {
    Unrouted,
    Routed,
    Stale,
}

/// Result of a single routing computation.
///
/// `NoPath` is an expected, recoverable outcome (fully enclosed geometry),
/// distinguishable so the caller can fall back to a straight connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteOutcome {
    /// A collision-free polyline from the start anchor to the end anchor.
    Path(Route),
    /// No corridor connects the anchors under the current obstacle set.
    NoPath,
}

impl RouteOutcome {
    pub fn path(&self) -> Option<&Route> {
        match self {
            RouteOutcome::Path(route) => Some(route),
            RouteOutcome::NoPath => None,
        }
    }
}

#[derive(Debug, Clone)]
struct RouteEntry {
    start: Point,
    end: Point,
    status: RouteStatus,
    outcome: Option<RouteOutcome>,
    deps: BTreeSet<ObstacleId>,
}

/// What one [`Router::solve`] pass did.
#[derive(Debug, Default)]
pub struct SolveReport {
    /// Routes recomputed this pass, in id order.
    pub recomputed: Vec<RouteId>,
    /// Routes whose recomputation hit a configuration error (for example an
    /// endpoint now inside a moved obstacle's clearance zone). They stay
    /// stale; the rest of the pass is unaffected.
    pub failures: Vec<(RouteId, Error)>,
}

/// The routing engine for one diagram session.
#[derive(Debug)]
pub struct Router {
    options: RouterOptions,
    graph: VisibilityGraph,
    routes: BTreeMap<RouteId, RouteEntry>,
    dependents: BTreeMap<ObstacleId, BTreeSet<RouteId>>,
    next_route: u64,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// A router with the default clearance and tie tolerance.
    pub fn new() -> Self {
        let options = RouterOptions::default();
        Self {
            graph: VisibilityGraph::new(options.clearance),
            options,
            routes: BTreeMap::new(),
            dependents: BTreeMap::new(),
            next_route: 0,
        }
    }

    pub fn with_options(options: RouterOptions) -> Result<Self> {
        if options.clearance < 1 {
            return Err(Error::InvalidClearance {
                clearance: options.clearance,
            });
        }
        Ok(Self {
            graph: VisibilityGraph::new(options.clearance),
            options,
            routes: BTreeMap::new(),
            dependents: BTreeMap::new(),
            next_route: 0,
        })
    }

    pub fn options(&self) -> RouterOptions {
        self.options
    }

    /// Read-only view of the visibility graph.
    pub fn graph(&self) -> &VisibilityGraph {
        &self.graph
    }

    /// Replaces the whole obstacle set atomically: every rectangle is
    /// validated before any mutation, and ids are returned in input order so
    /// the host can map its own shape ids. All routes become stale.
    pub fn set_obstacles(
        &mut self,
        rects: impl IntoIterator<Item = Rect>,
    ) -> Result<Vec<ObstacleId>> {
        let rects: Vec<Rect> = rects.into_iter().collect();
        for rect in &rects {
            if rect.width <= 0 || rect.height <= 0 {
                return Err(Error::DegenerateObstacle {
                    width: rect.width,
                    height: rect.height,
                });
            }
        }
        self.graph.clear();
        self.dependents.clear();
        let mut ids = Vec::with_capacity(rects.len());
        for rect in rects {
            ids.push(self.graph.register_obstacle(rect)?);
        }
        for entry in self.routes.values_mut() {
            entry.deps.clear();
            if entry.status == RouteStatus::Routed {
                entry.status = RouteStatus::Stale;
            }
        }
        tracing::debug!(obstacles = ids.len(), "replaced obstacle set");
        Ok(ids)
    }

    /// Registers one more obstacle. Routed polylines that the new clearance
    /// zone cuts become stale even though they hold no vertex of it yet.
    pub fn add_obstacle(&mut self, rect: Rect) -> Result<ObstacleId> {
        let id = self.graph.register_obstacle(rect)?;
        if let Some(zone) = self.graph.obstacle(id).map(|ob| ob.blocking()) {
            self.stale_routes_crossing(zone);
        }
        tracing::debug!(%id, vertices = self.graph.vertex_count(), "registered obstacle");
        Ok(id)
    }

    /// Moves or resizes an obstacle, marking dependent routes and routes the
    /// new footprint cuts as stale. Unrelated routes keep their cached
    /// polylines.
    pub fn update_obstacle(&mut self, id: ObstacleId, rect: Rect) -> Result<()> {
        self.graph.update_obstacle(id, rect)?;
        self.stale_dependents(id);
        if let Some(zone) = self.graph.obstacle(id).map(|ob| ob.blocking()) {
            self.stale_routes_crossing(zone);
        }
        tracing::debug!(%id, "updated obstacle");
        Ok(())
    }

    /// Unregisters an obstacle. Only routes that depended on it go stale;
    /// other routes stay valid (their polylines remain collision-free, at
    /// worst transiently non-optimal).
    pub fn remove_obstacle(&mut self, id: ObstacleId) -> Result<()> {
        self.graph.remove_obstacle(id)?;
        self.stale_dependents(id);
        self.dependents.remove(&id);
        tracing::debug!(%id, "removed obstacle");
        Ok(())
    }

    /// Marks routes depending on `id` stale and returns how many flipped.
    /// Routes not referencing the obstacle are untouched.
    pub fn invalidate(&mut self, id: ObstacleId) -> Result<usize> {
        let Some(zone) = self.graph.obstacle(id).map(|ob| ob.blocking()) else {
            return Err(Error::UnknownObstacle(id));
        };
        let mut flipped = self.stale_dependents(id);
        flipped += self.stale_routes_crossing(zone);
        tracing::debug!(%id, flipped, "invalidated obstacle");
        Ok(flipped)
    }

    /// One-shot routing between two anchors. Endpoint vertices are added for
    /// the duration of the search and removed again.
    pub fn route(&mut self, start: Point, end: Point) -> Result<RouteOutcome> {
        if start == end {
            return Err(Error::IdenticalEndpoints {
                x: start.x,
                y: start.y,
            });
        }
        let (outcome, _) = self.compute(start, end)?;
        Ok(outcome)
    }

    /// Registers a persistent connection. It starts `Unrouted`; the next
    /// [`Router::solve`] computes it.
    pub fn add_route(&mut self, start: Point, end: Point) -> Result<RouteId> {
        if start == end {
            return Err(Error::IdenticalEndpoints {
                x: start.x,
                y: start.y,
            });
        }
        let id = RouteId(self.next_route);
        self.next_route += 1;
        self.routes.insert(
            id,
            RouteEntry {
                start,
                end,
                status: RouteStatus::Unrouted,
                outcome: None,
                deps: BTreeSet::new(),
            },
        );
        Ok(id)
    }

    pub fn remove_route(&mut self, id: RouteId) -> Result<()> {
        if self.routes.remove(&id).is_none() {
            return Err(Error::UnknownRoute(id));
        }
        for set in self.dependents.values_mut() {
            set.remove(&id);
        }
        Ok(())
    }

    /// Moves a route's anchors; a routed route becomes stale.
    pub fn move_endpoints(&mut self, id: RouteId, start: Point, end: Point) -> Result<()> {
        if start == end {
            return Err(Error::IdenticalEndpoints {
                x: start.x,
                y: start.y,
            });
        }
        let Some(entry) = self.routes.get_mut(&id) else {
            return Err(Error::UnknownRoute(id));
        };
        entry.start = start;
        entry.end = end;
        if entry.status == RouteStatus::Routed {
            entry.status = RouteStatus::Stale;
        }
        Ok(())
    }

    pub fn status(&self, id: RouteId) -> Option<RouteStatus> {
        self.routes.get(&id).map(|entry| entry.status)
    }

    /// The route's polyline, only while it is authoritative: a stale or
    /// unrouted route returns `None` and must be solved first.
    pub fn path(&self, id: RouteId) -> Option<&Route> {
        self.outcome(id).and_then(RouteOutcome::path)
    }

    /// The route's last computed outcome, only while it is authoritative.
    pub fn outcome(&self, id: RouteId) -> Option<&RouteOutcome> {
        let entry = self.routes.get(&id)?;
        if entry.status != RouteStatus::Routed {
            return None;
        }
        entry.outcome.as_ref()
    }

    /// All registered routes with their current status, in id order.
    pub fn routes(&self) -> impl Iterator<Item = (RouteId, RouteStatus)> + '_ {
        self.routes.iter().map(|(&id, entry)| (id, entry.status))
    }

    /// Recomputes every unrouted or stale route once, in id order. Routes
    /// whose anchors became invalid stay stale and are reported; the pass
    /// continues past them.
    pub fn solve(&mut self) -> SolveReport {
        let pending: Vec<RouteId> = self
            .routes
            .iter()
            .filter(|(_, entry)| entry.status != RouteStatus::Routed)
            .map(|(&id, _)| id)
            .collect();

        let mut report = SolveReport::default();
        for id in pending {
            let Some((start, end)) = self.routes.get(&id).map(|e| (e.start, e.end)) else {
                continue;
            };
            match self.compute(start, end) {
                Ok((outcome, deps)) => {
                    self.replace_deps(id, &deps);
                    if let Some(entry) = self.routes.get_mut(&id) {
                        entry.outcome = Some(outcome);
                        entry.deps = deps;
                        entry.status = RouteStatus::Routed;
                    }
                    report.recomputed.push(id);
                }
                Err(err) => report.failures.push((id, err)),
            }
        }
        tracing::debug!(
            recomputed = report.recomputed.len(),
            failures = report.failures.len(),
            "solve pass"
        );
        report
    }

    /// Runs one search between transient endpoint vertices and reports the
    /// outcome plus the obstacles it depends on. An unreachable pair depends
    /// on every obstacle: removing any of them could open a corridor.
    fn compute(
        &mut self,
        start: Point,
        end: Point,
    ) -> Result<(RouteOutcome, BTreeSet<ObstacleId>)> {
        tracing::trace!(?start, ?end, "computing route");
        let s = self.graph.add_endpoint(start)?;
        let e = match self.graph.add_endpoint(end) {
            Ok(e) => e,
            Err(err) => {
                self.graph.remove_endpoint(s);
                return Err(err);
            }
        };
        let found = shortest_path(&self.graph, s, e, self.options.tie_epsilon);
        self.graph.remove_endpoint(s);
        self.graph.remove_endpoint(e);
        Ok(match found {
            Some(result) => (RouteOutcome::Path(result.route), result.dependencies),
            None => (
                RouteOutcome::NoPath,
                self.graph.obstacles().map(|(id, _)| id).collect(),
            ),
        })
    }

    fn replace_deps(&mut self, id: RouteId, deps: &BTreeSet<ObstacleId>) {
        for set in self.dependents.values_mut() {
            set.remove(&id);
        }
        for &ob in deps {
            self.dependents.entry(ob).or_default().insert(id);
        }
    }

    fn stale_dependents(&mut self, id: ObstacleId) -> usize {
        let Some(routes) = self.dependents.get(&id) else {
            return 0;
        };
        let ids: Vec<RouteId> = routes.iter().copied().collect();
        let mut flipped = 0;
        for rid in ids {
            if let Some(entry) = self.routes.get_mut(&rid) {
                if entry.status == RouteStatus::Routed {
                    entry.status = RouteStatus::Stale;
                    flipped += 1;
                }
            }
        }
        flipped
    }

    /// Stales routed polylines that enter `zone`. A polyline routed against
    /// the current obstacle set never does, so this only fires when a zone
    /// appeared or moved after the route was computed.
    fn stale_routes_crossing(&mut self, zone: Rect) -> usize {
        let mut flipped = 0;
        for entry in self.routes.values_mut() {
            if entry.status != RouteStatus::Routed {
                continue;
            }
            let Some(RouteOutcome::Path(route)) = &entry.outcome else {
                continue;
            };
            let crosses = route
                .points()
                .windows(2)
                .any(|pair| zone.intersects_segment(&Segment::new(pair[0], pair[1])));
            if crosses {
                entry.status = RouteStatus::Stale;
                flipped += 1;
            }
        }
        flipped
    }
}
