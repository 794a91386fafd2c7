#![forbid(unsafe_code)]

//! Obstacle-avoiding connection routing for diagram canvases (headless).
//!
//! Design goals:
//! - shortest collision-free polylines over a visibility graph of
//!   clearance-expanded obstacle corners
//! - deterministic output for identical input (stable tie-breaking by turn
//!   direction)
//! - incremental re-routing: dirty tracking keeps interactive dragging cheap
//!
//! The host supplies obstacle rectangles and anchor points and renders the
//! returned polylines itself; the crate holds no durable state and performs
//! no I/O.

pub mod error;
pub mod geometry;
pub mod graph;
pub mod router;
pub mod search;

pub use error::{Error, Result};
pub use geometry::{Point, Rect, Segment};
pub use graph::{Obstacle, ObstacleId, Vertex, VertexId, VisibilityGraph};
pub use router::{RouteId, RouteOutcome, RouteStatus, Router, SolveReport};
pub use search::Route;

use serde::{Deserialize, Serialize};

/// Default outward expansion applied to obstacle corners, in coordinate
/// units.
pub const DEFAULT_CLEARANCE: i32 = 4;

/// Default absolute tolerance under which two candidate path lengths count
/// as equal and fall through to the turn-direction ranking.
pub const DEFAULT_TIE_EPSILON: f64 = 1e-6;

/// Tuning knobs for a routing session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouterOptions {
    /// Distance kept between routed paths and obstacle rectangles. Must be
    /// at least 1; corner vertices sit on the obstacle expanded by this
    /// margin.
    pub clearance: i32,
    /// Tolerance for treating candidate path lengths as tied, needed when
    /// obstacle corners are nearly collinear with a candidate path.
    pub tie_epsilon: f64,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            clearance: DEFAULT_CLEARANCE,
            tie_epsilon: DEFAULT_TIE_EPSILON,
        }
    }
}
