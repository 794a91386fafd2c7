use crate::graph::ObstacleId;
use crate::router::RouteId;

pub type Result<T> = std::result::Result<T, Error>;

/// Configuration and handle errors reported across the routing boundary.
///
/// An unreachable endpoint pair is *not* an error; see
/// [`RouteOutcome::NoPath`](crate::router::RouteOutcome).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("obstacle rectangle has no area: {width}x{height}")]
    DegenerateObstacle { width: i32, height: i32 },

    #[error("endpoint ({x}, {y}) lies inside the clearance zone of obstacle {obstacle}")]
    EndpointInsideObstacle { x: i32, y: i32, obstacle: ObstacleId },

    #[error("route endpoints coincide at ({x}, {y})")]
    IdenticalEndpoints { x: i32, y: i32 },

    #[error("clearance must be at least 1, got {clearance}")]
    InvalidClearance { clearance: i32 },

    #[error("unknown obstacle: {0}")]
    UnknownObstacle(ObstacleId),

    #[error("unknown route: {0}")]
    UnknownRoute(RouteId),
}
