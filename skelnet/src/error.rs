use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot normalize a zero-length vector")]
    ZeroVector,
    #[error("degenerate polygon with {vertices} vertices")]
    DegeneratePolygon { vertices: usize },
    #[error("geometry error: {0}")]
    Geometry(String),
    #[error("triangulation failed: {0}")]
    Triangulation(String),
    #[error("no interior point found for hole after {attempts} attempts")]
    HoleSeed { attempts: usize },
    #[error("edge ({u}, {v}, {index}) not found")]
    EdgeNotFound { u: u32, v: u32, index: u32 },
    #[error("node {0} not found")]
    NodeNotFound(u32),
    #[error("no node at coordinate ({x}, {y})")]
    CoordinateNotFound { x: f64, y: f64 },
    #[error("edge needs at least 2 points, got {points}")]
    DegenerateEdge { points: usize },
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParam { name: &'static str, reason: String },
    #[error("{what} exceeds limit of {max}")]
    Limit { what: &'static str, max: usize },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
