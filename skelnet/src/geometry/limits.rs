// Centralized ingestion limits to harden against untrusted input (JSON)

pub const MAX_LINESTRINGS: usize = 100_000;
pub const MAX_POINTS_PER_LINE: usize = 50_000;
pub const MAX_POINTS_TOTAL: usize = 2_000_000;

// Topology documents
pub const MAX_NODES: usize = 2_000_000;
pub const MAX_EDGES: usize = 4_000_000;

// Rejection sampling cap for hole seeds
pub const MAX_HOLE_SEED_ATTEMPTS: usize = 10_000;

// Numeric bounds
pub const COORD_MIN: f64 = -1.0e9;
pub const COORD_MAX: f64 = 1.0e9;
pub const THICKNESS_MAX: f64 = 1.0e6;

#[inline]
pub fn in_coord_bounds(x: f64) -> bool { x.is_finite() && x >= COORD_MIN && x <= COORD_MAX }

#[inline]
pub fn in_thickness_bounds(w: f64) -> bool { w.is_finite() && w > 0.0 && w <= THICKNESS_MAX }
