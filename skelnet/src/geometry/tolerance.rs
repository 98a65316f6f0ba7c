// Centralized tolerances for robust geometry

pub const EPS_LEN: f64 = 1e-12;           // zero-length vector threshold
pub const EPS_AREA: f64 = 1e-12;          // zero-area polygon threshold
pub const EPS_AXIS: f64 = 1e-6;           // product moment below which a shape is axis aligned

// Centroid smoothing strip, in units of sqrt(polygon area)
pub const STRIP_HALF_LENGTH: f64 = 10.0;
pub const STRIP_HALF_WIDTH: f64 = 1.0 / 8.0;

// Minimum loop size; a split must leave both halves above it
pub const MIN_POLY_VERTICES: usize = 3;

// Triangle quality bound handed to the triangulator (degrees); 0 leaves only
// the area bound
pub const MIN_TRIANGLE_ANGLE: f64 = 0.0;
