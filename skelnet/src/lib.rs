//! Routable skeleton networks from noisy linestrings.
//!
//! The pipeline buffers the input lines into a shape, triangulates it, merges
//! and bisects the resulting polygons, then traces the medial skeleton into a
//! directed multigraph that answers shortest-path and proximity queries.

pub mod config;
pub mod error;
pub mod geometry {
    pub mod buffer;
    pub mod edge_iter;
    pub mod limits;
    pub mod math;
    pub mod moments;
    pub mod tolerance;
}
pub mod algorithms {
    pub mod astar;
    pub mod collapse;
    pub mod picking;
    pub mod skeleton;
    pub mod split;
}
pub mod json;
pub mod mesh;
pub mod mesher;
pub mod model;
pub mod svg;
pub mod topology;
pub mod triangulate;

pub use config::{JoinStyle, SkeletonParams};
pub use error::{Error, Result};
pub use geometry::buffer::BufferMaker;
pub use mesh::{EdgeSink, Mesh};
pub use mesher::Mesher;
pub use model::{EdgeKey, PathResult, TopoEdge, Vec2};
pub use topology::{FrozenTopology, Topology};
pub use triangulate::{SpadeTriangulator, Triangulator};

use geo::{Geometry, LineString};
use log::info;
#[cfg(feature = "skeleton_prof")]
use log::debug;

/// Buffers, meshes and skeletonizes `lines` with the default triangulator.
pub fn build_topology(lines: &[LineString<f64>], params: &SkeletonParams) -> Result<Topology> {
    build_topology_with(SpadeTriangulator::default(), lines, params)
}

pub fn build_topology_with<T: Triangulator>(
    triangulator: T,
    lines: &[LineString<f64>],
    params: &SkeletonParams,
) -> Result<Topology> {
    params.validate()?;
    #[cfg(feature = "skeleton_prof")]
    let t0 = std::time::Instant::now();

    let shape = BufferMaker::from_params(params).make_buffered_shape(lines)?;
    #[cfg(feature = "skeleton_prof")]
    let t_buffer = t0.elapsed();

    let mut mesher = Mesher::with_triangulator(triangulator);
    mesher.add_shape(&Geometry::MultiPolygon(shape))?;
    mesher.add_endpoints(lines)?;
    let mut mesh = mesher.discretize(params.thickness)?;
    #[cfg(feature = "skeleton_prof")]
    let t_mesh = t0.elapsed();

    let merged = mesh.collapse_shapes();
    info!("collapsed {merged} polygons, {} remain", mesh.polygon_count());
    let split = mesh.split_shapes(params.cutoff_ratio);
    info!("split {split} polygons, {} remain", mesh.polygon_count());
    #[cfg(feature = "skeleton_prof")]
    let t_refine = t0.elapsed();

    let mut topology = Topology::new();
    let branches = mesh.skeletonize(&mut topology, params.split_at_endpoints)?;
    info!(
        "skeleton emitted {branches} branches: {} nodes, {} edges",
        topology.node_count(),
        topology.edge_count()
    );
    #[cfg(feature = "skeleton_prof")]
    {
        let total = t0.elapsed();
        debug!(
            "skeleton_prof: buffer={:.3}ms mesh={:.3}ms refine={:.3}ms skeleton={:.3}ms",
            t_buffer.as_secs_f64() * 1e3,
            (t_mesh - t_buffer).as_secs_f64() * 1e3,
            (t_refine - t_mesh).as_secs_f64() * 1e3,
            (total - t_refine).as_secs_f64() * 1e3
        );
    }
    Ok(topology)
}

/// Parses a JSON linestring document and runs the pipeline. Parameters in the
/// document take precedence over `fallback`.
pub fn build_topology_from_json(s: &str, fallback: &SkeletonParams) -> Result<Topology> {
    let (lines, params) = json::linestrings_from_json(s)?;
    build_topology(&lines, params.as_ref().unwrap_or(fallback))
}
