use rstar::AABB;

use crate::geometry::math::dist_point_to_polyline;
use crate::model::{EdgeKey, Vec2};
use crate::topology::Topology;

pub fn nearby_edges_impl(t: &Topology, p: Vec2, tol: f64) -> Vec<EdgeKey> {
    if !p.is_finite() || !(tol >= 0.0) {
        return Vec::new();
    }
    let scope = tol * 2.0;
    let window = AABB::from_corners([p.x - scope, p.y - scope], [p.x + scope, p.y + scope]);
    let mut res: Vec<EdgeKey> = t
        .index
        .locate_in_envelope_intersecting(&window)
        .filter(|env| t.edge(env.key).map_or(false, |e| dist_point_to_polyline(p, &e.points) < scope))
        .map(|env| env.key)
        .collect();
    res.sort_unstable();
    res
}
