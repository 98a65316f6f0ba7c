//! Medial skeleton extraction from a refined mesh.
//!
//! Stages run in order: shared-edge midpoints, projection normals pushed onto
//! neighbours, strip-narrowed centroids, then chain tracing. Each traced chain
//! becomes one polyline alternating node points and edge midpoints.

use std::collections::BTreeSet;

use geo::{Area, BooleanOps, Centroid, Coord, Intersects, LineString, MultiPolygon, Point, Polygon};
use log::{debug, trace};

use crate::error::{Error, Result};
use crate::geometry::moments::{area_centroid_moments, normalize};
use crate::geometry::tolerance::{EPS_AREA, STRIP_HALF_LENGTH, STRIP_HALF_WIDTH};
use crate::mesh::{EdgeSink, Mesh};
use crate::model::Vec2;

pub(crate) fn skeletonize_impl<S: EdgeSink + ?Sized>(
    mesh: &mut Mesh,
    sink: &mut S,
    split_at_endpoints: bool,
) -> Result<usize> {
    compute_midpoints(mesh);
    compute_projections(mesh);
    compute_centroids(mesh);

    let mut chains = trace_chains(mesh);
    if split_at_endpoints {
        chains = chains.into_iter().flat_map(|c| split_at_endpoint_nodes(mesh, c)).collect();
    }
    let mut emitted = 0usize;
    for chain in &chains {
        let points = chain_points(mesh, chain)?;
        if points.len() >= 2 {
            sink.add_polyline(&points)?;
            emitted += 1;
        }
    }
    let links = junction_links(mesh);
    for &(a, b) in &links {
        sink.add_polyline(&chain_points(mesh, &[a, b])?)?;
    }
    debug!(
        "skeleton: {} chains, {} junction links from {} polygons",
        chains.len(),
        links.len(),
        mesh.polygon_count()
    );
    Ok(emitted + links.len())
}

pub(crate) fn compute_midpoints(mesh: &mut Mesh) {
    let vertices = &mesh.vertices;
    for poly in mesh.polys.iter_mut().flatten() {
        for edge in poly.links.values_mut() {
            let (a, b) = edge.common;
            edge.point = match (vertices.get(a), vertices.get(b)) {
                (Some(&pa), Some(&pb)) => Some(pa.midpoint(pb)),
                _ => None,
            };
        }
    }
}

/// For every pair of edges around a node, the unit vector between their
/// midpoints is recorded on both far-end neighbours.
pub(crate) fn compute_projections(mesh: &mut Mesh) {
    for poly in mesh.polys.iter_mut().flatten() {
        poly.projections.clear();
    }
    let mut pushed: Vec<(u32, u32, Vec2)> = Vec::new();
    for (p, _) in mesh.polygons() {
        let nbrs: Vec<(u32, Vec2)> = match mesh.poly(p) {
            Some(poly) => poly.links.iter().filter_map(|(&n, e)| e.point.map(|pt| (n, pt))).collect(),
            None => continue,
        };
        for (i, &(n1, p1)) in nbrs.iter().enumerate() {
            for &(n2, p2) in &nbrs[i + 1..] {
                let d = p1 - p2;
                match normalize(d.x, d.y) {
                    Ok(normal) => {
                        pushed.push((n1, p, normal));
                        pushed.push((n2, p, normal));
                    }
                    Err(_) => trace!("skeleton: coincident midpoints around polygon {p}"),
                }
            }
        }
    }
    for (target, from, normal) in pushed {
        if let Some(poly) = mesh.poly_mut(target) {
            poly.projections.push((from, normal));
        }
    }
}

pub(crate) fn compute_centroids(mesh: &mut Mesh) {
    let points: Vec<(u32, Option<Vec2>)> = mesh.ids().into_iter().map(|id| (id, smoothed_centroid(mesh, id))).collect();
    for (id, pt) in points {
        if let Some(poly) = mesh.poly_mut(id) {
            poly.point = pt;
        }
    }
}

/// Centroid of the polygon narrowed by one strip per projection; the plain
/// centroid when the narrowed shape has no area left.
fn smoothed_centroid(mesh: &Mesh, id: u32) -> Option<Vec2> {
    let ring = mesh.loop_points(id);
    let original = polygon_of(&ring);
    let area = original.unsigned_area();
    let length = area.sqrt();
    let mut shape = MultiPolygon::new(vec![original.clone()]);
    for &(nbr, normal) in mesh.projections(id) {
        let Some(pt) = mesh.edge_point(id, nbr) else { continue };
        shape = shape.intersection(&MultiPolygon::new(vec![strip(pt, normal, length)]));
        if shape.unsigned_area() <= EPS_AREA {
            break;
        }
    }
    if shape.unsigned_area() > EPS_AREA {
        if let Some(c) = shape.centroid() {
            return Some(Vec2::new(c.x(), c.y()));
        }
    }
    plain_centroid(&ring, &original)
}

fn plain_centroid(ring: &[Vec2], shape: &Polygon<f64>) -> Option<Vec2> {
    if let Ok(m) = area_centroid_moments(ring) {
        return Some(m.centroid);
    }
    if let Some(c) = shape.centroid() {
        return Some(Vec2::new(c.x(), c.y()));
    }
    if ring.is_empty() {
        return None;
    }
    let sum = ring.iter().fold(Vec2::default(), |acc, &p| acc + p);
    Some(sum / ring.len() as f64)
}

fn polygon_of(ring: &[Vec2]) -> Polygon<f64> {
    Polygon::new(LineString::from(ring.iter().map(|&p| Coord::from(p)).collect::<Vec<_>>()), vec![])
}

/// Rectangle centered on `center`, long side along `normal`.
fn strip(center: Vec2, normal: Vec2, length: f64) -> Polygon<f64> {
    let along = normal * (STRIP_HALF_LENGTH * length);
    let across = normal.perp() * (STRIP_HALF_WIDTH * length);
    polygon_of(&[
        center + along + across,
        center - along + across,
        center - along - across,
        center + along - across,
    ])
}

/// Chains through every degree-1 or degree-2 node, each traced once.
pub(crate) fn trace_chains(mesh: &Mesh) -> Vec<Vec<u32>> {
    let mut visited = BTreeSet::new();
    let mut chains = Vec::new();
    for id in mesh.ids() {
        let deg = mesh.degree(id);
        if !(deg == 1 || deg == 2) || visited.contains(&id) {
            continue;
        }
        let chain = chain_from(mesh, id);
        visited.extend(chain.iter().copied());
        chains.push(chain);
    }
    chains
}

/// Maximal chain of degree-2 nodes through `seed`, from terminal to terminal.
/// A component made only of degree-2 nodes comes back closed, starting and
/// ending at `seed`.
pub(crate) fn chain_from(mesh: &Mesh, seed: u32) -> Vec<u32> {
    let mut stack = vec![seed];
    let mut seen = BTreeSet::from([seed]);
    let mut last = seed;
    let mut terminal = None;
    'search: while let Some(node) = stack.pop() {
        last = node;
        for child in mesh.neighbours(node) {
            if seen.insert(child) {
                if mesh.degree(child) == 2 {
                    stack.push(child);
                } else {
                    terminal = Some(child);
                    break 'search;
                }
            }
        }
    }
    let limit = mesh.polygon_count() + 1;
    let Some(terminal) = terminal else {
        return closed_walk(mesh, seed, limit);
    };
    let mut nodes = vec![terminal, last];
    while nodes.len() <= limit {
        let (prev, cur) = (nodes[nodes.len() - 2], nodes[nodes.len() - 1]);
        if mesh.degree(cur) != 2 {
            break;
        }
        match mesh.neighbours(cur).find(|&c| c != prev) {
            Some(next) => nodes.push(next),
            None => break,
        }
    }
    nodes.reverse();
    nodes
}

fn closed_walk(mesh: &Mesh, seed: u32, limit: usize) -> Vec<u32> {
    let mut nodes = vec![seed];
    let mut prev = None;
    let mut cur = seed;
    while nodes.len() <= limit {
        let Some(next) = mesh.neighbours(cur).find(|&c| Some(c) != prev) else { break };
        nodes.push(next);
        if next == seed {
            break;
        }
        prev = Some(cur);
        cur = next;
    }
    nodes
}

/// Cuts `chain` at interior nodes covering a linestring endpoint. Each
/// endpoint cuts at most once, at the first node that covers it. Endpoints
/// already covered by either terminal of the chain never cut.
pub(crate) fn split_at_endpoint_nodes(mesh: &Mesh, chain: Vec<u32>) -> Vec<Vec<u32>> {
    if chain.len() < 3 || mesh.endpoints().is_empty() {
        return vec![chain];
    }
    let (head, tail) = (chain[0], chain[chain.len() - 1]);
    let mut pending: BTreeSet<usize> =
        mesh.endpoints().iter().copied().filter(|&v| !covers(mesh, head, v) && !covers(mesh, tail, v)).collect();
    let mut cuts = Vec::new();
    for (i, &node) in chain.iter().enumerate().take(chain.len() - 1).skip(1) {
        let covered: Vec<usize> = pending.iter().copied().filter(|&v| covers(mesh, node, v)).collect();
        if !covered.is_empty() {
            cuts.push(i);
            for v in covered {
                pending.remove(&v);
            }
        }
    }
    if cuts.is_empty() {
        return vec![chain];
    }
    let mut out = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for i in cuts {
        out.push(chain[start..=i].to_vec());
        start = i;
    }
    out.push(chain[start..].to_vec());
    out
}

fn covers(mesh: &Mesh, id: u32, vertex: usize) -> bool {
    let Some(vs) = mesh.polygon(id) else { return false };
    if vs.contains(&vertex) {
        return true;
    }
    match mesh.vertex(vertex) {
        Some(p) => polygon_of(&mesh.loop_points(id)).intersects(&Point::new(p.x, p.y)),
        None => false,
    }
}

/// Mesh edges joining two nodes of degree three or more.
pub(crate) fn junction_links(mesh: &Mesh) -> Vec<(u32, u32)> {
    let mut out = Vec::new();
    for (a, _) in mesh.polygons() {
        if mesh.degree(a) < 3 {
            continue;
        }
        for b in mesh.neighbours(a) {
            if b > a && mesh.degree(b) >= 3 {
                out.push((a, b));
            }
        }
    }
    out
}

fn chain_points(mesh: &Mesh, chain: &[u32]) -> Result<Vec<Vec2>> {
    let Some(&first) = chain.first() else { return Ok(Vec::new()) };
    let mut points = Vec::with_capacity(chain.len() * 2);
    points.push(mesh.node_point(first).ok_or_else(|| missing(first))?);
    for w in chain.windows(2) {
        points.push(mesh.edge_point(w[0], w[1]).ok_or_else(|| missing(w[0]))?);
        points.push(mesh.node_point(w[1]).ok_or_else(|| missing(w[1]))?);
    }
    Ok(points)
}

fn missing(id: u32) -> Error {
    Error::Geometry(format!("polygon {id} has no skeleton point"))
}
