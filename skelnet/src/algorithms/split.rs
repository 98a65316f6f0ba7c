use log::{debug, trace};

use crate::geometry::edge_iter::oriented_edges;
use crate::geometry::moments::{area_centroid_moments, axis_from_moments, normalize};
use crate::geometry::tolerance::MIN_POLY_VERTICES;
use crate::mesh::Mesh;
use crate::model::Vec2;

pub(crate) fn split_impl(mesh: &mut Mesh, cutoff_ratio: f64) -> usize {
    let mut stack = mesh.ids();
    let mut splits = 0usize;
    while let Some(id) = stack.pop() {
        let Some(n) = mesh.polygon(id).map(|vs| vs.len()) else { continue };
        if n <= 3 {
            continue;
        }
        let Some((top, bottom)) = split_nodes(mesh, id, cutoff_ratio) else { continue };
        if let Some(fresh) = split_polygon(mesh, id, top, bottom) {
            splits += 1;
            stack.push(id);
            stack.push(fresh);
        }
    }
    debug!("split: {} polygons bisected, {} remain", splits, mesh.polygon_count());
    splits
}

/// Split vertices for `id` when its aspect ratio exceeds `cutoff_ratio`.
fn split_nodes(mesh: &Mesh, id: u32, cutoff_ratio: f64) -> Option<(usize, usize)> {
    let pts = mesh.loop_points(id);
    let moments = match area_centroid_moments(&pts) {
        Ok(m) => m,
        Err(e) => {
            trace!("split: skipping polygon {id}: {e}");
            return None;
        }
    };
    let (axis, ratio) = axis_from_moments(&moments).ok()?;
    if !(ratio > cutoff_ratio) {
        return None;
    }
    find_split_nodes(mesh, id, moments.centroid, axis)
}

/// On each side of the axis through `centroid`, the vertex whose direction
/// from the centroid is closest to perpendicular to `axis`.
pub(crate) fn find_split_nodes(mesh: &Mesh, id: u32, centroid: Vec2, axis: Vec2) -> Option<(usize, usize)> {
    let (mut top, mut lowest_top) = (None, 1.0);
    let (mut bottom, mut lowest_bottom) = (None, 1.0);
    for &v in mesh.polygon(id)? {
        let Some(p) = mesh.vertex(v) else { continue };
        let d = p - centroid;
        let Ok(d) = normalize(d.x, d.y) else { continue };
        let dot = d.dot(axis).abs();
        if d.x * axis.y - d.y * axis.x > 0.0 {
            if dot < lowest_top {
                lowest_top = dot;
                top = Some(v);
            }
        } else if dot < lowest_bottom {
            lowest_bottom = dot;
            bottom = Some(v);
        }
    }
    Some((top?, bottom?))
}

/// Cuts `id` along the chord `top`-`bottom`. The first half keeps the id, the
/// second half gets a fresh one which is returned. Links whose shared segment
/// leaves the first half move to the new polygon.
pub(crate) fn split_polygon(mesh: &mut Mesh, id: u32, top: usize, bottom: usize) -> Option<u32> {
    let vertices = mesh.polygon(id)?;
    let first = half(vertices, top, bottom)?;
    let second = half(vertices, bottom, top)?;
    if first.len() <= MIN_POLY_VERTICES || second.len() <= MIN_POLY_VERTICES {
        return None;
    }
    let moved: Vec<(u32, (usize, usize))> = mesh
        .poly(id)?
        .links
        .iter()
        .filter(|(_, e)| !(first.contains(&e.common.0) && first.contains(&e.common.1)))
        .map(|(&n, e)| (n, e.common))
        .collect();
    mesh.set_vertices(id, first);
    let fresh = mesh.add_polygon(second);
    mesh.link(id, fresh, (top, bottom));
    for (n, common) in moved {
        mesh.unlink(id, n);
        mesh.link(fresh, n, common);
    }
    Some(fresh)
}

/// Vertices met walking the loop from `start` to `end`, both included.
fn half(vertices: &[usize], start: usize, end: usize) -> Option<Vec<usize>> {
    let next: std::collections::HashMap<usize, usize> = oriented_edges(vertices).collect();
    let mut out = vec![start];
    let mut cur = start;
    while cur != end {
        cur = *next.get(&cur)?;
        out.push(cur);
        if out.len() > vertices.len() {
            return None;
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(raw: &[(f64, f64)], nbrs: &[(usize, usize)]) -> Mesh {
        let mut vs: Vec<Vec2> = raw.iter().map(|&p| p.into()).collect();
        let n = vs.len();
        let mut polys = vec![(0..n).collect::<Vec<_>>()];
        let mut links = Vec::new();
        // one outside triangle per requested neighbour edge
        for (i, &(a, b)) in nbrs.iter().enumerate() {
            vs.push((vs[a] + vs[b]) * 0.5 + Vec2::new(0.0, 5.0));
            polys.push(vec![a, b, n + i]);
            links.push((0, (i + 1) as u32, (a, b)));
        }
        let boundary = vec![true; vs.len()];
        Mesh::from_parts(vs, boundary, polys, &links)
    }

    fn hexagon() -> Mesh {
        strip(&[(0.0, 0.0), (3.0, 0.0), (6.0, 0.0), (6.0, 1.0), (3.0, 1.0), (0.0, 1.0)], &[])
    }

    fn octagon(nbrs: &[(usize, usize)]) -> Mesh {
        strip(
            &[(0.0, 0.0), (2.0, 0.0), (4.0, 0.0), (6.0, 0.0), (6.0, 1.0), (4.0, 1.0), (2.0, 1.0), (0.0, 1.0)],
            nbrs,
        )
    }

    #[test]
    fn split_nodes_are_closest_to_the_cross_axis() {
        let m = hexagon();
        let nodes = find_split_nodes(&m, 0, Vec2::new(3.0, 0.5), Vec2::new(-1.0, 0.0));
        assert_eq!(nodes, Some((4, 1)));
    }

    #[test]
    fn elongated_hexagon_is_bisected_once() {
        let mut m = hexagon();
        assert_eq!(m.split_shapes(2.0), 1);
        assert_eq!(m.polygon_count(), 2);
        assert_eq!(m.polygon(0).unwrap(), &[4, 5, 0, 1]);
        assert_eq!(m.polygon(1).unwrap(), &[1, 2, 3, 4]);
        assert_eq!(m.shared(0, 1), Some((1, 4)));
    }

    #[test]
    fn high_cutoff_keeps_polygon() {
        let mut m = hexagon();
        assert_eq!(m.split_shapes(10.0), 0);
        assert_eq!(m.polygon_count(), 1);
    }

    #[test]
    fn quads_are_never_split() {
        let mut m = strip(&[(0.0, 0.0), (10.0, 0.0), (10.0, 1.0), (0.0, 1.0)], &[]);
        assert_eq!(m.split_shapes(1.5), 0);
        assert_eq!(m.polygon(0).unwrap().len(), 4);
    }

    #[test]
    fn split_rewires_links_outside_first_half() {
        let mut m = octagon(&[(3, 4), (6, 7)]);
        let fresh = split_polygon(&mut m, 0, 5, 1).unwrap();
        assert_eq!(fresh, 3);
        assert_eq!(m.polygon(0).unwrap(), &[5, 6, 7, 0, 1]);
        assert_eq!(m.polygon(3).unwrap(), &[1, 2, 3, 4, 5]);
        assert_eq!(m.shared(3, 1), Some((3, 4)));
        assert_eq!(m.shared(0, 1), None);
        assert_eq!(m.shared(0, 2), Some((6, 7)));
        assert_eq!(m.shared(0, 3), Some((1, 5)));
    }

    #[test]
    fn vertex_count_is_preserved() {
        let mut m = octagon(&[]);
        split_polygon(&mut m, 0, 5, 1).unwrap();
        let total: usize = m.polygons().map(|(_, vs)| vs.len()).sum();
        assert_eq!(total, 8 + 2);
    }

    #[test]
    fn small_halves_are_rejected() {
        let mut m = octagon(&[]);
        assert_eq!(split_polygon(&mut m, 0, 6, 0), None);
        assert_eq!(m.polygon(0).unwrap().len(), 8);
        assert_eq!(m.polygon_count(), 1);
    }
}
