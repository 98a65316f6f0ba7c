//! Quality constrained triangulation behind a small trait so the mesher can be
//! driven by any engine. The shipped engine is spade's constrained Delaunay
//! triangulation with Ruppert style refinement, bounded by triangle area and
//! free to split required segments.

use std::collections::{HashSet, VecDeque};

use log::debug;
use spade::handles::{FixedFaceHandle, FixedVertexHandle, InnerTag};
use spade::{
    AngleLimit, ConstrainedDelaunayTriangulation, Point2, PositionInTriangulation, RefinementParameters,
    Triangulation,
};

use crate::error::{Error, Result};
use crate::geometry::limits::MAX_NODES;
use crate::geometry::math::bbox;
use crate::geometry::tolerance::MIN_TRIANGLE_ANGLE;
use crate::model::Vec2;

/// Planar straight line graph handed to a triangulator.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriangulationInput {
    pub vertices: Vec<Vec2>,
    /// Required segments as vertex index pairs.
    pub segments: Vec<(usize, usize)>,
    /// One point strictly inside each hole.
    pub holes: Vec<Vec2>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriangulationOutput {
    pub vertices: Vec<Vec2>,
    /// True for vertices lying on a required segment.
    pub boundary: Vec<bool>,
    pub triangles: Vec<[usize; 3]>,
    /// Output index of every input vertex.
    pub input_ids: Vec<usize>,
}

pub trait Triangulator {
    /// Triangulates the region enclosed by `input.segments`, minus holes, with
    /// no triangle larger than `max_area`.
    fn triangulate(&self, input: &TriangulationInput, max_area: f64) -> Result<TriangulationOutput>;
}

impl<T: Triangulator + ?Sized> Triangulator for &T {
    fn triangulate(&self, input: &TriangulationInput, max_area: f64) -> Result<TriangulationOutput> {
        (**self).triangulate(input, max_area)
    }
}

#[derive(Clone, Debug)]
pub struct SpadeTriangulator {
    /// Minimum interior angle in degrees; 0 refines by area only.
    pub min_angle: f64,
    /// Forbid Steiner points on required segments. Faces along long segments
    /// may then stay above the area bound.
    pub keep_segments: bool,
}

impl Default for SpadeTriangulator {
    fn default() -> Self {
        SpadeTriangulator { min_angle: MIN_TRIANGLE_ANGLE, keep_segments: false }
    }
}

type Cdt = ConstrainedDelaunayTriangulation<Point2<f64>>;

impl Triangulator for SpadeTriangulator {
    fn triangulate(&self, input: &TriangulationInput, max_area: f64) -> Result<TriangulationOutput> {
        if input.vertices.is_empty() {
            return Err(Error::Triangulation("no input vertices".into()));
        }
        if !(max_area > 0.0) {
            return Err(Error::Triangulation(format!("max area must be positive, got {max_area}")));
        }
        let mut cdt = Cdt::new();
        let mut handles = Vec::with_capacity(input.vertices.len());
        for p in &input.vertices {
            let h = cdt
                .insert(Point2::new(p.x, p.y))
                .map_err(|e| Error::Triangulation(format!("cannot insert ({}, {}): {e:?}", p.x, p.y)))?;
            handles.push(h);
        }
        for &(a, b) in &input.segments {
            let (Some(&ha), Some(&hb)) = (handles.get(a), handles.get(b)) else {
                return Err(Error::Triangulation(format!("segment {a}-{b} references a missing vertex")));
            };
            if ha == hb {
                continue;
            }
            if !cdt.can_add_constraint(ha, hb) {
                return Err(Error::Triangulation(format!("segment {a}-{b} crosses another segment")));
            }
            cdt.add_constraint(ha, hb);
        }

        let mut params = RefinementParameters::<f64>::new()
            .with_angle_limit(AngleLimit::from_deg(self.min_angle))
            .with_max_allowed_area(max_area)
            .with_max_additional_vertices(vertex_budget(input, max_area))
            .exclude_outer_faces(true);
        if self.keep_segments {
            params = params.keep_constraint_edges();
        }
        let result = cdt.refine(params);
        if !result.refinement_complete {
            debug!("triangulate: refinement stopped at the vertex budget");
        }
        let mut excluded: HashSet<FixedFaceHandle<InnerTag>> = result.excluded_faces.into_iter().collect();
        for seed in &input.holes {
            flood_exclude(&cdt, *seed, &mut excluded);
        }

        let vertices: Vec<Vec2> = cdt.vertices().map(|v| Vec2::new(v.position().x, v.position().y)).collect();
        let mut boundary = vec![false; vertices.len()];
        for e in cdt.undirected_edges() {
            if cdt.is_constraint_edge(e.fix()) {
                for v in e.vertices() {
                    boundary[v.fix().index()] = true;
                }
            }
        }
        let triangles: Vec<[usize; 3]> = cdt
            .inner_faces()
            .filter(|f| !excluded.contains(&f.fix()))
            .map(|f| f.vertices().map(|v| v.fix().index()))
            .collect();
        debug!(
            "triangulate: {} input vertices -> {} vertices, {} triangles",
            input.vertices.len(),
            vertices.len(),
            triangles.len()
        );
        Ok(TriangulationOutput {
            vertices,
            boundary,
            triangles,
            input_ids: handles.iter().map(|h: &FixedVertexHandle| h.index()).collect(),
        })
    }
}

fn vertex_budget(input: &TriangulationInput, max_area: f64) -> usize {
    let area = bbox(&input.vertices).map_or(0.0, |(x0, y0, x1, y1)| (x1 - x0) * (y1 - y0));
    let estimate = (area / max_area * 4.0).min(MAX_NODES as f64) as usize;
    (estimate + 10 * input.vertices.len()).min(MAX_NODES)
}

/// Marks every face reachable from the face containing `seed` without
/// crossing a constraint edge.
fn flood_exclude(cdt: &Cdt, seed: Vec2, excluded: &mut HashSet<FixedFaceHandle<InnerTag>>) {
    let start = match cdt.locate(Point2::new(seed.x, seed.y)) {
        PositionInTriangulation::OnFace(f) => f,
        _ => return,
    };
    let mut queue = VecDeque::from([start]);
    let mut seen = HashSet::from([start]);
    while let Some(f) = queue.pop_front() {
        excluded.insert(f);
        for e in cdt.face(f).adjacent_edges() {
            if cdt.is_constraint_edge(e.as_undirected().fix()) {
                continue;
            }
            if let Some(next) = e.rev().face().as_inner() {
                if seen.insert(next.fix()) {
                    queue.push_back(next.fix());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, s: f64) -> Vec<Vec2> {
        vec![Vec2::new(x0, y0), Vec2::new(x0 + s, y0), Vec2::new(x0 + s, y0 + s), Vec2::new(x0, y0 + s)]
    }

    fn ring_segments(start: usize, n: usize) -> Vec<(usize, usize)> {
        (0..n).map(|i| (start + i, start + (i + 1) % n)).collect()
    }

    fn area(out: &TriangulationOutput, t: &[usize; 3]) -> f64 {
        let [a, b, c] = t.map(|i| out.vertices[i]);
        ((b - a).cross(c - a) / 2.0).abs()
    }

    #[test]
    fn refines_to_area_bound() {
        let input = TriangulationInput { vertices: square(0.0, 0.0, 10.0), segments: ring_segments(0, 4), holes: vec![] };
        let out = SpadeTriangulator::default().triangulate(&input, 4.0).unwrap();
        assert!(out.triangles.len() >= 25);
        let total: f64 = out.triangles.iter().map(|t| area(&out, t)).sum();
        assert!((total - 100.0).abs() < 1e-6);
        assert!(out.triangles.iter().all(|t| area(&out, t) <= 4.0 + 1e-9));
        assert_eq!(out.input_ids, vec![0, 1, 2, 3]);
        assert!(out.boundary[..4].iter().all(|&b| b));
    }

    #[test]
    fn kept_segments_cover_the_square() {
        let input = TriangulationInput { vertices: square(0.0, 0.0, 10.0), segments: ring_segments(0, 4), holes: vec![] };
        let engine = SpadeTriangulator { min_angle: 20.0, keep_segments: true };
        let out = engine.triangulate(&input, 4.0).unwrap();
        let total: f64 = out.triangles.iter().map(|t| area(&out, t)).sum();
        assert!((total - 100.0).abs() < 1e-6);
        // required segments are never subdivided
        let on_edge = |p: Vec2| p.x == 0.0 || p.x == 10.0 || p.y == 0.0 || p.y == 10.0;
        assert_eq!(out.vertices.iter().filter(|&&p| on_edge(p)).count(), 4);
    }

    #[test]
    fn hole_faces_are_dropped() {
        let mut vertices = square(0.0, 0.0, 10.0);
        vertices.extend(square(4.0, 4.0, 2.0));
        let mut segments = ring_segments(0, 4);
        segments.extend(ring_segments(4, 4));
        let input = TriangulationInput { vertices, segments, holes: vec![Vec2::new(5.0, 5.0)] };
        let out = SpadeTriangulator::default().triangulate(&input, 100.0).unwrap();
        let total: f64 = out.triangles.iter().map(|t| area(&out, t)).sum();
        assert!((total - 96.0).abs() < 1e-6, "area {total}");
    }

    #[test]
    fn interior_points_are_not_boundary() {
        let mut vertices = square(0.0, 0.0, 10.0);
        vertices.push(Vec2::new(3.0, 3.0));
        let input = TriangulationInput { vertices, segments: ring_segments(0, 4), holes: vec![] };
        let out = SpadeTriangulator::default().triangulate(&input, 1000.0).unwrap();
        assert!(!out.boundary[out.input_ids[4]]);
        assert!(out.triangles.iter().any(|t| t.contains(&out.input_ids[4])));
    }

    #[test]
    fn crossing_segments_fail() {
        let input = TriangulationInput {
            vertices: square(0.0, 0.0, 1.0),
            segments: vec![(0, 2), (1, 3)],
            holes: vec![],
        };
        assert!(matches!(
            SpadeTriangulator::default().triangulate(&input, 1.0),
            Err(Error::Triangulation(_))
        ));
    }

    #[test]
    fn empty_input_fails() {
        let input = TriangulationInput::default();
        assert!(SpadeTriangulator::default().triangulate(&input, 1.0).is_err());
    }
}
