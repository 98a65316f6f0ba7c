use std::collections::{BTreeMap, BTreeSet};

use crate::error::Result;
use crate::model::Vec2;

/// Link between two polygons sharing the boundary segment `common`
/// (sorted vertex pair). `point` is filled in by skeletonization.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshEdge {
    pub common: (usize, usize),
    pub point: Option<Vec2>,
}

#[derive(Clone, Debug, Default)]
pub struct MeshPolygon {
    pub vertices: Vec<usize>,
    pub(crate) links: BTreeMap<u32, MeshEdge>,
    pub(crate) point: Option<Vec2>,
    pub(crate) projections: Vec<(u32, Vec2)>,
}

/// Receives skeleton polylines.
pub trait EdgeSink {
    fn add_polyline(&mut self, points: &[Vec2]) -> Result<()>;
}

impl EdgeSink for Vec<Vec<Vec2>> {
    fn add_polyline(&mut self, points: &[Vec2]) -> Result<()> {
        self.push(points.to_vec());
        Ok(())
    }
}

/// Polygon adjacency graph over a shared vertex array.
///
/// Polygons live in an arena indexed by id; merged polygons are tombstoned and
/// their ids are never handed out again. New ids come from the end of the
/// arena, so they always sit above every id issued so far.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub(crate) vertices: Vec<Vec2>,
    pub(crate) boundary: Vec<bool>,
    pub(crate) endpoints: BTreeSet<usize>,
    pub(crate) polys: Vec<Option<MeshPolygon>>, // id is index
}

impl Mesh {
    pub fn new(vertices: Vec<Vec2>, boundary: Vec<bool>) -> Self {
        Mesh { vertices, boundary, endpoints: BTreeSet::new(), polys: Vec::new() }
    }

    /// Builds a mesh from explicit polygons and `(a, b, common)` links.
    pub fn from_parts(
        vertices: Vec<Vec2>,
        boundary: Vec<bool>,
        polygons: Vec<Vec<usize>>,
        links: &[(u32, u32, (usize, usize))],
    ) -> Self {
        let mut m = Mesh::new(vertices, boundary);
        for p in polygons {
            m.add_polygon(p);
        }
        for &(a, b, common) in links {
            m.link(a, b, common);
        }
        m
    }

    pub fn set_endpoints<I: IntoIterator<Item = usize>>(&mut self, ids: I) {
        self.endpoints = ids.into_iter().collect();
    }

    pub fn endpoints(&self) -> &BTreeSet<usize> {
        &self.endpoints
    }

    pub fn vertex(&self, i: usize) -> Option<Vec2> {
        self.vertices.get(i).copied()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// True for vertices that are not on the outer edge of the shape.
    pub fn is_internal(&self, i: usize) -> bool {
        self.boundary.get(i).map_or(false, |b| !b)
    }

    pub fn polygon(&self, id: u32) -> Option<&[usize]> {
        self.poly(id).map(|p| p.vertices.as_slice())
    }

    pub fn polygons(&self) -> impl Iterator<Item = (u32, &[usize])> + '_ {
        self.polys
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.as_ref().map(|p| (i as u32, p.vertices.as_slice())))
    }

    pub fn polygon_count(&self) -> usize {
        self.polys.iter().filter(|p| p.is_some()).count()
    }

    pub fn ids(&self) -> Vec<u32> {
        self.polygons().map(|(id, _)| id).collect()
    }

    pub fn degree(&self, id: u32) -> usize {
        self.poly(id).map_or(0, |p| p.links.len())
    }

    pub fn neighbours(&self, id: u32) -> impl Iterator<Item = u32> + '_ {
        self.poly(id).into_iter().flat_map(|p| p.links.keys().copied())
    }

    pub fn shared(&self, a: u32, b: u32) -> Option<(usize, usize)> {
        self.poly(a)?.links.get(&b).map(|e| e.common)
    }

    /// Skeleton point of a polygon, available after skeletonization.
    pub fn node_point(&self, id: u32) -> Option<Vec2> {
        self.poly(id)?.point
    }

    /// Midpoint of the segment shared by `a` and `b`, available after skeletonization.
    pub fn edge_point(&self, a: u32, b: u32) -> Option<Vec2> {
        self.poly(a)?.links.get(&b)?.point
    }

    pub fn projections(&self, id: u32) -> &[(u32, Vec2)] {
        self.poly(id).map_or(&[][..], |p| p.projections.as_slice())
    }

    pub fn loop_points(&self, id: u32) -> Vec<Vec2> {
        self.polygon(id)
            .map(|vs| vs.iter().filter_map(|&v| self.vertex(v)).collect())
            .unwrap_or_default()
    }

    /// Merges fully interior polygons and polygons touching interior vertices.
    pub fn collapse_shapes(&mut self) -> usize {
        crate::algorithms::collapse::collapse_impl(self)
    }

    /// Bisects polygons whose aspect ratio exceeds `cutoff_ratio`.
    pub fn split_shapes(&mut self, cutoff_ratio: f64) -> usize {
        crate::algorithms::split::split_impl(self, cutoff_ratio)
    }

    /// Emits the medial skeleton into `sink`; returns the number of polylines.
    pub fn skeletonize<S: EdgeSink + ?Sized>(&mut self, sink: &mut S, split_at_endpoints: bool) -> Result<usize> {
        crate::algorithms::skeleton::skeletonize_impl(self, sink, split_at_endpoints)
    }

    pub(crate) fn poly(&self, id: u32) -> Option<&MeshPolygon> {
        self.polys.get(id as usize).and_then(|p| p.as_ref())
    }

    pub(crate) fn poly_mut(&mut self, id: u32) -> Option<&mut MeshPolygon> {
        self.polys.get_mut(id as usize).and_then(|p| p.as_mut())
    }

    pub(crate) fn add_polygon(&mut self, vertices: Vec<usize>) -> u32 {
        let id = self.polys.len() as u32;
        self.polys.push(Some(MeshPolygon { vertices, ..Default::default() }));
        id
    }

    pub(crate) fn set_vertices(&mut self, id: u32, vertices: Vec<usize>) {
        if let Some(p) = self.poly_mut(id) {
            p.vertices = vertices;
        }
    }

    /// Adds or retags the link between `a` and `b`. Self links are ignored.
    pub(crate) fn link(&mut self, a: u32, b: u32, common: (usize, usize)) {
        if a == b || self.poly(a).is_none() || self.poly(b).is_none() {
            return;
        }
        let common = if common.1 < common.0 { (common.1, common.0) } else { common };
        for (x, y) in [(a, b), (b, a)] {
            if let Some(p) = self.poly_mut(x) {
                p.links.insert(y, MeshEdge { common, point: None });
            }
        }
    }

    pub(crate) fn unlink(&mut self, a: u32, b: u32) {
        if let Some(p) = self.poly_mut(a) {
            p.links.remove(&b);
        }
        if let Some(p) = self.poly_mut(b) {
            p.links.remove(&a);
        }
    }

    pub(crate) fn remove_polygon(&mut self, id: u32) {
        let nbrs: Vec<u32> = self.neighbours(id).collect();
        for n in nbrs {
            self.unlink(id, n);
        }
        if let Some(slot) = self.polys.get_mut(id as usize) {
            *slot = None;
        }
    }
}
