use std::collections::HashMap;

use geo::{Area, Contains, Coord, Geometry, LineString, Point, Polygon};
use log::{debug, info};

use crate::error::{Error, Result};
use crate::geometry::edge_iter::edges;
use crate::geometry::limits::{MAX_HOLE_SEED_ATTEMPTS, MAX_NODES};
use crate::geometry::math::bbox;
use crate::geometry::tolerance::EPS_AREA;
use crate::mesh::Mesh;
use crate::model::Vec2;
use crate::triangulate::{SpadeTriangulator, TriangulationInput, Triangulator};

/// Collects constrained rings and required points, then hands them to a
/// triangulator and turns the triangles into a polygon adjacency mesh.
#[derive(Clone, Debug, Default)]
pub struct Mesher<T = SpadeTriangulator> {
    triangulator: T,
    input: TriangulationInput,
    lookup: HashMap<(u64, u64), usize>,
    endpoints: Vec<usize>,
}

impl Mesher<SpadeTriangulator> {
    pub fn new() -> Self {
        Self::with_triangulator(SpadeTriangulator::default())
    }
}

impl<T: Triangulator> Mesher<T> {
    pub fn with_triangulator(triangulator: T) -> Self {
        Mesher { triangulator, input: TriangulationInput::default(), lookup: HashMap::new(), endpoints: Vec::new() }
    }

    /// Registers every polygon of `shape`, descending into collections.
    pub fn add_shape(&mut self, shape: &Geometry<f64>) -> Result<()> {
        match shape {
            Geometry::Polygon(p) => self.add_polygon(p),
            Geometry::MultiPolygon(mp) => mp.iter().try_for_each(|p| self.add_polygon(p)),
            Geometry::GeometryCollection(gc) => gc.iter().try_for_each(|g| self.add_shape(g)),
            Geometry::Rect(r) => self.add_polygon(&r.to_polygon()),
            Geometry::Triangle(t) => self.add_polygon(&t.to_polygon()),
            _ => Err(Error::Geometry("only areal geometries can be meshed".into())),
        }
    }

    /// Exterior and interior rings become required segments; each interior
    /// ring also gets a seed point marking it as a hole.
    pub fn add_polygon(&mut self, polygon: &Polygon<f64>) -> Result<()> {
        self.add_ring(polygon.exterior())?;
        for hole in polygon.interiors() {
            let ring = ring_points(hole);
            let seed = hole_seed(&ring)?;
            self.add_ring(hole)?;
            self.input.holes.push(seed);
        }
        Ok(())
    }

    fn add_ring(&mut self, ring: &LineString<f64>) -> Result<()> {
        let pts = ring_points(ring);
        if pts.len() < 3 {
            return Err(Error::DegeneratePolygon { vertices: pts.len() });
        }
        let mut ids = Vec::with_capacity(pts.len());
        for p in pts {
            let id = self.intern(p)?;
            if ids.last() != Some(&id) {
                ids.push(id);
            }
        }
        if ids.len() > 1 && ids.first() == ids.last() {
            ids.pop();
        }
        let n = ids.len();
        for i in 0..n {
            let (a, b) = (ids[i], ids[(i + 1) % n]);
            if a != b {
                self.input.segments.push((a, b));
            }
        }
        Ok(())
    }

    /// First and last point of every line become required vertices.
    pub fn add_endpoints(&mut self, lines: &[LineString<f64>]) -> Result<()> {
        for line in lines {
            let ends = [line.0.first(), line.0.last()];
            for c in ends.into_iter().flatten() {
                let id = self.intern(Vec2::from(*c))?;
                if !self.endpoints.contains(&id) {
                    self.endpoints.push(id);
                }
            }
        }
        Ok(())
    }

    fn intern(&mut self, p: Vec2) -> Result<usize> {
        if !p.is_finite() {
            return Err(Error::Geometry(format!("non-finite vertex ({}, {})", p.x, p.y)));
        }
        let key = ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits());
        if let Some(&id) = self.lookup.get(&key) {
            return Ok(id);
        }
        if self.input.vertices.len() >= MAX_NODES {
            return Err(Error::Limit { what: "mesh vertices", max: MAX_NODES });
        }
        let id = self.input.vertices.len();
        self.input.vertices.push(p);
        self.lookup.insert(key, id);
        Ok(id)
    }

    pub fn input(&self) -> &TriangulationInput {
        &self.input
    }

    /// Input indices of registered linestring endpoints.
    pub fn endpoint_ids(&self) -> &[usize] {
        &self.endpoints
    }

    /// Triangulates with maximum triangle area `tolerance²` and builds the
    /// adjacency mesh, one polygon per triangle.
    pub fn discretize(&self, tolerance: f64) -> Result<Mesh> {
        let out = self.triangulator.triangulate(&self.input, tolerance * tolerance)?;
        info!("discretized {} vertices / {} triangles", out.vertices.len(), out.triangles.len());
        let endpoints: Vec<usize> = self.endpoints.iter().filter_map(|&i| out.input_ids.get(i).copied()).collect();
        let mut mesh = mesh_from_triangles(out.vertices, out.boundary, &out.triangles);
        mesh.set_endpoints(endpoints);
        Ok(mesh)
    }
}

/// Links every triangle to each earlier triangle sharing one of its edges.
pub fn mesh_from_triangles(vertices: Vec<Vec2>, boundary: Vec<bool>, triangles: &[[usize; 3]]) -> Mesh {
    let mut mesh = Mesh::new(vertices, boundary);
    let mut seen: HashMap<(usize, usize), Vec<u32>> = HashMap::new();
    for t in triangles {
        let id = mesh.add_polygon(t.to_vec());
        for e in edges(t) {
            let prev = seen.entry(e).or_default();
            for &other in prev.iter() {
                mesh.link(other, id, e);
            }
            prev.push(id);
        }
    }
    debug!("mesh: {} polygons from {} triangles", mesh.polygon_count(), triangles.len());
    mesh
}

fn ring_points(ring: &LineString<f64>) -> Vec<Vec2> {
    let mut pts: Vec<Vec2> = ring.coords().map(|&c| Vec2::from(c)).collect();
    if pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    pts
}

/// Point strictly inside `ring`, found by low discrepancy sampling of its
/// bounding box.
pub fn hole_seed(ring: &[Vec2]) -> Result<Vec2> {
    let polygon = Polygon::new(LineString::from(ring.iter().map(|&p| Coord::from(p)).collect::<Vec<_>>()), vec![]);
    let Some((x0, y0, x1, y1)) = bbox(ring).filter(|_| polygon.unsigned_area() > EPS_AREA) else {
        return Err(Error::HoleSeed { attempts: 0 });
    };
    for i in 1..=MAX_HOLE_SEED_ATTEMPTS {
        let p = Vec2::new(x0 + halton(i, 2) * (x1 - x0), y0 + halton(i, 3) * (y1 - y0));
        if polygon.contains(&Point::new(p.x, p.y)) {
            return Ok(p);
        }
    }
    Err(Error::HoleSeed { attempts: MAX_HOLE_SEED_ATTEMPTS })
}

fn halton(mut i: usize, base: usize) -> f64 {
    let mut f = 1.0;
    let mut r = 0.0;
    while i > 0 {
        f /= base as f64;
        r += f * (i % base) as f64;
        i /= base;
    }
    r
}
