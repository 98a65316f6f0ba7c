use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }
    #[inline]
    pub fn dot(self, o: Vec2) -> f64 {
        self.x * o.x + self.y * o.y
    }
    /// z component of the 3d cross product.
    #[inline]
    pub fn cross(self, o: Vec2) -> f64 {
        self.x * o.y - self.y * o.x
    }
    #[inline]
    pub fn norm(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
    #[inline]
    pub fn dist(self, o: Vec2) -> f64 {
        (self - o).norm()
    }
    #[inline]
    pub fn perp(self) -> Vec2 {
        Vec2 { x: -self.y, y: self.x }
    }
    pub fn midpoint(self, o: Vec2) -> Vec2 {
        (self + o) * 0.5
    }
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, o: Vec2) -> Vec2 {
        Vec2 { x: self.x + o.x, y: self.y + o.y }
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, o: Vec2) -> Vec2 {
        Vec2 { x: self.x - o.x, y: self.y - o.y }
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, k: f64) -> Vec2 {
        Vec2 { x: self.x * k, y: self.y * k }
    }
}

impl Div<f64> for Vec2 {
    type Output = Vec2;
    fn div(self, k: f64) -> Vec2 {
        Vec2 { x: self.x / k, y: self.y / k }
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2 { x: -self.x, y: -self.y }
    }
}

impl From<(f64, f64)> for Vec2 {
    fn from((x, y): (f64, f64)) -> Self {
        Vec2 { x, y }
    }
}

impl From<geo::Coord<f64>> for Vec2 {
    fn from(c: geo::Coord<f64>) -> Self {
        Vec2 { x: c.x, y: c.y }
    }
}

impl From<Vec2> for geo::Coord<f64> {
    fn from(p: Vec2) -> Self {
        geo::Coord { x: p.x, y: p.y }
    }
}

/// Key of one directed topology edge: (source, target, parallel index).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeKey {
    pub u: u32,
    pub v: u32,
    pub index: u32,
}

impl EdgeKey {
    pub const fn new(u: u32, v: u32, index: u32) -> Self {
        EdgeKey { u, v, index }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopoEdge {
    pub points: Vec<Vec2>,
    pub length: f64,
    /// True for the reversed twin inserted alongside the caller's polyline.
    pub mirror: bool,
}

/// Result of a shortest path query. An unreachable target yields no edges and
/// a single infinite distance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathResult {
    pub edges: Vec<EdgeKey>,
    pub distances: Vec<f64>,
}

impl PathResult {
    pub fn unreachable() -> Self {
        PathResult { edges: Vec::new(), distances: vec![f64::INFINITY] }
    }
    pub fn is_reachable(&self) -> bool {
        !self.edges.is_empty() || self.distances.iter().all(|d| d.is_finite())
    }
    pub fn total(&self) -> f64 {
        self.distances.iter().sum()
    }
}
