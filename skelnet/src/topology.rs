use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;

use rstar::{RTree, RTreeObject, AABB};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::geometry::limits::{MAX_EDGES, MAX_NODES};
use crate::geometry::math::{bbox, polyline_length};
use crate::mesh::EdgeSink;
use crate::model::{EdgeKey, PathResult, TopoEdge, Vec2};

/// Bounding box of one directed edge in the spatial index.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct EdgeEnvelope {
    pub key: EdgeKey,
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl RTreeObject for EdgeEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

/// Directed multigraph of skeleton edges between deduplicated nodes.
///
/// Every polyline added produces two directed edges, the second one reversed
/// and flagged as the mirror. Parallel edges between the same ordered pair are
/// told apart by their index, assigned in insertion order.
#[derive(Clone, Debug, Default)]
pub struct Topology {
    pub(crate) nodes: Vec<Vec2>,                        // id is index
    pub(crate) ids: HashMap<(u64, u64), u32>,           // coordinate bits -> id
    pub(crate) out: Vec<Vec<u32>>,                      // distinct targets per source, first-seen order
    pub(crate) edges: HashMap<(u32, u32), Vec<TopoEdge>>, // parallel index is position
    pub(crate) order: Vec<EdgeKey>,                     // insertion order
    pub(crate) index: RTree<EdgeEnvelope>,
}

fn coord_key(p: Vec2) -> (u64, u64) {
    // +0.0 folds -0.0 onto 0.0
    ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits())
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `points` and its reversal; returns (forward, mirror) keys.
    pub fn add_edge(&mut self, points: &[Vec2]) -> Result<(EdgeKey, EdgeKey)> {
        let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
            return Err(Error::DegenerateEdge { points: points.len() });
        };
        if points.len() < 2 {
            return Err(Error::DegenerateEdge { points: points.len() });
        }
        if !points.iter().all(|p| p.is_finite()) {
            return Err(Error::Geometry("edge has non-finite coordinates".into()));
        }
        if self.order.len() + 2 > MAX_EDGES {
            return Err(Error::Limit { what: "edges", max: MAX_EDGES });
        }
        let u = self.intern(first)?;
        let v = self.intern(last)?;
        let length = polyline_length(points);
        let forward = self.insert_one(u, v, TopoEdge { points: points.to_vec(), length, mirror: false });
        let mut rev = points.to_vec();
        rev.reverse();
        let mirror = self.insert_one(v, u, TopoEdge { points: rev, length, mirror: true });
        Ok((forward, mirror))
    }

    fn insert_one(&mut self, u: u32, v: u32, edge: TopoEdge) -> EdgeKey {
        let (min, max) = match bbox(&edge.points) {
            Some((x0, y0, x1, y1)) => ([x0, y0], [x1, y1]),
            None => ([0.0, 0.0], [0.0, 0.0]),
        };
        let parallel = self.edges.entry((u, v)).or_default();
        if parallel.is_empty() {
            self.out[u as usize].push(v);
        }
        let key = EdgeKey::new(u, v, parallel.len() as u32);
        parallel.push(edge);
        self.order.push(key);
        self.index.insert(EdgeEnvelope { key, min, max });
        key
    }

    fn intern(&mut self, p: Vec2) -> Result<u32> {
        let key = coord_key(p);
        if let Some(&id) = self.ids.get(&key) {
            return Ok(id);
        }
        if self.nodes.len() >= MAX_NODES {
            return Err(Error::Limit { what: "nodes", max: MAX_NODES });
        }
        let id = self.nodes.len() as u32;
        self.nodes.push(p);
        self.out.push(Vec::new());
        self.ids.insert(key, id);
        Ok(id)
    }

    pub fn get_edge(&self, u: u32, v: u32, index: u32) -> Result<&TopoEdge> {
        self.edges
            .get(&(u, v))
            .and_then(|p| p.get(index as usize))
            .ok_or(Error::EdgeNotFound { u, v, index })
    }

    pub fn edge(&self, key: EdgeKey) -> Result<&TopoEdge> {
        self.get_edge(key.u, key.v, key.index)
    }

    pub fn node(&self, id: u32) -> Result<Vec2> {
        self.nodes.get(id as usize).copied().ok_or(Error::NodeNotFound(id))
    }

    pub fn node_id(&self, p: Vec2) -> Result<u32> {
        self.ids.get(&coord_key(p)).copied().ok_or(Error::CoordinateNotFound { x: p.x, y: p.y })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.order.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (u32, Vec2)> + '_ {
        self.nodes.iter().enumerate().map(|(i, &p)| (i as u32, p))
    }

    /// Directed edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeKey, &TopoEdge)> + '_ {
        self.order.iter().filter_map(move |&k| self.edge(k).ok().map(|e| (k, e)))
    }

    /// Edges leaving `u`, grouped by target in first-insertion order.
    pub fn out_edges(&self, u: u32) -> Vec<(EdgeKey, &TopoEdge)> {
        let Some(targets) = self.out.get(u as usize) else { return Vec::new() };
        let mut res = Vec::new();
        for &v in targets {
            if let Some(parallel) = self.edges.get(&(u, v)) {
                for (i, e) in parallel.iter().enumerate() {
                    res.push((EdgeKey::new(u, v, i as u32), e));
                }
            }
        }
        res
    }

    pub fn shortest_path(&self, source: u32, target: u32) -> Result<PathResult> {
        crate::algorithms::astar::shortest_path_impl(self, source, target)
    }

    /// Keys of directed edges passing within `2 * tolerance` of `p`, sorted.
    /// Both directions of a polyline are reported.
    pub fn nearby_edges(&self, p: Vec2, tolerance: f64) -> Vec<EdgeKey> {
        crate::algorithms::picking::nearby_edges_impl(self, p, tolerance)
    }

    pub fn to_json(&self) -> Value {
        crate::json::to_json_impl(self)
    }

    pub fn from_json_value(v: Value) -> Result<Self> {
        crate::json::from_json_impl(v)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Self::from_json_value(serde_json::from_str(s)?)
    }

    pub fn freeze(self) -> FrozenTopology {
        FrozenTopology(Arc::new(self))
    }
}

impl EdgeSink for Topology {
    fn add_polyline(&mut self, points: &[Vec2]) -> Result<()> {
        self.add_edge(points).map(|_| ())
    }
}

/// Read-only shared handle to a finished topology.
#[derive(Clone, Debug)]
pub struct FrozenTopology(Arc<Topology>);

impl Deref for FrozenTopology {
    type Target = Topology;

    fn deref(&self) -> &Topology {
        &self.0
    }
}

impl From<Topology> for FrozenTopology {
    fn from(t: Topology) -> Self {
        t.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(f64, f64)]) -> Vec<Vec2> {
        raw.iter().map(|&p| p.into()).collect()
    }

    #[test]
    fn add_edge_interns_endpoints() {
        let mut t = Topology::new();
        t.add_edge(&pts(&[(0.0, 0.0), (1.0, 1.0), (1.0, 2.0)])).unwrap();
        t.add_edge(&pts(&[(2.0, 2.0), (1.0, 2.0)])).unwrap();
        assert_eq!(t.node_count(), 3);
        assert_eq!(t.edge_count(), 4);
        assert_eq!(t.node_id(Vec2::new(1.0, 2.0)).unwrap(), 1);
    }

    #[test]
    fn mirror_has_reversed_points() {
        let mut t = Topology::new();
        let (f, m) = t.add_edge(&pts(&[(0.0, 0.0), (0.0, 1.0), (2.0, 1.0)])).unwrap();
        assert_eq!(f, EdgeKey::new(0, 1, 0));
        assert_eq!(m, EdgeKey::new(1, 0, 0));
        let fe = t.edge(f).unwrap();
        let me = t.edge(m).unwrap();
        assert_eq!(fe.length, 3.0);
        assert_eq!(fe.length, me.length);
        assert!(!fe.mirror && me.mirror);
        assert_eq!(me.points.first(), fe.points.last());
    }

    #[test]
    fn parallel_edges_get_increasing_index() {
        let mut t = Topology::new();
        t.add_edge(&pts(&[(0.0, 0.0), (1.0, 0.0)])).unwrap();
        let (f, m) = t.add_edge(&pts(&[(0.0, 0.0), (0.5, 1.0), (1.0, 0.0)])).unwrap();
        assert_eq!(f, EdgeKey::new(0, 1, 1));
        assert_eq!(m, EdgeKey::new(1, 0, 1));
        assert_eq!(t.out_edges(0).len(), 2);
    }

    #[test]
    fn closed_polyline_is_a_self_loop_pair() {
        let mut t = Topology::new();
        let (f, m) = t.add_edge(&pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)])).unwrap();
        assert_eq!(t.node_count(), 1);
        assert_eq!(f, EdgeKey::new(0, 0, 0));
        assert_eq!(m, EdgeKey::new(0, 0, 1));
    }

    #[test]
    fn negative_zero_is_the_same_node() {
        let mut t = Topology::new();
        t.add_edge(&pts(&[(0.0, 0.0), (1.0, 0.0)])).unwrap();
        t.add_edge(&pts(&[(-0.0, -0.0), (0.0, 1.0)])).unwrap();
        assert_eq!(t.node_count(), 3);
    }

    #[test]
    fn lookup_misses_are_errors() {
        let mut t = Topology::new();
        t.add_edge(&pts(&[(0.0, 0.0), (1.0, 0.0)])).unwrap();
        assert!(matches!(t.get_edge(0, 1, 1), Err(Error::EdgeNotFound { u: 0, v: 1, index: 1 })));
        assert!(matches!(t.node(7), Err(Error::NodeNotFound(7))));
        assert!(matches!(t.node_id(Vec2::new(5.0, 5.0)), Err(Error::CoordinateNotFound { .. })));
        assert!(matches!(t.add_edge(&pts(&[(0.0, 0.0)])), Err(Error::DegenerateEdge { points: 1 })));
        assert!(matches!(t.add_edge(&[]), Err(Error::DegenerateEdge { points: 0 })));
    }

    #[test]
    fn frozen_view_shares_queries() {
        let mut t = Topology::new();
        t.add_edge(&pts(&[(0.0, 0.0), (1.0, 0.0)])).unwrap();
        let frozen = t.freeze();
        let other = frozen.clone();
        assert_eq!(other.node_count(), 2);
        assert_eq!(frozen.edges().count(), 2);
    }
}
