use crate::config::SkeletonParams;
use crate::error::{Error, Result};
use crate::geometry::limits::{self, MAX_LINESTRINGS, MAX_POINTS_PER_LINE, MAX_POINTS_TOTAL};
use crate::model::Vec2;
use crate::topology::Topology;
use geo::LineString;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const FORMAT_VERSION: u32 = 1;

/// Parses `[[[x, y], ...], ...]` or `{"lines": [...], "params": {...}}`.
///
/// Every line needs at least two points with coordinates inside
/// `COORD_MIN..=COORD_MAX`. Parameters, when present, are validated.
pub fn linestrings_from_json(s: &str) -> Result<(Vec<LineString<f64>>, Option<SkeletonParams>)> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Doc {
        Bare(Vec<Vec<[f64; 2]>>),
        Full {
            lines: Vec<Vec<[f64; 2]>>,
            #[serde(default)]
            params: Option<SkeletonParams>,
        },
    }
    let (raw, params) = match serde_json::from_str::<Doc>(s)? {
        Doc::Bare(lines) => (lines, None),
        Doc::Full { lines, params } => (lines, params),
    };
    if let Some(p) = &params {
        p.validate()?;
    }
    if raw.len() > MAX_LINESTRINGS {
        return Err(Error::Limit { what: "linestrings", max: MAX_LINESTRINGS });
    }
    let mut total = 0usize;
    let mut lines = Vec::with_capacity(raw.len());
    for (i, pts) in raw.into_iter().enumerate() {
        if pts.len() > MAX_POINTS_PER_LINE {
            return Err(Error::Limit { what: "points per linestring", max: MAX_POINTS_PER_LINE });
        }
        total += pts.len();
        if total > MAX_POINTS_TOTAL {
            return Err(Error::Limit { what: "total points", max: MAX_POINTS_TOTAL });
        }
        if pts.len() < 2 {
            return Err(Error::Geometry(format!("linestring {i} has {} points, need at least 2", pts.len())));
        }
        if let Some(p) = pts.iter().find(|p| !limits::in_coord_bounds(p[0]) || !limits::in_coord_bounds(p[1])) {
            return Err(Error::Geometry(format!("linestring {i} has out of range coordinate ({}, {})", p[0], p[1])));
        }
        lines.push(LineString::from(pts.into_iter().map(|[x, y]| (x, y)).collect::<Vec<_>>()));
    }
    Ok((lines, params))
}

#[derive(Serialize, Deserialize)]
struct NodeSer {
    id: u32,
    x: f64,
    y: f64,
}

#[derive(Serialize, Deserialize)]
struct EdgeSer {
    u: u32,
    v: u32,
    index: u32,
    length: f64,
    mirror: bool,
    points: Vec<Vec2>,
}

#[derive(Serialize, Deserialize)]
struct Doc {
    version: u32,
    nodes: Vec<NodeSer>,
    edges: Vec<EdgeSer>,
}

pub fn to_json_impl(t: &Topology) -> Value {
    let nodes = t.nodes().map(|(id, p)| NodeSer { id, x: p.x, y: p.y }).collect();
    let edges = t
        .edges()
        .map(|(k, e)| EdgeSer { u: k.u, v: k.v, index: k.index, length: e.length, mirror: e.mirror, points: e.points.clone() })
        .collect();
    serde_json::to_value(Doc { version: FORMAT_VERSION, nodes, edges }).unwrap_or(Value::Null)
}

/// Rebuilds a topology by replaying every non-mirror edge in document order.
/// Node ids and parallel indices of a document written by `to_json_impl`
/// come out unchanged.
pub fn from_json_impl(v: Value) -> Result<Topology> {
    let doc: Doc = serde_json::from_value(v)?;
    if doc.version != FORMAT_VERSION {
        return Err(Error::InvalidParam { name: "version", reason: format!("unsupported version {}", doc.version) });
    }
    if doc.edges.len() > limits::MAX_EDGES {
        return Err(Error::Limit { what: "edges", max: limits::MAX_EDGES });
    }
    let mut t = Topology::new();
    for e in doc.edges.iter().filter(|e| !e.mirror) {
        let (fwd, _) = t.add_edge(&e.points)?;
        if (fwd.u, fwd.v) != (e.u, e.v) {
            return Err(Error::Geometry(format!(
                "edge ({}, {}, {}) endpoints do not match its points",
                e.u, e.v, e.index
            )));
        }
    }
    Ok(t)
}
