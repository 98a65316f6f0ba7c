use crate::Network;
use crate::error;
use crate::interop::{keys_u32, new_obj, points_f64, set_kv};
use js_sys::Uint32Array;
use skelnet::geometry::limits::in_coord_bounds;
use skelnet::{SkeletonParams, Topology, Vec2};
use wasm_bindgen::prelude::*;
type JsValue = wasm_bindgen::JsValue;

#[wasm_bindgen]
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn parse_params(params_json: Option<String>) -> skelnet::Result<SkeletonParams> {
    match params_json {
        Some(s) if !s.trim().is_empty() => SkeletonParams::from_json(&s),
        _ => Ok(SkeletonParams::default()),
    }
}

fn build(lines_json: &str, params_json: Option<String>) -> skelnet::Result<Network> {
    let fallback = parse_params(params_json)?;
    let t = skelnet::build_topology_from_json(lines_json, &fallback)?;
    Ok(Network::rs_from_topology(t))
}

/// Builds a network from `[[[x, y], ...], ...]` or `{"lines", "params"}`.
/// `params_json` supplies parameters when the document has none.
#[wasm_bindgen]
pub fn build_network_res(lines_json: &str, params_json: Option<String>) -> JsValue {
    match build(lines_json, params_json) {
        Ok(n) => error::ok(n.into()),
        Err(e) => error::from_core(&e),
    }
}

fn point_res(x: f64, y: f64) -> Result<Vec2, JsValue> {
    if !x.is_finite() { return Err(error::non_finite("x")); }
    if !y.is_finite() { return Err(error::non_finite("y")); }
    Ok(Vec2::new(x, y))
}

#[wasm_bindgen]
impl Network {
    /// Same as `build_network_res` but yields `undefined` on failure.
    pub fn from_lines(lines_json: &str, params_json: Option<String>) -> Option<Network> {
        build(lines_json, params_json).ok()
    }

    /// Loads a document written by `to_json`.
    pub fn from_json_res(doc: &str) -> JsValue {
        match Topology::from_json_str(doc) {
            Ok(t) => error::ok(Network::rs_from_topology(t).into()),
            Err(e) => error::from_core(&e),
        }
    }

    pub fn node_count(&self) -> u32 {
        self.inner.node_count() as u32
    }
    pub fn edge_count(&self) -> u32 {
        self.inner.edge_count() as u32
    }

    pub fn get_node(&self, id: u32) -> JsValue {
        match self.inner.node(id) {
            Ok(p) => serde_wasm_bindgen::to_value(&[p.x, p.y]).unwrap_or(JsValue::NULL),
            Err(_) => JsValue::NULL,
        }
    }
    pub fn get_node_res(&self, id: u32) -> JsValue {
        match self.inner.node(id) {
            Ok(p) => error::ok(serde_wasm_bindgen::to_value(&[p.x, p.y]).unwrap_or(JsValue::NULL)),
            Err(e) => error::from_core(&e),
        }
    }
    pub fn node_id_res(&self, x: f64, y: f64) -> JsValue {
        let p = match point_res(x, y) {
            Ok(p) => p,
            Err(e) => return e,
        };
        error::result(self.inner.node_id(p).map(|id| JsValue::from_f64(id as f64)))
    }

    /// `{points: Float64Array [x, y, ...], length, mirror}`.
    pub fn get_edge_res(&self, u: u32, v: u32, index: u32) -> JsValue {
        error::result(self.inner.get_edge(u, v, index).map(|e| {
            let obj = new_obj();
            set_kv(&obj, "points", &points_f64(&e.points).into());
            set_kv(&obj, "length", &JsValue::from_f64(e.length));
            set_kv(&obj, "mirror", &JsValue::from_bool(e.mirror));
            obj.into()
        }))
    }

    /// `{edges: Uint32Array [u, v, index, ...], distances: Float64Array, total}`.
    /// An unreachable target is a success with no edges and `distances = [Infinity]`.
    pub fn shortest_path_res(&self, source: u32, target: u32) -> JsValue {
        error::result(self.inner.shortest_path(source, target).map(|r| {
            let obj = new_obj();
            set_kv(&obj, "edges", &keys_u32(&r.edges).into());
            set_kv(&obj, "distances", &crate::interop::arr_f64(&r.distances).into());
            set_kv(&obj, "total", &JsValue::from_f64(r.total()));
            obj.into()
        }))
    }

    /// Flattened `[u, v, index, ...]` of edges within `2 * tolerance`; empty on bad input.
    pub fn nearby_edges(&self, x: f64, y: f64, tolerance: f64) -> Uint32Array {
        keys_u32(&self.inner.nearby_edges(Vec2::new(x, y), tolerance))
    }
    pub fn nearby_edges_res(&self, x: f64, y: f64, tolerance: f64) -> JsValue {
        let p = match point_res(x, y) {
            Ok(p) => p,
            Err(e) => return e,
        };
        if !in_coord_bounds(x) || !in_coord_bounds(y) {
            let (lo, hi) = (skelnet::geometry::limits::COORD_MIN, skelnet::geometry::limits::COORD_MAX);
            return error::out_of_range(if in_coord_bounds(x) { "y" } else { "x" }, lo, hi, if in_coord_bounds(x) { y } else { x });
        }
        if !tolerance.is_finite() {
            return error::non_finite("tolerance");
        }
        if tolerance < 0.0 {
            return error::out_of_range("tolerance", 0.0, f64::MAX, tolerance);
        }
        error::ok(keys_u32(&self.inner.nearby_edges(p, tolerance)).into())
    }

    pub fn to_json(&self) -> String {
        self.inner.to_json().to_string()
    }

    /// One SVG path string per undirected edge.
    pub fn svg_paths(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&skelnet::svg::topology_to_svg_paths(&self.inner)).unwrap_or(JsValue::NULL)
    }
}
