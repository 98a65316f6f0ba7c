use wasm_bindgen::prelude::*;
use js_sys::Object;
use skelnet::Error;

use crate::interop::{new_obj, set_kv};

pub fn ok(v: JsValue) -> JsValue {
    let o = new_obj();
    set_kv(&o, "ok", &JsValue::from_bool(true));
    set_kv(&o, "value", &v);
    o.into()
}

pub fn err(code: &'static str, message: impl Into<String>, data: Option<JsValue>) -> JsValue {
    let root = new_obj();
    set_kv(&root, "ok", &JsValue::from_bool(false));
    let e = new_obj();
    set_kv(&e, "code", &JsValue::from_str(code));
    set_kv(&e, "message", &JsValue::from_str(&message.into()));
    if let Some(d) = data { set_kv(&e, "data", &d); }
    set_kv(&root, "error", &e.into());
    root.into()
}

fn data(pairs: &[(&str, JsValue)]) -> Option<JsValue> {
    let d: Object = new_obj();
    for (k, v) in pairs { set_kv(&d, k, v); }
    Some(d.into())
}

fn num(x: impl Into<f64>) -> JsValue { JsValue::from_f64(x.into()) }

pub fn code_of(e: &Error) -> &'static str {
    match e {
        Error::Json(_) => "invalid_json",
        Error::InvalidParam { .. } => "invalid_param",
        Error::Limit { .. } => "limit",
        Error::Triangulation(_) | Error::HoleSeed { .. } => "triangulation",
        Error::EdgeNotFound { .. } | Error::NodeNotFound(_) | Error::CoordinateNotFound { .. } => "not_found",
        Error::ZeroVector
        | Error::DegeneratePolygon { .. }
        | Error::DegenerateEdge { .. }
        | Error::Geometry(_) => "geometry",
    }
}

/// Envelope for a core error; lookup misses and limits carry their fields.
pub fn from_core(e: &Error) -> JsValue {
    let extra = match e {
        Error::InvalidParam { name, .. } => data(&[("param", JsValue::from_str(name))]),
        Error::Limit { what, max } => data(&[("what", JsValue::from_str(what)), ("max", num(*max as f64))]),
        Error::NodeNotFound(id) => data(&[("kind", JsValue::from_str("node")), ("id", num(*id))]),
        Error::EdgeNotFound { u, v, index } => data(&[
            ("kind", JsValue::from_str("edge")),
            ("u", num(*u)),
            ("v", num(*v)),
            ("index", num(*index)),
        ]),
        Error::CoordinateNotFound { x, y } => data(&[("kind", JsValue::from_str("coordinate")), ("x", num(*x)), ("y", num(*y))]),
        _ => None,
    };
    err(code_of(e), e.to_string(), extra)
}

#[inline]
pub fn non_finite(param: &str) -> JsValue {
    err("invalid_param", format!("parameter '{}' must be finite", param), data(&[("param", JsValue::from_str(param))]))
}

#[inline]
pub fn out_of_range(param: &str, min: f64, max: f64, got: f64) -> JsValue {
    err(
        "invalid_param",
        format!("parameter '{}' out of range", param),
        data(&[("param", JsValue::from_str(param)), ("min", num(min)), ("max", num(max)), ("got", num(got))]),
    )
}

pub fn result(r: skelnet::Result<JsValue>) -> JsValue {
    match r {
        Ok(v) => ok(v),
        Err(e) => from_core(&e),
    }
}
