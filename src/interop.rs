use js_sys::{Float64Array, Object, Reflect, Uint32Array};
use wasm_bindgen::JsValue;
use skelnet::{EdgeKey, Vec2};

pub fn new_obj() -> Object { Object::new() }
pub fn set_kv(obj: &Object, k: &str, v: &JsValue) {
    let _ = Reflect::set(obj, &JsValue::from_str(k), v);
}
pub fn arr_u32(slice: &[u32]) -> Uint32Array {
    let arr = Uint32Array::new_with_length(slice.len() as u32);
    arr.copy_from(slice); arr
}
pub fn arr_f64(slice: &[f64]) -> Float64Array {
    let arr = Float64Array::new_with_length(slice.len() as u32);
    arr.copy_from(slice); arr
}

/// Edge keys flattened to `[u, v, index, ...]`.
pub fn keys_u32(keys: &[EdgeKey]) -> Uint32Array {
    let flat: Vec<u32> = keys.iter().flat_map(|k| [k.u, k.v, k.index]).collect();
    arr_u32(&flat)
}

/// Points flattened to `[x, y, ...]`.
pub fn points_f64(points: &[Vec2]) -> Float64Array {
    let flat: Vec<f64> = points.iter().flat_map(|p| [p.x, p.y]).collect();
    arr_f64(&flat)
}
