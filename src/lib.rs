use wasm_bindgen::prelude::*;
mod api;
mod error;
mod interop;
mod logging;

pub use api::{build_network_res, set_panic_hook};
pub use logging::init_logging;

/// Read-only skeleton network built from linestrings.
#[wasm_bindgen]
pub struct Network { pub(crate) inner: skelnet::FrozenTopology }

impl Network {
    pub fn rs_from_topology(t: skelnet::Topology) -> Network { Network { inner: t.freeze() } }
    pub fn rs_topology(&self) -> &skelnet::Topology { &self.inner }
}
