#[cfg(feature = "bench_skeleton")]
use geo::LineString;
#[cfg(feature = "bench_skeleton")]
use skelnet::{build_topology, SkeletonParams, Vec2};
#[cfg(feature = "bench_skeleton")]
use std::time::Instant;

#[cfg(not(feature = "bench_skeleton"))]
fn main() {
    panic!("skeleton_bench requires --features bench_skeleton");
}

/// `n` horizontal and `n` vertical streets, `spacing` apart, each with a
/// little deterministic wobble.
#[cfg(feature = "bench_skeleton")]
fn street_grid(n: usize, spacing: f64) -> Vec<LineString<f64>> {
    let extent = spacing * n as f64;
    let wobble = |k: usize| ((k * 7919) % 13) as f64 / 13.0 - 0.5;
    let mut lines = Vec::with_capacity(2 * n);
    for i in 0..n {
        let c = spacing * (i as f64 + 0.5);
        lines.push(LineString::from(vec![(0.0, c), (extent * 0.5, c + wobble(i)), (extent, c)]));
        lines.push(LineString::from(vec![(c, 0.0), (c + wobble(i + n), extent * 0.5), (c, extent)]));
    }
    lines
}

#[cfg(feature = "bench_skeleton")]
fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let i = ((sorted.len() - 1) as f64 * q).round() as usize;
    sorted[i.min(sorted.len() - 1)]
}

#[cfg(feature = "bench_skeleton")]
fn main() {
    let args: Vec<String> = std::env::args().collect();
    let mut n = 6usize;
    let mut spacing = 60.0f64;
    let mut thickness = 14.0f64;
    let mut repeats = 5usize;
    let mut queries = 1000usize;
    for a in &args[1..] {
        if let Some(val) = a.strip_prefix("--n=") {
            if let Ok(v) = val.parse() {
                n = v;
            }
        } else if let Some(val) = a.strip_prefix("--spacing=") {
            if let Ok(v) = val.parse() {
                spacing = v;
            }
        } else if let Some(val) = a.strip_prefix("--thickness=") {
            if let Ok(v) = val.parse() {
                thickness = v;
            }
        } else if let Some(val) = a.strip_prefix("--repeats=") {
            if let Ok(v) = val.parse() {
                repeats = v;
            }
        } else if let Some(val) = a.strip_prefix("--queries=") {
            if let Ok(v) = val.parse() {
                queries = v;
            }
        }
    }

    let lines = street_grid(n, spacing);
    let params = SkeletonParams { thickness, ..Default::default() };
    let mut build_ms = Vec::with_capacity(repeats);
    let mut last = None;
    for _ in 0..repeats.max(1) {
        let t0 = Instant::now();
        match build_topology(&lines, &params) {
            Ok(t) => last = Some(t),
            Err(e) => {
                eprintln!("build failed: {e}");
                return;
            }
        }
        build_ms.push(t0.elapsed().as_secs_f64() * 1000.0);
    }
    let Some(topo) = last else { return };

    let count = topo.node_count() as u32;
    let mut path_us = Vec::with_capacity(queries);
    let mut pick_us = Vec::with_capacity(queries);
    let extent = spacing * n as f64;
    for q in 0..queries {
        let s = (q as u32 * 31) % count.max(1);
        let t = (q as u32 * 17 + 5) % count.max(1);
        let t0 = Instant::now();
        let _ = topo.shortest_path(s, t);
        path_us.push(t0.elapsed().as_secs_f64() * 1e6);

        let p = Vec2::new((q * 37 % 101) as f64 / 101.0 * extent, (q * 53 % 103) as f64 / 103.0 * extent);
        let t0 = Instant::now();
        let _ = topo.nearby_edges(p, thickness);
        pick_us.push(t0.elapsed().as_secs_f64() * 1e6);
    }
    build_ms.sort_by(f64::total_cmp);
    path_us.sort_by(f64::total_cmp);
    pick_us.sort_by(f64::total_cmp);

    println!(
        "grid={}x{} nodes={} edges={} build_ms p50={:.2} max={:.2}",
        n,
        n,
        topo.node_count(),
        topo.edge_count(),
        percentile(&build_ms, 0.5),
        percentile(&build_ms, 1.0)
    );
    println!(
        "shortest_path_us p50={:.1} p95={:.1} p99={:.1}",
        percentile(&path_us, 0.5),
        percentile(&path_us, 0.95),
        percentile(&path_us, 0.99)
    );
    println!(
        "nearby_edges_us p50={:.1} p95={:.1} p99={:.1}",
        percentile(&pick_us, 0.5),
        percentile(&pick_us, 0.95),
        percentile(&pick_us, 0.99)
    );
}
