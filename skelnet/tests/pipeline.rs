use geo::LineString;
use skelnet::{build_topology, build_topology_from_json, Error, SkeletonParams, Topology, Vec2};

fn crossing_lines() -> Vec<LineString<f64>> {
    vec![
        LineString::from(vec![(0.0, 0.0), (100.0, 100.0)]),
        LineString::from(vec![(0.0, 100.0), (100.0, 0.0)]),
    ]
}

fn params() -> SkeletonParams {
    SkeletonParams { thickness: 10.0, cutoff_ratio: 2.0, ..Default::default() }
}

fn nearest_node(t: &Topology, p: Vec2) -> u32 {
    t.nodes().min_by(|a, b| a.1.dist(p).total_cmp(&b.1.dist(p))).map(|(id, _)| id).unwrap()
}

fn degrees(t: &Topology) -> Vec<usize> {
    let mut d: Vec<usize> = t.nodes().map(|(id, _)| t.out_edges(id).len()).collect();
    d.sort_unstable();
    d
}

#[test]
fn crossing_lines_give_an_x() {
    let t = build_topology(&crossing_lines(), &params()).unwrap();
    // one junction, four tips, one undirected branch per arm
    assert_eq!(t.node_count(), 5);
    assert_eq!(t.edge_count(), 8);
    assert_eq!(degrees(&t), vec![1, 1, 1, 1, 4]);

    let a = nearest_node(&t, Vec2::new(0.0, 0.0));
    let b = nearest_node(&t, Vec2::new(100.0, 100.0));
    let c = nearest_node(&t, Vec2::new(0.0, 100.0));
    let (pa, pb) = (t.node(a).unwrap(), t.node(b).unwrap());
    assert!(pa.dist(Vec2::new(0.0, 0.0)) < 15.0);
    assert!(pb.dist(Vec2::new(100.0, 100.0)) < 15.0);

    let res = t.shortest_path(a, b).unwrap();
    assert_eq!(res.edges.len(), 2);
    assert!(res.total() >= pa.dist(pb) - 1e-9);
    assert!(res.total() > 100.0);
    assert!(t.shortest_path(a, c).unwrap().is_reachable());
}

#[test]
fn endpoints_at_the_tips_do_not_split_arms() {
    let t = build_topology(&crossing_lines(), &SkeletonParams { split_at_endpoints: true, ..params() }).unwrap();
    assert_eq!(t.node_count(), 5);
    assert_eq!(t.edge_count(), 8);
    assert_eq!(degrees(&t), vec![1, 1, 1, 1, 4]);
}

#[test]
fn pipeline_is_deterministic() {
    let first = build_topology(&crossing_lines(), &params()).unwrap();
    let second = build_topology(&crossing_lines(), &params()).unwrap();
    assert_eq!(first.node_count(), second.node_count());
    assert_eq!(first.edge_count(), second.edge_count());
    assert_eq!(first.to_json(), second.to_json());
}

#[test]
fn skeleton_stays_inside_the_buffer() {
    let t = build_topology(&crossing_lines(), &params()).unwrap();
    let half = params().thickness / 2.0;
    for (_, p) in t.nodes() {
        let d1 = (p.x - p.y).abs() / 2f64.sqrt();
        let d2 = (p.x + p.y - 100.0).abs() / 2f64.sqrt();
        // simplification may shave up to thickness / 10 off the outline
        assert!(d1.min(d2) <= half + 1.0, "node {p:?} is outside the band");
    }
}

#[test]
fn endpoint_splitting_keeps_the_network_connected() {
    let lines = vec![
        LineString::from(vec![(0.0, 0.0), (100.0, 0.0)]),
        LineString::from(vec![(40.0, 0.0), (40.0, 60.0)]),
    ];
    let t = build_topology(&lines, &SkeletonParams { split_at_endpoints: true, ..params() }).unwrap();
    assert_eq!(t.edge_count() % 2, 0);
    let a = nearest_node(&t, Vec2::new(0.0, 0.0));
    let b = nearest_node(&t, Vec2::new(40.0, 60.0));
    assert!(t.shortest_path(a, b).unwrap().is_reachable());
}

#[test]
fn json_entry_point_uses_document_params() {
    let doc = r#"{"lines": [[[0,0],[100,100]],[[0,100],[100,0]]], "params": {"thickness": 10}}"#;
    let from_doc = build_topology_from_json(doc, &SkeletonParams::default()).unwrap();
    let direct = build_topology(&crossing_lines(), &params()).unwrap();
    assert_eq!(from_doc.to_json(), direct.to_json());
}

#[test]
fn invalid_params_fail_before_any_work() {
    let bad = SkeletonParams { thickness: -1.0, ..Default::default() };
    assert!(matches!(build_topology(&crossing_lines(), &bad), Err(Error::InvalidParam { .. })));
    assert!(matches!(build_topology(&[], &params()), Err(Error::Geometry(_))));
}
