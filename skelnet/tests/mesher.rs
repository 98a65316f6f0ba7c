use geo::{Geometry, LineString, Polygon};
use skelnet::geometry::moments::area_centroid_moments;
use skelnet::triangulate::{TriangulationInput, TriangulationOutput};
use skelnet::{Error, Mesh, Mesher, Result, Triangulator, Vec2};

fn square_with_hole() -> Polygon<f64> {
    Polygon::new(
        LineString::from(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]),
        vec![LineString::from(vec![(4.0, 4.0), (6.0, 4.0), (6.0, 6.0), (4.0, 6.0), (4.0, 4.0)])],
    )
}

fn mesh_area(mesh: &Mesh) -> f64 {
    mesh.polygons().map(|(id, _)| area_centroid_moments(&mesh.loop_points(id)).map_or(0.0, |m| m.area)).sum()
}

#[test]
fn hole_is_left_out_of_the_mesh() {
    let mut mesher = Mesher::new();
    mesher.add_shape(&Geometry::Polygon(square_with_hole())).unwrap();
    assert_eq!(mesher.input().vertices.len(), 8);
    assert_eq!(mesher.input().segments.len(), 8);
    assert_eq!(mesher.input().holes.len(), 1);

    let mesh = mesher.discretize(3.0).unwrap();
    assert!(mesh.polygon_count() >= 8);
    assert!((mesh_area(&mesh) - 96.0).abs() < 1e-6);
    assert!(mesh.polygons().all(|(_, vs)| vs.len() == 3));
}

#[test]
fn triangles_sharing_an_edge_are_linked() {
    let mut mesher = Mesher::new();
    mesher.add_shape(&Geometry::Polygon(square_with_hole())).unwrap();
    let mesh = mesher.discretize(100.0).unwrap();
    for (id, _) in mesh.polygons() {
        for n in mesh.neighbours(id) {
            let (a, b) = mesh.shared(id, n).unwrap();
            assert!(mesh.polygon(id).unwrap().contains(&a) && mesh.polygon(n).unwrap().contains(&b));
            assert_eq!(mesh.shared(n, id), Some((a, b)));
        }
    }
}

#[test]
fn endpoints_become_interior_mesh_vertices() {
    let mut mesher = Mesher::new();
    mesher.add_shape(&Geometry::Polygon(square_with_hole())).unwrap();
    mesher.add_endpoints(&[LineString::from(vec![(2.0, 2.0), (2.0, 8.0)])]).unwrap();
    assert_eq!(mesher.endpoint_ids(), &[8, 9]);

    let mesh = mesher.discretize(100.0).unwrap();
    let located: Vec<Vec2> = mesh.endpoints().iter().filter_map(|&i| mesh.vertex(i)).collect();
    assert!(located.contains(&Vec2::new(2.0, 2.0)));
    assert!(located.contains(&Vec2::new(2.0, 8.0)));
    assert!(mesh.endpoints().iter().all(|&i| mesh.is_internal(i)));
}

#[test]
fn non_areal_shapes_are_rejected() {
    let mut mesher = Mesher::new();
    let line = Geometry::LineString(LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]));
    assert!(matches!(mesher.add_shape(&line), Err(Error::Geometry(_))));
}

/// Fans every polygon ring from its first vertex; good enough for convex input.
struct FanTriangulator;

impl Triangulator for FanTriangulator {
    fn triangulate(&self, input: &TriangulationInput, _max_area: f64) -> Result<TriangulationOutput> {
        let n = input.vertices.len();
        if n < 3 {
            return Err(Error::Triangulation("too few vertices".into()));
        }
        Ok(TriangulationOutput {
            vertices: input.vertices.clone(),
            boundary: vec![true; n],
            triangles: (1..n - 1).map(|i| [0, i, i + 1]).collect(),
            input_ids: (0..n).collect(),
        })
    }
}

#[test]
fn mesher_accepts_any_triangulator() {
    let hexagon = Polygon::new(
        LineString::from(vec![(2.0, 0.0), (4.0, 1.0), (4.0, 3.0), (2.0, 4.0), (0.0, 3.0), (0.0, 1.0), (2.0, 0.0)]),
        vec![],
    );
    let mut mesher = Mesher::with_triangulator(FanTriangulator);
    mesher.add_polygon(&hexagon).unwrap();
    let mut mesh = mesher.discretize(1.0).unwrap();
    assert_eq!(mesh.polygon_count(), 4);
    let degrees: Vec<usize> = mesh.polygons().map(|(id, _)| mesh.degree(id)).collect();
    assert_eq!(degrees, vec![1, 2, 2, 1]);

    // all vertices are on the boundary, so nothing collapses
    mesh.collapse_shapes();
    assert_eq!(mesh.polygon_count(), 4);
}
