use crate::geometry::math::bbox;
use crate::mesh::Mesh;
use crate::model::Vec2;
use crate::topology::Topology;
use std::fmt::Write;

fn path_data(points: &[Vec2], closed: bool) -> String {
    let mut d = String::new();
    for (i, p) in points.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        let _ = write!(d, "{}{} {} {}", if i == 0 { "" } else { " " }, cmd, p.x, p.y);
    }
    if closed && !points.is_empty() {
        d.push_str(" Z");
    }
    d
}

/// One path per undirected edge; mirror twins are skipped.
pub fn topology_to_svg_paths(t: &Topology) -> Vec<String> {
    t.edges().filter(|(_, e)| !e.mirror).map(|(_, e)| path_data(&e.points, false)).collect()
}

/// Standalone SVG document of the mesh: polygons outlined and labelled with
/// their ids, skeleton points (when computed) as dots.
pub fn mesh_to_svg(mesh: &Mesh) -> String {
    let all: Vec<Vec2> = mesh.polygons().flat_map(|(id, _)| mesh.loop_points(id)).collect();
    let (x0, y0, x1, y1) = bbox(&all).unwrap_or((0.0, 0.0, 1.0, 1.0));
    let pad = ((x1 - x0).max(y1 - y0) * 0.02).max(1.0);
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}">"#,
        x0 - pad,
        y0 - pad,
        x1 - x0 + 2.0 * pad,
        y1 - y0 + 2.0 * pad
    );
    for (id, _) in mesh.polygons() {
        let pts = mesh.loop_points(id);
        let _ = writeln!(out, r#"  <path d="{}" fill="none" stroke="black" stroke-width="0.2"/>"#, path_data(&pts, true));
        let label = match mesh.node_point(id) {
            Some(c) => {
                let _ = writeln!(out, r#"  <circle cx="{}" cy="{}" r="0.5" fill="red"/>"#, c.x, c.y);
                c
            }
            None => pts.iter().fold(Vec2::default(), |acc, &p| acc + p) / pts.len().max(1) as f64,
        };
        let _ = writeln!(out, r#"  <text x="{}" y="{}" font-size="2">{}</text>"#, label.x, label.y, id);
    }
    out.push_str("</svg>\n");
    out
}
