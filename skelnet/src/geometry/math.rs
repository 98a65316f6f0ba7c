use crate::model::Vec2;

pub fn seg_distance_sq(px: f64, py: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> (f64, f64) {
    let vx = x2 - x1; let vy = y2 - y1;
    let wx = px - x1; let wy = py - y1;
    let vv = vx*vx + vy*vy;
    let mut t = if vv > 0.0 { (wx*vx + wy*vy) / vv } else { 0.0 };
    if t < 0.0 { t = 0.0; } else if t > 1.0 { t = 1.0; }
    let projx = x1 + t * vx; let projy = y1 + t * vy;
    let dx = px - projx; let dy = py - projy;
    (dx*dx + dy*dy, t)
}

pub fn dist_point_to_seg_sq(px: f64, py: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let (d2, _) = seg_distance_sq(px, py, x1, y1, x2, y2);
    d2
}

pub fn dist_point_to_polyline(p: Vec2, points: &[Vec2]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => p.dist(*only),
        _ => {
            let mut best = f64::INFINITY;
            for w in points.windows(2) {
                let d2 = dist_point_to_seg_sq(p.x, p.y, w[0].x, w[0].y, w[1].x, w[1].y);
                if d2 < best { best = d2; }
            }
            best.sqrt()
        }
    }
}

pub fn polyline_length(points: &[Vec2]) -> f64 {
    points.windows(2).map(|w| w[0].dist(w[1])).sum()
}

/// (minx, miny, maxx, maxy); None for an empty slice.
pub fn bbox(points: &[Vec2]) -> Option<(f64, f64, f64, f64)> {
    let first = points.first()?;
    let mut b = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        b.0 = b.0.min(p.x); b.1 = b.1.min(p.y);
        b.2 = b.2.max(p.x); b.3 = b.3.max(p.y);
    }
    Some(b)
}

pub fn ring_perimeter(points: &[Vec2]) -> f64 {
    let n = points.len();
    if n < 2 { return 0.0; }
    polyline_length(points) + points[n - 1].dist(points[0])
}
