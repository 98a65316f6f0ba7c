//! Area, centroid and second moments of simple polygons, and the principal
//! axis derived from them.
//!
//! Moments follow the engineering convention: `sxx` is the second moment about
//! the x axis (integral of y²), `syy` about the y axis (integral of x²) and
//! `sxy` the negated product moment.

use crate::error::{Error, Result};
use crate::geometry::tolerance::{EPS_AREA, EPS_AXIS, EPS_LEN};
use crate::model::Vec2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Moments {
    pub area: f64,
    pub centroid: Vec2,
    pub sxx: f64,
    pub syy: f64,
    pub sxy: f64,
}

impl Moments {
    /// Second moments shifted to the centroid: (sxx, syy, sxy).
    pub fn central(&self) -> (f64, f64, f64) {
        let Vec2 { x: cx, y: cy } = self.centroid;
        (
            self.sxx - cy * cy * self.area,
            self.syy - cx * cx * self.area,
            self.sxy + cx * cy * self.area,
        )
    }
}

/// Shoelace summation over the closed loop `poly` (first point not repeated).
/// Area is positive whatever the orientation.
pub fn area_centroid_moments(poly: &[Vec2]) -> Result<Moments> {
    if poly.len() < 3 {
        return Err(Error::DegeneratePolygon { vertices: poly.len() });
    }
    let n = poly.len();
    let signed: f64 = (0..n).map(|i| poly[i].cross(poly[(i + 1) % n])).sum();
    let factor = if signed >= 0.0 { 1.0 } else { -1.0 };
    let (mut psum, mut xmsum, mut ymsum) = (0.0, 0.0, 0.0);
    let (mut xxsum, mut yysum, mut xysum) = (0.0, 0.0, 0.0);
    for i in 0..n {
        let Vec2 { x: x1, y: y1 } = poly[i];
        let Vec2 { x: x2, y: y2 } = poly[(i + 1) % n];
        let z = (x1 * y2 - x2 * y1) * factor;
        let z1 = y1 + y2;
        let z2 = x1 + x2;
        psum += z;
        ymsum += z1 * z;
        xmsum += z2 * z;
        yysum += (x1 * z2 + x2 * x2) * z;
        xxsum += (y1 * z1 + y2 * y2) * z;
        xysum += (x2 * y2 + x1 * y1 + z1 * z2) * z;
    }
    let area = psum.abs() / 2.0;
    if area <= EPS_AREA {
        return Err(Error::DegeneratePolygon { vertices: n });
    }
    Ok(Moments {
        area,
        centroid: Vec2::new(xmsum / (6.0 * area), ymsum / (6.0 * area)),
        sxx: xxsum / 12.0,
        syy: yysum / 12.0,
        sxy: -xysum / 24.0,
    })
}

/// Unit direction of the long axis and the aspect ratio (>= 1, possibly
/// infinite for a sliver).
pub fn principal_axis(poly: &[Vec2]) -> Result<(Vec2, f64)> {
    axis_from_moments(&area_centroid_moments(poly)?)
}

pub fn axis_from_moments(m: &Moments) -> Result<(Vec2, f64)> {
    let (sxx, syy, sxy) = m.central();
    let sc = sxx + syy;
    if sc <= EPS_AREA {
        return Err(Error::ZeroVector);
    }
    let (sxx, syy, sxy) = (sxx / sc, syy / sc, sxy / sc);
    if sxy.abs() < EPS_AXIS {
        return Ok(if syy > sxx {
            (Vec2::new(-1.0, 0.0), (syy / sxx).sqrt())
        } else {
            (Vec2::new(0.0, -1.0), (sxx / syy).sqrt())
        });
    }
    let e2 = sxy * sxy - sxx * syy;
    let disc = (1.0 + 4.0 * e2).max(0.0).sqrt();
    let eig1 = (1.0 + disc) / 2.0;
    let eig2 = (1.0 - disc) / 2.0;
    let dir = normalize(sxx - eig1, sxy)?;
    let ratio = if eig2 > 0.0 { (eig1 / eig2).sqrt() } else { f64::INFINITY };
    Ok((dir, ratio))
}

pub fn normalize(x: f64, y: f64) -> Result<Vec2> {
    let d = (x * x + y * y).sqrt();
    if d <= EPS_LEN {
        return Err(Error::ZeroVector);
    }
    Ok(Vec2::new(x / d, y / d))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(f64, f64)]) -> Vec<Vec2> {
        raw.iter().map(|&p| p.into()).collect()
    }

    #[test]
    fn unit_square_moments() {
        let sq = pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let m = area_centroid_moments(&sq).unwrap();
        assert!((m.area - 1.0).abs() < 1e-12);
        assert!((m.centroid.x - 0.5).abs() < 1e-12);
        assert!((m.centroid.y - 0.5).abs() < 1e-12);
        let (cxx, cyy, cxy) = m.central();
        assert!((cxx - 1.0 / 12.0).abs() < 1e-12);
        assert!((cyy - 1.0 / 12.0).abs() < 1e-12);
        assert!(cxy.abs() < 1e-12);
    }

    #[test]
    fn orientation_does_not_change_area() {
        let ccw = pts(&[(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (0.0, 1.0)]);
        let mut cw = ccw.clone();
        cw.reverse();
        let a = area_centroid_moments(&ccw).unwrap();
        let b = area_centroid_moments(&cw).unwrap();
        assert!((a.area - b.area).abs() < 1e-12);
        assert!((a.centroid.x - b.centroid.x).abs() < 1e-12);
        assert!((a.central().0 - b.central().0).abs() < 1e-12);
    }

    #[test]
    fn rectangle_axis_and_ratio() {
        let rect = pts(&[(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (0.0, 1.0)]);
        let (dir, ratio) = principal_axis(&rect).unwrap();
        assert!((dir.x.abs() - 1.0).abs() < 1e-9);
        assert!(dir.y.abs() < 1e-9);
        assert!((ratio - 2.0).abs() < 1e-9);
        let tall = pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 3.0), (0.0, 3.0)]);
        let (dir, ratio) = principal_axis(&tall).unwrap();
        assert!((dir.y.abs() - 1.0).abs() < 1e-9);
        assert!((ratio - 3.0).abs() < 1e-9);
    }

    #[test]
    fn rotated_rectangle_axis_follows_long_side() {
        let (s, c) = (30f64.to_radians().sin(), 30f64.to_radians().cos());
        let rot = |x: f64, y: f64| Vec2::new(x * c - y * s, x * s + y * c);
        let rect = vec![rot(0.0, 0.0), rot(4.0, 0.0), rot(4.0, 1.0), rot(0.0, 1.0)];
        let (dir, ratio) = principal_axis(&rect).unwrap();
        assert!(dir.dot(Vec2::new(c, s)).abs() > 1.0 - 1e-9);
        assert!((ratio - 4.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_rejects_zero() {
        assert!(matches!(normalize(0.0, 0.0), Err(Error::ZeroVector)));
        let v = normalize(3.0, 4.0).unwrap();
        assert!((v.x - 0.6).abs() < 1e-12 && (v.y - 0.8).abs() < 1e-12);
    }

    #[test]
    fn degenerate_polygons_fail() {
        assert!(area_centroid_moments(&pts(&[(0.0, 0.0), (1.0, 1.0)])).is_err());
        assert!(principal_axis(&pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)])).is_err());
    }
}
