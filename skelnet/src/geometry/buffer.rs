//! Buffered outline of a set of linestrings, stroked by the `geo` kernel
//! with round caps and the configured joins.

use std::f64::consts::FRAC_PI_2;

use geo::algorithm::buffer::{Buffer, BufferStyle, LineCap, LineJoin};
use geo::{LineString, MultiLineString, MultiPolygon, Polygon, Simplify};
use log::{debug, info};

use crate::config::{JoinStyle, SkeletonParams};
use crate::error::{Error, Result};
use crate::geometry::math::ring_perimeter;
use crate::model::Vec2;

#[derive(Clone, Debug)]
pub struct BufferMaker {
    /// Full width of the band; the buffer distance is half of it.
    pub thickness: f64,
    pub min_inner_perimeter: f64,
    pub resolution: u32,
    pub join: JoinStyle,
    pub simplify: bool,
}

impl Default for BufferMaker {
    fn default() -> Self {
        Self::from_params(&SkeletonParams::default())
    }
}

impl BufferMaker {
    pub fn from_params(p: &SkeletonParams) -> Self {
        BufferMaker {
            thickness: p.thickness,
            min_inner_perimeter: p.min_inner_perimeter(),
            resolution: p.resolution,
            join: p.join,
            simplify: p.simplify,
        }
    }

    pub fn make_buffered_shape(&self, lines: &[LineString<f64>]) -> Result<MultiPolygon<f64>> {
        info!("creating buffered shape from {} linestrings", lines.len());
        let merged = MultiLineString::new(lines.to_vec()).buffer_with_style(self.style());
        let filled = self.remove_holes(&merged);
        let shape = if self.simplify { filled.simplify(self.thickness / 10.0) } else { filled };
        let shape = MultiPolygon::new(shape.0.into_iter().filter(|p| p.exterior().0.len() >= 4).collect());
        if shape.0.is_empty() {
            return Err(Error::Geometry("buffered shape is empty".into()));
        }
        debug!(
            "buffer: {} polygons, {} holes",
            shape.0.len(),
            shape.0.iter().map(|p| p.interiors().len()).sum::<usize>()
        );
        Ok(shape)
    }

    /// Stroke style: half the thickness, arcs stepped `resolution` times per
    /// quarter circle.
    fn style(&self) -> BufferStyle<f64> {
        let step = FRAC_PI_2 / self.resolution.max(1) as f64;
        let join = match self.join {
            JoinStyle::Round => LineJoin::Round(step),
            JoinStyle::Bevel => LineJoin::Bevel,
        };
        BufferStyle::new(self.thickness / 2.0).line_cap(LineCap::Round(step)).line_join(join)
    }

    /// Drops interior rings whose perimeter is at or below the minimum.
    pub fn remove_holes(&self, shape: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        let polys = shape
            .iter()
            .map(|p| {
                let kept: Vec<LineString<f64>> = p
                    .interiors()
                    .iter()
                    .filter(|ring| {
                        let pts: Vec<Vec2> = ring.coords().map(|&c| Vec2::from(c)).collect();
                        ring_perimeter(&pts) > self.min_inner_perimeter
                    })
                    .cloned()
                    .collect();
                Polygon::new(p.exterior().clone(), kept)
            })
            .collect();
        MultiPolygon::new(polys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;

    fn maker(thickness: f64, min_inner: f64) -> BufferMaker {
        BufferMaker { thickness, min_inner_perimeter: min_inner, resolution: 2, join: JoinStyle::Bevel, simplify: false }
    }

    #[test]
    fn straight_line_area() {
        let line = LineString::from(vec![(0.0, 0.0), (100.0, 0.0)]);
        let shape = maker(10.0, 25.0).make_buffered_shape(&[line]).unwrap();
        assert_eq!(shape.0.len(), 1);
        // rectangle plus two half-disc caps, no larger than the true circle
        let area = shape.unsigned_area();
        assert!(area > 1000.0 + 2.0 * 2f64.sqrt() * 25.0 * 0.95, "{area}");
        assert!(area < 1000.0 + std::f64::consts::PI * 25.0 + 0.5, "{area}");
    }

    #[test]
    fn bevel_join_fills_the_corner() {
        let line = LineString::from(vec![(0.0, 0.0), (50.0, 0.0), (50.0, 50.0)]);
        let shape = maker(10.0, 25.0).make_buffered_shape(&[line]).unwrap();
        assert_eq!(shape.0.len(), 1);
        assert!(shape.0[0].interiors().is_empty());
    }

    #[test]
    fn round_join_covers_more_than_bevel() {
        let line = LineString::from(vec![(0.0, 0.0), (50.0, 0.0), (50.0, 50.0)]);
        let bevel = maker(10.0, 25.0).make_buffered_shape(&[line.clone()]).unwrap();
        let round = BufferMaker { join: JoinStyle::Round, ..maker(10.0, 25.0) }.make_buffered_shape(&[line]).unwrap();
        let (b, r) = (bevel.unsigned_area(), round.unsigned_area());
        // the outer corner gains at most a quarter disc minus its bevel triangle
        assert!(r > b, "{r} <= {b}");
        assert!(r - b < 25.0 * std::f64::consts::FRAC_PI_4, "{r} vs {b}");
    }

    #[test]
    fn small_holes_are_filled() {
        let outer = LineString::from(vec![(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0), (0.0, 0.0)]);
        let small = LineString::from(vec![(10.0, 10.0), (20.0, 10.0), (20.0, 20.0), (10.0, 20.0), (10.0, 10.0)]);
        let tiny = LineString::from(vec![(90.0, 90.0), (90.0, 85.0), (85.0, 85.0), (85.0, 90.0), (90.0, 90.0)]);
        let mp = MultiPolygon::new(vec![Polygon::new(outer, vec![small, tiny])]);
        let filled = maker(10.0, 21.0).remove_holes(&mp);
        assert_eq!(filled.0[0].interiors().len(), 1);
    }

    #[test]
    fn grid_keeps_one_large_hole() {
        let lines = vec![
            LineString::from(vec![(0.0, 0.0), (100.0, 0.0)]),
            LineString::from(vec![(10.0, 10.0), (10.0, -30.0)]),
            LineString::from(vec![(20.0, 10.0), (20.0, -30.0)]),
            LineString::from(vec![(0.0, -10.0), (100.0, -10.0)]),
            LineString::from(vec![(40.0, 10.0), (40.0, -30.0)]),
        ];
        let mut m = maker(5.0, 25.0);
        m.simplify = true;
        let shape = m.make_buffered_shape(&lines).unwrap();
        assert_eq!(shape.0.len(), 1);
        assert_eq!(shape.0[0].interiors().len(), 1);
    }

    #[test]
    fn no_lines_is_an_error() {
        assert!(matches!(maker(10.0, 1.0).make_buffered_shape(&[]), Err(Error::Geometry(_))));
    }
}
