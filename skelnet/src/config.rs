use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::limits::in_thickness_bounds;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinStyle {
    Round,
    #[default]
    Bevel,
}

/// Tuning knobs for the linestring to topology pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkeletonParams {
    /// Full buffer width; also the triangulation tolerance.
    pub thickness: f64,
    /// Holes with a perimeter at or below this are filled. Defaults to thickness².
    pub min_inner_perimeter: Option<f64>,
    pub cutoff_ratio: f64,
    pub split_at_endpoints: bool,
    /// Arc segments per quarter circle.
    pub resolution: u32,
    pub join: JoinStyle,
    pub simplify: bool,
}

impl Default for SkeletonParams {
    fn default() -> Self {
        SkeletonParams {
            thickness: 14.0,
            min_inner_perimeter: None,
            cutoff_ratio: 2.0,
            split_at_endpoints: false,
            resolution: 2,
            join: JoinStyle::Bevel,
            simplify: true,
        }
    }
}

impl SkeletonParams {
    pub fn min_inner_perimeter(&self) -> f64 {
        self.min_inner_perimeter.unwrap_or(self.thickness * self.thickness)
    }

    pub fn validate(&self) -> Result<()> {
        if !in_thickness_bounds(self.thickness) {
            return Err(invalid("thickness", format!("must be positive and finite, got {}", self.thickness)));
        }
        if let Some(p) = self.min_inner_perimeter {
            if !p.is_finite() || p < 0.0 {
                return Err(invalid("min_inner_perimeter", format!("must be a finite non-negative number, got {p}")));
            }
        }
        if !(self.cutoff_ratio > 1.0) || !self.cutoff_ratio.is_finite() {
            return Err(invalid("cutoff_ratio", format!("must be finite and above 1, got {}", self.cutoff_ratio)));
        }
        if self.resolution == 0 {
            return Err(invalid("resolution", "must be at least 1".into()));
        }
        Ok(())
    }

    /// Parses and validates; missing fields take their defaults.
    pub fn from_json(s: &str) -> Result<Self> {
        let params: SkeletonParams = serde_json::from_str(s)?;
        params.validate()?;
        Ok(params)
    }
}

fn invalid(name: &'static str, reason: String) -> Error {
    Error::InvalidParam { name, reason }
}
