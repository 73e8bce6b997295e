//! Gesture Templates
//!
//! A template is the canonical geometry of one named reference gesture:
//! translated so it starts at the origin, uniformly scaled so the largest
//! bounding-box side equals [`MAX_DIM`], and indexed by cumulative arc
//! length so any distance along the curve can be turned back into a point.

use crate::geometry::{cumulative_arc_length, lerp, scale, translate_to_origin, BoundingBox, Point};
use crate::{Error, Result};

/// Largest bounding-box dimension of every scaled template
pub const MAX_DIM: f64 = 1024.0;

/// Immutable reference gesture
#[derive(Debug, Clone, PartialEq)]
pub struct GestureTemplate {
    name: String,
    raw_points: Vec<Point>,
    normalized_points: Vec<Point>,
    scaled_points: Vec<Point>,
    cumulative_arc_length: Vec<f64>,
    bounding_box: BoundingBox,
}

impl GestureTemplate {
    /// Build a template from an authored point sequence.
    ///
    /// Fails with [`Error::InsufficientData`] for fewer than two points and
    /// with [`Error::DegenerateGeometry`] when every point is identical (or
    /// any coordinate is not finite).
    pub fn new(name: impl Into<String>, points: &[Point]) -> Result<Self> {
        let name = name.into();

        if points.len() < 2 {
            return Err(Error::InsufficientData {
                required: 2,
                actual: points.len(),
            });
        }
        if let Some(bad) = points.iter().find(|p| !p.is_finite()) {
            return Err(Error::DegenerateGeometry(format!(
                "template '{}' contains a non-finite point ({}, {})",
                name, bad.x, bad.y
            )));
        }

        let normalized_points = translate_to_origin(points);
        let extent = BoundingBox::of(&normalized_points)
            .map(|b| b.max_dim())
            .unwrap_or(0.0);
        if extent <= 0.0 {
            return Err(Error::DegenerateGeometry(format!(
                "template '{}' has a zero-extent bounding box",
                name
            )));
        }

        let factor = MAX_DIM / extent;
        let scaled_points: Vec<Point> = normalized_points.iter().map(|&p| scale(p, factor)).collect();
        let cumulative_arc_length = cumulative_arc_length(&scaled_points);
        let bounding_box = BoundingBox::of(&scaled_points).ok_or_else(|| {
            Error::DegenerateGeometry(format!("template '{}' has no points", name))
        })?;

        Ok(Self {
            name,
            raw_points: points.to_vec(),
            normalized_points,
            scaled_points,
            cumulative_arc_length,
            bounding_box,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Points exactly as authored
    pub fn raw_points(&self) -> &[Point] {
        &self.raw_points
    }

    /// Raw points translated so the first one is the origin
    pub fn normalized_points(&self) -> &[Point] {
        &self.normalized_points
    }

    /// Normalized points scaled to [`MAX_DIM`]
    pub fn scaled_points(&self) -> &[Point] {
        &self.scaled_points
    }

    /// Cumulative arc length at each scaled point
    pub fn cumulative_arc_length(&self) -> &[f64] {
        &self.cumulative_arc_length
    }

    pub fn sample_count(&self) -> usize {
        self.scaled_points.len()
    }

    /// Total arc length of the scaled curve
    pub fn total_length(&self) -> f64 {
        self.cumulative_arc_length.last().copied().unwrap_or(0.0)
    }

    /// Bounding box of the scaled curve
    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    pub fn bounding_box_max_dim(&self) -> f64 {
        self.bounding_box.max_dim()
    }

    /// Point lying `distance` along the scaled curve.
    ///
    /// Binary-searches the cumulative arc length for the bracketing samples
    /// and interpolates linearly between them. A distance that lands exactly
    /// on a sample returns that sample unchanged. Distances outside
    /// `[0, total_length]` fail with [`Error::OutOfRange`]; callers clamp.
    pub fn linearize(&self, distance: f64) -> Result<Point> {
        let cumulative = &self.cumulative_arc_length;
        let total = self.total_length();

        if !(0.0..=total).contains(&distance) {
            return Err(Error::OutOfRange { distance, total });
        }

        let mut lo = 0;
        let mut hi = cumulative.len() - 1;
        if cumulative[lo] == distance {
            return Ok(self.scaled_points[lo]);
        }
        if cumulative[hi] == distance {
            return Ok(self.scaled_points[hi]);
        }

        // Invariant: cumulative[lo] < distance < cumulative[hi]
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            let at_mid = cumulative[mid];
            if at_mid == distance {
                return Ok(self.scaled_points[mid]);
            }
            if at_mid < distance {
                lo = mid;
            } else {
                hi = mid;
            }
        }

        let span = cumulative[hi] - cumulative[lo];
        if span <= 0.0 {
            return Ok(self.scaled_points[lo]);
        }
        let t = (distance - cumulative[lo]) / span;
        Ok(lerp(self.scaled_points[lo], self.scaled_points[hi], t))
    }
}
