//! Synthetic centroid traces
//!
//! Scripted hand motion for demos and tests: hold still, trace a shape,
//! hold still again. Shapes are resampled evenly by arc length so the hand
//! moves at constant speed.

use super::trace_file::CentroidTrace;
use super::types::CentroidSample;
use crate::geometry::{scale, Point};
use crate::recognition::template::{GestureTemplate, MAX_DIM};
use crate::Result;

/// Builder for a scripted centroid stream
#[derive(Debug, Clone)]
pub struct SyntheticTrace {
    samples: Vec<CentroidSample>,
    position: Point,
    next_frame: u64,
}

impl SyntheticTrace {
    /// Start with the hand resting at `start`
    pub fn new(start: Point) -> Self {
        Self {
            samples: Vec::new(),
            position: start,
            next_frame: 0,
        }
    }

    /// Hold the current position for `frames` frames
    pub fn dwell(mut self, frames: usize) -> Self {
        for _ in 0..frames {
            self.emit(self.position);
        }
        self
    }

    /// Trace `shape` from the current position over `frames` frames.
    ///
    /// The shape is moved to start at the current position and scaled so its
    /// larger bounding-box side is `size` pixels.
    pub fn trace(mut self, shape: &[Point], size: f64, frames: usize) -> Result<Self> {
        let template = GestureTemplate::new("synthetic", shape)?;
        let factor = size / MAX_DIM;
        let total = template.total_length();
        let origin = self.position;

        for i in 1..=frames {
            let along = (i as f64 / frames as f64 * total).min(total);
            let offset = scale(template.linearize(along)?, factor);
            self.emit(Point::new(origin.x + offset.x, origin.y + offset.y));
        }
        Ok(self)
    }

    /// Move in a straight line to `target` over `frames` frames
    pub fn move_to(mut self, target: Point, frames: usize) -> Self {
        let start = self.position;
        for i in 1..=frames {
            let t = i as f64 / frames as f64;
            self.emit(Point::new(
                start.x + t * (target.x - start.x),
                start.y + t * (target.y - start.y),
            ));
        }
        self
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn build(self) -> CentroidTrace {
        CentroidTrace::new(self.samples)
    }

    fn emit(&mut self, position: Point) {
        self.samples.push(CentroidSample::new(self.next_frame, position));
        self.position = position;
        self.next_frame += 1;
    }
}
