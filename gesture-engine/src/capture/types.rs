//! Centroid stream types
//!
//! The only contract between the vision front end and the engine: one
//! hand-centroid position per processed frame, in capture order.

use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// Hand centroid observed in one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CentroidSample {
    /// Frame index; strictly increasing along a stream
    pub frame: u64,
    /// Centroid position in frame pixels
    pub position: Point,
}

impl CentroidSample {
    pub fn new(frame: u64, position: Point) -> Self {
        Self { frame, position }
    }

    pub fn at(frame: u64, x: f64, y: f64) -> Self {
        Self::new(frame, Point::new(x, y))
    }
}

/// Anything that delivers centroids one frame at a time.
///
/// Samples must arrive in capture order with strictly increasing frame
/// indices; none may be dropped or reordered. `None` marks end of stream.
pub trait CentroidSource {
    fn next_centroid(&mut self) -> Option<CentroidSample>;
}

/// Source replaying samples already held in memory
#[derive(Debug, Clone)]
pub struct ReplaySource {
    samples: std::vec::IntoIter<CentroidSample>,
}

impl ReplaySource {
    pub fn new(samples: Vec<CentroidSample>) -> Self {
        Self {
            samples: samples.into_iter(),
        }
    }

    /// Number frames 0, 1, 2, ... in the order given
    pub fn from_points(points: &[Point]) -> Self {
        Self::new(
            points
                .iter()
                .enumerate()
                .map(|(i, &p)| CentroidSample::new(i as u64, p))
                .collect(),
        )
    }

    pub fn remaining(&self) -> usize {
        self.samples.len()
    }
}

impl CentroidSource for ReplaySource {
    fn next_centroid(&mut self) -> Option<CentroidSample> {
        self.samples.next()
    }
}
