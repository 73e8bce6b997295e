//! Centroid Trace Files
//!
//! JSON recordings of a centroid stream, for replaying captured sessions
//! through the engine, plus the line format accepted on stdin.

use super::types::{CentroidSample, ReplaySource};
use crate::geometry::Point;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Recorded centroid stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentroidTrace {
    /// Frame width the centroids were measured in, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_width: Option<u32>,
    /// Frame height the centroids were measured in, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_height: Option<u32>,
    pub samples: Vec<CentroidSample>,
}

impl CentroidTrace {
    pub fn new(samples: Vec<CentroidSample>) -> Self {
        Self {
            frame_width: None,
            frame_height: None,
            samples,
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

    pub fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.frame_width = Some(width);
        self.frame_height = Some(height);
        self
    }

    /// Frame size recorded alongside the samples
    pub fn frame_size(&self) -> Option<(u32, u32)> {
        self.frame_width.zip(self.frame_height)
    }

    /// Check frame indices strictly increase and positions are finite
    pub fn validate(&self) -> Result<()> {
        for (i, w) in self.samples.windows(2).enumerate() {
            if w[1].frame <= w[0].frame {
                return Err(Error::Capture(format!(
                    "sample {} has frame {} after frame {}",
                    i + 1,
                    w[1].frame,
                    w[0].frame
                )));
            }
        }
        if let Some(bad) = self.samples.iter().find(|s| !s.position.is_finite()) {
            return Err(Error::Capture(format!(
                "frame {} has a non-finite position",
                bad.frame
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Load and validate a trace from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let trace: Self = serde_json::from_str(&content)?;
        trace.validate()?;
        Ok(trace)
    }

    /// Save the trace as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn into_source(self) -> ReplaySource {
        ReplaySource::new(self.samples)
    }
}

/// Load a bare JSON array of points, as accepted by `classify`
pub fn load_points(path: &Path) -> Result<Vec<Point>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Parse one `x y` or `x,y` line. Blank lines and `#` comments yield `None`.
pub fn parse_point_line(line: &str) -> Result<Option<Point>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<&str> = trimmed
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|f| !f.is_empty())
        .collect();
    if fields.len() != 2 {
        return Err(Error::Capture(format!(
            "expected two coordinates, got '{}'",
            trimmed
        )));
    }

    let parse = |field: &str| {
        field
            .parse::<f64>()
            .map_err(|e| Error::Capture(format!("bad coordinate '{}': {}", field, e)))
    };
    let point = Point::new(parse(fields[0])?, parse(fields[1])?);
    if !point.is_finite() {
        return Err(Error::Capture(format!("non-finite coordinate in '{}'", trimmed)));
    }
    Ok(Some(point))
}
