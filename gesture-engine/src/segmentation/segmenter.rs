//! Stationary/Moving Segmenter
//!
//! Each new centroid is compared against the mean of the `window` samples
//! before it. If any of the newest `window` samples lies further than the
//! radius threshold from that mean the hand is moving, otherwise it is
//! stationary:
//!
//! ```text
//!   STATIONARY ──(any sample outside radius)──▶ MOVING      start recording
//!   MOVING     ──(all samples inside radius)──▶ STATIONARY  close segment
//! ```
//!
//! The radius is a fraction of the shorter frame side and the comparison is
//! done in squared-distance space.

use crate::capture::types::CentroidSample;
use crate::geometry::{distance_sq, Point};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

/// Largest accepted motion window
pub const MAX_WINDOW: usize = 64;

/// Motion classification of the most recent window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionState {
    Stationary,
    Moving,
}

/// Segmenter state, updated once per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentationState {
    pub motion: MotionState,
    /// True while samples are being collected into a gesture
    pub recording: bool,
}

impl Default for SegmentationState {
    fn default() -> Self {
        Self {
            motion: MotionState::Stationary,
            recording: false,
        }
    }
}

/// Segmenter tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Samples averaged for the stationary test (N)
    pub window: usize,
    /// Stationary radius as a fraction of the shorter frame side
    pub radius_fraction: f64,
    /// Segments must have more samples than this to be classified
    pub min_gesture_points: usize,
    /// Settle samples dropped from the end of each completed segment
    pub trailing_trim: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            window: 4,
            radius_fraction: 0.04,
            min_gesture_points: 5,
            trailing_trim: 2,
        }
    }
}

impl SegmenterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window == 0 || self.window > MAX_WINDOW {
            return Err(Error::Config(format!(
                "window must be in [1, {}], got {}",
                MAX_WINDOW, self.window
            )));
        }
        if !(self.radius_fraction > 0.0 && self.radius_fraction <= 1.0) {
            return Err(Error::Config(format!(
                "radius_fraction must be in (0, 1], got {}",
                self.radius_fraction
            )));
        }
        if self.min_gesture_points < 1 {
            return Err(Error::Config("min_gesture_points must be >= 1".to_string()));
        }
        Ok(())
    }
}

/// A completed gesture, ready for classification
#[derive(Debug, Clone, PartialEq)]
pub struct GestureSegment {
    /// Recorded positions with the trailing settle samples removed
    pub points: Vec<Point>,
    /// Frame of the first recorded sample
    pub start_frame: u64,
    /// Frame of the last recorded sample
    pub end_frame: u64,
    /// Samples recorded before trimming
    pub recorded: usize,
}

/// Boundary emitted by [`MotionSegmenter::push`]
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentEvent {
    /// Motion began; this frame is the first recorded sample
    Started { frame: u64 },
    /// Motion settled with enough samples to classify
    Completed(GestureSegment),
    /// Motion settled too soon; the samples were dropped as noise
    Discarded {
        start_frame: u64,
        end_frame: u64,
        recorded: usize,
    },
}

/// Gesture boundary detector over a centroid stream
#[derive(Debug, Clone)]
pub struct MotionSegmenter {
    config: SegmenterConfig,
    threshold_sq: f64,
    state: SegmentationState,
    history: VecDeque<Point>,
    buffer: Vec<Point>,
    start_frame: u64,
    last_frame: u64,
}

impl MotionSegmenter {
    /// Create a segmenter for a camera frame of the given size
    pub fn new(config: SegmenterConfig, frame_width: f64, frame_height: f64) -> Result<Self> {
        config.validate()?;
        let shorter = frame_width.min(frame_height);
        if !(shorter > 0.0 && shorter.is_finite()) {
            return Err(Error::Config(format!(
                "frame size must be positive, got {}x{}",
                frame_width, frame_height
            )));
        }
        let radius = config.radius_fraction * shorter;

        Ok(Self {
            history: VecDeque::with_capacity(config.window + 1),
            threshold_sq: radius * radius,
            config,
            state: SegmentationState::default(),
            buffer: Vec::new(),
            start_frame: 0,
            last_frame: 0,
        })
    }

    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    pub fn state(&self) -> SegmentationState {
        self.state
    }

    /// Stationary radius in pixels
    pub fn threshold_radius(&self) -> f64 {
        self.threshold_sq.sqrt()
    }

    /// Samples collected for the gesture in progress
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Return to the initial state, forgetting history and any open segment
    pub fn reset(&mut self) {
        self.state = SegmentationState::default();
        self.history.clear();
        self.buffer.clear();
        self.start_frame = 0;
        self.last_frame = 0;
    }

    /// Feed one centroid and report a gesture boundary if one was crossed
    pub fn push(&mut self, sample: CentroidSample) -> Option<SegmentEvent> {
        self.history.push_back(sample.position);
        while self.history.len() > self.config.window + 1 {
            self.history.pop_front();
        }
        // Need N samples to average plus the newest before judging motion
        if self.history.len() < self.config.window + 1 {
            return None;
        }

        let was_recording = self.state.recording;
        let moving = self.is_moving();

        match (self.state.motion, moving) {
            (MotionState::Stationary, true) => {
                self.state.motion = MotionState::Moving;
                self.state.recording = true;
            }
            (MotionState::Moving, false) => {
                self.state.motion = MotionState::Stationary;
                self.state.recording = false;
            }
            _ => {}
        }

        if self.state.recording {
            self.buffer.push(sample.position);
            self.last_frame = sample.frame;
            if !was_recording {
                self.start_frame = sample.frame;
                debug!(frame = sample.frame, "gesture started");
                return Some(SegmentEvent::Started { frame: sample.frame });
            }
            None
        } else if was_recording {
            Some(self.close_segment())
        } else {
            None
        }
    }

    /// Any of the newest N samples outside the radius around the mean of
    /// the N samples before the newest
    fn is_moving(&self) -> bool {
        let window = self.config.window;
        let (sum_x, sum_y) = self
            .history
            .iter()
            .take(window)
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        let mean = Point::new(sum_x / window as f64, sum_y / window as f64);

        self.history
            .iter()
            .skip(1)
            .any(|&p| distance_sq(p, mean) > self.threshold_sq)
    }

    fn close_segment(&mut self) -> SegmentEvent {
        let points = std::mem::take(&mut self.buffer);
        let recorded = points.len();

        if recorded <= self.config.min_gesture_points {
            debug!(
                start_frame = self.start_frame,
                end_frame = self.last_frame,
                recorded,
                "gesture too short, discarded"
            );
            return SegmentEvent::Discarded {
                start_frame: self.start_frame,
                end_frame: self.last_frame,
                recorded,
            };
        }

        let keep = recorded
            .saturating_sub(self.config.trailing_trim)
            .max(2)
            .min(recorded);
        let mut points = points;
        points.truncate(keep);

        debug!(
            start_frame = self.start_frame,
            end_frame = self.last_frame,
            recorded,
            kept = keep,
            "gesture completed"
        );
        SegmentEvent::Completed(GestureSegment {
            points,
            start_frame: self.start_frame,
            end_frame: self.last_frame,
            recorded,
        })
    }
}
