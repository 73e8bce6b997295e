//! Gesture Engine
//!
//! Frame-driven loop tying the segmenter to the classifier. Each centroid is
//! fully processed before the next one is accepted; completed segments are
//! classified immediately and reported to a [`GestureListener`].
//!
//! Classification failures stay inside the report for that segment. The
//! segmenter keeps running and the next gesture is recognised normally.

use crate::app::config::Config;
use crate::capture::types::{CentroidSample, CentroidSource};
use crate::recognition::{builtin_registry, Classifier, Recognition, TemplateRegistry, TemplateScore};
use crate::segmentation::{GestureSegment, MotionSegmenter, SegmentEvent};
use crate::{Error, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of one completed gesture segment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GestureReport {
    pub start_frame: u64,
    pub end_frame: u64,
    /// Points handed to the classifier
    pub samples: usize,
    /// Points recorded before the trailing trim
    pub recorded: usize,
    pub recognition: Recognition,
    /// Per-template scores, empty when classification failed
    pub scores: Vec<TemplateScore>,
    /// Why classification failed, if it did
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GestureReport {
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Receives one report per completed gesture segment
pub trait GestureListener {
    fn on_gesture_classified(&mut self, report: &GestureReport);
}

impl<F> GestureListener for F
where
    F: FnMut(&GestureReport),
{
    fn on_gesture_classified(&mut self, report: &GestureReport) {
        self(report)
    }
}

/// Running counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub frames: u64,
    pub segments_started: u64,
    pub segments_completed: u64,
    pub segments_discarded: u64,
    pub matches: u64,
    pub no_matches: u64,
    pub failures: u64,
}

/// Segmentation plus classification over a centroid stream
#[derive(Debug, Clone)]
pub struct GestureEngine {
    segmenter: MotionSegmenter,
    classifier: Classifier,
    stats: EngineStats,
    last_frame: Option<u64>,
}

impl GestureEngine {
    pub fn new(segmenter: MotionSegmenter, classifier: Classifier) -> Self {
        Self {
            segmenter,
            classifier,
            stats: EngineStats::default(),
            last_frame: None,
        }
    }

    /// Build an engine over the built-in template library
    pub fn from_config(config: &Config) -> Result<Self> {
        let registry = builtin_registry()?;
        Self::with_registry(config, Arc::new(registry))
    }

    /// Build an engine over a caller-supplied registry
    pub fn with_registry(config: &Config, registry: Arc<TemplateRegistry>) -> Result<Self> {
        config.validate()?;
        let segmenter = MotionSegmenter::new(
            config.segmentation.clone(),
            config.camera.width as f64,
            config.camera.height as f64,
        )?;
        let classifier = Classifier::shared(registry, config.recognition.scoring_mode)
            .with_rejection_threshold(config.recognition.rejection_threshold);
        Ok(Self::new(segmenter, classifier))
    }

    pub fn segmenter(&self) -> &MotionSegmenter {
        &self.segmenter
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Drop any open segment and accept frame numbering from scratch.
    /// Counters are kept.
    pub fn reset(&mut self) {
        self.segmenter.reset();
        self.last_frame = None;
    }

    /// Process one centroid.
    ///
    /// Returns a report when this sample closed a gesture segment. Fails
    /// only for an out-of-order frame or a non-finite position; both break
    /// the stream contract.
    pub fn process(&mut self, sample: CentroidSample) -> Result<Option<GestureReport>> {
        if let Some(last) = self.last_frame {
            if sample.frame <= last {
                return Err(Error::Capture(format!(
                    "frame {} delivered after frame {}",
                    sample.frame, last
                )));
            }
        }
        if !sample.position.is_finite() {
            return Err(Error::Capture(format!(
                "non-finite centroid at frame {}",
                sample.frame
            )));
        }
        self.last_frame = Some(sample.frame);
        self.stats.frames += 1;

        match self.segmenter.push(sample) {
            Some(SegmentEvent::Started { .. }) => {
                self.stats.segments_started += 1;
                Ok(None)
            }
            Some(SegmentEvent::Discarded { .. }) => {
                self.stats.segments_discarded += 1;
                Ok(None)
            }
            Some(SegmentEvent::Completed(segment)) => {
                self.stats.segments_completed += 1;
                Ok(Some(self.classify_segment(segment)))
            }
            None => Ok(None),
        }
    }

    /// Drain `source`, reporting every classified gesture to `listener`
    pub fn run<S, L>(&mut self, source: &mut S, listener: &mut L) -> Result<EngineStats>
    where
        S: CentroidSource + ?Sized,
        L: GestureListener + ?Sized,
    {
        while let Some(sample) = source.next_centroid() {
            if let Some(report) = self.process(sample)? {
                listener.on_gesture_classified(&report);
            }
        }
        debug!(frames = self.stats.frames, "centroid stream ended");
        Ok(self.stats)
    }

    fn classify_segment(&mut self, segment: GestureSegment) -> GestureReport {
        let GestureSegment {
            points,
            start_frame,
            end_frame,
            recorded,
        } = segment;

        let (recognition, scores, error) = match self.classifier.classify(&points) {
            Ok(classification) => {
                match &classification.recognition {
                    Recognition::Match { template, score } => {
                        self.stats.matches += 1;
                        info!(start_frame, end_frame, template = %template, score, "gesture recognised");
                    }
                    Recognition::NoMatch { best_score } => {
                        self.stats.no_matches += 1;
                        info!(start_frame, end_frame, best_score = ?best_score, "gesture not recognised");
                    }
                }
                (classification.recognition, classification.scores, None)
            }
            Err(e) => {
                self.stats.failures += 1;
                warn!(start_frame, end_frame, error = %e, "gesture classification failed");
                (
                    Recognition::NoMatch { best_score: None },
                    Vec::new(),
                    Some(e.to_string()),
                )
            }
        };

        GestureReport {
            start_frame,
            end_frame,
            samples: points.len(),
            recorded,
            recognition,
            scores,
            error,
        }
    }
}
