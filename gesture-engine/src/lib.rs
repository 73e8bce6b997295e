//! # Gesture Engine
//!
//! Recognises 2D hand gestures (swipes, circles and other stylised traces)
//! from a stream of per-frame hand-centroid positions.
//!
//! ## Overview
//!
//! A motion segmenter watches the centroid stream and decides when a
//! continuous trace begins and ends. Each completed trace is scored against
//! a registry of reference templates; the closest template is reported,
//! optionally subject to a rejection threshold.
//!
//! ## Quick Start
//!
//! ```no_run
//! use gesture_engine::{Config, GestureEngine, GestureReport};
//! use gesture_engine::capture::CentroidTrace;
//!
//! let mut engine = GestureEngine::from_config(&Config::default())?;
//! let mut source = CentroidTrace::load("trace.json".as_ref())?.into_source();
//!
//! engine.run(&mut source, &mut |report: &GestureReport| {
//!     println!("{:?}", report.recognition);
//! })?;
//! # Ok::<(), gesture_engine::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`geometry`]: Points, bounding boxes and arc length
//! - [`recognition`]: Templates, curve matching and classification
//! - [`segmentation`]: Stationary/moving gesture boundary detection
//! - [`capture`]: Centroid sources, SPSC hand-off and trace files
//! - [`pipeline`]: The frame-driven engine and its listener callback
//! - [`app`]: CLI and configuration management
//!
//! ## Centroid Pipeline
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │  Centroid   │───▶│ Ring Buffer │───▶│   Motion    │───▶│    Curve    │
//! │   Source    │    │   (SPSC)    │    │  Segmenter  │    │   Matcher   │
//! └─────────────┘    └─────────────┘    └─────────────┘    └─────────────┘
//!                                                                 │
//!                                                                 ▼
//!                                       ┌─────────────┐    ┌─────────────┐
//!                                       │  Listener   │◀───│ Classifier  │
//!                                       │             │    │             │
//!                                       └─────────────┘    └─────────────┘
//! ```

pub mod geometry;
pub mod recognition;
pub mod segmentation;
pub mod capture;
pub mod pipeline;
pub mod app;

// Re-export commonly used types
pub use app::config::Config;
pub use geometry::Point;
pub use pipeline::{EngineStats, GestureEngine, GestureListener, GestureReport};
pub use recognition::{Classifier, GestureTemplate, Recognition, ScoringMode, TemplateRegistry};
pub use segmentation::{MotionSegmenter, SegmenterConfig};

/// Result type alias for the gesture engine
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the gesture engine
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("Arc length {distance} outside [0, {total}]")]
    OutOfRange { distance: f64, total: f64 },

    #[error("Insufficient data: need {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Template registry error: {0}")]
    Registry(String),

    #[error("Centroid capture error: {0}")]
    Capture(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
