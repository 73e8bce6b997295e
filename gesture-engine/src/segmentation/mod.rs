//! Motion segmentation
//!
//! Decides where a continuous hand trace begins and ends within the
//! centroid stream, using a stationary/moving state machine over a short
//! sliding window.

pub mod segmenter;

pub use segmenter::{
    GestureSegment, MotionSegmenter, MAX_WINDOW, MotionState, SegmentEvent, SegmentationState, SegmenterConfig,
};
