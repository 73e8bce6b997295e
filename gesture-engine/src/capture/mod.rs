//! Centroid capture
//!
//! The engine's view of the vision front end: a stream of per-frame hand
//! centroids. Sources can be recorded trace files, scripted synthetic
//! motion, or a live producer thread behind a lock-free SPSC ring buffer.

pub mod types;
pub mod ring_buffer;
pub mod trace_file;
pub mod synthetic;

pub use types::{CentroidSample, CentroidSource, ReplaySource};
pub use ring_buffer::{CentroidConsumer, CentroidProducer, CentroidRingBuffer, RingBufferStats};
pub use trace_file::{parse_point_line, CentroidTrace};
pub use synthetic::SyntheticTrace;
