//! Planar geometry primitives
//!
//! Points and the polyline helpers shared by template construction and
//! curve matching:
//! - Named-field 2D points with free distance/offset/scale functions
//! - Bounding boxes and origin translation
//! - Cumulative arc length over ordered point sequences

pub mod point;
pub mod curve;

pub use point::{distance, distance_sq, lerp, scale, subtract, Point};
pub use curve::{cumulative_arc_length, path_length, translate_to_origin, BoundingBox};
