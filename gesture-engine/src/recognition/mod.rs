//! Gesture recognition
//!
//! Templates, curve matching and classification:
//! - Arc-length indexed reference curves normalised to a fixed size
//! - Three scoring modes for comparing a captured trace with a template
//! - A classifier over an immutable template registry

pub mod template;
pub mod matcher;
pub mod classifier;
pub mod library;

pub use template::{GestureTemplate, MAX_DIM};
pub use matcher::{CurveMatcher, MatchScore, ScoringMode};
pub use classifier::{Classification, Classifier, Recognition, TemplateRegistry, TemplateScore};
pub use library::builtin_registry;
