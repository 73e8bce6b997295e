//! Application Layer
//!
//! The `gesture-rec` command line and its TOML configuration file.

pub mod cli;
pub mod config;

pub use cli::Cli;
pub use config::{CameraConfig, CaptureConfig, Config, RecognitionConfig};
