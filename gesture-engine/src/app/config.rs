//! Configuration Management

use crate::recognition::ScoringMode;
use crate::segmentation::SegmenterConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Camera frame geometry
    pub camera: CameraConfig,
    /// Motion segmentation settings
    #[serde(default)]
    pub segmentation: SegmenterConfig,
    /// Template matching settings
    #[serde(default)]
    pub recognition: RecognitionConfig,
    /// Centroid hand-off settings
    #[serde(default)]
    pub capture: CaptureConfig,
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Frame width (pixels)
    pub width: u32,
    /// Frame height (pixels)
    pub height: u32,
}

/// Recognition configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RecognitionConfig {
    /// How captured gestures are compared with templates
    #[serde(default)]
    pub scoring_mode: ScoringMode,
    /// Best scores above this are reported as no match (unset = always match)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_threshold: Option<f64>,
}

/// Capture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Ring buffer size
    pub ring_buffer_size: usize,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            ring_buffer_size: 1024,
        }
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    /// Returns Ok(()) if valid, or Err with a description of the first invalid field.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(crate::Error::Config(format!(
                "camera size must be non-zero, got {}x{}", self.camera.width, self.camera.height
            )));
        }
        self.segmentation.validate()?;
        if let Some(threshold) = self.recognition.rejection_threshold {
            if !(threshold.is_finite() && threshold >= 0.0) {
                return Err(crate::Error::Config(format!(
                    "rejection_threshold must be a non-negative number, got {}", threshold
                )));
            }
        }
        if self.capture.ring_buffer_size == 0 || (self.capture.ring_buffer_size & (self.capture.ring_buffer_size - 1)) != 0 {
            return Err(crate::Error::Config(format!(
                "ring_buffer_size must be a power of 2, got {}", self.capture.ring_buffer_size
            )));
        }
        Ok(())
    }

    /// Load config from file
    pub fn load(path: &PathBuf) -> Result<Self, crate::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from default location
    pub fn load_default() -> Result<Self, crate::Error> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &PathBuf) -> Result<(), crate::Error> {
        let content = self.to_toml()?;

        // Create parent directories
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Save to default location
    pub fn save_default(&self) -> Result<(), crate::Error> {
        self.save(&Self::default_path())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".gesture_engine").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Generate TOML representation
    pub fn to_toml(&self) -> Result<String, crate::Error> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }
}
