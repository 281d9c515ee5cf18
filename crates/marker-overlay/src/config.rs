//! JSON configuration and detection files.

use crate::markers::{DetectedMarkers, MarkerLayout};
use crate::OverlayIoError;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

fn default_frame_rate() -> f64 {
    10.0
}

fn default_resize_width() -> Option<u32> {
    Some(600)
}

/// Settings shared by the still-image and live modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Marker ids at the card corners (TL, TR, BR, BL).
    #[serde(default)]
    pub layout: MarkerLayout,
    /// Cap on processed frames per second in live mode; `<= 0` disables it.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,
    /// Resize targets to this width (aspect preserved) before detection.
    #[serde(default = "default_resize_width")]
    pub resize_width: Option<u32>,
    /// Where the still-image mode writes its result.
    #[serde(default)]
    pub output_path: Option<String>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            layout: MarkerLayout::default(),
            frame_rate: default_frame_rate(),
            resize_width: default_resize_width(),
            output_path: None,
        }
    }
}

impl OverlayConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, OverlayIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), OverlayIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the still-image output path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("output/augmented_reality.jpg"))
    }

    /// Minimum time between processed frames; zero when uncapped.
    pub fn frame_interval(&self) -> Duration {
        frame_interval(self.frame_rate)
    }
}

pub(crate) fn frame_interval(frame_rate: f64) -> Duration {
    if frame_rate.is_finite() && frame_rate > 0.0 {
        Duration::try_from_secs_f64(1.0 / frame_rate).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}

/// Load detector output stored as JSON (`{"markers": [...], "rejected": [...]}`).
pub fn load_detections(path: impl AsRef<Path>) -> Result<DetectedMarkers, OverlayIoError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Write detector output as pretty JSON.
pub fn write_detections(
    path: impl AsRef<Path>,
    detections: &DetectedMarkers,
) -> Result<(), OverlayIoError> {
    let json = serde_json::to_string_pretty(detections)?;
    fs::write(path, json)?;
    Ok(())
}
