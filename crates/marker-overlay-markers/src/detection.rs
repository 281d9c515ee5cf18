//! Marker detections as handed over by an external detector.

use marker_overlay_core::ColorImageView;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// One recognised marker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerDetection {
    /// Dictionary id of the marker.
    pub id: u32,
    /// Marker corners in image pixels, clockwise from the marker's own
    /// top-left corner (TL, TR, BR, BL).
    pub corners: [Point2<f32>; 4],
}

impl MarkerDetection {
    pub fn new(id: u32, corners: [Point2<f32>; 4]) -> Self {
        Self { id, corners }
    }

    /// Axis-aligned square marker with top-left `(x, y)` and side `side`.
    pub fn square(id: u32, x: f32, y: f32, side: f32) -> Self {
        Self::new(
            id,
            [
                Point2::new(x, y),
                Point2::new(x + side, y),
                Point2::new(x + side, y + side),
                Point2::new(x, y + side),
            ],
        )
    }
}

/// Output of one detector call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectedMarkers {
    /// Recognised markers, in no particular order.
    #[serde(default)]
    pub markers: Vec<MarkerDetection>,
    /// Quads that looked like markers but failed to decode. Informational only.
    #[serde(default)]
    pub rejected: Vec<[Point2<f32>; 4]>,
}

impl DetectedMarkers {
    pub fn new(markers: Vec<MarkerDetection>) -> Self {
        Self {
            markers,
            rejected: Vec::new(),
        }
    }
}

/// External marker detection capability.
///
/// Implementations locate marker quads in `image` and decode their ids.
/// Only [`DetectedMarkers::markers`] is consumed by the overlay pipeline.
pub trait MarkerDetector {
    fn detect(&self, image: &ColorImageView<'_>) -> DetectedMarkers;
}

impl<F> MarkerDetector for F
where
    F: Fn(&ColorImageView<'_>) -> DetectedMarkers,
{
    fn detect(&self, image: &ColorImageView<'_>) -> DetectedMarkers {
        self(image)
    }
}

/// Detector that ignores the image and returns pre-computed detections,
/// e.g. loaded from an annotation file.
#[derive(Clone, Debug, Default)]
pub struct FixedDetections(pub DetectedMarkers);

impl MarkerDetector for FixedDetections {
    fn detect(&self, _image: &ColorImageView<'_>) -> DetectedMarkers {
        self.0.clone()
    }
}
