//! End-to-end overlay: detections -> destination quad -> composite.

use crate::compositor::composite;
use crate::core::{ColorImage, ColorImageView};
use crate::markers::{resolve, MarkerDetection, MarkerDetector, MarkerLayout};
use crate::OverlayError;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Resolve the destination quad from `markers` and composite `source` into `target`.
pub fn overlay_markers(
    target: &ColorImageView<'_>,
    source: &ColorImageView<'_>,
    markers: &[MarkerDetection],
    layout: &MarkerLayout,
) -> Result<ColorImage, OverlayError> {
    let quad = resolve(markers, layout)?;
    Ok(composite(target, source, &quad)?)
}

/// Result of processing one frame when failures fall back to the input.
#[derive(Clone, Debug)]
pub enum FrameOutcome {
    Composited(ColorImage),
    Passthrough { reason: OverlayError },
}

impl From<Result<ColorImage, OverlayError>> for FrameOutcome {
    fn from(result: Result<ColorImage, OverlayError>) -> Self {
        match result {
            Ok(frame) => FrameOutcome::Composited(frame),
            Err(reason) => FrameOutcome::Passthrough { reason },
        }
    }
}

impl FrameOutcome {
    #[inline]
    pub fn is_composited(&self) -> bool {
        matches!(self, FrameOutcome::Composited(_))
    }
}

/// Stateless overlay of one fixed source image onto incoming targets.
///
/// Holds only immutable inputs (the source picture and the marker layout);
/// every call recomputes the homography from the current detections.
#[derive(Clone, Debug)]
pub struct OverlayPipeline {
    source: ColorImage,
    layout: MarkerLayout,
}

impl OverlayPipeline {
    pub fn new(source: ColorImage, layout: MarkerLayout) -> Self {
        Self { source, layout }
    }

    #[inline]
    pub fn source(&self) -> &ColorImage {
        &self.source
    }

    #[inline]
    pub fn layout(&self) -> &MarkerLayout {
        &self.layout
    }

    /// Composite using already detected markers.
    pub fn apply(
        &self,
        target: &ColorImageView<'_>,
        markers: &[MarkerDetection],
    ) -> Result<ColorImage, OverlayError> {
        overlay_markers(target, &self.source.view(), markers, &self.layout)
    }

    /// Detect markers in `target`, then composite.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, target, detector),
            fields(width = target.width, height = target.height)
        )
    )]
    pub fn run<D>(
        &self,
        target: &ColorImageView<'_>,
        detector: &D,
    ) -> Result<ColorImage, OverlayError>
    where
        D: MarkerDetector + ?Sized,
    {
        let detected = detector.detect(target);
        log::debug!(
            "detected {} markers ({} rejected candidates)",
            detected.markers.len(),
            detected.rejected.len()
        );
        self.apply(target, &detected.markers)
    }

    /// Like [`OverlayPipeline::apply`], reporting failures as a passthrough.
    pub fn apply_or_passthrough(
        &self,
        target: &ColorImageView<'_>,
        markers: &[MarkerDetection],
    ) -> FrameOutcome {
        self.apply(target, markers).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::{DetectedMarkers, FixedDetections, ResolveError};

    fn card_markers() -> Vec<MarkerDetection> {
        vec![
            MarkerDetection::square(923, 4.0, 4.0, 4.0),
            MarkerDetection::square(1001, 24.0, 4.0, 4.0),
            MarkerDetection::square(241, 24.0, 20.0, 4.0),
            MarkerDetection::square(1007, 4.0, 20.0, 4.0),
        ]
    }

    #[test]
    fn run_uses_detector_output() {
        let pipeline =
            OverlayPipeline::new(ColorImage::filled(8, 8, &[0, 255, 0]), MarkerLayout::default());
        let target = ColorImage::filled(32, 32, &[10, 10, 10]);
        let detector = FixedDetections(DetectedMarkers::new(card_markers()));

        let out = pipeline.run(&target.view(), &detector).expect("overlay");
        assert_eq!(out.pixel(16, 16), &[0, 255, 0]);
        assert_eq!(out.pixel(1, 1), &[10, 10, 10]);
    }

    #[test]
    fn missing_markers_pass_through() {
        let pipeline =
            OverlayPipeline::new(ColorImage::filled(8, 8, &[1, 2, 3]), MarkerLayout::default());
        let target = ColorImage::filled(32, 32, &[10, 10, 10]);

        let outcome = pipeline.apply_or_passthrough(&target.view(), &card_markers()[..3]);
        match outcome {
            FrameOutcome::Passthrough { reason } => assert_eq!(
                reason,
                OverlayError::Resolve(ResolveError::InsufficientMarkers { found: 3 })
            ),
            FrameOutcome::Composited(_) => panic!("expected passthrough"),
        }
    }
}
