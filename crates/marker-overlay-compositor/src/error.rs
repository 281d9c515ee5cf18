use marker_overlay_core::HomographyError;

/// Errors returned by the compositor.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CompositeError {
    #[error("degenerate homography: {0}")]
    DegenerateHomography(#[from] HomographyError),
    #[error("source has {source_channels} channels but target has {target_channels}")]
    ChannelMismatch {
        source_channels: usize,
        target_channels: usize,
    },
    #[error("target image is empty")]
    EmptyTarget,
    #[error("source image is empty")]
    EmptySource,
}
