use crate::{compositor::CompositeError, markers::ResolveError};

/// Why a frame produced no overlay.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OverlayError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Composite(#[from] CompositeError),
}

/// Errors from loading and saving configs, detections and images.
#[derive(thiserror::Error, Debug)]
pub enum OverlayIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "image")]
    #[error(transparent)]
    Image(#[from] ::image::ImageError),
    #[error("cannot encode an image with {channels} channels")]
    UnsupportedChannels { channels: usize },
}
