//! High-level facade crate for the `marker-overlay-*` workspace.
//!
//! Projects a source picture onto a card printed with four fiducial markers:
//! the four detections are ordered into a destination quad
//! ([`markers::resolve`]), the source is warped onto it and composited into
//! the target frame under a polygon mask ([`compositor::composite`]).
//!
//! This crate provides:
//! - re-exports of the underlying crates
//! - [`OverlayPipeline`], the per-frame entry point
//! - a rate-capped frame loop ([`LiveLoop`]) over pluggable sources and sinks
//! - (feature `image`) image file I/O and on-disk frame sequences
//!
//! Marker detection itself is external; plug a detector in through
//! [`markers::MarkerDetector`] or feed recorded detections.
//!
//! ## Quickstart
//!
//! ```no_run
//! use marker_overlay::core::ColorImage;
//! use marker_overlay::markers::MarkerLayout;
//! use marker_overlay::{load_detections, OverlayPipeline};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = ColorImage::filled(400, 300, &[255, 0, 0]);
//! let target = ColorImage::filled(800, 600, &[0, 0, 0]);
//! let detections = load_detections("frame.json")?;
//!
//! let pipeline = OverlayPipeline::new(source, MarkerLayout::default());
//! let out = pipeline.apply(&target.view(), &detections.markers)?;
//! assert_eq!((out.width, out.height), (800, 600));
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `marker_overlay::core`: images, quads, homography, warp and masks.
//! - `marker_overlay::markers`: detections, card layout and quad resolution.
//! - `marker_overlay::compositor`: warp + mask compositing.
//! - `marker_overlay::image_io` (feature `image`): conversions from `image` buffers.

pub use marker_overlay_compositor as compositor;
pub use marker_overlay_core as core;
pub use marker_overlay_markers as markers;

mod config;
mod error;
mod live;
mod pipeline;

#[cfg(feature = "image")]
pub mod image_io;
#[cfg(feature = "image")]
mod sequence;

pub use config::{load_detections, write_detections, OverlayConfig};
pub use error::{OverlayError, OverlayIoError};
pub use live::{
    Clock, Frame, FrameRateLimiter, FrameSink, FrameSource, LiveError, LiveLoop, LoopStats,
    SystemClock,
};
pub use pipeline::{overlay_markers, FrameOutcome, OverlayPipeline};

#[cfg(feature = "image")]
pub use sequence::{ImageDirectorySink, ImageSequence};
