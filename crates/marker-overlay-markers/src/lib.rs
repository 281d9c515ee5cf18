//! Marker detections and destination quad resolution.
//!
//! This crate does **not** detect markers. It consumes id + corner quads
//! produced by an external detector (see [`MarkerDetector`]) and turns the
//! four markers of a known card layout into the quadrilateral an overlay is
//! projected onto.

mod detection;
mod layout;
mod resolve;

pub use detection::{DetectedMarkers, FixedDetections, MarkerDetection, MarkerDetector};
pub use layout::{MarkerLayout, REFERENCE_MARKER_IDS};
pub use resolve::{resolve, ResolveError, LAYOUT_MARKER_COUNT};
