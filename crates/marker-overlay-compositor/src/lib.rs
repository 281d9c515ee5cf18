//! Homography compositing.
//!
//! Given a target frame, a source image and the destination quad (TL, TR,
//! BR, BL), this crate:
//! 1. solves the homography taking the source rectangle onto the quad,
//! 2. warps the source into a target-sized canvas,
//! 3. fills the quad polygon into a mask,
//! 4. keeps the target outside the mask and the warp inside it.
//!
//! Everything is recomputed per call; nothing is cached between frames.

mod composite;
mod error;

pub use composite::{composite, composite_layers, CompositeLayers};
pub use error::CompositeError;
