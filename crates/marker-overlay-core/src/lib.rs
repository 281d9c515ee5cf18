//! Core types and utilities for marker-driven image overlays.
//!
//! This crate is purely geometric: pixel buffers, a 4-point homography
//! solver, perspective warping and polygon masks. It does *not* know about
//! markers or any image codec.

mod homography;
mod image;
mod logger;
pub mod mask;
mod quad;
mod warp;

pub use homography::{homography_from_4pt, Homography, HomographyError};
pub use image::{sample_bilinear_clamped, ColorImage, ColorImageView, GrayImage};
pub use mask::{and_mask, fill_convex_poly, invert_mask, or_images, polygon_mask};
pub use quad::{Quad, QuadCorner};
pub use warp::warp_perspective;

#[cfg(feature = "tracing")]
pub use logger::{init_tracing, TracingFormat};

pub use logger::{init_with_level, level_from_env, parse_level, LOG_ENV};
