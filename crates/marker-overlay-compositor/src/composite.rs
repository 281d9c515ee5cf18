use crate::CompositeError;
use marker_overlay_core::{
    and_mask, homography_from_4pt, invert_mask, or_images, polygon_mask, warp_perspective,
    ColorImage, ColorImageView, GrayImage, Homography, Quad,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Intermediate buffers of one compositing run.
#[derive(Clone, Debug)]
pub struct CompositeLayers {
    /// Source rectangle -> destination quad.
    pub homography: Homography,
    /// Source warped into a target-sized canvas, zero outside its footprint.
    pub warped: ColorImage,
    /// 255 inside the destination polygon, 0 elsewhere.
    pub mask: GrayImage,
    /// Final frame.
    pub output: ColorImage,
}

/// Project `source` onto `quad` inside `target`.
///
/// Pixels inside the (integer-cast) quad polygon come from the warped
/// source, every other pixel is copied from `target`. The output has the
/// target's size and channel count.
pub fn composite(
    target: &ColorImageView<'_>,
    source: &ColorImageView<'_>,
    quad: &Quad,
) -> Result<ColorImage, CompositeError> {
    composite_layers(target, source, quad).map(|layers| layers.output)
}

/// Same as [`composite`], also returning the homography, warp and mask.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "debug",
        skip(target, source, quad),
        fields(
            target_w = target.width,
            target_h = target.height,
            source_w = source.width,
            source_h = source.height
        )
    )
)]
pub fn composite_layers(
    target: &ColorImageView<'_>,
    source: &ColorImageView<'_>,
    quad: &Quad,
) -> Result<CompositeLayers, CompositeError> {
    if target.is_empty() {
        return Err(CompositeError::EmptyTarget);
    }
    if source.is_empty() {
        return Err(CompositeError::EmptySource);
    }
    if source.channels != target.channels {
        return Err(CompositeError::ChannelMismatch {
            source_channels: source.channels,
            target_channels: target.channels,
        });
    }

    let source_rect = Quad::from_size(source.width, source.height);
    let homography = homography_from_4pt(&source_rect.corners, &quad.corners)?;
    let warped = warp_perspective(source, &homography, target.width, target.height)?;

    let mask = polygon_mask(target.width, target.height, &quad.pixel_vertices());
    let masked_target = and_mask(target, &invert_mask(&mask));
    // The warp footprint follows the real-valued quad, the mask the truncated
    // one; clip the warp so nothing leaks outside the mask.
    let masked_warp = and_mask(&warped.view(), &mask);
    let output = or_images(&masked_warp.view(), &masked_target.view());

    Ok(CompositeLayers {
        homography,
        warped,
        mask,
        output,
    })
}
