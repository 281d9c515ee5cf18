use crate::{sample_bilinear_clamped, ColorImage, ColorImageView, Homography, HomographyError};

// Slack on the source rectangle bounds to absorb solve round-off.
const FOOTPRINT_EPS: f64 = 1e-6;

/// Warp `src` into an `out_w × out_h` canvas, where `h_dst_from_src` maps
/// source pixels into canvas pixels.
///
/// Every canvas pixel is pulled back through the inverse transform. Pixels
/// whose pre-image falls outside the closed source rectangle `[0,w]×[0,h]`
/// stay zero; the rest are sampled bilinearly with edge replication, so the
/// non-zero footprint is exactly the image of the source rectangle.
pub fn warp_perspective(
    src: &ColorImageView<'_>,
    h_dst_from_src: &Homography,
    out_w: usize,
    out_h: usize,
) -> Result<ColorImage, HomographyError> {
    let h_src_from_dst = h_dst_from_src
        .inverse()
        .ok_or(HomographyError::Singular)?;

    let mut out = ColorImage::zeros(out_w, out_h, src.channels);
    if src.is_empty() {
        return Ok(out);
    }

    let max_x = src.width as f64 + FOOTPRINT_EPS;
    let max_y = src.height as f64 + FOOTPRINT_EPS;

    for y in 0..out_h {
        for x in 0..out_w {
            let Some(p) = h_src_from_dst.apply_f64(x as f64, y as f64) else {
                continue;
            };
            if p.x < -FOOTPRINT_EPS || p.y < -FOOTPRINT_EPS || p.x > max_x || p.y > max_y {
                continue;
            }
            sample_bilinear_clamped(src, p.x, p.y, out.pixel_mut(x, y));
        }
    }

    Ok(out)
}
