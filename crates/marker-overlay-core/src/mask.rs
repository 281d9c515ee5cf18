//! Binary polygon masks and the bitwise operations used to blend with them.
//!
//! Masks are single-channel; when combined with a multi-channel image the
//! mask byte is applied to every channel of the pixel.

use crate::{ColorImage, ColorImageView, GrayImage};
use nalgebra::Point2;

/// Fill a polygon into `mask`, boundary pixels included.
///
/// Each row is filled between the leftmost and rightmost crossing of the
/// polygon edges, which is exact for convex polygons. Non-convex or
/// self-intersecting input gets that same span per row, holes included.
pub fn fill_convex_poly(mask: &mut GrayImage, vertices: &[Point2<i32>], value: u8) {
    if vertices.is_empty() || mask.width == 0 || mask.height == 0 {
        return;
    }

    let y_min = vertices.iter().map(|p| p.y).min().unwrap_or(0).max(0);
    let y_max = vertices
        .iter()
        .map(|p| p.y)
        .max()
        .unwrap_or(-1)
        .min(mask.height as i32 - 1);

    let n = vertices.len();
    for y in y_min..=y_max {
        let mut left = f64::INFINITY;
        let mut right = f64::NEG_INFINITY;

        for i in 0..n {
            let a = vertices[i];
            let b = vertices[(i + 1) % n];
            if y < a.y.min(b.y) || y > a.y.max(b.y) {
                continue;
            }
            if a.y == b.y {
                left = left.min(a.x.min(b.x) as f64);
                right = right.max(a.x.max(b.x) as f64);
                continue;
            }
            // i64: vertices may sit at the i32 limits after casting.
            let t = (y as i64 - a.y as i64) as f64 / (b.y as i64 - a.y as i64) as f64;
            let x = a.x as f64 + t * (b.x as i64 - a.x as i64) as f64;
            left = left.min(x);
            right = right.max(x);
        }

        if left > right {
            continue;
        }
        let x0 = (left.round() as i64).max(0);
        let x1 = (right.round() as i64).min(mask.width as i64 - 1);
        if x0 > x1 {
            continue;
        }
        let row = y as usize * mask.width;
        mask.data[row + x0 as usize..=row + x1 as usize].fill(value);
    }
}

/// `width × height` mask, 255 inside the polygon and 0 elsewhere.
pub fn polygon_mask(width: usize, height: usize, vertices: &[Point2<i32>]) -> GrayImage {
    let mut mask = GrayImage::zeros(width, height);
    fill_convex_poly(&mut mask, vertices, 255);
    mask
}

/// Bitwise NOT of every mask byte.
pub fn invert_mask(mask: &GrayImage) -> GrayImage {
    GrayImage {
        width: mask.width,
        height: mask.height,
        data: mask.data.iter().map(|v| !v).collect(),
    }
}

/// Per-pixel `image AND mask`, with the mask byte replicated across channels.
///
/// Panics if the spatial sizes differ.
pub fn and_mask(image: &ColorImageView<'_>, mask: &GrayImage) -> ColorImage {
    assert!(
        image.width == mask.width && image.height == mask.height,
        "mask {}x{} does not match image {}x{}",
        mask.width,
        mask.height,
        image.width,
        image.height
    );

    let c = image.channels;
    let mut out = ColorImage::zeros(image.width, image.height, c);
    if c == 0 {
        return out;
    }
    for ((dst, src), &m) in out
        .data
        .chunks_exact_mut(c)
        .zip(image.data.chunks_exact(c))
        .zip(mask.data.iter())
    {
        for (d, s) in dst.iter_mut().zip(src) {
            *d = s & m;
        }
    }
    out
}

/// Per-byte `a OR b`.
///
/// Panics if the shapes differ.
pub fn or_images(a: &ColorImageView<'_>, b: &ColorImageView<'_>) -> ColorImage {
    assert!(
        a.width == b.width && a.height == b.height && a.channels == b.channels,
        "image shapes differ: {}x{}x{} vs {}x{}x{}",
        a.width,
        a.height,
        a.channels,
        b.width,
        b.height,
        b.channels
    );

    ColorImage {
        width: a.width,
        height: a.height,
        channels: a.channels,
        data: a.data.iter().zip(b.data).map(|(x, y)| x | y).collect(),
    }
}
