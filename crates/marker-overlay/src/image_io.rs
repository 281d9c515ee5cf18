//! Conversions between `image` crate buffers and [`ColorImage`], plus disk I/O.

use crate::core::{ColorImage, ColorImageView};
use crate::OverlayIoError;
use ::image::{imageops::FilterType, DynamicImage, ImageReader, RgbImage};
use std::{fs, path::Path};

/// Borrow an `image::RgbImage` as a 3-channel view.
pub fn rgb_view(img: &RgbImage) -> ColorImageView<'_> {
    ColorImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        channels: 3,
        data: img.as_raw(),
    }
}

/// Convert any decoded image into an 8-bit RGB [`ColorImage`].
pub fn color_from_dynamic(img: DynamicImage) -> ColorImage {
    let rgb = img.to_rgb8();
    let (w, h) = (rgb.width() as usize, rgb.height() as usize);
    ColorImage {
        width: w,
        height: h,
        channels: 3,
        data: rgb.into_raw(),
    }
}

/// Convert a [`ColorImage`] with 1, 3 or 4 channels into a `DynamicImage`.
pub fn color_to_dynamic(img: ColorImage) -> Result<DynamicImage, OverlayIoError> {
    let channels = img.channels;
    let (w, h) = (img.width as u32, img.height as u32);
    let converted = match channels {
        1 => ::image::GrayImage::from_raw(w, h, img.data).map(DynamicImage::ImageLuma8),
        3 => RgbImage::from_raw(w, h, img.data).map(DynamicImage::ImageRgb8),
        4 => ::image::RgbaImage::from_raw(w, h, img.data).map(DynamicImage::ImageRgba8),
        _ => None,
    };
    converted.ok_or(OverlayIoError::UnsupportedChannels { channels })
}

/// Decode an image file as RGB.
pub fn load_color(path: impl AsRef<Path>) -> Result<ColorImage, OverlayIoError> {
    Ok(color_from_dynamic(ImageReader::open(path)?.decode()?))
}

/// Encode `img` to `path` (format from the extension), creating parent directories.
pub fn save_color(path: impl AsRef<Path>, img: &ColorImage) -> Result<(), OverlayIoError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    color_to_dynamic(img.clone())?.save(path)?;
    Ok(())
}

/// Resize to `width` pixels wide keeping the aspect ratio (height truncated).
///
/// Returns the input unchanged when it already has that width or when
/// `width` is zero.
pub fn resize_to_width(img: ColorImage, width: u32) -> Result<ColorImage, OverlayIoError> {
    if width == 0 || img.width == width as usize || img.is_empty() {
        return Ok(img);
    }
    let ratio = width as f64 / img.width as f64;
    let height = ((img.height as f64 * ratio) as u32).max(1);

    let channels = img.channels;
    let resized = color_to_dynamic(img)?.resize_exact(width, height, FilterType::Triangle);
    let data = match channels {
        1 => resized.into_luma8().into_raw(),
        4 => resized.into_rgba8().into_raw(),
        _ => resized.into_rgb8().into_raw(),
    };
    Ok(ColorImage {
        width: width as usize,
        height: height as usize,
        channels,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_keeps_aspect_and_channels() {
        let img = ColorImage::filled(800, 533, &[12, 34, 56]);
        let out = resize_to_width(img, 600).unwrap();
        assert_eq!((out.width, out.height, out.channels), (600, 399, 3));
        assert_eq!(out.data.len(), 600 * 399 * 3);
    }

    #[test]
    fn resize_to_same_width_is_identity() {
        let img = ColorImage::filled(600, 10, &[1, 2, 3]);
        let out = resize_to_width(img.clone(), 600).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn png_round_trip_preserves_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/frame.png");
        let mut img = ColorImage::zeros(5, 4, 3);
        img.pixel_mut(2, 1).copy_from_slice(&[200, 100, 50]);

        save_color(&path, &img).unwrap();
        assert_eq!(load_color(&path).unwrap(), img);
    }

    #[test]
    fn two_channel_images_cannot_be_encoded() {
        let img = ColorImage::zeros(2, 2, 2);
        assert!(matches!(
            color_to_dynamic(img),
            Err(OverlayIoError::UnsupportedChannels { channels: 2 })
        ));
    }

    #[test]
    fn rgb_view_borrows_raw_buffer() {
        let img = RgbImage::from_pixel(3, 2, ::image::Rgb([9, 8, 7]));
        let view = rgb_view(&img);
        assert_eq!((view.width, view.height, view.channels), (3, 2, 3));
        assert_eq!(view.pixel(2, 1), &[9, 8, 7]);
    }
}
