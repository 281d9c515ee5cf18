//! Interleaved 8-bit pixel buffers.
//!
//! `ColorImage` stores `height × width × channels` bytes in row-major order,
//! which is the layout of decoded RGB/BGR frames. `GrayImage` is the
//! single-channel variant used for masks.

#[derive(Clone, Copy, Debug)]
pub struct ColorImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub data: &'a [u8], // row-major, len = w*h*c
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorImage {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub data: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl ColorImage {
    /// All-zero image of the given shape.
    pub fn zeros(width: usize, height: usize, channels: usize) -> Self {
        Self {
            width,
            height,
            channels,
            data: vec![0u8; width * height * channels],
        }
    }

    /// Image filled with one pixel value; `pixel.len()` sets the channel count.
    pub fn filled(width: usize, height: usize, pixel: &[u8]) -> Self {
        let mut data = Vec::with_capacity(width * height * pixel.len());
        for _ in 0..width * height {
            data.extend_from_slice(pixel);
        }
        Self {
            width,
            height,
            channels: pixel.len(),
            data,
        }
    }

    /// Wrap an existing buffer, checking its length against the shape.
    pub fn from_raw(width: usize, height: usize, channels: usize, data: Vec<u8>) -> Option<Self> {
        let expected = width.checked_mul(height)?.checked_mul(channels)?;
        (data.len() == expected).then_some(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn view(&self) -> ColorImageView<'_> {
        ColorImageView {
            width: self.width,
            height: self.height,
            channels: self.channels,
            data: &self.data,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let i = (y * self.width + x) * self.channels;
        &self.data[i..i + self.channels]
    }

    #[inline]
    pub fn pixel_mut(&mut self, x: usize, y: usize) -> &mut [u8] {
        let i = (y * self.width + x) * self.channels;
        &mut self.data[i..i + self.channels]
    }
}

impl ColorImageView<'_> {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let i = (y * self.width + x) * self.channels;
        &self.data[i..i + self.channels]
    }
}

impl GrayImage {
    pub fn zeros(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width * height],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }
}

#[inline]
fn get_clamped(src: &ColorImageView<'_>, x: i64, y: i64, c: usize) -> f64 {
    let xc = x.clamp(0, src.width as i64 - 1) as usize;
    let yc = y.clamp(0, src.height as i64 - 1) as usize;
    src.data[(yc * src.width + xc) * src.channels + c] as f64
}

/// Bilinear sample at `(x, y)` with pixel centres on integer coordinates.
///
/// Out-of-range neighbours replicate the nearest edge pixel. `out` must hold
/// `src.channels` values. The source must be non-empty.
#[inline]
pub fn sample_bilinear_clamped(src: &ColorImageView<'_>, x: f64, y: f64, out: &mut [u8]) {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    for (c, o) in out.iter_mut().enumerate().take(src.channels) {
        let p00 = get_clamped(src, x0, y0, c);
        let p10 = get_clamped(src, x0 + 1, y0, c);
        let p01 = get_clamped(src, x0, y0 + 1, c);
        let p11 = get_clamped(src, x0 + 1, y0 + 1, c);

        let a = p00 + fx * (p10 - p00);
        let b = p01 + fx * (p11 - p01);
        *o = (a + fy * (b - a)).round().clamp(0.0, 255.0) as u8;
    }
}
