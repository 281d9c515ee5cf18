//! Recorded frame sequences on disk.
//!
//! A sequence is a directory of images played back in file-name order. A
//! frame `0042.png` may carry its detections in a sidecar `0042.json`
//! (same format as [`crate::load_detections`]); frames without one are
//! handed to the live loop's detector.

use crate::config::load_detections;
use crate::core::ColorImage;
use crate::image_io::{load_color, resize_to_width, save_color};
use crate::live::{Frame, FrameSink, FrameSource};
use crate::OverlayIoError;
use std::{
    fs,
    path::{Path, PathBuf},
};

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// Frame source reading images from a directory.
#[derive(Clone, Debug)]
pub struct ImageSequence {
    paths: Vec<PathBuf>,
    next: usize,
    resize_width: Option<u32>,
}

impl ImageSequence {
    /// List the images in `dir`, sorted by file name.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, OverlayIoError> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && is_image(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(Self {
            paths,
            next: 0,
            resize_width: None,
        })
    }

    /// Resize every frame to `width` before it is returned.
    ///
    /// Sidecar detections are expected in the resized pixel frame.
    pub fn with_resize_width(mut self, width: Option<u32>) -> Self {
        self.resize_width = width;
        self
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FrameSource for ImageSequence {
    type Error = OverlayIoError;

    fn next_frame(&mut self) -> Result<Option<Frame>, OverlayIoError> {
        let Some(path) = self.paths.get(self.next) else {
            return Ok(None);
        };
        self.next += 1;

        let mut image = load_color(path)?;
        if let Some(width) = self.resize_width {
            image = resize_to_width(image, width)?;
        }

        let sidecar = path.with_extension("json");
        let markers = if sidecar.is_file() {
            Some(load_detections(&sidecar)?)
        } else {
            None
        };
        log::trace!(
            "loaded {} ({}x{}, sidecar: {})",
            path.display(),
            image.width,
            image.height,
            markers.is_some()
        );

        Ok(Some(Frame { image, markers }))
    }
}

/// Frame sink writing `<dir>/<index>.png`, numbered from zero.
#[derive(Clone, Debug)]
pub struct ImageDirectorySink {
    dir: PathBuf,
    written: usize,
}

impl ImageDirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: 0,
        }
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

impl FrameSink for ImageDirectorySink {
    type Error = OverlayIoError;

    fn show(&mut self, frame: &ColorImage) -> Result<(), OverlayIoError> {
        let path = self.dir.join(format!("{:05}.png", self.written));
        save_color(&path, frame)?;
        self.written += 1;
        Ok(())
    }
}
