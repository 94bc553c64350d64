//! Image backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations the split pipeline
//! needs from an image library: identify, load (acquisition) and encode.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests swap in the recording [`tests::MockBackend`].

use super::params::OutputFormat;
use image::RgbaImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Please select a valid image file: {}", .0.display())]
    NotAnImage(PathBuf),
    #[error("Image has no pixels ({width}x{height})")]
    Empty { width: u32, height: u32 },
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error("Encoding failed: {0}")]
    EncodeFailed(String),
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\u{d7}{}", self.width, self.height)
    }
}

/// A decoded source raster.
///
/// Immutable once loaded: the session shares it behind an `Arc` and replaces
/// it wholesale on a new upload. Both dimensions are at least 1.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    pixels: RgbaImage,
}

impl SourceImage {
    pub fn new(pixels: RgbaImage) -> Result<Self, BackendError> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(BackendError::Empty { width, height });
        }
        Ok(Self { pixels })
    }

    pub fn dimensions(&self) -> Dimensions {
        let (width, height) = self.pixels.dimensions();
        Dimensions { width, height }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Trait for image backends.
///
/// `Send + Sync` because encode calls run on the rayon pool while the session
/// keeps its own handle.
pub trait ImageBackend: Send + Sync {
    /// Read image dimensions without a full decode.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Validate that `path` is an image and decode it.
    ///
    /// Non-image input fails with [`BackendError::NotAnImage`].
    fn load(&self, path: &Path) -> Result<SourceImage, BackendError>;

    /// Encode a rendered frame. The encoded image keeps the frame's dimensions.
    fn encode(&self, frame: &RgbaImage, format: OutputFormat) -> Result<Vec<u8>, BackendError>;
}
