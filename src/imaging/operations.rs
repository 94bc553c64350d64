//! Frame rendering.
//!
//! Turns a [`SegmentSpec`] into pixels: reads `source_rect` from the source
//! and draws it at `placement` inside a freshly allocated frame of
//! `output_size`. Grid frames are resampled with Lanczos3; free and square
//! frames are copied 1:1.

use super::backend::{BackendError, SourceImage};
use super::calculations::SegmentSpec;
use image::RgbaImage;
use image::imageops::{self, FilterType};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Render one segment into a new frame of exactly `spec.output_size`.
///
/// Every call allocates its own transparent frame, so nothing from a previous
/// segment can show through. Pixels outside `placement` stay transparent.
pub fn render_frame(source: &SourceImage, spec: &SegmentSpec) -> Result<RgbaImage> {
    let bounds = source.dimensions();
    let src = spec.source_rect;
    if !src.fits_within(bounds) || src.width == 0 || src.height == 0 {
        return Err(BackendError::ProcessingFailed(format!(
            "segment {} reads {}x{} at ({}, {}) outside a {} source",
            spec.index + 1,
            src.width,
            src.height,
            src.x,
            src.y,
            bounds
        )));
    }

    let mut frame = RgbaImage::new(spec.output_size.width, spec.output_size.height);
    let region = imageops::crop_imm(source.pixels(), src.x, src.y, src.width, src.height).to_image();
    let at = spec.placement;

    if spec.is_scaled() {
        let scaled = imageops::resize(&region, at.width, at.height, FilterType::Lanczos3);
        imageops::replace(&mut frame, &scaled, at.x as i64, at.y as i64);
    } else {
        imageops::replace(&mut frame, &region, at.x as i64, at.y as i64);
    }

    Ok(frame)
}
