//! Shared test utilities for the trisplit test suite.
//!
//! Synthetic images only; nothing here reads fixtures from disk.
//!
//! # Column coding
//!
//! [`column_coded_source`] paints every pixel's red channel with the index of
//! the column it belongs to (times [`COLUMN_STEP`]), so a rendered or encoded
//! segment can be traced back to the column it was cut from:
//!
//! ```ignore
//! let source = column_coded_source(1500, 900);
//! assert_eq!(column_of(source.pixels().get_pixel(1200, 10)), 2);
//! ```

use crate::imaging::SourceImage;
use crate::imaging::calculations::column_bounds;
use image::{ImageEncoder, Rgba, RgbaImage};
use std::path::Path;

/// Red-channel step between neighbouring columns.
pub const COLUMN_STEP: u8 = 100;

/// An opaque RGBA gradient of the given size.
pub fn gradient_frame(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    })
}

/// A source whose red channel encodes the column index of each pixel.
pub fn column_coded_source(width: u32, height: u32) -> SourceImage {
    let (second_left, _) = column_bounds(width, 1);
    let (third_left, _) = column_bounds(width, 2);
    let pixels = RgbaImage::from_fn(width, height, |x, y| {
        let column = if x < second_left {
            0
        } else if x < third_left {
            1
        } else {
            2
        };
        Rgba([column * COLUMN_STEP, (y % 256) as u8, 40, 255])
    });
    SourceImage::new(pixels).unwrap()
}

/// Recover the column index from a pixel painted by [`column_coded_source`].
///
/// Rounds to the nearest step so it survives lossy JPEG and resampling.
pub fn column_of(pixel: &Rgba<u8>) -> u8 {
    ((pixel[0] as f32) / COLUMN_STEP as f32).round() as u8
}

/// Write a gradient PNG to `path`.
pub fn write_test_png(path: &Path, width: u32, height: u32) {
    let img = gradient_frame(width, height);
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::png::PngEncoder::new(writer)
        .write_image(
            img.as_raw(),
            width,
            height,
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
}

/// Decode an encoded segment blob back into RGBA pixels.
pub fn decode_blob(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory(bytes).unwrap().into_rgba8()
}
