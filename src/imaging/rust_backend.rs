//! Pure Rust image backend built on the `image` crate.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::ImageReader::into_dimensions` |
//! | Decode (JPEG, PNG, TIFF, WebP, BMP, GIF) | `image::ImageReader` with content sniffing |
//! | Encode → PNG | `image::codecs::png::PngEncoder` (lossless, RGBA) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (RGB, quality 95) |

use super::backend::{BackendError, Dimensions, ImageBackend, SourceImage};
use super::params::{Encoding, OutputFormat};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{
    ExtendedColorType, ImageEncoder, ImageFormat, ImageReader, Rgb, RgbImage, Rgba, RgbaImage,
};
use std::path::Path;
use std::sync::LazyLock;

/// Extensions whose decoders are compiled in.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
    ("bmp", ImageFormat::Bmp),
    ("gif", ImageFormat::Gif),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Open `path` and settle its format from content, falling back to the extension.
///
/// A file whose format can be determined neither way is not an image.
fn open_image(path: &Path) -> Result<ImageReader<std::io::BufReader<std::fs::File>>, BackendError> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    match reader.format() {
        Some(fmt) if fmt.reading_enabled() => Ok(reader),
        _ => {
            log::debug!(
                "{} matches none of: {}",
                path.display(),
                supported_input_extensions().join(", ")
            );
            Err(BackendError::NotAnImage(path.to_path_buf()))
        }
    }
}

fn encode_png(frame: &RgbaImage) -> Result<Vec<u8>, BackendError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(
            frame.as_raw(),
            frame.width(),
            frame.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| BackendError::EncodeFailed(format!("PNG encode failed: {}", e)))?;
    Ok(bytes)
}

/// Composite a frame over black, the way a canvas export flattens alpha.
fn flatten_onto_black(frame: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(frame.width(), frame.height(), |x, y| {
        let Rgba([r, g, b, a]) = *frame.get_pixel(x, y);
        let scale = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
        Rgb([scale(r), scale(g), scale(b)])
    })
}

/// JPEG has no alpha channel; the frame is flattened onto black first.
fn encode_jpeg(frame: &RgbaImage, quality: u8) -> Result<Vec<u8>, BackendError> {
    let rgb = flatten_onto_black(frame);
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| BackendError::EncodeFailed(format!("JPEG encode failed: {}", e)))?;
    Ok(bytes)
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = open_image(path)?.into_dimensions().map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
        })?;
        Ok(Dimensions { width, height })
    }

    fn load(&self, path: &Path) -> Result<SourceImage, BackendError> {
        let decoded = open_image(path)?.decode().map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })?;
        log::debug!(
            "decoded {} ({}x{})",
            path.display(),
            decoded.width(),
            decoded.height()
        );
        SourceImage::new(decoded.into_rgba8())
    }

    fn encode(&self, frame: &RgbaImage, format: OutputFormat) -> Result<Vec<u8>, BackendError> {
        if frame.width() == 0 || frame.height() == 0 {
            return Err(BackendError::EncodeFailed(format!(
                "cannot encode an empty {}x{} frame",
                frame.width(),
                frame.height()
            )));
        }
        match format.encoding {
            Encoding::Png => encode_png(frame),
            Encoding::Jpeg => encode_jpeg(frame, format.quality.percent()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{gradient_frame, write_test_png};

    #[test]
    fn supported_extensions_match_decodable_formats() {
        let exts = supported_input_extensions();
        for expected in &["jpg", "jpeg", "png", "tif", "tiff", "webp", "bmp", "gif"] {
            assert!(
                exts.contains(expected),
                "expected {expected} in supported extensions"
            );
        }
    }

    #[test]
    fn identify_synthetic_png() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.png");
        write_test_png(&path, 200, 150);

        let backend = RustBackend::new();
        assert_eq!(backend.identify(&path).unwrap(), Dimensions::new(200, 150));
    }

    #[test]
    fn identify_nonexistent_file_errors() {
        let backend = RustBackend::new();
        let result = backend.identify(Path::new("/nonexistent/image.jpg"));
        assert!(matches!(result, Err(BackendError::Io(_))));
    }

    #[test]
    fn load_sniffs_content_over_extension() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("upload.bin");
        write_test_png(&path, 30, 20);

        let source = RustBackend::new().load(&path).unwrap();
        assert_eq!(source.dimensions(), Dimensions::new(30, 20));
    }

    #[test]
    fn load_rejects_non_image() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("notes.txt");
        std::fs::write(&path, "definitely not pixels").unwrap();

        let err = RustBackend::new().load(&path).unwrap_err();
        assert!(matches!(err, BackendError::NotAnImage(_)));
        assert!(err.to_string().starts_with("Please select a valid image file"));
    }

    #[test]
    fn load_corrupt_image_fails_decode() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("broken.png");
        std::fs::write(&path, "definitely not pixels").unwrap();

        let err = RustBackend::new().load(&path).unwrap_err();
        assert!(matches!(err, BackendError::ProcessingFailed(_)));
    }

    #[test]
    fn png_encode_is_lossless() {
        let frame = gradient_frame(64, 48);
        let bytes = RustBackend::new().encode(&frame, OutputFormat::PNG).unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap().into_rgba8();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn jpeg_encode_preserves_dimensions() {
        let frame = gradient_frame(64, 48);
        let bytes = RustBackend::new()
            .encode(&frame, OutputFormat::JPEG)
            .unwrap();

        assert_eq!(
            image::guess_format(&bytes).unwrap(),
            image::ImageFormat::Jpeg
        );
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
    }

    #[test]
    fn flatten_composites_alpha_over_black() {
        let mut frame = RgbaImage::from_pixel(2, 1, Rgba([255, 0, 0, 0]));
        frame.put_pixel(1, 0, Rgba([255, 255, 255, 128]));

        let flat = flatten_onto_black(&frame);
        assert_eq!(*flat.get_pixel(0, 0), Rgb([0, 0, 0]));
        assert_eq!(*flat.get_pixel(1, 0), Rgb([128, 128, 128]));
    }

    #[test]
    fn jpeg_hides_colour_under_transparency() {
        let mut frame = RgbaImage::from_pixel(32, 16, Rgba([255, 0, 0, 0]));
        for y in 0..16 {
            for x in 16..32 {
                frame.put_pixel(x, y, Rgba([255, 255, 255, 128]));
            }
        }
        let bytes = RustBackend::new()
            .encode(&frame, OutputFormat::JPEG)
            .unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().into_rgb8();

        let Rgb([r, g, b]) = *decoded.get_pixel(4, 8);
        assert!(r < 8 && g < 8 && b < 8, "transparent red came back as {r},{g},{b}");
        let Rgb([r, _, _]) = *decoded.get_pixel(28, 8);
        assert!((120..=136).contains(&r), "half-transparent white came back as {r}");
    }

    #[test]
    fn encode_empty_frame_errors() {
        let result = RustBackend::new().encode(&RgbaImage::new(0, 0), OutputFormat::PNG);
        assert!(matches!(result, Err(BackendError::EncodeFailed(_))));
    }
}
