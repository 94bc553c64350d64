//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify / decode** | `image::ImageReader` with content sniffing |
//! | **Region math** | [`calculations`], pure |
//! | **Render** | `imageops::crop_imm` + `resize` (Lanczos3) + `replace` |
//! | **Encode** | `PngEncoder` (lossless) / `JpegEncoder` (quality 95) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for segment geometry (unit + property tested)
//! - **Parameters**: Output format and quality
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Frame rendering from a [`SegmentSpec`]

pub mod backend;
pub mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, SourceImage};
pub use calculations::{
    GRID_CANVAS, GeometryError, Rect, SEGMENT_COUNT, SegmentSpec, ShortSourcePolicy,
    calculate_segment, calculate_segments,
};
pub use operations::render_frame;
pub use params::{Encoding, OutputFormat, Quality};
pub use rust_backend::RustBackend;
