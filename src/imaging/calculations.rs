//! Pure region math for the three-way split.
//!
//! All functions here are pure and testable without any I/O or images:
//! identical inputs always yield identical rectangles.
//!
//! ## Columns
//!
//! The source is cut into three vertical columns. With `part = floor(w / 3)`,
//! column `i` starts at `i * part`; the first two are `part` wide and the last
//! one runs to the right edge, absorbing the remainder of the division:
//!
//! ```text
//! w = 1501, part = 500
//! | 0..500 | 500..1000 | 1000..1501 |
//! ```
//!
//! ## Re-framing per mode
//!
//! | Mode | Source rect | Output |
//! |---|---|---|
//! | Free | the whole column | column size |
//! | Grid | column width, 3:4 height, vertically centred | 1080×1440 (scaled) |
//! | Square | `min(column width, h)` square, centred | that square (1:1) |
//!
//! A grid column whose 3:4 height exceeds the source height is resolved by
//! [`ShortSourcePolicy`].

use super::backend::Dimensions;
use crate::types::Mode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of segments a source is cut into.
pub const SEGMENT_COUNT: usize = 3;

/// Fixed output canvas of grid mode (3:4 portrait).
pub const GRID_CANVAS: Dimensions = Dimensions {
    width: 1080,
    height: 1440,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("Source is {width}px wide; at least 3px are needed for three segments")]
    TooNarrow { width: u32 },
    #[error("Segment index {0} out of range (expected 0-2)")]
    IndexOutOfRange(usize),
    #[error(
        "Segment {} needs {required}px of height for a 3:4 frame but the source is only {available}px tall",
        .index + 1
    )]
    ShortSource {
        index: usize,
        required: u32,
        available: u32,
    },
}

/// Pixel rectangle; `x`/`y` are the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn size(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// Exclusive right edge, saturating at `u32::MAX`.
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge, saturating at `u32::MAX`.
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Whether this rectangle lies entirely inside a `bounds`-sized image.
    pub fn fits_within(&self, bounds: Dimensions) -> bool {
        self.right() <= bounds.width && self.bottom() <= bounds.height
    }
}

/// What to do in grid mode when a column is too short for a 3:4 frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShortSourcePolicy {
    /// Keep the full height and crop the column's width to 3:4, centred.
    #[default]
    Crop,
    /// Scale the whole column to the canvas width and centre it vertically.
    Pad,
    /// Refuse to split.
    Reject,
}

/// Geometry of one output segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SegmentSpec {
    /// Fixed position, 0..3. Determines the file name.
    pub index: usize,
    /// The column this segment was cut from. Columns tile `[0, w)` exactly.
    pub column: Rect,
    /// Source pixels actually read, always inside the source image.
    pub source_rect: Rect,
    /// Size of the rendered output frame.
    pub output_size: Dimensions,
    /// Where `source_rect` is drawn inside the output frame.
    pub placement: Rect,
}

impl SegmentSpec {
    /// Whether rendering needs resampling rather than a 1:1 copy.
    pub fn is_scaled(&self) -> bool {
        self.source_rect.size() != self.placement.size()
    }
}

/// Column bounds for segment `index` of a `width`-wide source.
///
/// Returns `(left, segment_width)`. The last column absorbs the remainder.
pub fn column_bounds(width: u32, index: usize) -> (u32, u32) {
    let part = width / SEGMENT_COUNT as u32;
    let left = index as u32 * part;
    let right = if index == SEGMENT_COUNT - 1 {
        width
    } else {
        left + part
    };
    (left, right - left)
}

/// Height that, paired with `segment_width`, gives a 1080:1440 frame.
pub fn grid_target_height(segment_width: u32) -> u32 {
    (segment_width as f64 * GRID_CANVAS.height as f64 / GRID_CANVAS.width as f64).round() as u32
}

/// Calculate the geometry of one segment.
///
/// # Examples
/// ```
/// # use trisplit::imaging::{calculate_segment, Dimensions, Rect, ShortSourcePolicy};
/// # use trisplit::types::Mode;
/// let spec = calculate_segment(
///     Dimensions::new(1500, 900),
///     Mode::Square,
///     1,
///     ShortSourcePolicy::Crop,
/// )
/// .unwrap();
/// assert_eq!(spec.source_rect, Rect::new(500, 200, 500, 500));
/// assert_eq!(spec.output_size, Dimensions::new(500, 500));
/// ```
pub fn calculate_segment(
    source: Dimensions,
    mode: Mode,
    index: usize,
    policy: ShortSourcePolicy,
) -> Result<SegmentSpec, GeometryError> {
    if index >= SEGMENT_COUNT {
        return Err(GeometryError::IndexOutOfRange(index));
    }
    if source.width < SEGMENT_COUNT as u32 {
        return Err(GeometryError::TooNarrow {
            width: source.width,
        });
    }

    let h = source.height;
    let (left, segment_width) = column_bounds(source.width, index);
    let column = Rect::new(left, 0, segment_width, h);

    let spec = match mode {
        Mode::Free => SegmentSpec {
            index,
            column,
            source_rect: column,
            output_size: column.size(),
            placement: Rect::new(0, 0, segment_width, h),
        },
        Mode::Grid => grid_segment(index, column, policy)?,
        Mode::Square => {
            let side = segment_width.min(h);
            let top = (h - side) / 2;
            // Only non-zero when the column is wider than the image is tall
            let inset = (segment_width - side) / 2;
            SegmentSpec {
                index,
                column,
                source_rect: Rect::new(left + inset, top, side, side),
                output_size: Dimensions::new(side, side),
                placement: Rect::new(0, 0, side, side),
            }
        }
    };

    Ok(spec)
}

fn grid_segment(
    index: usize,
    column: Rect,
    policy: ShortSourcePolicy,
) -> Result<SegmentSpec, GeometryError> {
    let h = column.height;
    let segment_width = column.width;
    let target_height = grid_target_height(segment_width);
    let canvas = Rect::new(0, 0, GRID_CANVAS.width, GRID_CANVAS.height);

    if target_height <= h {
        let top = (h - target_height) / 2;
        return Ok(SegmentSpec {
            index,
            column,
            source_rect: Rect::new(column.x, top, segment_width, target_height),
            output_size: GRID_CANVAS,
            placement: canvas,
        });
    }

    match policy {
        ShortSourcePolicy::Crop => {
            let crop_width = ((h as u64 * GRID_CANVAS.width as u64 / GRID_CANVAS.height as u64)
                as u32)
                .clamp(1, segment_width);
            let inset = (segment_width - crop_width) / 2;
            Ok(SegmentSpec {
                index,
                column,
                source_rect: Rect::new(column.x + inset, 0, crop_width, h),
                output_size: GRID_CANVAS,
                placement: canvas,
            })
        }
        ShortSourcePolicy::Pad => {
            let scaled_height = ((h as f64 * GRID_CANVAS.width as f64 / segment_width as f64)
                .round() as u32)
                .clamp(1, GRID_CANVAS.height);
            let top = (GRID_CANVAS.height - scaled_height) / 2;
            Ok(SegmentSpec {
                index,
                column,
                source_rect: column,
                output_size: GRID_CANVAS,
                placement: Rect::new(0, top, GRID_CANVAS.width, scaled_height),
            })
        }
        ShortSourcePolicy::Reject => Err(GeometryError::ShortSource {
            index,
            required: target_height,
            available: h,
        }),
    }
}

/// Calculate all three segments in index order.
pub fn calculate_segments(
    source: Dimensions,
    mode: Mode,
    policy: ShortSourcePolicy,
) -> Result<[SegmentSpec; SEGMENT_COUNT], GeometryError> {
    Ok([
        calculate_segment(source, mode, 0, policy)?,
        calculate_segment(source, mode, 1, policy)?,
        calculate_segment(source, mode, 2, policy)?,
    ])
}
