//! Parameter types for segment encoding.
//!
//! These describe *what* to produce, not *how*. The orchestrator picks an
//! [`OutputFormat`] once per run and hands it to the
//! [`backend`](super::backend) for every segment.
//!
//! ## Types
//!
//! - [`Quality`]: encoder quality in `[0, 1]`. Clamped on construction.
//! - [`Encoding`]: PNG or JPEG.
//! - [`OutputFormat`]: encoding plus its fixed quality. Built from the single
//!   PNG toggle; there is no other way to pick a quality.

use serde::{Deserialize, Serialize};

/// Encoder quality in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quality(f32);

impl Quality {
    /// Quality used for the lossless PNG path.
    pub const LOSSLESS: Quality = Quality(1.0);
    /// Quality used for JPEG output.
    pub const HIGH: Quality = Quality(0.95);

    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::LOSSLESS;
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Quality as a 1–100 percentage, the scale JPEG encoders take.
    pub fn percent(self) -> u8 {
        ((self.0 * 100.0).round() as u8).max(1)
    }
}

/// Image encoding of every segment in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Png,
    Jpeg,
}

impl Encoding {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Encoding::Png => "png",
            Encoding::Jpeg => "jpg",
        }
    }
}

/// Encoding and quality for a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputFormat {
    pub encoding: Encoding,
    pub quality: Quality,
}

impl OutputFormat {
    pub const PNG: OutputFormat = OutputFormat {
        encoding: Encoding::Png,
        quality: Quality::LOSSLESS,
    };

    pub const JPEG: OutputFormat = OutputFormat {
        encoding: Encoding::Jpeg,
        quality: Quality::HIGH,
    };

    /// Resolve the format from the PNG toggle.
    pub fn from_png_flag(png: bool) -> Self {
        if png { Self::PNG } else { Self::JPEG }
    }

    pub fn is_png(self) -> bool {
        self.encoding == Encoding::Png
    }

    /// Short label shown next to the mode title.
    pub fn label(self) -> &'static str {
        match self.encoding {
            Encoding::Png => "PNG (100% Lossless)",
            Encoding::Jpeg => "JPG (High Quality)",
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::JPEG
    }
}
