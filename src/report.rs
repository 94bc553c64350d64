//! JSON report describing a finalized run.
//!
//! Written next to the delivery with `--report`. Each segment lists its
//! geometry, encoded size, and a SHA-256 of the encoded blob, so a delivery
//! can be checked against the run that produced it.

use crate::imaging::{Dimensions, Encoding, Rect};
use crate::session::SplitRun;
use crate::types::Mode;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct SplitReport {
    pub source: Dimensions,
    pub mode: Mode,
    pub encoding: Encoding,
    /// Archive file name, or `None` when the files were delivered individually.
    pub archive: Option<String>,
    pub segments: Vec<SegmentReport>,
}

#[derive(Debug, Serialize)]
pub struct SegmentReport {
    pub name: String,
    pub column: Rect,
    pub source_rect: Rect,
    pub output_size: Dimensions,
    pub bytes: usize,
    pub sha256: String,
}

impl SplitReport {
    pub fn new(run: &SplitRun, archive: Option<&str>) -> Self {
        Self {
            source: run.source,
            mode: run.mode,
            encoding: run.format.encoding,
            archive: archive.map(str::to_string),
            segments: run
                .segments
                .iter()
                .map(|s| SegmentReport {
                    name: s.name.clone(),
                    column: s.spec.column,
                    source_rect: s.spec.source_rect,
                    output_size: s.spec.output_size,
                    bytes: s.blob.len(),
                    sha256: format!("{:x}", Sha256::digest(&s.blob)),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write the report as pretty JSON to `path`.
    pub fn write(&self, path: &Path) -> std::io::Result<()> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}
