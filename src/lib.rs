//! # trisplit
//!
//! Slices one image into three vertical panels for a tri-panel social media
//! grid, re-frames every panel the same way, encodes the three in parallel,
//! and bundles them into one archive.
//!
//! # Architecture: One Run, Three Segments
//!
//! ```text
//! SourceImage ─ calculations ─ [SegmentSpec; 3]
//!                                  │  render (sequential, index 0, 1, 2)
//!                                  ▼
//!                      encode on rayon pool (any completion order)
//!                                  │  run-tagged Completion
//!                                  ▼
//!                      RunCollector (count to 3 for *this* run)
//!                                  │
//!                                  ▼
//!                      SplitRun ─ Packager ─ Delivery (zip or 3 files)
//! ```
//!
//! Changing the image, the mode, or the PNG toggle starts a new run. Results
//! of the previous run may still arrive; they carry the old run id and are
//! dropped.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Segment geometry, frame rendering, PNG/JPEG encoding behind [`imaging::ImageBackend`] |
//! | [`session`] | Split orchestration: run identity, completion gate, progress events |
//! | [`archive`] | Zip packaging with per-file fallback |
//! | [`report`] | JSON report of a finalized run |
//! | [`config`] | `trisplit.toml` loading, merging and validation |
//! | [`naming`] | Segment, archive and report file names |
//! | [`types`] | [`types::Mode`], the re-framing policy |
//! | [`output`] | CLI output formatting |
//!
//! # Modes
//!
//! | Mode | Output per segment |
//! |------|--------------------|
//! | Free | the column as-is |
//! | Grid | 1080×1440, a centred 3:4 crop of the column scaled up or down |
//! | Square | a centred square, side `min(column width, height)`, not scaled |
//!
//! The third column absorbs the remainder of `width / 3`, so the three
//! columns always cover the full width.
//!
//! # Pure-Rust Imaging
//!
//! Decoding, resampling (Lanczos3) and encoding all come from the `image`
//! crate. No system libraries, no external tools.

pub mod archive;
pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod report;
pub mod session;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
