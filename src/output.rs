//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Split
//!
//! One header per run, one line per segment in the order encodes finish, and
//! a ready line once all three are in. The delivery summary follows.
//!
//! ```text
//! Grid 3:4 (1080×1440) • JPG (High Quality)
//!     Source: 1500×900
//!     002 2.jpg 1080×1440 (212.4 KB)
//!     001 1.jpg 1080×1440 (198.0 KB)
//!     003 3.jpg 1080×1440 (204.9 KB)
//! 3/3 segments ready
//! Archive → split/FarGonE_3split_grid.zip (611.8 KB)
//! ```
//!
//! When packaging fails the summary is the notice plus the individual files:
//!
//! ```text
//! Archive failed (disk full), saving files individually
//!     1.jpg → split/1.jpg
//!     ...
//! ```
//!
//! ## Plan
//!
//! ```text
//! Square
//!     Source: 1500×900
//!     001 column 0..500
//!         read 500×500 at (0, 200) → 500×500
//! ```
//!
//! # Architecture
//!
//! Each display has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::archive::Delivery;
use crate::imaging::{Dimensions, OutputFormat, SEGMENT_COUNT, SegmentSpec};
use crate::session::SplitEvent;
use crate::types::Mode;
use std::path::PathBuf;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte size.
fn format_bytes(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{} B", bytes)
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

/// Run header: mode title and format label.
///
/// ```text
/// Free Split • JPG (High Quality)
/// ```
pub fn run_header(mode: Mode, format: OutputFormat) -> String {
    format!("{} \u{2022} {}", mode.title(), format.label())
}

// ============================================================================
// Split progress
// ============================================================================

/// Format a single split progress event as display lines.
pub fn format_split_event(event: &SplitEvent) -> Vec<String> {
    match event {
        SplitEvent::RunStarted {
            mode,
            format,
            source,
            ..
        } => vec![
            run_header(*mode, *format),
            format!("{}Source: {}", indent(1), source),
        ],
        SplitEvent::SegmentEncoded {
            index,
            name,
            size,
            bytes,
            ..
        } => vec![format!(
            "{}{} {} {} ({})",
            indent(1),
            format_index(index + 1),
            name,
            size,
            format_bytes(*bytes)
        )],
        SplitEvent::RunFinalized { .. } => {
            vec![format!("{0}/{0} segments ready", SEGMENT_COUNT)]
        }
    }
}

// ============================================================================
// Delivery
// ============================================================================

/// Format where a delivery ended up. `paths` are the written files, in
/// delivery order.
pub fn format_delivery(delivery: &Delivery, paths: &[PathBuf]) -> Vec<String> {
    match delivery {
        Delivery::Archive { bytes, .. } => paths
            .iter()
            .map(|p| format!("Archive \u{2192} {} ({})", p.display(), format_bytes(bytes.len())))
            .collect(),
        Delivery::Individual { files, notice } => {
            let mut lines = vec![notice.clone()];
            for (file, path) in files.iter().zip(paths) {
                lines.push(format!(
                    "{}{} \u{2192} {}",
                    indent(1),
                    file.name,
                    path.display()
                ));
            }
            lines
        }
    }
}

/// Print a delivery summary to stdout.
pub fn print_delivery(delivery: &Delivery, paths: &[PathBuf]) {
    for line in format_delivery(delivery, paths) {
        println!("{}", line);
    }
}

// ============================================================================
// Plan
// ============================================================================

/// Format the geometry of a split without encoding anything.
pub fn format_plan(mode: Mode, source: Dimensions, specs: &[SegmentSpec]) -> Vec<String> {
    let mut lines = vec![
        mode.title().to_string(),
        format!("{}Source: {}", indent(1), source),
    ];
    for spec in specs {
        lines.push(format!(
            "{}{} column {}..{}",
            indent(1),
            format_index(spec.index + 1),
            spec.column.x,
            spec.column.right()
        ));
        let src = spec.source_rect;
        let mut detail = format!(
            "{}read {} at ({}, {}) \u{2192} {}",
            indent(2),
            src.size(),
            src.x,
            src.y,
            spec.output_size
        );
        if spec.placement.size() != spec.output_size {
            detail.push_str(&format!(
                ", placed {} at ({}, {})",
                spec.placement.size(),
                spec.placement.x,
                spec.placement.y
            ));
        }
        lines.push(detail);
    }
    lines
}

/// Print the plan to stdout.
pub fn print_plan(mode: Mode, source: Dimensions, specs: &[SegmentSpec]) {
    for line in format_plan(mode, source, specs) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
