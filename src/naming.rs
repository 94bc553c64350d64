//! File naming rules for segments, archives and reports.
//!
//! Segment names come from the segment's fixed index, never from the order in
//! which encodings finish:
//!
//! - index 0 → `1.jpg` / `1.png`
//! - index 1 → `2.jpg` / `2.png`
//! - index 2 → `3.jpg` / `3.png`
//!
//! Archives are named `{prefix}_{mode}{_PNG}.zip`, for example
//! `FarGonE_3split_grid_PNG.zip`. The `_PNG` marker only appears for PNG runs.

use crate::imaging::Encoding;
use crate::types::Mode;

/// Archive prefix used when the config does not override it.
pub const DEFAULT_ARCHIVE_PREFIX: &str = "FarGonE_3split";

/// File name of segment `index` (0-based).
pub fn segment_filename(index: usize, encoding: Encoding) -> String {
    format!("{}.{}", index + 1, encoding.extension())
}

/// File name of the archive bundling one run.
pub fn archive_filename(prefix: &str, mode: Mode, encoding: Encoding) -> String {
    let marker = match encoding {
        Encoding::Png => "_PNG",
        Encoding::Jpeg => "",
    };
    format!("{}_{}{}.zip", prefix, mode.label(), marker)
}

/// File name of the JSON report written next to an archive.
pub fn report_filename(archive_name: &str) -> String {
    let stem = archive_name.strip_suffix(".zip").unwrap_or(archive_name);
    format!("{}.json", stem)
}

/// Check that an archive prefix yields a plain file name.
///
/// Returns a description of the problem, or `None` if the prefix is usable.
pub fn prefix_problem(prefix: &str) -> Option<&'static str> {
    if prefix.trim().is_empty() {
        Some("must not be empty")
    } else if prefix.contains(['/', '\\']) {
        Some("must not contain path separators")
    } else if prefix.starts_with('.') {
        Some("must not start with a dot")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_names_are_one_based() {
        assert_eq!(segment_filename(0, Encoding::Jpeg), "1.jpg");
        assert_eq!(segment_filename(1, Encoding::Jpeg), "2.jpg");
        assert_eq!(segment_filename(2, Encoding::Png), "3.png");
    }

    #[test]
    fn archive_name_jpeg_has_no_marker() {
        assert_eq!(
            archive_filename(DEFAULT_ARCHIVE_PREFIX, Mode::Free, Encoding::Jpeg),
            "FarGonE_3split_free.zip"
        );
    }

    #[test]
    fn archive_name_png_has_marker() {
        assert_eq!(
            archive_filename(DEFAULT_ARCHIVE_PREFIX, Mode::Grid, Encoding::Png),
            "FarGonE_3split_grid_PNG.zip"
        );
        assert_eq!(
            archive_filename(DEFAULT_ARCHIVE_PREFIX, Mode::Square, Encoding::Png),
            "FarGonE_3split_square_PNG.zip"
        );
    }

    #[test]
    fn archive_name_custom_prefix() {
        assert_eq!(
            archive_filename("banner", Mode::Square, Encoding::Jpeg),
            "banner_square.zip"
        );
    }

    #[test]
    fn report_name_replaces_extension() {
        assert_eq!(
            report_filename("FarGonE_3split_grid_PNG.zip"),
            "FarGonE_3split_grid_PNG.json"
        );
        assert_eq!(report_filename("odd"), "odd.json");
    }

    #[test]
    fn prefix_checks() {
        assert_eq!(prefix_problem("FarGonE_3split"), None);
        assert_eq!(prefix_problem("  "), Some("must not be empty"));
        assert_eq!(
            prefix_problem("a/b"),
            Some("must not contain path separators")
        );
        assert_eq!(prefix_problem(".hidden"), Some("must not start with a dot"));
    }
}
