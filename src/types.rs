//! Shared types used across the split pipeline.
//!
//! [`Mode`] is referenced by the config file, the CLI, the region calculator,
//! the orchestrator and the archive naming rules, so it lives here rather than
//! in any one of them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Re-framing policy applied uniformly to all three segments.
///
/// - `Free`: each segment is its raw column, no re-framing
/// - `Grid`: each segment is centre-cropped to 3:4 and scaled to 1080×1440
/// - `Square`: each segment is the largest centred square of its column
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Free,
    Grid,
    Square,
}

impl Mode {
    /// All modes in display order.
    pub const ALL: [Mode; 3] = [Mode::Free, Mode::Grid, Mode::Square];

    /// Lowercase label used in archive names and config values.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Free => "free",
            Mode::Grid => "grid",
            Mode::Square => "square",
        }
    }

    /// Human-readable title shown above a run's output.
    pub fn title(self) -> &'static str {
        match self {
            Mode::Free => "Free Split",
            Mode::Grid => "Grid 3:4 (1080\u{d7}1440)",
            Mode::Square => "Square",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
