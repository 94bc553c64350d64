//! Configuration module.
//!
//! Handles loading, validating, and merging `trisplit.toml`. Stock defaults
//! are overridden by the user's file, which only needs the keys it changes.
//!
//! ## Config File Location
//!
//! `trisplit.toml` in the working directory, or any file passed with
//! `--config`. Without a file the stock defaults apply.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [output]
//! directory = "split"              # Where deliveries are written
//! archive_prefix = "FarGonE_3split" # Archive name prefix
//! png = false                      # PNG (lossless) instead of JPEG
//! default_mode = "free"            # free | grid | square
//!
//! [grid]
//! short_source = "crop"            # crop | pad | reject
//!
//! [archive]
//! compression = "deflated"         # deflated | stored
//!
//! [processing]
//! max_processes = 4                # Max parallel encoders (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::archive::Compression;
use crate::imaging::ShortSourcePolicy;
use crate::naming::{DEFAULT_ARCHIVE_PREFIX, prefix_problem};
use crate::session::SessionSettings;
use crate::types::Mode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Config file looked up in the working directory.
pub const CONFIG_FILE: &str = "trisplit.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `trisplit.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitConfig {
    /// Delivery location, naming and initial selections.
    pub output: OutputConfig,
    /// Grid mode edge cases.
    pub grid: GridConfig,
    /// Archive serialization.
    pub archive: ArchiveConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl SplitConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(problem) = prefix_problem(&self.output.archive_prefix) {
            return Err(ConfigError::Validation(format!(
                "output.archive_prefix {problem}"
            )));
        }
        if self.output.directory.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output.directory must not be empty".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Initial session selections from this config.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            mode: self.output.default_mode,
            png: self.output.png,
            short_source: self.grid.short_source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory deliveries are written to, relative to the working directory.
    pub directory: String,
    /// Prefix of archive names: `{prefix}_{mode}{_PNG}.zip`.
    pub archive_prefix: String,
    /// Encode segments as lossless PNG instead of JPEG.
    pub png: bool,
    /// Mode used when none is given on the command line.
    pub default_mode: Mode,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "split".to_string(),
            archive_prefix: DEFAULT_ARCHIVE_PREFIX.to_string(),
            png: false,
            default_mode: Mode::Free,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Handling of columns too short for a 3:4 frame.
    pub short_source: ShortSourcePolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveConfig {
    pub compression: Compression,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel encode workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SplitConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SplitConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SplitConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective config.
///
/// An explicit path must exist. Without one, `trisplit.toml` in the working
/// directory is used if present.
pub fn load_config(explicit: Option<&Path>) -> Result<SplitConfig, ConfigError> {
    let overlay = match explicit {
        Some(path) => {
            let value = load_raw_config(path)?;
            if value.is_none() {
                return Err(ConfigError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("config file not found: {}", path.display()),
                )));
            }
            value
        }
        None => load_raw_config(Path::new(CONFIG_FILE))?,
    };
    resolve_config(stock_defaults_value()?, overlay)
}

/// Returns a fully-commented stock `trisplit.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# trisplit configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file as trisplit.toml in the working directory, or pass it
# with --config. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Directory archives (or fallback files) are written to.
directory = "split"

# Archive names are {prefix}_{mode}.zip, or {prefix}_{mode}_PNG.zip for PNG.
archive_prefix = "FarGonE_3split"

# Encode segments as lossless PNG instead of high quality JPEG.
png = false

# Mode used when --mode is not given: "free", "grid" or "square".
default_mode = "free"

# ---------------------------------------------------------------------------
# Grid mode (1080x1440 frames)
# ---------------------------------------------------------------------------
[grid]
# What to do when a column is too short for a 3:4 frame:
#   "crop"   - keep the full height, crop the width to 3:4 (centred)
#   "pad"    - scale the whole column, centre it, leave bands above and below
#   "reject" - refuse to split
short_source = "crop"

# ---------------------------------------------------------------------------
# Archive
# ---------------------------------------------------------------------------
[archive]
# Zip entry compression: "deflated" or "stored".
compression = "deflated"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel encode workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
