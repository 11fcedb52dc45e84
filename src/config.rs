//! Print configuration module.
//!
//! Handles loading, validating, and merging `print-frame.toml`. Stock
//! defaults describe an 8x10 inch print; a user file overrides just the
//! values it names.
//!
//! ## Config File Location
//!
//! ```text
//! <config-dir>/
//! └── print-frame.toml      # optional; stock defaults apply without it
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [target]
//! width = 8.0               # Physical print width (inches)
//! height = 10.0             # Physical print height (inches)
//! # dpi = 300               # Omit to export at 300 DPI
//!
//! [crop]
//! min_width_px = 800        # Minimum crop width; height follows the ratio
//! initial_fill = 80.0       # Percent of the largest fitting crop used at load
//!
//! [placement]
//! initial_scale = 0.25      # Image starts at this fraction of native size
//!
//! [export]
//! format = "jpeg"           # "jpeg" or "png"
//! jpeg_quality = 100        # 90-100
//! background = [255, 255, 255]
//! ```
//!
//! ## Partial Configuration
//!
//! ```toml
//! # Print 8.5x11 at 240 DPI, everything else stock
//! [target]
//! width = 8.5
//! height = 11.0
//! dpi = 240
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{ExportSettings, MIN_PRINT_QUALITY, OutputFormat, Quality};
use crate::session::SessionSettings;
use crate::types::PhysicalSize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Config file name looked up in the config directory.
pub const CONFIG_FILENAME: &str = "print-frame.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `print-frame.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrintConfig {
    /// Physical print size and optional DPI.
    pub target: TargetConfig,
    /// Crop constraints.
    pub crop: CropConfig,
    /// Placement mode start state.
    pub placement: PlacementConfig,
    /// Output encoding.
    pub export: ExportConfig,
}

impl PrintConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.target.width) || !positive(self.target.height) {
            return Err(ConfigError::Validation(
                "target.width and target.height must be positive".into(),
            ));
        }
        if self.target.dpi.is_some_and(|dpi| !positive(dpi)) {
            return Err(ConfigError::Validation("target.dpi must be positive".into()));
        }
        if self.crop.min_width_px == 0 {
            return Err(ConfigError::Validation(
                "crop.min_width_px must be non-zero".into(),
            ));
        }
        if !(self.crop.initial_fill > 0.0 && self.crop.initial_fill <= 100.0) {
            return Err(ConfigError::Validation(
                "crop.initial_fill must be in (0, 100]".into(),
            ));
        }
        if !positive(self.placement.initial_scale) {
            return Err(ConfigError::Validation(
                "placement.initial_scale must be positive".into(),
            ));
        }
        if !(MIN_PRINT_QUALITY..=100).contains(&self.export.jpeg_quality) {
            return Err(ConfigError::Validation(format!(
                "export.jpeg_quality must be {MIN_PRINT_QUALITY}-100"
            )));
        }
        Ok(())
    }

    pub fn physical_size(&self) -> PhysicalSize {
        PhysicalSize::new(self.target.width, self.target.height)
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            print: self.physical_size(),
            dpi: self.target.dpi,
            min_width_px: self.crop.min_width_px,
            initial_fill: self.crop.initial_fill,
            initial_scale: self.placement.initial_scale,
            background: self.export.background,
        }
    }

    pub fn export_settings(&self) -> ExportSettings {
        ExportSettings {
            format: self.export.format,
            quality: Quality::new(self.export.jpeg_quality),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetConfig {
    pub width: f64,
    pub height: f64,
    /// Export DPI. When absent, export uses the documented 300 default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dpi: Option<f64>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            width: 8.0,
            height: 10.0,
            dpi: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CropConfig {
    pub min_width_px: u32,
    pub initial_fill: f64,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            min_width_px: 800,
            initial_fill: 80.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlacementConfig {
    pub initial_scale: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            initial_scale: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub format: OutputFormat,
    pub jpeg_quality: u8,
    pub background: [u8; 3],
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Jpeg,
            jpeg_quality: 100,
            background: [255, 255, 255],
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(PrintConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
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

/// Read `print-frame.toml` from `dir` as a raw value, or `None` if absent.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<PrintConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PrintConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `print-frame.toml` in `dir`.
pub fn load_config(dir: &Path) -> Result<PrintConfig, ConfigError> {
    let overlay = load_raw_config(dir)?;
    if overlay.is_none() {
        log::debug!("no {CONFIG_FILENAME} in {}, using stock defaults", dir.display());
    }
    resolve_config(overlay)
}

/// A fully-commented stock `print-frame.toml`, printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# print-frame configuration
# =========================
# All options are optional. Values shown are the stock defaults.
# Unknown keys are rejected.

# ---------------------------------------------------------------------------
# Print target
# ---------------------------------------------------------------------------
[target]
# Physical print size in inches. The crop ratio is width:height.
width = 8.0
height = 10.0
# Export density. When omitted, exports are rendered at 300 DPI.
# dpi = 300

# ---------------------------------------------------------------------------
# Crop mode
# ---------------------------------------------------------------------------
[crop]
# Smallest crop width in source pixels. The minimum height follows from
# the print ratio (800 -> 1000 for 8x10). Smaller crops are enlarged.
min_width_px = 800
# Size of the starting crop, in percent of the largest crop that fits.
initial_fill = 80.0

# ---------------------------------------------------------------------------
# Placement mode
# ---------------------------------------------------------------------------
[placement]
# Starting size of the image inside the frame, as a fraction of its
# native size.
initial_scale = 0.25

# ---------------------------------------------------------------------------
# Export
# ---------------------------------------------------------------------------
[export]
# "jpeg" or "png". PNG is lossless.
format = "jpeg"
# JPEG quality, 90-100.
jpeg_quality = 100
# Fill colour for areas the image does not cover (RGB).
background = [255, 255, 255]
"##
}
