//! CLI defaults configuration.
//!
//! An optional TOML file, passed with `--config <FILE>`, supplies defaults for
//! the `crop` and `resize` commands. User values are merged key by key over the
//! stock defaults, so a file only needs the keys it changes. Flags given on the
//! command line override both.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [crop]
//! anchor = "center"     # left | center | right
//! quality = 100         # JPEG quality (1-100)
//! file_mode = 0o755     # permissions applied to the written file
//!
//! [resize]
//! max_width = 1000
//! max_height = 1000
//! quality = 100
//! file_mode = 0o644
//! ```
//!
//! ## Partial Configuration
//!
//! ```toml
//! [resize]
//! max_width = 1600
//! ```
//!
//! Unknown keys are rejected to catch typos early. The library API never reads
//! this file; it only shapes the options the binary passes in.

use crate::imaging::{
    CropAnchor, CropOptions, DEFAULT_CROP_FILE_MODE, DEFAULT_RESIZE_FILE_MODE, Quality,
    ResizeOptions,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration loaded from a TOML file.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// Defaults for `pixtrim crop`.
    pub crop: CropConfig,
    /// Defaults for `pixtrim resize`.
    pub resize: ResizeConfig,
}

impl ToolConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_quality("crop.quality", self.crop.quality)?;
        check_quality("resize.quality", self.resize.quality)?;
        check_mode("crop.file_mode", self.crop.file_mode)?;
        check_mode("resize.file_mode", self.resize.file_mode)?;
        if self.resize.max_width == 0 || self.resize.max_height == 0 {
            return Err(ConfigError::Validation(
                "resize.max_width and resize.max_height must be positive".into(),
            ));
        }
        Ok(())
    }
}

fn check_quality(key: &str, value: u32) -> Result<(), ConfigError> {
    if !(1..=100).contains(&value) {
        return Err(ConfigError::Validation(format!("{key} must be 1-100")));
    }
    Ok(())
}

fn check_mode(key: &str, value: u32) -> Result<(), ConfigError> {
    if value > 0o7777 {
        return Err(ConfigError::Validation(format!(
            "{key} must be at most 0o7777, got {value:#o}"
        )));
    }
    Ok(())
}

/// Square crop defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CropConfig {
    pub anchor: CropAnchor,
    pub quality: u32,
    pub file_mode: u32,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            anchor: CropAnchor::Center,
            quality: 100,
            file_mode: DEFAULT_CROP_FILE_MODE,
        }
    }
}

impl From<&CropConfig> for CropOptions {
    fn from(config: &CropConfig) -> Self {
        Self {
            anchor: config.anchor,
            quality: Quality::new(config.quality),
            file_mode: Some(config.file_mode),
        }
    }
}

/// Bounded resize defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    pub max_width: u32,
    pub max_height: u32,
    pub quality: u32,
    pub file_mode: u32,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            max_width: 1000,
            max_height: 1000,
            quality: 100,
            file_mode: DEFAULT_RESIZE_FILE_MODE,
        }
    }
}

impl From<&ResizeConfig> for ResizeOptions {
    fn from(config: &ResizeConfig) -> Self {
        Self {
            max_width: config.max_width,
            max_height: config.max_height,
            quality: Quality::new(config.quality),
            file_mode: Some(config.file_mode),
        }
    }
}

/// Stock defaults as a TOML value, the base every user file is merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ToolConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` into `base`. Tables merge key by key; any
/// other value in the overlay replaces the base value.
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

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<ToolConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ToolConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the tool configuration.
///
/// `None` yields the stock defaults. A given path must exist and parse.
pub fn load_config(path: Option<&Path>) -> Result<ToolConfig, ConfigError> {
    let overlay = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Some(toml::from_str::<toml::Value>(&content)?)
        }
        None => None,
    };
    resolve_config(overlay)
}

/// Returns a fully-commented stock config file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# pixtrim configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Pass this file with `pixtrim --config <FILE> ...`.
# Flags given on the command line override these values.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Square crops (`pixtrim crop`)
# ---------------------------------------------------------------------------
[crop]
# Which end of the longer side to keep: "left", "center" or "right".
# For portrait images left keeps the top and right keeps the bottom.
anchor = "center"

# JPEG encoding quality (1 = worst, 100 = best). Ignored for other formats.
quality = 100

# Permission bits applied to the written file (Unix only).
file_mode = 0o755

# ---------------------------------------------------------------------------
# Bounded resizes (`pixtrim resize`)
# ---------------------------------------------------------------------------
[resize]
# Bounding box in pixels. Images that already fit are left alone;
# larger images shrink to fit, keeping their aspect ratio.
max_width = 1000
max_height = 1000

# JPEG encoding quality (1 = worst, 100 = best). Ignored for other formats.
quality = 100

# Permission bits applied to the written file (Unix only).
file_mode = 0o644
"##
}
