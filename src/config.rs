//! Print configuration.
//!
//! Handles loading, validating, and merging `printify.toml`. Stock defaults are
//! serialized to a TOML table, the user file is merged on top, and the result
//! is deserialized and validated. The file is optional; without it every value
//! takes its default.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [page]
//! width = 794               # A4 width in CSS px at 96 DPI
//! height = 1123             # A4 height in CSS px at 96 DPI
//!
//! [tiles]
//! width = 200               # Default tile width for new entries
//! height = 200              # Default tile height for new entries
//! min_size = 10             # Floor applied when shrinking a tile
//! resize_step = 10          # Step used by grow/shrink
//!
//! [grid]
//! per_page = 4              # Images per page for the grid policy
//! columns = 2               # Grid columns (rows derived from per_page)
//!
//! [flow]
//! margin = 5                # Space around each image in the flow policy
//!
//! [print]
//! policy = "grid"           # "grid" or "flow"
//! title = "Print Images"    # Document title
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::layout::PolicyKind;
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

/// Print configuration loaded from `printify.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrintConfig {
    /// Physical page surface.
    pub page: PageConfig,
    /// Default transform state and resize bounds for entries.
    pub tiles: TilesConfig,
    /// Grid policy settings.
    pub grid: GridConfig,
    /// Flow policy settings.
    pub flow: FlowConfig,
    /// Print document settings.
    pub print: PrintSettings,
}

impl PrintConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page.width == 0 || self.page.height == 0 {
            return Err(ConfigError::Validation(
                "page.width and page.height must be non-zero".into(),
            ));
        }
        if self.grid.per_page == 0 {
            return Err(ConfigError::Validation(
                "grid.per_page must be at least 1".into(),
            ));
        }
        if self.grid.columns == 0 || self.grid.columns > self.grid.per_page {
            return Err(ConfigError::Validation(
                "grid.columns must be between 1 and grid.per_page".into(),
            ));
        }
        let fits =
            |cells: usize, side: u32| u32::try_from(cells).is_ok_and(|cells| cells <= side);
        if !fits(self.grid.columns, self.page.width) || !fits(self.grid.rows(), self.page.height) {
            return Err(ConfigError::Validation(
                "page is too small for the grid: every cell needs at least 1px".into(),
            ));
        }
        if self.tiles.min_size == 0 {
            return Err(ConfigError::Validation(
                "tiles.min_size must be at least 1".into(),
            ));
        }
        if self.tiles.width < self.tiles.min_size || self.tiles.height < self.tiles.min_size {
            return Err(ConfigError::Validation(
                "tiles.width and tiles.height must not be below tiles.min_size".into(),
            ));
        }
        if self.tiles.resize_step == 0 {
            return Err(ConfigError::Validation(
                "tiles.resize_step must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Page surface size in logical units (CSS px).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfig {
    pub width: u32,
    pub height: u32,
}

/// A4 at 96 DPI.
pub const A4_WIDTH: u32 = 794;
pub const A4_HEIGHT: u32 = 1123;

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            width: A4_WIDTH,
            height: A4_HEIGHT,
        }
    }
}

/// Default tile size for new entries and resize limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TilesConfig {
    pub width: u32,
    pub height: u32,
    /// Neither dimension is ever resized below this.
    pub min_size: u32,
    /// Amount added or removed by a single grow/shrink.
    pub resize_step: u32,
}

impl Default for TilesConfig {
    fn default() -> Self {
        Self {
            width: 200,
            height: 200,
            min_size: 10,
            resize_step: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    pub per_page: usize,
    pub columns: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            per_page: 4,
            columns: 2,
        }
    }
}

impl GridConfig {
    /// Number of rows needed to hold `per_page` cells.
    pub fn rows(&self) -> usize {
        self.per_page.div_ceil(self.columns)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlowConfig {
    /// Space kept on every side of each image.
    pub margin: u32,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self { margin: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrintSettings {
    pub policy: PolicyKind,
    pub title: String,
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self {
            policy: PolicyKind::Grid,
            title: "Print Images".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Default config file name looked up in the working directory.
pub const CONFIG_FILE: &str = "printify.toml";

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(PrintConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
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
) -> Result<PrintConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PrintConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file, falling back to stock defaults when absent.
pub fn load_config(path: &Path) -> Result<PrintConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `printify.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Printify Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Page surface, in CSS px (A4 at 96 DPI by default)
# ---------------------------------------------------------------------------
[page]
width = 794
height = 1123

# ---------------------------------------------------------------------------
# Tiles
# ---------------------------------------------------------------------------
[tiles]
# Size given to every newly added image.
width = 200
height = 200

# Shrinking never takes a dimension below this value.
min_size = 10

# Amount added or removed by the shell's grow/shrink commands.
resize_step = 10

# ---------------------------------------------------------------------------
# Grid policy: fixed number of images per page, each cropped to fill its cell
# ---------------------------------------------------------------------------
[grid]
per_page = 4
columns = 2

# ---------------------------------------------------------------------------
# Flow policy: images keep their own size and wrap across the page
# ---------------------------------------------------------------------------
[flow]
margin = 5

# ---------------------------------------------------------------------------
# Print document
# ---------------------------------------------------------------------------
[print]
# "grid" or "flow"
policy = "grid"
title = "Print Images"
"##
}

/// Generate the page-size CSS shared by both print documents.
pub fn generate_page_css(page: &PageConfig) -> String {
    format!(
        r#":root {{
    --page-width: {width}px;
    --page-height: {height}px;
}}

@page {{
    size: {width}px {height}px;
    margin: 0;
}}"#,
        width = page.width,
        height = page.height,
    )
}
