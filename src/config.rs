//! Run configuration.
//!
//! Handles loading, validating, and merging the run settings. Three layers are
//! merged, later ones winning key by key:
//!
//! 1. stock defaults ([`GalleryConfig::default`])
//! 2. `gallery.toml` in the root folder, if present
//! 3. command-line flags ([`CliOverrides`])
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [thumbnails]
//! sizes = []                # Longer-edge sizes to generate (at least one required)
//! dir_name = "thumbs"       # Per-folder thumbnail directory
//! quality = 90              # JPEG quality (1-100)
//!
//! [images]
//! order = "time-asc"        # time-asc | time-desc | name-asc | name-desc
//!
//! [export]
//! # size = 300              # Also write images.js pointing at this thumbnail size
//!
//! [processing]
//! max_processes = 5         # Image operations running at once
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::process::ImageOrder;
use crate::queue::DEFAULT_CONCURRENCY;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the optional run configuration file in the root folder.
pub const CONFIG_FILENAME: &str = "gallery.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML encode error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Run configuration loaded from `gallery.toml` and the command line.
///
/// All fields have defaults except the thumbnail sizes, which must come from
/// either the file or `--size`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    pub thumbnails: ThumbnailsConfig,
    pub images: ImagesConfig,
    pub export: ExportConfig,
    pub processing: ProcessingConfig,
}

/// Thumbnail generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    /// Longer-edge pixel sizes, one thumbnail per size per image.
    pub sizes: Vec<u32>,
    /// Directory inside each folder that receives the thumbnails.
    pub dir_name: String,
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub quality: u32,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            sizes: Vec::new(),
            dir_name: "thumbs".to_string(),
            quality: 90,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Order of `images` in each descriptor.
    pub order: ImageOrder,
}

/// Alternate `images.js` export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Thumbnail size the exported file names point at. No export when absent.
    pub size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of image operations running at once.
    pub max_processes: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_processes: DEFAULT_CONCURRENCY,
        }
    }
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let thumbs = &self.thumbnails;
        if thumbs.sizes.is_empty() {
            return Err(ConfigError::Validation(
                "at least one thumbnail size is required (--size or thumbnails.sizes)".into(),
            ));
        }
        if thumbs.sizes.contains(&0) {
            return Err(ConfigError::Validation(
                "thumbnails.sizes values must be non-zero".into(),
            ));
        }
        if let Some(size) = duplicate(&thumbs.sizes) {
            return Err(ConfigError::Validation(format!(
                "thumbnails.sizes lists {size} more than once"
            )));
        }
        if !(1..=100).contains(&thumbs.quality) {
            return Err(ConfigError::Validation(
                "thumbnails.quality must be 1-100".into(),
            ));
        }
        let dir = thumbs.dir_name.as_str();
        if dir.is_empty() || dir.contains(['/', '\\']) || dir.starts_with('.') {
            return Err(ConfigError::Validation(format!(
                "thumbnails.dir_name must be a plain, non-hidden directory name, got {dir:?}"
            )));
        }
        if self.processing.max_processes == 0 {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        match self.export.size {
            Some(size) if !thumbs.sizes.contains(&size) => Err(ConfigError::Validation(format!(
                "export.size {size} is not one of the thumbnail sizes {:?}",
                thumbs.sizes
            ))),
            _ => Ok(()),
        }
    }
}

fn duplicate(sizes: &[u32]) -> Option<u32> {
    sizes
        .iter()
        .enumerate()
        .find(|&(i, size)| sizes[..i].contains(size))
        .map(|(_, size)| *size)
}

/// Settings given on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub sizes: Vec<u32>,
    pub order: Option<ImageOrder>,
    pub export_size: Option<u32>,
    pub max_processes: Option<usize>,
    pub thumb_dir: Option<String>,
}

impl CliOverrides {
    /// Sparse TOML table holding only the flags that were given.
    pub fn to_overlay(&self) -> Result<toml::Value, ConfigError> {
        let mut root = toml::Table::new();
        let mut thumbnails = toml::Table::new();
        if !self.sizes.is_empty() {
            thumbnails.insert("sizes".into(), toml::Value::try_from(&self.sizes)?);
        }
        if let Some(dir) = &self.thumb_dir {
            thumbnails.insert("dir_name".into(), toml::Value::String(dir.clone()));
        }
        insert_section(&mut root, "thumbnails", thumbnails);

        if let Some(order) = self.order {
            let mut images = toml::Table::new();
            images.insert("order".into(), toml::Value::try_from(order)?);
            insert_section(&mut root, "images", images);
        }
        if let Some(size) = self.export_size {
            let mut export = toml::Table::new();
            export.insert("size".into(), toml::Value::Integer(size.into()));
            insert_section(&mut root, "export", export);
        }
        if let Some(n) = self.max_processes {
            let mut processing = toml::Table::new();
            processing.insert("max_processes".into(), toml::Value::try_from(n)?);
            insert_section(&mut root, "processing", processing);
        }
        Ok(toml::Value::Table(root))
    }
}

fn insert_section(root: &mut toml::Table, name: &str, section: toml::Table) {
    if !section.is_empty() {
        root.insert(name.into(), toml::Value::Table(section));
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user values are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(GalleryConfig::default())?)
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

/// Load `gallery.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `gallery.toml`.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.is_file() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load the run configuration for `root`: defaults, then `gallery.toml`, then the CLI.
pub fn load_config(root: &Path, cli: &CliOverrides) -> Result<GalleryConfig, ConfigError> {
    let config = load_unvalidated(root, cli)?;
    config.validate()?;
    Ok(config)
}

/// Merge all layers without validating.
///
/// Enough for read-only commands such as `check`, which need the thumbnail
/// directory name but no sizes.
pub fn load_unvalidated(root: &Path, cli: &CliOverrides) -> Result<GalleryConfig, ConfigError> {
    let mut merged = stock_defaults_value()?;
    if let Some(file) = load_raw_config(root)? {
        merged = merge_toml(merged, file);
    }
    merged = merge_toml(merged, cli.to_overlay()?);
    let config: GalleryConfig = merged.try_into()?;
    Ok(config)
}

/// Returns a fully-commented stock `gallery.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# gallery-meta configuration
# ==========================
# Place this file as gallery.toml in the root folder. All settings are
# optional; values shown are the defaults. Command-line flags override
# anything set here. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Thumbnails
# ---------------------------------------------------------------------------
[thumbnails]
# Longer-edge pixel sizes. One thumbnail per size is written for every image
# as <folder>/<dir_name>/<size>-<filename>. At least one size is required,
# here or via --size.
sizes = []

# Directory inside each folder that receives the thumbnails. It is never
# scanned as a subfolder.
dir_name = "thumbs"

# JPEG encoding quality (1 = worst, 100 = best).
quality = 90

# ---------------------------------------------------------------------------
# Image ordering inside each meta.json
# ---------------------------------------------------------------------------
[images]
# time-asc | time-desc  : by capture time, images without one last
# name-asc | name-desc  : by file name
order = "time-asc"

# ---------------------------------------------------------------------------
# Alternate export
# ---------------------------------------------------------------------------
[export]
# Also write images.js per folder, with file names pointing at the thumbnail
# of this size. Must be one of thumbnails.sizes.
# size = 300

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum number of image operations (identify + resize) running at once.
max_processes = 5
"##
}
