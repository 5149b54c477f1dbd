//! Sync configuration module.
//!
//! Every tunable the pipeline uses lives in [`SyncConfig`] and is passed
//! explicitly into each component. The stock defaults reproduce the values the
//! website was built against; a `--config` TOML file can override any subset.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [drive]
//! root_id = "1JWZ4WcU8ZIxZqXa2Xxods5DnjN94O-Ju"  # Top-level content folder
//! page_size = 100                               # Items per listing page (1-1000)
//! order_by = "name_natural,recency"             # Passed through to the list API
//!
//! [images]
//! large = 1920          # Longest side of the `large` variant
//! medium = 640          # Longest side of the `medium` variant
//! preview = 128         # Longest side of the blurred `preview` variant
//! preview_blur = 0.03   # Blur radius as a fraction of the original's longest side
//!
//! [download]
//! chunk_size = 104857600  # Bytes per progress chunk (100 MiB)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse: override just the values you want:
//!
//! ```toml
//! [images]
//! large = 2560
//! ```
//!
//! Unknown keys are rejected to catch typos early.

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

/// ID of the Drive folder all website content is organized under.
pub const DEFAULT_ROOT_ID: &str = "1JWZ4WcU8ZIxZqXa2Xxods5DnjN94O-Ju";

/// Smallest accepted download chunk; matches the hashing buffer.
pub const MIN_CHUNK_SIZE: u64 = 64 * 1024;

/// Sync configuration.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Remote listing settings.
    pub drive: DriveConfig,
    /// Image variant sizes and preview blur.
    pub images: ImagesConfig,
    /// Media download settings.
    pub download: DownloadConfig,
}

impl SyncConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.drive.root_id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "drive.root_id must not be empty".into(),
            ));
        }
        if !(1..=1000).contains(&self.drive.page_size) {
            return Err(ConfigError::Validation(
                "drive.page_size must be 1-1000".into(),
            ));
        }
        if self.images.large == 0 || self.images.medium == 0 || self.images.preview == 0 {
            return Err(ConfigError::Validation(
                "images sizes must be non-zero".into(),
            ));
        }
        if !(self.images.preview_blur > 0.0 && self.images.preview_blur < 1.0) {
            return Err(ConfigError::Validation(
                "images.preview_blur must be between 0 and 1 (exclusive)".into(),
            ));
        }
        if self.download.chunk_size < MIN_CHUNK_SIZE {
            return Err(ConfigError::Validation(format!(
                "download.chunk_size must be at least {MIN_CHUNK_SIZE} bytes"
            )));
        }
        Ok(())
    }
}

/// Remote listing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriveConfig {
    /// Folder every logical path (`home/bio`, `portfolio/...`) is resolved from.
    pub root_id: String,
    /// Number of items requested per listing page.
    pub page_size: u32,
    /// Listing order, passed through uninterpreted.
    pub order_by: String,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            root_id: DEFAULT_ROOT_ID.to_string(),
            page_size: 100,
            order_by: "name_natural,recency".to_string(),
        }
    }
}

/// Image variant settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    pub large: u32,
    pub medium: u32,
    pub preview: u32,
    /// Blur radius as a fraction of the original's longest side.
    pub preview_blur: f64,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            large: 1920,
            medium: 640,
            preview: 128,
            preview_blur: 0.03,
        }
    }
}

/// Media download settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DownloadConfig {
    /// Bytes per download chunk. Progress is only shown for multi-chunk files.
    pub chunk_size: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            chunk_size: 100 * 1024 * 1024,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SyncConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults do not serialize: {e}")))
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

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SyncConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SyncConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective configuration.
///
/// With no path the stock defaults are used. A missing file at an explicit
/// path is an error rather than a silent fallback.
pub fn load_config(path: Option<&Path>) -> Result<SyncConfig, ConfigError> {
    let overlay = path.map(load_raw_config).transpose()?;
    resolve_config(stock_defaults_value()?, overlay)
}

/// Returns a fully-commented stock config with all keys and explanations.
///
/// Printed by `--print-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# drive-content-sync configuration
# ===============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Remote listing
# ---------------------------------------------------------------------------
[drive]
# Folder every logical path (home/bio, portfolio/<album>, video, contact)
# is resolved from.
root_id = "1JWZ4WcU8ZIxZqXa2Xxods5DnjN94O-Ju"

# Items requested per listing page (1-1000).
page_size = 100

# Listing order. Output JSON follows this order exactly.
order_by = "name_natural,recency"

# ---------------------------------------------------------------------------
# Image variants (longest side in pixels; images are never upscaled)
# ---------------------------------------------------------------------------
[images]
large = 1920
medium = 640
preview = 128

# Gaussian blur radius for the preview, as a fraction of the original
# image's longest side (minimum radius 2px).
preview_blur = 0.03

# ---------------------------------------------------------------------------
# Downloads
# ---------------------------------------------------------------------------
[download]
# Bytes per download chunk. A progress bar is shown for files spanning
# more than one chunk.
chunk_size = 104857600
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_config_matches_site_values() {
        let config = SyncConfig::default();
        assert_eq!(config.drive.root_id, DEFAULT_ROOT_ID);
        assert_eq!(config.drive.order_by, "name_natural,recency");
        assert_eq!(config.images.large, 1920);
        assert_eq!(config.images.medium, 640);
        assert_eq!(config.images.preview, 128);
        assert_eq!(config.images.preview_blur, 0.03);
        assert_eq!(config.download.chunk_size, 100 * 1024 * 1024);
    }

    #[test]
    fn validate_default_config_passes() {
        assert!(SyncConfig::default().validate().is_ok());
    }

    #[test]
    fn load_config_without_path_uses_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.images.large, 1920);
        assert_eq!(config.drive.page_size, 100);
    }

    #[test]
    fn load_config_partial_override() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sync.toml");
        fs::write(
            &path,
            r#"
[images]
large = 2560
"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.images.large, 2560);
        // Untouched keys keep their defaults
        assert_eq!(config.images.medium, 640);
        assert_eq!(config.drive.root_id, DEFAULT_ROOT_ID);
    }

    #[test]
    fn load_config_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(Some(&tmp.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sync.toml");
        fs::write(&path, "this is not toml [[[").unwrap();
        let result = load_config(Some(&path));
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sync.toml");
        fs::write(&path, "[images]\nhuge = 4000\n").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn unknown_section_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sync.toml");
        fs::write(&path, "[videos]\nresize = true\n").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn validate_empty_root_id() {
        let mut config = SyncConfig::default();
        config.drive.root_id = "  ".into();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_page_size_bounds() {
        let mut config = SyncConfig::default();
        config.drive.page_size = 0;
        assert!(config.validate().is_err());
        config.drive.page_size = 1000;
        assert!(config.validate().is_ok());
        config.drive.page_size = 1001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_zero_image_size() {
        let mut config = SyncConfig::default();
        config.images.medium = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_preview_blur_range() {
        let mut config = SyncConfig::default();
        config.images.preview_blur = 0.0;
        assert!(config.validate().is_err());
        config.images.preview_blur = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_chunk_size_minimum() {
        let mut config = SyncConfig::default();
        config.download.chunk_size = 1024;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sync.toml");
        fs::write(&path, "[drive]\npage_size = 5000\n").unwrap();
        let result = load_config(Some(&path));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("a = 1\nb = 2").unwrap();
        let overlay: toml::Value = toml::from_str("b = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"].as_integer(), Some(1));
        assert_eq!(merged["b"].as_integer(), Some(3));
    }

    #[test]
    fn merge_toml_deep_nested() {
        let base: toml::Value = toml::from_str("[x.y]\np = 1\nq = 2").unwrap();
        let overlay: toml::Value = toml::from_str("[x.y]\nq = 9").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["x"]["y"]["p"].as_integer(), Some(1));
        assert_eq!(merged["x"]["y"]["q"].as_integer(), Some(9));
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let parsed: SyncConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SyncConfig::default();
        assert_eq!(parsed.drive.root_id, defaults.drive.root_id);
        assert_eq!(parsed.drive.page_size, defaults.drive.page_size);
        assert_eq!(parsed.drive.order_by, defaults.drive.order_by);
        assert_eq!(parsed.images.large, defaults.images.large);
        assert_eq!(parsed.images.medium, defaults.images.medium);
        assert_eq!(parsed.images.preview, defaults.images.preview);
        assert_eq!(parsed.images.preview_blur, defaults.images.preview_blur);
        assert_eq!(parsed.download.chunk_size, defaults.download.chunk_size);
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let value = stock_defaults_value().unwrap();
        let table = value.as_table().unwrap();
        for section in ["drive", "images", "download"] {
            assert!(table.contains_key(section), "missing section {section}");
        }
    }
}
