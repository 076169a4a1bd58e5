//! Configuration module.
//!
//! Handles loading, validating, and merging `recast.toml`. Stock defaults are
//! overridden by the user's file; command-line flags override both.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [output]
//! format = "webp"                       # png | jpeg | webp | bmp | gif | tiff
//! quality = 80                          # JPEG quality (1-100)
//! archive_name = "converted-images.zip" # Bulk export file name
//! archive_folder = "converted-images"   # Folder inside the archive ("" = none)
//! entry_prefix = "converted-image"      # Output files are <prefix>-<id>.<ext>
//!
//! [resize]
//! aspect_lock = true                    # Editing one dimension rescales the other
//! filter = "triangle"                   # nearest | triangle | catmull-rom | gaussian | lanczos3
//!
//! [processing]
//! max_processes = 4                     # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [output]
//! format = "png"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::export::{ExportOptions, Naming};
use crate::format::TargetFormat;
use crate::imaging::{Filter, Quality};
use crate::sink::is_plain_file_name;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "recast.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `recast.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecastConfig {
    /// Output format, quality and file naming.
    pub output: OutputConfig,
    /// Resize behaviour (aspect lock, scaling filter).
    pub resize: ResizeConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl RecastConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.quality == 0 || self.output.quality > 100 {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        if self.output.archive_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output.archive_name must not be empty".into(),
            ));
        }
        if !is_plain_file_name(&self.output.archive_name) {
            return Err(ConfigError::Validation(
                "output.archive_name must be a file name, not a path".into(),
            ));
        }
        if !self.output.archive_folder.is_empty()
            && !is_plain_file_name(&self.output.archive_folder)
        {
            return Err(ConfigError::Validation(
                "output.archive_folder must be a single folder name or empty".into(),
            ));
        }
        if self.output.entry_prefix.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output.entry_prefix must not be empty".into(),
            ));
        }
        if !is_plain_file_name(&self.output.entry_prefix) {
            return Err(ConfigError::Validation(
                "output.entry_prefix must not contain path separators".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            quality: Quality::new(self.output.quality),
            filter: self.resize.filter,
            naming: Naming {
                archive_name: self.output.archive_name.clone(),
                archive_folder: self.output.archive_folder.clone(),
                entry_prefix: self.output.entry_prefix.clone(),
            },
        }
    }
}

/// Output format and naming.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Target format when none is given on the command line.
    pub format: TargetFormat,
    /// JPEG encoding quality (1 = worst, 100 = best). Other formats are lossless.
    pub quality: u32,
    /// File name of the bulk export archive.
    pub archive_name: String,
    /// Folder the entries live in inside the archive. Empty for none.
    pub archive_folder: String,
    /// Exported files are named `<entry_prefix>-<id>.<ext>`.
    pub entry_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        let naming = Naming::default();
        Self {
            format: TargetFormat::WebP,
            quality: Quality::default().value(),
            archive_name: naming.archive_name,
            archive_folder: naming.archive_folder,
            entry_prefix: naming.entry_prefix,
        }
    }
}

/// Resize behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    /// When set, editing one dimension recomputes the other from the
    /// image's natural aspect ratio.
    pub aspect_lock: bool,
    /// Scaling filter.
    pub filter: Filter,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            aspect_lock: true,
            filter: Filter::default(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel conversion workers.
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
    toml::Value::try_from(RecastConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config failed to serialize: {e}")))
}

/// Merge `overlay` into `base`: tables key by key, anything else replaced.
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

/// Layer a user table over the stock defaults, then deserialize and validate.
pub fn resolve_config(user: Option<toml::Value>) -> Result<RecastConfig, ConfigError> {
    let mut layered = stock_defaults_value()?;
    if let Some(user) = user {
        layered = merge_toml(layered, user);
    }
    let config: RecastConfig = layered.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `recast.toml` from `dir`. A missing file yields the defaults.
pub fn load_config(dir: &Path) -> Result<RecastConfig, ConfigError> {
    let user = match fs::read_to_string(dir.join(CONFIG_FILE_NAME)) {
        Ok(content) => Some(toml::from_str::<toml::Value>(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(e.into()),
    };
    resolve_config(user)
}

/// Returns a fully-commented stock `recast.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# recast configuration
# ====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# recast reads recast.toml from the current directory, or from the
# directory given with --config. Command-line flags override these values.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Target format: png, jpeg, webp, bmp, gif or tiff.
format = "webp"

# JPEG encoding quality (1 = worst, 100 = best).
# PNG, WebP, BMP, GIF and TIFF are written losslessly.
quality = 80

# File name of the archive written by bulk export.
archive_name = "converted-images.zip"

# Folder the converted images are placed in inside the archive.
# Set to "" to put them at the archive root.
archive_folder = "converted-images"

# Converted files are named <entry_prefix>-<id>.<ext>.
entry_prefix = "converted-image"

# ---------------------------------------------------------------------------
# Resizing
# ---------------------------------------------------------------------------
[resize]
# When true, setting only a width (or only a height) recomputes the other
# dimension from the image's original aspect ratio.
aspect_lock = true

# Scaling filter: nearest, triangle, catmull-rom, gaussian or lanczos3.
filter = "triangle"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel conversion workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = RecastConfig::default();
        assert_eq!(config.output.format, TargetFormat::WebP);
        assert_eq!(config.output.quality, 80);
        assert_eq!(config.output.archive_name, "converted-images.zip");
        assert!(config.resize.aspect_lock);
        assert_eq!(config.resize.filter, Filter::Triangle);
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn parse_partial_config() {
        let config: RecastConfig = toml::from_str(
            r#"
[output]
format = "png"
"#,
        )
        .unwrap();
        assert_eq!(config.output.format, TargetFormat::Png);
        // Unspecified keys keep defaults
        assert_eq!(config.output.quality, 80);
        assert!(config.resize.aspect_lock);
    }

    #[test]
    fn export_options_from_config() {
        let mut config = RecastConfig::default();
        config.output.quality = 55;
        config.output.archive_folder = String::new();
        config.resize.filter = Filter::Lanczos3;
        let options = config.export_options();
        assert_eq!(options.quality.value(), 55);
        assert_eq!(options.filter, Filter::Lanczos3);
        assert_eq!(options.naming.archive_folder, "");
    }

    // =========================================================================
    // effective_threads
    // =========================================================================

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    // =========================================================================
    // Unknown key rejection
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let result: Result<RecastConfig, _> = toml::from_str(
            r#"
[output]
qualty = 90
"#,
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<RecastConfig, _> = toml::from_str("[outptu]\nformat = \"png\"");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_format_rejected() {
        let result: Result<RecastConfig, _> = toml::from_str("[output]\nformat = \"heic\"");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_key_rejected_via_load_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE_NAME), "[resize]\nlock = true\n").unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(RecastConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_quality_bounds() {
        let mut config = RecastConfig::default();
        config.output.quality = 100;
        assert!(config.validate().is_ok());
        config.output.quality = 0;
        assert!(config.validate().is_err());
        config.output.quality = 101;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("quality"));
    }

    #[test]
    fn validate_archive_name() {
        let mut config = RecastConfig::default();
        config.output.archive_name = "  ".into();
        assert!(config.validate().is_err());
        config.output.archive_name = "out/images.zip".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_archive_folder() {
        let mut config = RecastConfig::default();
        config.output.archive_folder = String::new();
        assert!(config.validate().is_ok());
        for folder in ["../../etc", "..", "a/b", "a\\b", "/abs", "."] {
            config.output.archive_folder = folder.into();
            assert!(
                config.validate().is_err(),
                "archive_folder {folder:?} should be rejected"
            );
        }
    }

    #[test]
    fn validate_entry_prefix() {
        let mut config = RecastConfig::default();
        config.output.entry_prefix = "photo".into();
        assert!(config.validate().is_ok());
        for prefix in ["", "../x", "nested/img", "a\\b", ".."] {
            config.output.entry_prefix = prefix.into();
            assert!(
                config.validate().is_err(),
                "entry_prefix {prefix:?} should be rejected"
            );
        }
    }

    #[test]
    fn load_config_rejects_escaping_archive_folder() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            "[output]\narchive_folder = \"../../etc\"\n",
        )
        .unwrap();
        let err = load_config(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("archive_folder"));
    }

    #[test]
    fn validate_zero_processes() {
        let mut config = RecastConfig::default();
        config.processing.max_processes = Some(0);
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            "[output]\nquality = 200\n",
        )
        .unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    // =========================================================================
    // load_config / resolve_config
    // =========================================================================

    #[test]
    fn load_config_without_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.output.format, TargetFormat::WebP);
    }

    #[test]
    fn load_config_applies_overrides() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            r#"
[output]
format = "jpeg"
quality = 65

[resize]
aspect_lock = false
filter = "nearest"
"#,
        )
        .unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.output.format, TargetFormat::Jpeg);
        assert_eq!(config.output.quality, 65);
        assert!(!config.resize.aspect_lock);
        assert_eq!(config.resize.filter, Filter::Nearest);
        assert_eq!(config.output.entry_prefix, "converted-image");
    }

    #[test]
    fn resolve_config_rejects_invalid_values() {
        let user: toml::Value = toml::from_str("[output]\nquality = 0\n").unwrap();
        assert!(resolve_config(Some(user)).is_err());
        assert!(resolve_config(None).is_ok());
    }

    // =========================================================================
    // stock_config_toml
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: RecastConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = RecastConfig::default();
        assert_eq!(config.output.format, defaults.output.format);
        assert_eq!(config.output.quality, defaults.output.quality);
        assert_eq!(config.output.archive_name, defaults.output.archive_name);
        assert_eq!(config.output.archive_folder, defaults.output.archive_folder);
        assert_eq!(config.output.entry_prefix, defaults.output.entry_prefix);
        assert_eq!(config.resize.aspect_lock, defaults.resize.aspect_lock);
        assert_eq!(config.resize.filter, defaults.resize.filter);
    }
}
