//! Site configuration.
//!
//! Loaded from a single `config.toml`. Stock defaults are serialized to a
//! TOML table, the user's file is merged on top key by key, and the merged
//! table is deserialized and validated. A missing file means "all defaults".
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! site_title = "Blog"             # Page title; post pages append " - {subject}"
//! base_url = "http://localhost"   # Public root of the site
//! data_root = "data"              # Filesystem directory holding post/<id>/ galleries
//! # data_url = "http://localhost/data"  # Public URL of data_root (default: base_url + "/data")
//! database = "cms.sqlite"         # SQLite database with the posts and users tables
//! table_prefix = ""               # Prefix on the posts/users table names
//!
//! [gallery]
//! extensions = ["jpg"]            # Full-size image extensions (case-insensitive)
//! thumbs_dir = "thumbs"           # Thumbnail subdirectory, filenames match 1:1
//! on_image_error = "abort"        # "abort" fails the request, "skip" drops the image
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
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

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Title shown in the browser tab.
    pub site_title: String,
    /// Public root of the site, used for navigation links and control images.
    pub base_url: String,
    /// Directory containing `post/<id>/` gallery folders.
    pub data_root: PathBuf,
    /// Public URL that `data_root` is served under.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_url: Option<String>,
    /// SQLite database file.
    pub database: PathBuf,
    /// Prefix applied to the `posts` and `users` table names.
    pub table_prefix: String,
    /// Gallery discovery settings.
    pub gallery: GalleryConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_title: "Blog".to_string(),
            base_url: "http://localhost".to_string(),
            data_root: PathBuf::from("data"),
            data_url: None,
            database: PathBuf::from("cms.sqlite"),
            table_prefix: String::new(),
            gallery: GalleryConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Validation("base_url must not be empty".into()));
        }
        if self.gallery.extensions.is_empty()
            || self.gallery.extensions.iter().any(|e| e.trim().is_empty())
        {
            return Err(ConfigError::Validation(
                "gallery.extensions must list at least one non-empty extension".into(),
            ));
        }
        let thumbs = &self.gallery.thumbs_dir;
        if thumbs.is_empty() || thumbs.contains(['/', '\\']) || thumbs == "." || thumbs == ".." {
            return Err(ConfigError::Validation(
                "gallery.thumbs_dir must be a single directory name".into(),
            ));
        }
        if !self
            .table_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ConfigError::Validation(
                "table_prefix may only contain ASCII letters, digits and '_'".into(),
            ));
        }
        Ok(())
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Public URL that replaces the `data_root` prefix in image paths.
    pub fn public_data_url(&self) -> String {
        match &self.data_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("{}/data", self.base_url()),
        }
    }
}

/// What to do when a gallery image or its thumbnail cannot be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageErrorPolicy {
    /// Fail the whole request.
    #[default]
    Abort,
    /// Drop the image/thumbnail pair and log a warning.
    Skip,
}

/// Gallery discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Extensions of full-size images, compared case-insensitively.
    pub extensions: Vec<String>,
    /// Name of the thumbnail subdirectory inside each post directory.
    pub thumbs_dir: String,
    pub on_image_error: ImageErrorPolicy,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["jpg".to_string()],
            thumbs_dir: "thumbs".to_string(),
            on_image_error: ImageErrorPolicy::Abort,
        }
    }
}

impl GalleryConfig {
    /// Whether `path` has one of the configured full-size extensions.
    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|want| want.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
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

/// Read a config file as a raw TOML value. `Ok(None)` if it does not exist.
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
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file, falling back to stock defaults.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# post-view configuration
# =======================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Title shown in the browser tab. Post pages append " - {subject}".
site_title = "Blog"

# Public root of the site. Used for previous/next links and for the
# gallery's navigation arrow images ({base_url}/web/images/prev.png).
base_url = "http://localhost"

# Directory holding per-post galleries:
#   {data_root}/post/{post id}/*.jpg          full-size images
#   {data_root}/post/{post id}/thumbs/*.jpg   thumbnails, same filenames
data_root = "data"

# Public URL that data_root is served under. Image URLs are built by
# replacing the data_root prefix with this value.
# Defaults to "{base_url}/data".
# data_url = "http://localhost/data"

# SQLite database with the posts and users tables. Opened read-only;
# it must already exist.
database = "cms.sqlite"

# Prefix applied to the posts and users table names.
table_prefix = ""

[gallery]
# Extensions of full-size images. Matching ignores case, so "jpg" also
# picks up photo.JPG and photo.Jpg.
extensions = ["jpg"]

# Thumbnail subdirectory inside each post directory.
thumbs_dir = "thumbs"

# What happens when an image or its thumbnail cannot be read:
#   "abort" - the request fails
#   "skip"  - the pair is left out and a warning is logged
on_image_error = "abort"
"##
}
