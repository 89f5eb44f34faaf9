//! Plugin configuration.
//!
//! Site-level config lives at `<site>/_plugins.toml`. Every field has a
//! default, so a missing file or a partial file is always valid.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{PluginError, Result};

/// Default configuration file name, looked up in the site root.
const CONFIG_FILE_NAME: &str = "_plugins.toml";

// ---------------------------------------------------------------------------
// Config structs (matching _plugins.toml schema)
// ---------------------------------------------------------------------------

/// Top-level plugin config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginsConfig {
    /// Heading anchor hook.
    #[serde(default)]
    pub anchors: AnchorsConfig,

    /// `unchangelogify` filter.
    #[serde(default)]
    pub changelog: ChangelogConfig,

    /// `oembed` tag.
    #[serde(default)]
    pub oembed: OEmbedConfig,
}

/// `[anchors]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorsConfig {
    /// Whether the post-render hook is registered at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// CSS class put on the generated `<a>`.
    #[serde(default = "default_anchor_class")]
    pub class: String,
}

impl Default for AnchorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            class: default_anchor_class(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_anchor_class() -> String {
    "header".into()
}

/// `[changelog]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangelogConfig {
    /// Class marking the tables `unchangelogify` removes.
    #[serde(default = "default_marker_class")]
    pub marker_class: String,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            marker_class: default_marker_class(),
        }
    }
}

fn default_marker_class() -> String {
    "changelog".into()
}

/// `[oembed]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OEmbedConfig {
    /// Timeout in seconds for each oEmbed HTTP request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Try `<link rel="alternate" type="application/json+oembed">` discovery
    /// when no built-in provider matches.
    #[serde(default = "default_true")]
    pub discovery: bool,

    /// Fall back to the Noembed proxy after discovery.
    #[serde(default = "default_true")]
    pub noembed: bool,

    /// Noembed endpoint.
    #[serde(default = "default_noembed_endpoint")]
    pub noembed_endpoint: String,

    /// `maxwidth` passed to providers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,

    /// `maxheight` passed to providers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_height: Option<u32>,
}

impl Default for OEmbedConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            discovery: true,
            noembed: true,
            noembed_endpoint: default_noembed_endpoint(),
            max_width: None,
            max_height: None,
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}
fn default_noembed_endpoint() -> String {
    "https://noembed.com/embed".into()
}

impl PluginsConfig {
    /// Reject values that would only fail later, at render time.
    pub fn validate(&self) -> Result<()> {
        if self.anchors.class.trim().is_empty() {
            return Err(PluginError::config("anchors.class must not be empty"));
        }
        if self.changelog.marker_class.trim().is_empty() {
            return Err(PluginError::config("changelog.marker_class must not be empty"));
        }
        if self.oembed.timeout_secs == 0 {
            return Err(PluginError::config("oembed.timeout_secs must be positive"));
        }
        Url::parse(&self.oembed.noembed_endpoint).map_err(|e| {
            PluginError::config(format!(
                "oembed.noembed_endpoint '{}' is not a URL: {e}",
                self.oembed.noembed_endpoint
            ))
        })?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config file of a site (`<site>/_plugins.toml`).
pub fn config_file_path(site_dir: &Path) -> PathBuf {
    site_dir.join(CONFIG_FILE_NAME)
}

/// Load the plugin config of a site. Returns defaults if the file does not exist.
pub fn load_config(site_dir: &Path) -> Result<PluginsConfig> {
    let path = config_file_path(site_dir);

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(PluginsConfig::default());
    }

    load_config_from(&path)
}

/// Load and validate the plugin config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<PluginsConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PluginError::io(path, e))?;

    let config: PluginsConfig = toml::from_str(&content).map_err(|e| {
        PluginError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;

    Ok(config)
}

/// Write a default config file into `site_dir`.
/// Returns the path to the created file.
pub fn init_config(site_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(site_dir).map_err(|e| PluginError::io(site_dir, e))?;

    let path = config_file_path(site_dir);
    if path.exists() {
        return Err(PluginError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    let content = toml::to_string_pretty(&PluginsConfig::default())
        .map_err(|e| PluginError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PluginError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
