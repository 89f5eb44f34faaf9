//! Shared types, error model, and configuration for the infojunkie site plugins.
//!
//! This crate is the foundation depended on by all other infojunkie crates.
//! It provides:
//! - [`PluginError`] — the unified error type
//! - [`RenderedDocument`] — the document handed to post-render hooks
//! - Configuration ([`PluginsConfig`], `_plugins.toml` loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AnchorsConfig, ChangelogConfig, OEmbedConfig, PluginsConfig, config_file_path, init_config,
    load_config, load_config_from,
};
pub use error::{PluginError, Result};
pub use types::{HTML_EXT, RenderedDocument};
