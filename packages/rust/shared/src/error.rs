//! Error types for the infojunkie plugins.
//!
//! Library crates use [`PluginError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all plugin operations.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while talking to an oEmbed endpoint.
    #[error("network error: {0}")]
    Network(String),

    /// The remote side answered, but not with a usable oEmbed response.
    #[error("oEmbed provider error: {0}")]
    Provider(String),

    /// No provider, discovery link, or fallback could handle the URL.
    #[error("no oEmbed provider for {url}")]
    NoProvider { url: String },

    /// Template markup could not be parsed (bad tag argument, unknown tag).
    #[error("parse error: {message}")]
    Parse { message: String },

    /// A filter, hook, or tag name that is not registered.
    #[error("unknown {kind} '{name}'")]
    Unknown { kind: &'static str, name: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PluginError>;

impl PluginError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create an error for an unregistered extension point.
    pub fn unknown(kind: &'static str, name: impl Into<String>) -> Self {
        Self::Unknown {
            kind,
            name: name.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = PluginError::config("timeout_secs must be positive");
        assert_eq!(err.to_string(), "config error: timeout_secs must be positive");

        let err = PluginError::unknown("filter", "shout");
        assert_eq!(err.to_string(), "unknown filter 'shout'");

        let err = PluginError::NoProvider {
            url: "https://example.com/x".into(),
        };
        assert!(err.to_string().contains("https://example.com/x"));
    }
}
