//! Core domain types shared by the hook, filter, and tag crates.

use std::path::{Path, PathBuf};

/// Output extension of documents that post-render HTML hooks operate on.
pub const HTML_EXT: &str = ".html";

// ---------------------------------------------------------------------------
// RenderedDocument
// ---------------------------------------------------------------------------

/// A document after the host has rendered it to its final output format.
///
/// Post-render hooks receive this mutably and replace `output` in place; the
/// rest of the pipeline only ever sees the latest `output`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    /// Source path, if the document came from disk.
    pub path: Option<PathBuf>,
    /// Rendered output.
    pub output: String,
    /// Output extension including the leading dot (e.g. `.html`).
    pub output_ext: String,
}

impl RenderedDocument {
    /// Create a document with the given output and extension.
    pub fn new(output: impl Into<String>, output_ext: impl Into<String>) -> Self {
        Self {
            path: None,
            output: output.into(),
            output_ext: output_ext.into(),
        }
    }

    /// Create a document whose extension is taken from `path`.
    ///
    /// Files without an extension get an empty `output_ext`.
    pub fn from_path(path: &Path, output: impl Into<String>) -> Self {
        let output_ext = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        Self {
            path: Some(path.to_path_buf()),
            output: output.into(),
            output_ext,
        }
    }

    /// Whether the rendered output is HTML.
    pub fn is_html(&self) -> bool {
        self.output_ext.eq_ignore_ascii_case(HTML_EXT)
    }
}
