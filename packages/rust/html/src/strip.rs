//! Changelog table removal (`unchangelogify`).
//!
//! Parses the fragment with html5ever (via `scraper`), detaches every `<table>`
//! carrying the marker class together with its subtree, and serializes what is
//! left. Parsing is lenient; there is no error path.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::debug;

/// Class marking tables that get stripped unless configured otherwise.
pub const DEFAULT_MARKER_CLASS: &str = "changelog";

static TABLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("valid selector"));

/// Template filter body that drops marker-classed tables.
#[derive(Debug, Clone)]
pub struct TableStripper {
    marker_class: String,
}

impl TableStripper {
    /// Create a stripper removing `<table class="{marker_class}">`.
    pub fn new(marker_class: impl Into<String>) -> Self {
        Self {
            marker_class: marker_class.into(),
        }
    }

    /// The class that marks tables for removal.
    pub fn marker_class(&self) -> &str {
        &self.marker_class
    }

    /// Strip matching tables from an HTML fragment.
    pub fn apply(&self, html: &str) -> String {
        strip_tables(html, &self.marker_class)
    }
}

impl Default for TableStripper {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER_CLASS)
    }
}

/// Remove every `<table>` whose class list contains `marker_class`.
///
/// The result is the serialized fragment without the implicit `<html>`
/// wrapper that fragment parsing introduces.
pub fn strip_tables(html: &str, marker_class: &str) -> String {
    let mut doc = Html::parse_fragment(html);

    let marked: Vec<_> = doc
        .select(&TABLE_SEL)
        .filter(|table| table.value().classes().any(|c| c == marker_class))
        .map(|table| table.id())
        .collect();

    for id in &marked {
        if let Some(mut node) = doc.tree.get_mut(*id) {
            node.detach();
        }
    }

    if !marked.is_empty() {
        debug!(removed = marked.len(), marker_class, "stripped marked tables");
    }

    doc.root_element().inner_html()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
