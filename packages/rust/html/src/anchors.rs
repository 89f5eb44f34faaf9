//! Heading anchors.
//!
//! `<h2 class="x" id="intro">Intro</h2>` becomes
//! `<h2 class="x" id="intro"><a class="header" href="#intro">Intro</a></h2>`.
//!
//! This is a text rewrite, not a DOM round-trip: the opening tag, the inner
//! content, and everything between headings are copied byte for byte.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use infojunkie_shared::RenderedDocument;

/// Class put on generated anchors unless configured otherwise.
pub const DEFAULT_ANCHOR_CLASS: &str = "header";

/// Opening `<h1>`..`<h6>` tag with its attribute list. Quoted values may
/// contain `>`.
static OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<h([1-6])((?:\s+[^\s=/>]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+))?)*)\s*>"#,
    )
    .expect("valid regex")
});

/// One attribute: name, then a double-quoted, single-quoted or bare value.
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s+([^\s=/>]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+)))?"#)
        .expect("valid regex")
});

// ---------------------------------------------------------------------------
// HeadingAnchorizer
// ---------------------------------------------------------------------------

/// Post-render hook body for heading anchors.
#[derive(Debug, Clone)]
pub struct HeadingAnchorizer {
    class: String,
}

impl HeadingAnchorizer {
    /// Create an anchorizer emitting `<a class="{class}">`.
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
        }
    }

    /// The CSS class of generated anchors.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Rewrite an HTML string.
    pub fn apply(&self, html: &str) -> String {
        rewrite(html, &self.class).0
    }

    /// Rewrite a rendered document in place. Non-HTML output is left alone.
    #[instrument(skip_all, fields(ext = %doc.output_ext))]
    pub fn process(&self, doc: &mut RenderedDocument) {
        if !doc.is_html() {
            return;
        }

        let (output, anchored) = rewrite(&doc.output, &self.class);
        debug!(anchored, path = ?doc.path, "heading anchors applied");
        doc.output = output;
    }
}

impl Default for HeadingAnchorizer {
    fn default() -> Self {
        Self::new(DEFAULT_ANCHOR_CLASS)
    }
}

/// Wrap every `id`-carrying heading's content in `<a class="{class}" href="#id">`.
pub fn anchorize(html: &str, class: &str) -> String {
    rewrite(html, class).0
}

/// Returns the rewritten HTML and the number of headings anchored.
fn rewrite(html: &str, class: &str) -> (String, usize) {
    let class = escape_attr(class);
    let mut out = String::with_capacity(html.len());
    let mut cursor = 0;
    let mut anchored = 0;

    for caps in OPEN_RE.captures_iter(html) {
        let Some(open) = caps.get(0) else {
            continue;
        };
        // Headings nested inside a heading we already rewrote.
        if open.start() < cursor {
            continue;
        }

        let attrs = caps.get(2).map_or("", |m| m.as_str());
        let Some(id) = heading_id(attrs) else {
            continue;
        };

        let close_tag = format!("</h{}>", &caps[1]);
        let Some(inner_len) = html[open.end()..].find(&close_tag) else {
            continue;
        };
        let inner = &html[open.end()..open.end() + inner_len];

        let anchor_open = format!(r##"<a class="{class}" href="#{id}">"##);
        if inner.starts_with(&anchor_open) && inner.ends_with("</a>") {
            continue;
        }

        out.push_str(&html[cursor..open.end()]);
        out.push_str(&anchor_open);
        out.push_str(inner);
        out.push_str("</a>");
        out.push_str(&close_tag);

        cursor = open.end() + inner_len + close_tag.len();
        anchored += 1;
    }

    out.push_str(&html[cursor..]);
    (out, anchored)
}

/// Value of the attribute named exactly `id`, if it is a usable fragment.
fn heading_id(attrs: &str) -> Option<&str> {
    let value = ATTR_RE
        .captures_iter(attrs)
        .find(|caps| caps[1].eq_ignore_ascii_case("id"))
        .and_then(|caps| caps.get(2).or_else(|| caps.get(3)).or_else(|| caps.get(4)))?
        .as_str();

    let usable = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-');
    usable.then_some(value)
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
