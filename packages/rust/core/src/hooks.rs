//! Post-render hooks: in-place transforms run on a document's final output.

use infojunkie_html::HeadingAnchorizer;
use infojunkie_shared::{AnchorsConfig, RenderedDocument};

/// A transform invoked after a document has been rendered, before it is written.
pub trait PostRenderHook: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Rewrite `doc.output` in place. Hooks decide for themselves which
    /// documents they touch.
    fn post_render(&self, doc: &mut RenderedDocument);
}

/// Injects self-referencing anchor links into headings of HTML documents.
#[derive(Debug, Clone, Default)]
pub struct AnchorsHook {
    anchorizer: HeadingAnchorizer,
}

impl AnchorsHook {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            anchorizer: HeadingAnchorizer::new(class),
        }
    }
}

impl From<&AnchorsConfig> for AnchorsHook {
    fn from(config: &AnchorsConfig) -> Self {
        Self::new(config.class.as_str())
    }
}

impl PostRenderHook for AnchorsHook {
    fn name(&self) -> &str {
        "anchors"
    }

    fn post_render(&self, doc: &mut RenderedDocument) {
        self.anchorizer.process(doc);
    }
}
