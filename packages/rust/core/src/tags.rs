//! Template tags.

use std::sync::Arc;

use infojunkie_oembed::EmbedResolver;
use infojunkie_shared::{PluginError, Result};

/// Name of the embed tag: `{% oembed <url> %}`.
pub const OEMBED: &str = "oembed";

/// One occurrence of `{% oembed <url> %}`.
///
/// Construction is cheap: the provider registry and cache live in the shared
/// resolver, not in the tag.
pub struct OEmbedTag {
    markup: String,
    resolver: Arc<EmbedResolver>,
}

impl OEmbedTag {
    /// Bind a tag occurrence to its argument. Blank markup is a template error.
    pub fn parse(markup: &str, resolver: Arc<EmbedResolver>) -> Result<Self> {
        if markup.trim().is_empty() {
            return Err(PluginError::parse(format!("'{OEMBED}' tag requires a URL")));
        }
        Ok(Self {
            markup: markup.to_string(),
            resolver,
        })
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Embeddable HTML for the URL, or `""` if it could not be resolved.
    pub async fn render(&self) -> String {
        self.resolver.render(&self.markup).await
    }
}
