//! A configured site: hooks, filters and the embed tag behind one handle.

use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};
use tracing::{debug, info, instrument};

use infojunkie_oembed::{EmbedCache, EmbedResolver};
use infojunkie_shared::{PluginError, PluginsConfig, RenderedDocument, Result};

use crate::filters::{Filter, UnchangelogifyFilter};
use crate::hooks::{AnchorsHook, PostRenderHook};
use crate::tags::{OEMBED, OEmbedTag};

/// `{% name markup %}`, possibly spanning lines, with optional `{%-`/`-%}`
/// whitespace control. Markup may be absent.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{%(-?)\s*(\w+)(?:\s+(.*?))?\s*(-?)%\}").expect("valid regex")
});

/// Plugin registrations for one site build.
pub struct Site {
    config: PluginsConfig,
    hooks: Vec<Box<dyn PostRenderHook>>,
    filters: Vec<Box<dyn Filter>>,
    resolver: Arc<EmbedResolver>,
}

impl Site {
    /// Register every plugin enabled in `config`, with a fresh embed cache.
    pub fn new(config: PluginsConfig) -> Result<Self> {
        Self::with_embed_cache(config, Arc::new(EmbedCache::new()))
    }

    /// Like [`Site::new`], sharing an existing embed cache.
    pub fn with_embed_cache(config: PluginsConfig, cache: Arc<EmbedCache>) -> Result<Self> {
        let resolver = Arc::new(EmbedResolver::new(&config.oembed, cache)?);
        Ok(Self::with_resolver(config, resolver))
    }

    /// Like [`Site::new`], with a caller-built resolver.
    pub fn with_resolver(config: PluginsConfig, resolver: Arc<EmbedResolver>) -> Self {
        let mut hooks: Vec<Box<dyn PostRenderHook>> = Vec::new();
        if config.anchors.enabled {
            hooks.push(Box::new(AnchorsHook::from(&config.anchors)));
        }

        let filters: Vec<Box<dyn Filter>> =
            vec![Box::new(UnchangelogifyFilter::from(&config.changelog))];

        info!(
            hooks = hooks.len(),
            filters = filters.len(),
            providers = resolver.registry().providers().len(),
            "site plugins registered"
        );

        Self {
            config,
            hooks,
            filters,
            resolver,
        }
    }

    pub fn config(&self) -> &PluginsConfig {
        &self.config
    }

    /// Names of registered post-render hooks, in run order.
    pub fn hook_names(&self) -> Vec<&str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }

    /// Names of registered filters.
    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    pub fn resolver(&self) -> &Arc<EmbedResolver> {
        &self.resolver
    }

    pub fn embed_cache(&self) -> &Arc<EmbedCache> {
        self.resolver.cache()
    }

    /// Run every post-render hook over `doc`, in registration order.
    pub fn post_render(&self, doc: &mut RenderedDocument) {
        for hook in &self.hooks {
            debug!(hook = hook.name(), "post-render");
            hook.post_render(doc);
        }
    }

    /// Apply the filter registered as `name`.
    pub fn apply_filter(&self, name: &str, input: &str) -> Result<String> {
        let filter = self
            .filters
            .iter()
            .find(|f| f.name() == name)
            .ok_or_else(|| PluginError::unknown("filter", name))?;
        Ok(filter.apply(input))
    }

    /// Expand every `{% tag markup %}` in `template`, in document order.
    ///
    /// Each tag's output replaces it in place. `{%-` and `-%}` strip the
    /// whitespace of the adjacent template text. An unknown tag name or a tag
    /// that fails to parse is an error; a tag whose embed cannot be resolved
    /// renders empty.
    #[instrument(skip_all, fields(len = template.len()))]
    pub async fn render_tags(&self, template: &str) -> Result<String> {
        let mut out = String::with_capacity(template.len());
        let mut cursor = 0;
        let mut trim_next = false;

        for caps in TAG_RE.captures_iter(template) {
            let Some(whole) = caps.get(0) else {
                continue;
            };

            let mut text = &template[cursor..whole.start()];
            if trim_next {
                text = text.trim_start();
            }
            if !caps[1].is_empty() {
                text = text.trim_end();
            }
            out.push_str(text);

            out.push_str(&self.render_tag(&caps).await?);
            cursor = whole.end();
            trim_next = !caps[4].is_empty();
        }

        let rest = &template[cursor..];
        out.push_str(if trim_next { rest.trim_start() } else { rest });
        Ok(out)
    }

    async fn render_tag(&self, caps: &Captures<'_>) -> Result<String> {
        let name = &caps[2];
        let markup = caps.get(3).map_or("", |m| m.as_str());

        match name {
            OEMBED => {
                let tag = OEmbedTag::parse(markup, Arc::clone(&self.resolver))?;
                Ok(tag.render().await)
            }
            other => Err(PluginError::unknown("tag", other)),
        }
    }
}
