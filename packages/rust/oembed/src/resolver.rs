//! URL → embeddable HTML, memoized in a shared [`EmbedCache`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, error, instrument};
use url::Url;

use infojunkie_shared::{OEmbedConfig, PluginError, Result};

use crate::cache::{CachedEmbed, EmbedCache};
use crate::discovery;
use crate::provider::EmbedOptions;
use crate::registry::{Fallback, ProviderRegistry};

/// Maximum number of redirects to follow for any oEmbed request.
const MAX_REDIRECTS: usize = 5;

/// User-Agent string for oEmbed requests.
const USER_AGENT: &str = concat!("infojunkie-oembed/", env!("CARGO_PKG_VERSION"));

/// Resolves URLs through a [`ProviderRegistry`] and caches every outcome.
///
/// Cheap to share: hold it in an `Arc` and hand it to every tag occurrence.
pub struct EmbedResolver {
    client: Client,
    registry: Arc<ProviderRegistry>,
    cache: Arc<EmbedCache>,
    options: EmbedOptions,
}

impl EmbedResolver {
    /// Build a resolver with the built-in providers and the fallbacks enabled
    /// in `config`.
    pub fn new(config: &OEmbedConfig, cache: Arc<EmbedCache>) -> Result<Self> {
        let registry = ProviderRegistry::from_config(config)?;
        Self::with_registry(config, Arc::new(registry), cache)
    }

    /// Build a resolver over an explicit registry.
    pub fn with_registry(
        config: &OEmbedConfig,
        registry: Arc<ProviderRegistry>,
        cache: Arc<EmbedCache>,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            registry,
            cache,
            options: EmbedOptions::from(config),
        })
    }

    pub fn cache(&self) -> &Arc<EmbedCache> {
        &self.cache
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Render the tag argument `markup` to HTML.
    ///
    /// The cache key is `markup` with surrounding whitespace trimmed. Failures
    /// are logged once, cached, and rendered as an empty string; this never
    /// returns an error.
    #[instrument(skip(self))]
    pub async fn render(&self, markup: &str) -> String {
        let key = markup.trim();

        let outcome = self
            .cache
            .get_or_resolve(key, move || async move {
                match self.resolve_str(key).await {
                    Ok(html) => {
                        debug!(url = key, bytes = html.len(), "oEmbed resolved");
                        CachedEmbed::Resolved(html)
                    }
                    Err(e) => {
                        error!(
                            target: "oembed",
                            url = key,
                            error = %e,
                            "could not extract oEmbed information"
                        );
                        CachedEmbed::Failed(e.to_string())
                    }
                }
            })
            .await;

        outcome.html().to_string()
    }

    /// Resolve a URL without consulting or filling the cache.
    ///
    /// A matching provider is authoritative: its error is returned without
    /// trying fallbacks. Otherwise fallbacks run in order and the first success
    /// wins; if all fail, the last error is returned.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn resolve(&self, url: &Url) -> Result<String> {
        if let Some(provider) = self.registry.find(url) {
            debug!(provider = provider.name(), "matched provider");
            return provider
                .fetch(&self.client, url, &self.options)
                .await?
                .html();
        }

        let mut last_err = PluginError::NoProvider {
            url: url.to_string(),
        };

        for fallback in self.registry.fallbacks() {
            match self.try_fallback(fallback, url).await {
                Ok(html) => {
                    debug!(fallback = fallback.name(), "fallback resolved");
                    return Ok(html);
                }
                Err(e) => {
                    debug!(fallback = fallback.name(), error = %e, "fallback failed");
                    last_err = e;
                }
            }
        }

        Err(last_err)
    }

    async fn resolve_str(&self, raw: &str) -> Result<String> {
        let url = Url::parse(raw)
            .map_err(|e| PluginError::parse(format!("'{raw}' is not a URL: {e}")))?;
        self.resolve(&url).await
    }

    async fn try_fallback(&self, fallback: &Fallback, url: &Url) -> Result<String> {
        let response = match fallback {
            Fallback::Discovery => discovery::discover(&self.client, url, &self.options).await?,
            Fallback::Provider(provider) => {
                provider.fetch(&self.client, url, &self.options).await?
            }
        };
        response.html()
    }
}

/// Build a reqwest client with the configured timeout.
fn build_client(config: &OEmbedConfig) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| PluginError::Network(format!("failed to build HTTP client: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Provider;
    use std::io::Write;
    use std::sync::Mutex;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VIDEO_JSON: &str =
        r#"{"type":"video","html":"<iframe src=\"https://video.example/embed/1\"></iframe>"}"#;

    fn resolver_with(registry: ProviderRegistry) -> EmbedResolver {
        EmbedResolver::with_registry(
            &OEmbedConfig::default(),
            Arc::new(registry),
            Arc::new(EmbedCache::new()),
        )
        .unwrap()
    }

    fn mock_provider(server: &MockServer) -> ProviderRegistry {
        let mut registry = ProviderRegistry::empty();
        registry.register(
            Provider::new(
                "mock",
                format!("{}/oembed", server.uri()),
                &["https://video.example/*"],
            )
            .unwrap(),
        );
        registry
    }

    /// Collects formatted log output for assertions.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn success_is_cached() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/oembed"))
            .and(query_param("url", "https://video.example/watch/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VIDEO_JSON))
            .expect(1)
            .mount(&server)
            .await;

        let resolver = resolver_with(mock_provider(&server));

        let first = resolver.render("https://video.example/watch/1").await;
        let second = resolver.render("  https://video.example/watch/1\n").await;

        assert_eq!(first, r#"<iframe src="https://video.example/embed/1"></iframe>"#);
        assert_eq!(second, first);
        assert_eq!(resolver.cache().len().await, 1);
    }

    #[tokio::test]
    async fn failure_is_logged_once_and_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/oembed"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let logs = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::ERROR)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let resolver = resolver_with(mock_provider(&server));
        let url = "https://video.example/watch/broken";

        assert_eq!(resolver.render(url).await, "");
        assert_eq!(resolver.render(url).await, "");

        let output = logs.contents();
        assert_eq!(output.matches("could not extract oEmbed information").count(), 1);
        assert!(output.contains(url));
        assert!(output.contains("500"));
        assert!(resolver.cache().get(url).await.unwrap().is_failure());
    }

    #[tokio::test]
    async fn concurrent_renders_hit_provider_once() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/oembed"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VIDEO_JSON)
                    .set_delay(Duration::from_millis(100)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let resolver = resolver_with(mock_provider(&server));
        let url = "https://video.example/watch/1";

        let (a, b, c) = tokio::join!(resolver.render(url), resolver.render(url), resolver.render(url));
        assert!(a.contains("embed/1"));
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[tokio::test]
    async fn distinct_spellings_are_cached_separately() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/oembed"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VIDEO_JSON))
            .expect(2)
            .mount(&server)
            .await;

        let resolver = resolver_with(mock_provider(&server));
        resolver.render("https://video.example/watch/1").await;
        resolver.render("https://video.example/watch/1?").await;

        assert_eq!(resolver.cache().len().await, 2);
    }

    #[tokio::test]
    async fn invalid_url_renders_empty() {
        let resolver = resolver_with(ProviderRegistry::empty());
        assert_eq!(resolver.render("not a url").await, "");

        let cached = resolver.cache().get("not a url").await.unwrap();
        assert!(matches!(cached, CachedEmbed::Failed(ref e) if e.contains("not a URL")));
    }

    #[tokio::test]
    async fn unmatched_url_without_fallbacks_is_no_provider() {
        let resolver = resolver_with(ProviderRegistry::empty());
        let err = resolver
            .resolve(&Url::parse("https://nowhere.example/").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, PluginError::NoProvider { .. }));
    }

    #[tokio::test]
    async fn fallbacks_run_in_order() {
        let server = MockServer::start().await;
        let page_url = format!("{}/post", server.uri());

        // Discovery fails: the page has no oEmbed link.
        Mock::given(method("GET"))
            .and(path("/post"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html><head></head></html>"))
            .expect(1)
            .mount(&server)
            .await;

        // Noembed-style proxy answers.
        Mock::given(method("GET"))
            .and(path("/noembed"))
            .and(query_param("url", page_url.as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"type":"rich","html":"<div>proxied</div>"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut registry = ProviderRegistry::empty();
        registry
            .register_fallback(Fallback::Discovery)
            .register_fallback(Fallback::Provider(
                Provider::catch_all("noembed", format!("{}/noembed", server.uri())).unwrap(),
            ));

        let resolver = resolver_with(registry);
        assert_eq!(resolver.render(&page_url).await, "<div>proxied</div>");
    }

    #[tokio::test]
    async fn discovery_success_skips_later_fallbacks() {
        let server = MockServer::start().await;
        let page_url = format!("{}/post", server.uri());

        Mock::given(method("GET"))
            .and(path("/post"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                r#"<html><head><link rel="alternate" type="application/json+oembed" href="{}/wp-oembed?url=post"></head></html>"#,
                server.uri()
            )))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/wp-oembed"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"type":"rich","html":"<blockquote>wp</blockquote>"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/noembed"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VIDEO_JSON))
            .expect(0)
            .mount(&server)
            .await;

        let mut registry = ProviderRegistry::empty();
        registry
            .register_fallback(Fallback::Discovery)
            .register_fallback(Fallback::Provider(
                Provider::catch_all("noembed", format!("{}/noembed", server.uri())).unwrap(),
            ));

        let resolver = resolver_with(registry);
        assert_eq!(resolver.render(&page_url).await, "<blockquote>wp</blockquote>");
    }

    #[tokio::test]
    async fn matched_provider_error_skips_fallbacks() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/oembed"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/noembed"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VIDEO_JSON))
            .expect(0)
            .mount(&server)
            .await;

        let mut registry = mock_provider(&server);
        registry.register_fallback(Fallback::Provider(
            Provider::catch_all("noembed", format!("{}/noembed", server.uri())).unwrap(),
        ));

        let resolver = resolver_with(registry);
        assert_eq!(resolver.render("https://video.example/watch/404").await, "");
    }

    #[tokio::test]
    async fn slow_provider_times_out_as_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/oembed"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VIDEO_JSON)
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let config = OEmbedConfig {
            timeout_secs: 1,
            ..OEmbedConfig::default()
        };
        let resolver = EmbedResolver::with_registry(
            &config,
            Arc::new(mock_provider(&server)),
            Arc::new(EmbedCache::new()),
        )
        .unwrap();

        assert_eq!(resolver.render("https://video.example/watch/slow").await, "");
        assert!(
            resolver
                .cache()
                .get("https://video.example/watch/slow")
                .await
                .unwrap()
                .is_failure()
        );
    }
}
