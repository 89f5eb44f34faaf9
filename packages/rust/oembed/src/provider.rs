//! oEmbed providers: an API endpoint plus the URL schemes it serves.

use regex::Regex;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use infojunkie_shared::{OEmbedConfig, PluginError, Result};

use crate::response::EmbedResponse;

/// Maximum oEmbed response size we accept (1 MB).
const MAX_RESPONSE_SIZE: u64 = 1024 * 1024;

// ---------------------------------------------------------------------------
// EmbedOptions
// ---------------------------------------------------------------------------

/// Consumer parameters sent with every oEmbed request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbedOptions {
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
}

impl From<&OEmbedConfig> for EmbedOptions {
    fn from(config: &OEmbedConfig) -> Self {
        Self {
            max_width: config.max_width,
            max_height: config.max_height,
        }
    }
}

impl EmbedOptions {
    pub(crate) fn append_to(&self, endpoint: &mut Url) {
        if self.max_width.is_none() && self.max_height.is_none() {
            return;
        }
        let mut query = endpoint.query_pairs_mut();
        if let Some(w) = self.max_width {
            query.append_pair("maxwidth", &w.to_string());
        }
        if let Some(h) = self.max_height {
            query.append_pair("maxheight", &h.to_string());
        }
    }
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// A single oEmbed provider.
///
/// Schemes are glob patterns where `*` matches any run of characters, e.g.
/// `http*://*.youtube.com/watch*`. An endpoint may contain `{format}`, which is
/// replaced with `json`.
#[derive(Debug, Clone)]
pub struct Provider {
    name: String,
    endpoint: String,
    schemes: Vec<Regex>,
}

impl Provider {
    /// Create a provider, compiling its URL schemes.
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        schemes: &[&str],
    ) -> Result<Self> {
        let name = name.into();
        let schemes = schemes
            .iter()
            .map(|scheme| {
                scheme_regex(scheme).map_err(|e| {
                    PluginError::config(format!("provider {name}: bad scheme '{scheme}': {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name,
            endpoint: endpoint.into(),
            schemes,
        })
    }

    /// A provider that accepts every URL (proxies such as Noembed).
    pub fn catch_all(name: impl Into<String>, endpoint: impl Into<String>) -> Result<Self> {
        Self::new(name, endpoint, &["*"])
    }

    /// Provider name used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether any of this provider's schemes matches `url`.
    pub fn matches(&self, url: &Url) -> bool {
        self.schemes.iter().any(|re| re.is_match(url.as_str()))
    }

    /// The request URL for `url`: endpoint + `url`, `format` and size params.
    pub fn request_url(&self, url: &Url, opts: &EmbedOptions) -> Result<Url> {
        let endpoint = self.endpoint.replace("{format}", "json");
        let mut request = Url::parse(&endpoint).map_err(|e| {
            PluginError::config(format!("provider {}: bad endpoint '{endpoint}': {e}", self.name))
        })?;

        request
            .query_pairs_mut()
            .append_pair("url", url.as_str())
            .append_pair("format", "json");
        opts.append_to(&mut request);

        Ok(request)
    }

    /// Fetch the oEmbed resource for `url` from this provider.
    #[instrument(skip_all, fields(provider = %self.name, url = %url))]
    pub async fn fetch(
        &self,
        client: &Client,
        url: &Url,
        opts: &EmbedOptions,
    ) -> Result<EmbedResponse> {
        let request = self.request_url(url, opts)?;
        fetch_response(client, &request).await
    }
}

/// Compile a glob-style URL scheme into an anchored regex.
fn scheme_regex(scheme: &str) -> std::result::Result<Regex, regex::Error> {
    let pattern = scheme
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{pattern}$"))
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// GET `request` and decode the body as an oEmbed response.
pub(crate) async fn fetch_response(client: &Client, request: &Url) -> Result<EmbedResponse> {
    let body = fetch_text(client, request, MAX_RESPONSE_SIZE).await?;
    let response = EmbedResponse::from_json(&body)?;
    debug!(kind = ?response.kind, "oEmbed response decoded");
    Ok(response)
}

/// GET a URL, requiring a 2xx status and a body no larger than `max_size`.
pub(crate) async fn fetch_text(client: &Client, url: &Url, max_size: u64) -> Result<String> {
    let mut response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| PluginError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(PluginError::Network(format!("{url}: HTTP {status}")));
    }

    let too_large = |len: u64| {
        PluginError::Provider(format!(
            "{url}: response too large ({len} bytes, max {max_size})"
        ))
    };

    if let Some(len) = response.content_length() {
        if len > max_size {
            return Err(too_large(len));
        }
    }

    // Content-Length is absent on chunked bodies, so count as we read.
    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| PluginError::Network(format!("{url}: failed to read body: {e}")))?
    {
        push_chunk(&mut body, &chunk, max_size).map_err(too_large)?;
    }

    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Append `chunk` unless that would take `body` past `max_size`; the error
/// carries the size the body would have reached.
fn push_chunk(body: &mut Vec<u8>, chunk: &[u8], max_size: u64) -> std::result::Result<(), u64> {
    let len = (body.len() + chunk.len()) as u64;
    if len > max_size {
        return Err(len);
    }
    body.extend_from_slice(chunk);
    Ok(())
}
