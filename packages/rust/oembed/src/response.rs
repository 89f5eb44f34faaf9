//! oEmbed response model (<https://oembed.com/#section2.3>).
//!
//! Only the JSON format is supported. Unknown fields are ignored so provider
//! extensions never break deserialization.

use serde::Deserialize;

use infojunkie_shared::{PluginError, Result};

/// The `type` of an oEmbed resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedType {
    Photo,
    Video,
    Link,
    Rich,
    #[serde(other)]
    Unknown,
}

/// `width`/`height` as sent by providers: usually a number, sometimes `"100%"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Number(serde_json::Number),
    Text(String),
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A decoded oEmbed response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmbedResponse {
    /// Resource type. Missing on error bodies (e.g. Noembed's `{"error": ..}`).
    #[serde(rename = "type", default)]
    pub kind: Option<EmbedType>,
    /// Embeddable markup (`video` and `rich`).
    #[serde(default)]
    pub html: Option<String>,
    /// Image source (`photo`).
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub width: Option<Dimension>,
    #[serde(default)]
    pub height: Option<Dimension>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_url: Option<String>,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(default)]
    pub provider_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    /// Set by proxies that answer 200 with an error payload.
    #[serde(default)]
    pub error: Option<String>,
}

impl EmbedResponse {
    /// Decode a JSON body, turning provider-reported errors into `Err`.
    pub fn from_json(body: &str) -> Result<Self> {
        let response: Self = serde_json::from_str(body)
            .map_err(|e| PluginError::Provider(format!("invalid oEmbed JSON: {e}")))?;

        if let Some(error) = &response.error {
            return Err(PluginError::Provider(error.clone()));
        }

        Ok(response)
    }

    /// The HTML to splice into the page.
    ///
    /// - `video` / `rich`: the `html` field
    /// - `photo`: an `<img>` built from `url` and `title`
    /// - `link`: no embeddable representation, always an error
    pub fn html(&self) -> Result<String> {
        match self.kind {
            Some(EmbedType::Photo) => {
                let src = self.url.as_deref().ok_or_else(|| {
                    PluginError::Provider("photo response has no url".into())
                })?;
                let alt = self.title.as_deref().unwrap_or_default();
                Ok(format!(
                    "<img src='{}' alt='{}' />",
                    escape_attr(src),
                    escape_attr(alt)
                ))
            }
            Some(EmbedType::Link) => Err(PluginError::Provider(
                "link responses have no embeddable html".into(),
            )),
            Some(EmbedType::Video | EmbedType::Rich | EmbedType::Unknown) | None => self
                .html
                .clone()
                .filter(|html| !html.trim().is_empty())
                .ok_or_else(|| PluginError::Provider("response has no html".into())),
        }
    }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('\'', "&#39;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
