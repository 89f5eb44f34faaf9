//! oEmbed discovery (<https://oembed.com/#section4>).
//!
//! When no known provider matches a URL, fetch the page itself and look for
//! `<link rel="alternate" type="application/json+oembed" href="...">` in it.

use std::sync::LazyLock;

use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, instrument};
use url::Url;

use infojunkie_shared::{PluginError, Result};

use crate::provider::{EmbedOptions, fetch_response, fetch_text};
use crate::response::EmbedResponse;

/// Maximum page size we are willing to scan for a discovery link (5 MB).
const MAX_PAGE_SIZE: u64 = 5 * 1024 * 1024;

static OEMBED_LINK_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"link[type="application/json+oembed"]"#).expect("valid selector")
});

/// Find the JSON oEmbed endpoint advertised by a page.
///
/// Relative `href`s are resolved against `page_url`. Only links whose `rel`
/// contains the `alternate` token count.
pub fn discover_endpoint(page_html: &str, page_url: &Url) -> Option<Url> {
    let doc = Html::parse_document(page_html);

    doc.select(&OEMBED_LINK_SEL)
        .filter(|link| {
            link.value()
                .attr("rel")
                .is_some_and(|rel| {
                    rel.split_ascii_whitespace()
                        .any(|token| token.eq_ignore_ascii_case("alternate"))
                })
        })
        .filter_map(|link| link.value().attr("href"))
        .find_map(|href| page_url.join(href.trim()).ok())
}

/// Fetch `url`, discover its oEmbed endpoint, and fetch the resource from it.
#[instrument(skip_all, fields(url = %url))]
pub async fn discover(client: &Client, url: &Url, opts: &EmbedOptions) -> Result<EmbedResponse> {
    let page = fetch_text(client, url, MAX_PAGE_SIZE).await?;

    let mut endpoint = discover_endpoint(&page, url).ok_or_else(|| {
        PluginError::Provider(format!("{url}: page advertises no oEmbed endpoint"))
    })?;
    debug!(%endpoint, "discovered oEmbed endpoint");

    opts.append_to(&mut endpoint);

    fetch_response(client, &endpoint).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn page(head: &str) -> String {
        format!("<!DOCTYPE html><html><head>{head}</head><body><p>post</p></body></html>")
    }

    #[test]
    fn finds_absolute_endpoint() {
        let base = Url::parse("https://blog.example.com/post/1").unwrap();
        let html = page(
            r#"<link rel="alternate" type="application/json+oembed" href="https://blog.example.com/oembed?url=https%3A%2F%2Fblog.example.com%2Fpost%2F1">"#,
        );
        let endpoint = discover_endpoint(&html, &base).unwrap();
        assert_eq!(endpoint.path(), "/oembed");
        assert_eq!(
            endpoint.query_pairs().find(|(k, _)| k == "url").unwrap().1,
            "https://blog.example.com/post/1"
        );
    }

    #[test]
    fn resolves_relative_endpoint() {
        let base = Url::parse("https://blog.example.com/post/1").unwrap();
        let html = page(
            r#"<link rel="alternate nofollow" type="application/json+oembed" href="/wp-json/oembed/1.0/embed?url=x">"#,
        );
        let endpoint = discover_endpoint(&html, &base).unwrap();
        assert_eq!(
            endpoint.as_str(),
            "https://blog.example.com/wp-json/oembed/1.0/embed?url=x"
        );
    }

    #[test]
    fn ignores_xml_and_non_alternate_links() {
        let base = Url::parse("https://blog.example.com/").unwrap();
        let html = page(
            r#"<link rel="alternate" type="text/xml+oembed" href="/oembed.xml">
               <link rel="stylesheet" type="application/json+oembed" href="/nope">"#,
        );
        assert!(discover_endpoint(&html, &base).is_none());
    }

    #[test]
    fn no_links_at_all() {
        let base = Url::parse("https://blog.example.com/").unwrap();
        assert!(discover_endpoint(&page(""), &base).is_none());
    }

    #[tokio::test]
    async fn discover_against_mock_site() {
        let server = MockServer::start().await;
        let article = format!("{}/article", server.uri());

        Mock::given(method("GET"))
            .and(path("/article"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page(&format!(
                r#"<link rel="alternate" type="application/json+oembed" href="{}/oembed?url=article&format=json">"#,
                server.uri()
            ))))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/oembed"))
            .and(query_param("url", "article"))
            .and(query_param("maxwidth", "500"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"type":"rich","html":"<blockquote>post</blockquote>"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let opts = EmbedOptions {
            max_width: Some(500),
            max_height: None,
        };
        let response = discover(&Client::new(), &Url::parse(&article).unwrap(), &opts)
            .await
            .unwrap();
        assert_eq!(response.html().unwrap(), "<blockquote>post</blockquote>");
    }

    #[tokio::test]
    async fn discover_page_without_link_fails() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/plain"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page("")))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/plain", server.uri())).unwrap();
        let err = discover(&Client::new(), &url, &EmbedOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no oEmbed endpoint"));
    }
}
