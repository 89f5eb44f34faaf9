//! Built-in provider list.
//!
//! Compiled once per process on first use; registries clone the compiled
//! providers (cloning a `Regex` is cheap).

use std::sync::LazyLock;

use crate::provider::Provider;

/// `(name, endpoint, schemes)` for every built-in provider.
const PROVIDERS: &[(&str, &str, &[&str])] = &[
    (
        "youtube",
        "https://www.youtube.com/oembed",
        &[
            "http*://*.youtube.com/watch*",
            "http*://youtube.com/watch*",
            "http*://*.youtube.com/v/*",
            "http*://*.youtube.com/shorts/*",
            "http*://*.youtube.com/playlist?list=*",
            "http*://youtu.be/*",
        ],
    ),
    (
        "vimeo",
        "https://vimeo.com/api/oembed.{format}",
        &["http*://vimeo.com/*", "http*://*.vimeo.com/*"],
    ),
    (
        "flickr",
        "https://www.flickr.com/services/oembed/",
        &["http*://*.flickr.com/*", "http*://flic.kr/*"],
    ),
    (
        "soundcloud",
        "https://soundcloud.com/oembed",
        &["http*://soundcloud.com/*", "http*://*.soundcloud.com/*"],
    ),
    (
        "spotify",
        "https://open.spotify.com/oembed",
        &["http*://open.spotify.com/*", "spotify:*"],
    ),
    (
        "twitter",
        "https://publish.twitter.com/oembed",
        &[
            "http*://twitter.com/*/status/*",
            "http*://*.twitter.com/*/status/*",
            "http*://x.com/*/status/*",
        ],
    ),
    (
        "tiktok",
        "https://www.tiktok.com/oembed",
        &["http*://www.tiktok.com/*/video/*"],
    ),
    (
        "dailymotion",
        "https://www.dailymotion.com/services/oembed",
        &["http*://*.dailymotion.com/video/*", "http*://dai.ly/*"],
    ),
    (
        "slideshare",
        "https://www.slideshare.net/api/oembed/2",
        &["http*://*.slideshare.net/*"],
    ),
    (
        "speakerdeck",
        "https://speakerdeck.com/oembed.{format}",
        &["http*://speakerdeck.com/*/*"],
    ),
    (
        "codepen",
        "https://codepen.io/api/oembed",
        &["http*://codepen.io/*/pen/*"],
    ),
    (
        "giphy",
        "https://giphy.com/services/oembed",
        &[
            "http*://giphy.com/gifs/*",
            "http*://gph.is/*",
            "http*://media.giphy.com/media/*/giphy.gif",
        ],
    ),
    (
        "kickstarter",
        "https://www.kickstarter.com/services/oembed",
        &["http*://www.kickstarter.com/projects/*"],
    ),
    (
        "ted",
        "https://www.ted.com/services/v1/oembed.{format}",
        &["http*://*.ted.com/talks/*"],
    ),
    (
        "reddit",
        "https://www.reddit.com/oembed",
        &["http*://*.reddit.com/r/*/comments/*"],
    ),
];

static BUILTIN: LazyLock<Vec<Provider>> = LazyLock::new(|| {
    PROVIDERS
        .iter()
        .map(|(name, endpoint, schemes)| {
            Provider::new(*name, *endpoint, schemes).expect("built-in provider schemes are valid")
        })
        .collect()
});

/// All built-in providers, in match priority order.
pub fn builtin_providers() -> &'static [Provider] {
    &BUILTIN
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn provider_for(url: &str) -> Option<&'static str> {
        let url = Url::parse(url).unwrap();
        builtin_providers()
            .iter()
            .find(|p| p.matches(&url))
            .map(|p| p.name())
    }

    #[test]
    fn every_builtin_compiles() {
        assert_eq!(builtin_providers().len(), PROVIDERS.len());
    }

    #[test]
    fn well_known_urls_match() {
        assert_eq!(provider_for("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), Some("youtube"));
        assert_eq!(provider_for("https://youtu.be/dQw4w9WgXcQ"), Some("youtube"));
        assert_eq!(provider_for("https://vimeo.com/76979871"), Some("vimeo"));
        assert_eq!(provider_for("https://www.flickr.com/photos/bees/2341623661/"), Some("flickr"));
        assert_eq!(provider_for("https://x.com/rustlang/status/1"), Some("twitter"));
        assert_eq!(provider_for("https://codepen.io/someone/pen/abc"), Some("codepen"));
        assert_eq!(
            provider_for("https://www.reddit.com/r/rust/comments/abc/title/"),
            Some("reddit")
        );
    }

    #[test]
    fn unknown_site_matches_nothing() {
        assert_eq!(provider_for("https://blog.example.com/post/1"), None);
    }
}
