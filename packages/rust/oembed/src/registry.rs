//! Provider registry: specific providers first, then an ordered fallback chain.

use url::Url;

use infojunkie_shared::{OEmbedConfig, Result};

use crate::builtin::builtin_providers;
use crate::provider::Provider;

/// Name used for the Noembed fallback provider.
pub const NOEMBED: &str = "noembed";

/// Strategy tried when no registered provider matches a URL.
#[derive(Debug, Clone)]
pub enum Fallback {
    /// Fetch the page and follow its `application/json+oembed` link.
    Discovery,
    /// Ask a catch-all provider (e.g. the Noembed proxy).
    Provider(Provider),
}

impl Fallback {
    /// Name used in logs.
    pub fn name(&self) -> &str {
        match self {
            Self::Discovery => "discovery",
            Self::Provider(p) => p.name(),
        }
    }
}

/// Holds providers in priority order plus the fallback chain.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<Provider>,
    fallbacks: Vec<Fallback>,
}

impl ProviderRegistry {
    /// A registry with nothing registered.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry with every built-in provider and no fallbacks.
    pub fn builtin() -> Self {
        Self {
            providers: builtin_providers().to_vec(),
            fallbacks: Vec::new(),
        }
    }

    /// Built-in providers plus the fallbacks enabled in `config`
    /// (discovery first, Noembed last).
    pub fn from_config(config: &OEmbedConfig) -> Result<Self> {
        let mut registry = Self::builtin();
        if config.discovery {
            registry.register_fallback(Fallback::Discovery);
        }
        if config.noembed {
            registry.register_fallback(Fallback::Provider(Provider::catch_all(
                NOEMBED,
                config.noembed_endpoint.as_str(),
            )?));
        }
        Ok(registry)
    }

    /// Append a provider; earlier providers win on overlapping schemes.
    pub fn register(&mut self, provider: Provider) -> &mut Self {
        self.providers.push(provider);
        self
    }

    /// Append a fallback to the end of the chain.
    pub fn register_fallback(&mut self, fallback: Fallback) -> &mut Self {
        self.fallbacks.push(fallback);
        self
    }

    /// First registered provider whose schemes match `url`.
    pub fn find(&self, url: &Url) -> Option<&Provider> {
        self.providers.iter().find(|p| p.matches(url))
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn fallbacks(&self) -> &[Fallback] {
        &self.fallbacks
    }
}
