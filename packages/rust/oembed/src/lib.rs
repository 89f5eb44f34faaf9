//! oEmbed resolution with provider discovery and a process-wide cache.
//!
//! This crate provides:
//! - [`Provider`] / [`ProviderRegistry`] — built-in providers plus an ordered
//!   fallback chain ([`Fallback::Discovery`], then the Noembed proxy)
//! - [`discovery`] — `<link rel="alternate" type="application/json+oembed">` lookup
//! - [`EmbedCache`] — URL → outcome memo with single-flight population
//! - [`EmbedResolver`] — the `oembed` tag body: trim, look up, resolve, cache

mod builtin;
mod cache;
pub mod discovery;
mod provider;
mod registry;
mod resolver;
mod response;

pub use builtin::builtin_providers;
pub use cache::{CachedEmbed, EmbedCache};
pub use discovery::{discover, discover_endpoint};
pub use provider::{EmbedOptions, Provider};
pub use registry::{Fallback, NOEMBED, ProviderRegistry};
pub use resolver::EmbedResolver;
pub use response::{Dimension, EmbedResponse, EmbedType};
