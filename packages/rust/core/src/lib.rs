//! Site-level wiring for the infojunkie plugins.
//!
//! This crate binds the transformations in `infojunkie-html` and the resolver
//! in `infojunkie-oembed` to the extension points a site build exposes:
//! post-render hooks, named filters, and template tags. [`Site`] owns one of
//! each, built from a [`PluginsConfig`](infojunkie_shared::PluginsConfig).

pub mod filters;
pub mod hooks;
pub mod site;
pub mod tags;

pub use filters::{Filter, UNCHANGELOGIFY, UnchangelogifyFilter};
pub use hooks::{AnchorsHook, PostRenderHook};
pub use site::Site;
pub use tags::{OEMBED, OEmbedTag};
