//! Process-wide embed cache with single-flight population.
//!
//! Each key maps to a `OnceCell`. The map lock is held only long enough to
//! fetch or insert the cell, so different URLs resolve concurrently while
//! concurrent renders of the same URL share one resolution.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};

/// Outcome of resolving one URL, kept for the life of the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedEmbed {
    /// Embeddable HTML.
    Resolved(String),
    /// Resolution failed; the detail is kept for diagnostics.
    Failed(String),
}

impl CachedEmbed {
    /// What the tag renders: the HTML, or nothing for a failure.
    pub fn html(&self) -> &str {
        match self {
            Self::Resolved(html) => html,
            Self::Failed(_) => "",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// URL → outcome map. No eviction and no size bound: every distinct key seen
/// stays until the cache is dropped.
#[derive(Debug, Default)]
pub struct EmbedCache {
    entries: Mutex<HashMap<String, Arc<OnceCell<CachedEmbed>>>>,
}

impl EmbedCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The settled outcome for `key`, if any. In-flight entries return `None`.
    pub async fn get(&self, key: &str) -> Option<CachedEmbed> {
        let entries = self.entries.lock().await;
        entries.get(key).and_then(|cell| cell.get().cloned())
    }

    /// Number of settled entries.
    pub async fn len(&self) -> usize {
        let entries = self.entries.lock().await;
        entries.values().filter(|cell| cell.initialized()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Return the outcome for `key`, running `resolve` only if no outcome is
    /// cached and no other caller is already resolving the same key.
    pub async fn get_or_resolve<F, Fut>(&self, key: &str, resolve: F) -> CachedEmbed
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = CachedEmbed>,
    {
        let cell = {
            let mut entries = self.entries.lock().await;
            entries
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        cell.get_or_init(resolve).await.clone()
    }
}
