//! Session memo of provider-chain results

use super::provider::{LyricsQuery, ProviderChain, ResolvedLyrics};
use std::collections::HashMap;
use std::sync::Arc;

/// What the cache remembers for one (artist, title)
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEntry {
    Found(ResolvedLyrics),
    NotFound,
}

impl CacheEntry {
    pub fn resolved(&self) -> Option<ResolvedLyrics> {
        match self {
            CacheEntry::Found(r) => Some(r.clone()),
            CacheEntry::NotFound => None,
        }
    }
}

impl From<Option<ResolvedLyrics>> for CacheEntry {
    fn from(value: Option<ResolvedLyrics>) -> Self {
        match value {
            Some(r) => CacheEntry::Found(r),
            None => CacheEntry::NotFound,
        }
    }
}

/// Case-insensitive `artist|title`, ignoring surrounding whitespace
pub fn cache_key(title: &str, artist: &str) -> String {
    format!(
        "{}|{}",
        artist.trim().to_lowercase(),
        title.trim().to_lowercase()
    )
}

/// Unbounded, lives for the session
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: HashMap<String, CacheEntry>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, title: &str, artist: &str) -> Option<&CacheEntry> {
        self.entries.get(&cache_key(title, artist))
    }

    pub fn insert(&mut self, title: &str, artist: &str, result: Option<ResolvedLyrics>) {
        self.entries.insert(cache_key(title, artist), result.into());
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The lyrics context for one session: a provider chain and its cache.
///
/// Constructed once and handed to whoever needs lyrics.
pub struct LyricsResolver {
    chain: Arc<ProviderChain>,
    cache: ResolutionCache,
}

impl LyricsResolver {
    pub fn new(chain: ProviderChain) -> Self {
        Self {
            chain: Arc::new(chain),
            cache: ResolutionCache::new(),
        }
    }

    /// Cached result, resolving through the chain on a miss
    pub async fn get_or_resolve(&mut self, query: &LyricsQuery) -> Option<ResolvedLyrics> {
        if let Some(entry) = self.cached(query) {
            tracing::debug!("lyrics cache hit for '{}' by '{}'", query.title, query.artist);
            return entry.resolved();
        }

        let result = self.chain.resolve(query).await;
        self.store(query, result.clone());
        result
    }

    pub fn cached(&self, query: &LyricsQuery) -> Option<&CacheEntry> {
        self.cache.get(&query.title, &query.artist)
    }

    /// Record a resolution that ran outside `get_or_resolve`
    pub fn store(&mut self, query: &LyricsQuery, result: Option<ResolvedLyrics>) {
        self.cache.insert(&query.title, &query.artist, result);
    }

    /// Shared handle for running the chain in a background task
    pub fn chain(&self) -> Arc<ProviderChain> {
        self.chain.clone()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}
