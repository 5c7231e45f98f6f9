//! Lyrics provider trait and the ordered fallback chain

use super::parser::{strip_time_tags, LyricsDocument};
use async_trait::async_trait;
use std::sync::Arc;

/// What a lookup asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricsQuery {
    pub title: String,
    pub artist: String,
    /// Lyrics file declared by the current track, if any
    pub lrc_asset: Option<String>,
}

impl LyricsQuery {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            lrc_asset: None,
        }
    }

    pub fn with_lrc_asset(mut self, asset: Option<String>) -> Self {
        self.lrc_asset = asset.filter(|a| !a.trim().is_empty());
        self
    }

    /// Free-text search string sent to search endpoints
    pub fn search_text(&self) -> String {
        format!("{} {}", self.title.trim(), self.artist.trim())
    }
}

/// Shape of one provider response, decided once when the response is read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LyricsPayload {
    /// LRC text, plus the provider's own plain rendition when it has one
    Synced { lrc: String, plain: Option<String> },
    Plain(String),
    Empty,
}

impl LyricsPayload {
    /// Turn the payload into a document, or `None` if there is nothing to show
    pub fn into_document(self) -> Option<LyricsDocument> {
        match self {
            LyricsPayload::Synced { lrc, plain } => {
                let doc = LyricsDocument::parse(&lrc);
                let doc = match plain {
                    Some(p) => doc.with_plain_text(&p),
                    None => doc,
                };
                if doc.is_synced() {
                    return Some(doc);
                }
                // No usable time tags: fall back to whatever plain text there is.
                let plain = if doc.plain_text.is_empty() {
                    strip_time_tags(&lrc)
                } else {
                    doc.plain_text
                };
                (!plain.is_empty()).then(|| LyricsDocument::plain(&plain))
            }
            LyricsPayload::Plain(text) => {
                (!text.trim().is_empty()).then(|| LyricsDocument::plain(&text))
            }
            LyricsPayload::Empty => None,
        }
    }
}

/// A successful resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLyrics {
    pub document: Arc<LyricsDocument>,
    pub source: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Unavailable(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("not configured")]
    NotConfigured,
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A single source of lyrics
#[async_trait]
pub trait LyricsProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this provider can be attempted for `query` at all.
    /// Unconfigured providers are skipped without counting as a failure.
    fn is_configured(&self, query: &LyricsQuery) -> bool;

    async fn fetch(&self, query: &LyricsQuery) -> Result<LyricsPayload, ProviderError>;
}

/// Providers tried strictly in order; the first one with something to show wins
pub struct ProviderChain {
    providers: Vec<Box<dyn LyricsProvider>>,
}

impl ProviderChain {
    pub fn new(providers: Vec<Box<dyn LyricsProvider>>) -> Self {
        Self { providers }
    }

    /// LRCLIB, then the Kugou proxy, then the track's local LRC file
    pub fn from_config(
        cfg: &crate::config::LyricsConfig,
        content_dir: &std::path::Path,
    ) -> anyhow::Result<Self> {
        let timeout = std::time::Duration::from_secs(cfg.timeout_secs.max(1));
        let client = reqwest::Client::builder()
            .user_agent(super::USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self::new(vec![
            Box::new(super::lrclib::LrclibClient::new(
                client.clone(),
                cfg.lrclib_enabled,
                &cfg.lrclib_url,
            )),
            Box::new(super::kugou::KugouProxyClient::new(client.clone(), &cfg.kugou_proxy)),
            Box::new(super::local::LocalLrcProvider::new(client, content_dir)),
        ]))
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Resolve lyrics. `None` means every provider was exhausted.
    pub async fn resolve(&self, query: &LyricsQuery) -> Option<ResolvedLyrics> {
        for provider in &self.providers {
            let name = provider.name();
            if !provider.is_configured(query) {
                tracing::debug!("{} not configured, skipping", name);
                continue;
            }

            tracing::debug!("trying {} for '{}' by '{}'", name, query.title, query.artist);
            match provider.fetch(query).await {
                Ok(payload) => match payload.into_document() {
                    Some(document) => {
                        tracing::info!(
                            "lyrics for '{}' by '{}' from {} ({} timed lines)",
                            query.title,
                            query.artist,
                            name,
                            document.lines.len()
                        );
                        return Some(ResolvedLyrics {
                            document: Arc::new(document),
                            source: name,
                        });
                    }
                    None => tracing::warn!("{} returned no lyrics", name),
                },
                Err(ProviderError::NotConfigured) => {
                    tracing::debug!("{} not configured, skipping", name);
                }
                Err(e) => tracing::warn!("{} failed: {}", name, e),
            }
        }

        tracing::info!("no lyrics for '{}' by '{}'", query.title, query.artist);
        None
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted provider that counts its calls
    pub(crate) struct FakeProvider {
        pub name: &'static str,
        pub configured: bool,
        pub response: Box<dyn Fn() -> Result<LyricsPayload, ProviderError> + Send + Sync>,
        pub calls: Arc<AtomicUsize>,
    }

    impl FakeProvider {
        pub(crate) fn returning(
            name: &'static str,
            response: impl Fn() -> Result<LyricsPayload, ProviderError> + Send + Sync + 'static,
        ) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    name,
                    configured: true,
                    response: Box::new(response),
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl LyricsProvider for FakeProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        fn is_configured(&self, _query: &LyricsQuery) -> bool {
            self.configured
        }

        async fn fetch(&self, _query: &LyricsQuery) -> Result<LyricsPayload, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.response)()
        }
    }

    fn synced(lrc: &str) -> Result<LyricsPayload, ProviderError> {
        Ok(LyricsPayload::Synced {
            lrc: lrc.to_string(),
            plain: None,
        })
    }

    #[tokio::test]
    async fn test_falls_back_past_failing_provider() {
        let (first, first_calls) =
            FakeProvider::returning("first", || Err(ProviderError::Status(503)));
        let (second, second_calls) = FakeProvider::returning("second", || synced("[00:01.00]hi"));
        let (third, third_calls) = FakeProvider::returning("third", || synced("[00:02.00]no"));

        let chain = ProviderChain::new(vec![Box::new(first), Box::new(second), Box::new(third)]);
        let resolved = chain.resolve(&LyricsQuery::new("Song", "Artist")).await.unwrap();

        assert_eq!(resolved.source, "second");
        assert_eq!(resolved.document.lines[0].text, "hi");
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
        assert_eq!(third_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_payload_advances() {
        let (first, _) = FakeProvider::returning("first", || Ok(LyricsPayload::Empty));
        let (second, _) =
            FakeProvider::returning("second", || Ok(LyricsPayload::Plain("   ".into())));
        let (third, _) =
            FakeProvider::returning("third", || Ok(LyricsPayload::Plain("la la".into())));

        let chain = ProviderChain::new(vec![Box::new(first), Box::new(second), Box::new(third)]);
        let resolved = chain.resolve(&LyricsQuery::new("Song", "Artist")).await.unwrap();

        assert_eq!(resolved.source, "third");
        assert!(!resolved.document.is_synced());
        assert_eq!(resolved.document.plain_text, "la la");
    }

    #[tokio::test]
    async fn test_unconfigured_provider_is_not_called() {
        let (mut skipped, skipped_calls) =
            FakeProvider::returning("skipped", || synced("[00:01.00]x"));
        skipped.configured = false;
        let (used, _) = FakeProvider::returning("used", || synced("[00:01.00]y"));

        let chain = ProviderChain::new(vec![Box::new(skipped), Box::new(used)]);
        let resolved = chain.resolve(&LyricsQuery::new("a", "b")).await.unwrap();

        assert_eq!(resolved.source, "used");
        assert_eq!(skipped_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_exhausted_chain_is_none() {
        let (first, _) = FakeProvider::returning("first", || Err(ProviderError::NotConfigured));
        let (second, _) =
            FakeProvider::returning("second", || Err(ProviderError::Malformed("bad json".into())));

        let chain = ProviderChain::new(vec![Box::new(first), Box::new(second)]);
        assert!(chain.resolve(&LyricsQuery::new("a", "b")).await.is_none());
        assert_eq!(chain.provider_names(), vec!["first", "second"]);
    }

    #[test]
    fn test_synced_payload_without_tags_becomes_plain() {
        let doc = LyricsPayload::Synced {
            lrc: "just words\nno tags".into(),
            plain: None,
        }
        .into_document()
        .unwrap();
        assert!(!doc.is_synced());
        assert_eq!(doc.plain_text, "just words\nno tags");

        let nothing = LyricsPayload::Synced {
            lrc: "[00:01.00]\n".into(),
            plain: None,
        }
        .into_document();
        assert!(nothing.is_none());
    }

    #[test]
    fn test_synced_payload_keeps_provider_plain_text() {
        let doc = LyricsPayload::Synced {
            lrc: "[00:01.00]one".into(),
            plain: Some("One!".into()),
        }
        .into_document()
        .unwrap();
        assert!(doc.is_synced());
        assert_eq!(doc.plain_text, "One!");
    }

    #[test]
    fn test_query_normalizes_asset() {
        let q = LyricsQuery::new(" Song ", "Artist ").with_lrc_asset(Some("  ".into()));
        assert_eq!(q.lrc_asset, None);
        assert_eq!(q.search_text(), "Song Artist");
    }
}
