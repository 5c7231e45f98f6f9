//! LRCLIB API client
//!
//! LRCLIB is a free lyrics API that provides synchronized (LRC format) lyrics.
//! API Documentation: https://lrclib.net/docs

use super::provider::{LyricsPayload, LyricsProvider, LyricsQuery, ProviderError};
use async_trait::async_trait;
use serde::Deserialize;

/// One entry of an LRCLIB search response
#[derive(Debug, Deserialize, Clone)]
pub struct LrclibResponse {
    #[serde(rename = "trackName", default)]
    pub track_name: Option<String>,
    #[serde(rename = "artistName", default)]
    pub artist_name: Option<String>,
    #[serde(rename = "plainLyrics")]
    pub plain_lyrics: Option<String>,
    #[serde(rename = "syncedLyrics")]
    pub synced_lyrics: Option<String>,
}

impl LrclibResponse {
    fn into_payload(self) -> LyricsPayload {
        let plain = self.plain_lyrics.filter(|p| !p.trim().is_empty());
        match self.synced_lyrics {
            Some(lrc) if !lrc.trim().is_empty() => LyricsPayload::Synced { lrc, plain },
            _ => match plain {
                Some(p) => LyricsPayload::Plain(p),
                None => LyricsPayload::Empty,
            },
        }
    }
}

/// LRCLIB API client
#[derive(Debug, Clone)]
pub struct LrclibClient {
    client: reqwest::Client,
    enabled: bool,
    base_url: String,
}

impl LrclibClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://lrclib.net/api";

    pub fn new(client: reqwest::Client, enabled: bool, base_url: &str) -> Self {
        Self {
            client,
            enabled,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Search for lyrics. The first result is the one used.
    async fn search(&self, query: &LyricsQuery) -> Result<Vec<LrclibResponse>, ProviderError> {
        let url = format!(
            "{}/search?q={}",
            self.base_url,
            urlencoding::encode(&query.search_text())
        );

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        decode_search(&body)
    }
}

fn decode_search(body: &str) -> Result<Vec<LrclibResponse>, ProviderError> {
    serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))
}

#[async_trait]
impl LyricsProvider for LrclibClient {
    fn name(&self) -> &'static str {
        "LRCLib"
    }

    fn is_configured(&self, _query: &LyricsQuery) -> bool {
        self.enabled && !self.base_url.is_empty()
    }

    async fn fetch(&self, query: &LyricsQuery) -> Result<LyricsPayload, ProviderError> {
        let results = self.search(query).await?;
        Ok(results
            .into_iter()
            .next()
            .map(LrclibResponse::into_payload)
            .unwrap_or(LyricsPayload::Empty))
    }
}
