//! Kugou lyrics proxy client
//!
//! The proxy exposes Kugou's two-step lookup: `/search` returns candidates,
//! `/download` returns base64 encoded LRC for one candidate.

use super::provider::{LyricsPayload, LyricsProvider, LyricsQuery, ProviderError};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Candidate {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub accesskey: String,
    #[serde(default)]
    pub song: Option<String>,
    #[serde(default)]
    pub singer: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DownloadResponse {
    #[serde(default)]
    content: Option<String>,
}

/// Kugou candidate ids show up both as strings and as numbers
fn string_or_number<'de, D>(de: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_json::Value::deserialize(de)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("unexpected id {other}"))),
    }
}

#[derive(Debug, Clone)]
pub struct KugouProxyClient {
    client: reqwest::Client,
    base_url: String,
}

impl KugouProxyClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<T, ProviderError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ProviderError::Malformed(e.to_string()))
    }

    async fn search(&self, query: &LyricsQuery) -> Result<Option<Candidate>, ProviderError> {
        let url = format!(
            "{}/search?q={}",
            self.base_url,
            urlencoding::encode(&query.search_text())
        );
        let res: SearchResponse = self.get_json(&url).await?;
        Ok(res.candidates.into_iter().next())
    }

    async fn download(&self, candidate: &Candidate) -> Result<Option<String>, ProviderError> {
        let url = format!(
            "{}/download?id={}&accesskey={}",
            self.base_url,
            urlencoding::encode(&candidate.id),
            urlencoding::encode(&candidate.accesskey)
        );
        let res: DownloadResponse = self.get_json(&url).await?;
        match res.content {
            Some(content) if !content.trim().is_empty() => Ok(Some(decode_content(&content))),
            _ => Ok(None),
        }
    }
}

/// Decode the download payload.
///
/// The proxy may hand back LRC that is already decoded. Text carrying a `[`
/// is taken as-is, and a base64 decode is only kept when it yields UTF-8 LRC.
pub fn decode_content(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.contains('[') {
        return trimmed.to_string();
    }
    match STANDARD.decode(trimmed).map(String::from_utf8) {
        Ok(Ok(text)) if text.contains('[') => text,
        _ => trimmed.to_string(),
    }
}

#[async_trait]
impl LyricsProvider for KugouProxyClient {
    fn name(&self) -> &'static str {
        "Kugou"
    }

    fn is_configured(&self, _query: &LyricsQuery) -> bool {
        !self.base_url.is_empty()
    }

    async fn fetch(&self, query: &LyricsQuery) -> Result<LyricsPayload, ProviderError> {
        if self.base_url.is_empty() {
            return Err(ProviderError::NotConfigured);
        }

        let Some(candidate) = self.search(query).await? else {
            return Ok(LyricsPayload::Empty);
        };
        tracing::debug!(
            "kugou candidate {} ({} - {})",
            candidate.id,
            candidate.singer.as_deref().unwrap_or("?"),
            candidate.song.as_deref().unwrap_or("?")
        );

        Ok(match self.download(&candidate).await? {
            Some(lrc) if !lrc.trim().is_empty() => LyricsPayload::Synced { lrc, plain: None },
            _ => LyricsPayload::Empty,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_base64_content() {
        let encoded = STANDARD.encode("[00:01.00]hello\n[00:02.00]world");
        assert_eq!(decode_content(&encoded), "[00:01.00]hello\n[00:02.00]world");
    }

    #[test]
    fn test_already_decoded_content_passes_through() {
        assert_eq!(decode_content(" [00:01.00]hello\n"), "[00:01.00]hello");
        assert_eq!(decode_content("plain words"), "plain words");
    }

    #[test]
    fn test_text_that_happens_to_be_base64_is_kept() {
        // Both decode cleanly but give bytes that are not UTF-8 LRC.
        assert_eq!(decode_content("word"), "word");
        assert_eq!(decode_content("Love"), "Love");

        let encoded = STANDARD.encode([0xff, 0xfe, 0xfd]);
        assert_eq!(decode_content(&encoded), encoded);

        let no_tags = STANDARD.encode("just words");
        assert_eq!(decode_content(&no_tags), no_tags);
    }

    #[test]
    fn test_search_response_accepts_numeric_ids() {
        let res: SearchResponse = serde_json::from_str(
            r#"{"status":200,"candidates":[{"id":12345,"accesskey":"ABC","song":"Righteous","singer":"Juice WRLD","duration":203000}]}"#,
        )
        .unwrap();
        assert_eq!(res.candidates[0].id, "12345");
        assert_eq!(res.candidates[0].accesskey, "ABC");

        let empty: SearchResponse = serde_json::from_str(r#"{"status":1,"info":"OK"}"#).unwrap();
        assert!(empty.candidates.is_empty());
    }

    #[test]
    fn test_blank_proxy_is_not_configured() {
        let client = reqwest::Client::new();
        let q = LyricsQuery::new("a", "b");
        assert!(!KugouProxyClient::new(client.clone(), "  ").is_configured(&q));
        assert!(
            KugouProxyClient::new(client, "https://kugou.example.workers.dev/").is_configured(&q)
        );
    }
}
