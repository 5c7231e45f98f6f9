//! Client for the site's content worker
//!
//! Content is JSON keyed by type (`profile`, `tracks`, ...). Reads go to the
//! worker when live data is enabled and fall back to the static
//! `{type}.json` files in the local data directory. Writes need the worker.

pub mod models;

use anyhow::Context;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

pub use models::Track;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Profile,
    Tracks,
    Playlists,
    Gallery,
    Videos,
    Shows,
    Links,
}

impl ContentType {
    pub const ALL: [ContentType; 7] = [
        ContentType::Profile,
        ContentType::Tracks,
        ContentType::Playlists,
        ContentType::Gallery,
        ContentType::Videos,
        ContentType::Shows,
        ContentType::Links,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Profile => "profile",
            ContentType::Tracks => "tracks",
            ContentType::Playlists => "playlists",
            ContentType::Gallery => "gallery",
            ContentType::Videos => "videos",
            ContentType::Shows => "shows",
            ContentType::Links => "links",
        }
    }

    /// What an unset type reads as: `{}` for the profile, `[]` for lists
    pub fn empty_value(self) -> Value {
        match self {
            ContentType::Profile => json!({}),
            _ => json!([]),
        }
    }
}

impl std::str::FromStr for ContentType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .with_context(|| format!("unknown content type '{s}'"))
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("content proxy is not configured")]
    NotConfigured,
    #[error("unauthorized: missing or wrong content token")]
    Unauthorized,
    #[error("content proxy returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct ContentClient {
    client: reqwest::Client,
    proxy_url: Option<String>,
    token: Option<String>,
    use_live_data: bool,
    search_logging: bool,
    data_dir: PathBuf,
}

impl ContentClient {
    pub fn from_config(cfg: &crate::config::ContentConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(crate::lyrics::USER_AGENT)
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("build content http client")?;

        let non_empty = |s: &str| {
            let s = s.trim().trim_end_matches('/');
            (!s.is_empty()).then(|| s.to_string())
        };

        Ok(Self {
            client,
            proxy_url: non_empty(&cfg.proxy_url),
            token: non_empty(&cfg.token),
            use_live_data: cfg.use_live_data,
            search_logging: cfg.search_logging,
            data_dir: cfg.data_dir.clone(),
        })
    }

    fn proxy(&self) -> Result<&str, ContentError> {
        self.proxy_url.as_deref().ok_or(ContentError::NotConfigured)
    }

    /// Read one content type, preferring the worker when live data is on
    pub async fn load(&self, ty: ContentType) -> anyhow::Result<Value> {
        if self.use_live_data && self.proxy_url.is_some() {
            match self.fetch_live(ty).await {
                Ok(v) => return Ok(v),
                Err(e) => tracing::warn!("live {} unavailable, using local data: {}", ty, e),
            }
        }
        self.load_local(ty).await
    }

    pub async fn fetch_live(&self, ty: ContentType) -> Result<Value, ContentError> {
        let url = format!("{}/api/content/{}", self.proxy()?, ty);
        self.get_json(&url).await
    }

    /// The static `{type}.json`; a missing file reads as the empty value
    pub async fn load_local(&self, ty: ContentType) -> anyhow::Result<Value> {
        let path = self.data_dir.join(format!("{}.json", ty));
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => {
                serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("{} missing, using empty {}", path.display(), ty);
                Ok(ty.empty_value())
            }
            Err(e) => Err(e).with_context(|| format!("read {}", path.display())),
        }
    }

    pub async fn save(&self, ty: ContentType, value: &Value) -> Result<(), ContentError> {
        let url = format!("{}/api/content/{}", self.proxy()?, ty);
        self.post_json(&url, value).await
    }

    pub async fn load_bulk(&self) -> Result<Value, ContentError> {
        let url = format!("{}/api/content/bulk", self.proxy()?);
        self.get_json(&url).await
    }

    pub async fn save_bulk(&self, value: &Value) -> Result<(), ContentError> {
        let url = format!("{}/api/content/bulk", self.proxy()?);
        self.post_json(&url, value).await
    }

    /// Record a search query. Never fails: errors are only logged.
    pub async fn log_search(&self, query: &str) {
        let query = query.trim();
        if !self.search_logging || query.is_empty() {
            return;
        }
        let Some(proxy) = self.proxy_url.as_deref() else {
            return;
        };

        let url = format!("{}/api/search/log", proxy);
        let body = search_log_body(query, epoch_millis());
        match self.client.post(&url).json(&body).send().await {
            Ok(res) if res.status().is_success() => {}
            Ok(res) => tracing::warn!("search log rejected: {}", res.status()),
            Err(e) => tracing::warn!("search log failed: {}", e),
        }
    }

    pub async fn load_tracks(&self) -> anyhow::Result<Vec<Track>> {
        let value = self.load(ContentType::Tracks).await?;
        serde_json::from_value(value).context("decode tracks")
    }

    /// Local assets are relative to the data directory; URLs pass through
    pub fn resolve_asset(&self, asset: &str) -> String {
        if asset.contains("://") || Path::new(asset).is_absolute() {
            asset.to_string()
        } else {
            self.data_dir.join(asset).display().to_string()
        }
    }

    async fn get_json(&self, url: &str) -> Result<Value, ContentError> {
        let res = self.client.get(url).send().await?;
        let res = check_status(res).await?;
        let body = res.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn post_json(&self, url: &str, value: &Value) -> Result<(), ContentError> {
        let mut req = self.client.post(url).json(value);
        if let Some(token) = &self.token {
            req = req.header("X-Content-Token", token);
        }
        check_status(req.send().await?).await?;
        Ok(())
    }
}

async fn check_status(res: reqwest::Response) -> Result<reqwest::Response, ContentError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ContentError::Unauthorized);
    }
    let body = res.text().await.unwrap_or_default();
    Err(ContentError::Status {
        status: status.as_u16(),
        body,
    })
}

fn search_log_body(query: &str, at_millis: i64) -> Value {
    json!({ "q": query, "at": at_millis })
}

fn epoch_millis() -> i64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContentConfig;

    fn client(dir: &Path, proxy: &str) -> ContentClient {
        ContentClient::from_config(&ContentConfig {
            proxy_url: proxy.to_string(),
            token: String::new(),
            use_live_data: false,
            search_logging: false,
            data_dir: dir.to_path_buf(),
        })
        .unwrap()
    }

    #[test]
    fn test_content_type_names() {
        assert_eq!("shows".parse::<ContentType>().unwrap(), ContentType::Shows);
        assert!("bulk".parse::<ContentType>().is_err());
        assert_eq!(ContentType::Profile.empty_value(), json!({}));
        assert_eq!(ContentType::Links.empty_value(), json!([]));
    }

    #[tokio::test]
    async fn test_missing_local_file_is_empty_value() {
        let dir = tempfile::tempdir().unwrap();
        let c = client(dir.path(), "");

        assert_eq!(c.load(ContentType::Profile).await.unwrap(), json!({}));
        assert_eq!(c.load(ContentType::Gallery).await.unwrap(), json!([]));
        assert!(c.load_tracks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_loads_local_tracks() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("tracks.json"),
            r#"[{"id":"t1","title":"Righteous","artist":"Juice WRLD","audioUrl":"righteous.mp3","lrcFile":"sample.lrc"}]"#,
        )
        .unwrap();
        let c = client(dir.path(), "");

        let tracks = c.load_tracks().await.unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].lrc_file.as_deref(), Some("sample.lrc"));
    }

    #[tokio::test]
    async fn test_invalid_local_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("links.json"), "{ nope").unwrap();
        let c = client(dir.path(), "");

        assert!(c.load(ContentType::Links).await.is_err());
    }

    #[tokio::test]
    async fn test_writes_need_a_proxy() {
        let dir = tempfile::tempdir().unwrap();
        let c = client(dir.path(), "  ");

        assert!(matches!(
            c.save(ContentType::Shows, &json!([])).await,
            Err(ContentError::NotConfigured)
        ));
        assert!(matches!(c.load_bulk().await, Err(ContentError::NotConfigured)));
        // Fire-and-forget: nothing to report even without a proxy.
        c.log_search("righteous").await;
    }

    #[test]
    fn test_search_log_body_shape() {
        assert_eq!(
            search_log_body("legends", 1_700_000_000_000),
            json!({ "q": "legends", "at": 1_700_000_000_000i64 })
        );
    }

    #[test]
    fn test_resolve_asset() {
        let c = client(Path::new("/srv/dwc/data"), "");
        assert_eq!(c.resolve_asset("music/righteous.mp3"), "/srv/dwc/data/music/righteous.mp3");
        assert_eq!(c.resolve_asset("https://cdn.example/a.mp3"), "https://cdn.example/a.mp3");
        assert_eq!(c.resolve_asset("/abs/a.mp3"), "/abs/a.mp3");
    }
}
