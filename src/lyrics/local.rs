//! Fallback to the LRC file a track declares in the catalog

use super::provider::{LyricsPayload, LyricsProvider, LyricsQuery, ProviderError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalLrcProvider {
    client: reqwest::Client,
    base_dir: PathBuf,
}

impl LocalLrcProvider {
    pub fn new(client: reqwest::Client, base_dir: &Path) -> Self {
        Self {
            client,
            base_dir: base_dir.to_path_buf(),
        }
    }

    /// Relative assets resolve against the content directory
    fn resolve_path(&self, asset: &str) -> PathBuf {
        let p = Path::new(asset);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.base_dir.join(p)
        }
    }

    async fn read_asset(&self, asset: &str) -> Result<String, ProviderError> {
        if asset.starts_with("http://") || asset.starts_with("https://") {
            let response = self.client.get(asset).send().await?;
            if !response.status().is_success() {
                return Err(ProviderError::Status(response.status().as_u16()));
            }
            return Ok(response.text().await?);
        }

        let path = self.resolve_path(asset);
        Ok(tokio::fs::read_to_string(&path).await?)
    }
}

#[async_trait]
impl LyricsProvider for LocalLrcProvider {
    fn name(&self) -> &'static str {
        "Local"
    }

    fn is_configured(&self, query: &LyricsQuery) -> bool {
        query.lrc_asset.is_some()
    }

    async fn fetch(&self, query: &LyricsQuery) -> Result<LyricsPayload, ProviderError> {
        let Some(asset) = query.lrc_asset.as_deref() else {
            return Err(ProviderError::NotConfigured);
        };

        let lrc = self.read_asset(asset).await?;
        if lrc.trim().is_empty() {
            return Ok(LyricsPayload::Empty);
        }
        Ok(LyricsPayload::Synced { lrc, plain: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_relative_asset() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("sample.lrc"),
            "[ti:Sample]\n[00:01.00]local line\n",
        )
        .unwrap();

        let provider = LocalLrcProvider::new(reqwest::Client::new(), dir.path());
        let query = LyricsQuery::new("Sample", "Someone").with_lrc_asset(Some("sample.lrc".into()));

        assert!(provider.is_configured(&query));
        let payload = provider.fetch(&query).await.unwrap();
        let doc = payload.into_document().unwrap();
        assert_eq!(doc.lines[0].text, "local line");
        assert_eq!(doc.metadata["ti"], "Sample");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let provider = LocalLrcProvider::new(reqwest::Client::new(), dir.path());
        let query = LyricsQuery::new("a", "b").with_lrc_asset(Some("nope.lrc".into()));

        assert!(matches!(provider.fetch(&query).await, Err(ProviderError::Io(_))));
    }

    #[tokio::test]
    async fn test_no_asset_is_not_configured() {
        let provider = LocalLrcProvider::new(reqwest::Client::new(), Path::new("."));
        let query = LyricsQuery::new("a", "b");

        assert!(!provider.is_configured(&query));
        assert!(matches!(provider.fetch(&query).await, Err(ProviderError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_blank_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("blank.lrc"), "\n  \n").unwrap();
        let provider = LocalLrcProvider::new(reqwest::Client::new(), dir.path());
        let query = LyricsQuery::new("a", "b").with_lrc_asset(Some("blank.lrc".into()));

        assert_eq!(provider.fetch(&query).await.unwrap(), LyricsPayload::Empty);
    }
}
