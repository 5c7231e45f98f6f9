use serde::{Deserialize, Serialize};

/// One entry of the site's `tracks` content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub album: Option<String>,
    /// Display duration as written by the site, e.g. "3:23"
    #[serde(default)]
    pub duration: Option<String>,
    pub audio_url: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Lyrics file used when no online provider has the track
    #[serde(default)]
    pub lrc_file: Option<String>,
}

impl Track {
    pub fn display(&self) -> String {
        if self.artist.is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.title, self.artist)
        }
    }

    pub fn lyrics_query(&self) -> crate::lyrics::LyricsQuery {
        crate::lyrics::LyricsQuery::new(&self.title, &self.artist)
            .with_lrc_asset(self.lrc_file.clone())
    }

    /// Case-insensitive match on title, artist or album
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&needle)
            || self.artist.to_lowercase().contains(&needle)
            || self
                .album
                .as_deref()
                .is_some_and(|a| a.to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_site_track() {
        let track: Track = serde_json::from_str(
            r#"{
                "id": "righteous-juice-wrld",
                "title": "Righteous",
                "artist": "Juice WRLD",
                "album": "Legends Never Die",
                "duration": "3:23",
                "audioUrl": "../music/righteous.mp3",
                "imageUrl": "https://via.placeholder.com/300x300",
                "lrcFile": "sample.lrc"
            }"#,
        )
        .unwrap();

        assert_eq!(track.audio_url, "../music/righteous.mp3");
        assert_eq!(track.display(), "Righteous - Juice WRLD");
        let q = track.lyrics_query();
        assert_eq!(q.lrc_asset.as_deref(), Some("sample.lrc"));
        assert!(track.matches("legends"));
        assert!(track.matches(" JUICE "));
        assert!(!track.matches("lucid"));
    }
}
