use crate::content::Track;
use crate::lyrics::LyricsDocument;
use crate::queue::Queue;
use crate::sync::LyricsView;
use ratatui::layout::Rect;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Tracks,
    Lyrics,
    Help,
}

impl Screen {
    pub fn next(self) -> Self {
        match self {
            Screen::Tracks => Screen::Lyrics,
            Screen::Lyrics => Screen::Help,
            Screen::Help => Screen::Tracks,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Screen::Tracks => "Tracks",
            Screen::Lyrics => "Lyrics",
            Screen::Help => "Help",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub created_at: std::time::Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Success,
            created_at: std::time::Instant::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Error,
            created_at: std::time::Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > std::time::Duration::from_secs(3)
    }
}

/// The catalog with the `/` filter applied
#[derive(Debug, Clone, Default)]
pub struct TrackList {
    all: Vec<Track>,
    /// Indices into `all` that pass the filter
    visible: Vec<usize>,
    pub filter: String,
    pub selected: usize,
    pub scroll_offset: usize,
    pub loading: bool,
    pub loaded: bool,
}

impl TrackList {
    pub fn set_tracks(&mut self, tracks: Vec<Track>) {
        self.all = tracks;
        self.loading = false;
        self.loaded = true;
        self.apply_filter();
    }

    pub fn all(&self) -> &[Track] {
        &self.all
    }

    pub fn set_filter(&mut self, filter: &str) {
        self.filter = filter.to_string();
        self.apply_filter();
    }

    fn apply_filter(&mut self) {
        self.visible = self
            .all
            .iter()
            .enumerate()
            .filter(|(_, t)| t.matches(&self.filter))
            .map(|(i, _)| i)
            .collect();
        self.selected = self.selected.min(self.visible.len().saturating_sub(1));
        self.scroll_offset = self.scroll_offset.min(self.selected);
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn visible(&self) -> impl Iterator<Item = &Track> {
        self.visible.iter().map(|&i| &self.all[i])
    }

    /// Index into the full catalog of the selected row
    pub fn selected_catalog_index(&self) -> Option<usize> {
        self.visible.get(self.selected).copied()
    }

    pub fn select_by(&mut self, delta: isize) {
        let last = self.visible.len().saturating_sub(1);
        self.selected = self.selected.saturating_add_signed(delta).min(last);
    }

    pub fn select_last(&mut self) {
        self.selected = self.visible.len().saturating_sub(1);
    }

    pub fn update_scroll(&mut self, visible_height: usize) {
        if visible_height == 0 {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + visible_height {
            self.scroll_offset = self.selected - visible_height + 1;
        }
    }
}

/// Per-track lyrics lifecycle as the UI sees it
#[derive(Debug, Clone, Default)]
pub enum LyricsStatus {
    #[default]
    NoTrack,
    Loading,
    Loaded {
        document: Arc<LyricsDocument>,
        source: &'static str,
    },
    NotFound,
}

/// Lyrics display state. The sync engine drives it through [`LyricsView`].
#[derive(Debug, Clone, Default)]
pub struct LyricsPane {
    pub active: Option<usize>,
    pub scroll_offset: usize,
    /// Typewriter progress of the active line
    pub revealed: Option<(usize, String)>,
    /// Where the full lyrics list was last drawn, for mouse hit-testing
    pub area: Option<Rect>,
}

impl LyricsPane {
    pub fn reset(&mut self) {
        self.active = None;
        self.scroll_offset = 0;
        self.revealed = None;
    }

    fn visible_height(&self) -> usize {
        self.area.map(|a| a.height as usize).unwrap_or(10)
    }

    /// Line index under a terminal cell, if it falls on the lyrics list
    pub fn line_at(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.area?;
        let inside = column >= area.x
            && column < area.x + area.width
            && row >= area.y
            && row < area.y + area.height;
        inside.then(|| self.scroll_offset + (row - area.y) as usize)
    }

    pub fn scroll_by(&mut self, delta: isize, line_count: usize) {
        self.scroll_offset = self
            .scroll_offset
            .saturating_add_signed(delta)
            .min(line_count.saturating_sub(1));
    }

    /// Text to draw for line `index`: the typewriter progress for the
    /// active line, the full text otherwise
    pub fn display_text<'a>(&'a self, index: usize, full: &'a str) -> &'a str {
        match &self.revealed {
            Some((line, text)) if *line == index => text,
            _ => full,
        }
    }
}

impl LyricsView for LyricsPane {
    fn clear_active(&mut self) {
        self.active = None;
        self.revealed = None;
    }

    fn mark_active(&mut self, index: usize) {
        self.active = Some(index);
    }

    fn scroll_to(&mut self, index: usize) {
        self.scroll_offset = index.saturating_sub(self.visible_height() / 2);
    }

    fn reveal(&mut self, index: usize, words: &[String]) {
        self.revealed = Some((index, words.join(" ")));
    }
}

pub struct AppState {
    pub should_quit: bool,
    pub screen: Screen,

    pub tracks: TrackList,
    /// Filter being typed; `None` when not editing
    pub filter_input: Option<String>,

    pub queue: Queue,

    // Playback
    pub now_playing: Option<Track>,
    pub paused: bool,
    pub position_secs: f64,
    pub duration_secs: f64,
    pub volume: u8,

    // Lyrics
    pub lyrics: LyricsStatus,
    pub lyrics_pane: LyricsPane,
    pub typewriter_enabled: bool,

    pub toast: Option<Toast>,
    pub status: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            should_quit: false,
            screen: Screen::Tracks,
            tracks: TrackList::default(),
            filter_input: None,
            queue: Queue::new(),
            now_playing: None,
            paused: true,
            position_secs: 0.0,
            duration_secs: 0.0,
            volume: 80,
            lyrics: LyricsStatus::NoTrack,
            lyrics_pane: LyricsPane::default(),
            typewriter_enabled: true,
            toast: None,
            status: String::new(),
        }
    }

    pub fn lyrics_document(&self) -> Option<&Arc<LyricsDocument>> {
        match &self.lyrics {
            LyricsStatus::Loaded { document, .. } => Some(document),
            _ => None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.now_playing.is_some() && !self.paused
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(title: &str, artist: &str) -> Track {
        Track {
            id: title.to_lowercase(),
            title: title.to_string(),
            artist: artist.to_string(),
            album: None,
            duration: None,
            audio_url: String::new(),
            image_url: None,
            lrc_file: None,
        }
    }

    #[test]
    fn test_filter_keeps_catalog_indices() {
        let mut list = TrackList::default();
        list.set_tracks(vec![
            track("Lucid Dreams", "Juice WRLD"),
            track("Righteous", "Juice WRLD"),
            track("Wishing Well", "Juice WRLD"),
        ]);
        assert_eq!(list.len(), 3);

        list.set_filter("well");
        assert_eq!(list.len(), 1);
        assert_eq!(list.selected_catalog_index(), Some(2));

        list.set_filter("nothing matches");
        assert!(list.is_empty());
        assert_eq!(list.selected_catalog_index(), None);

        list.set_filter("");
        list.select_by(5);
        assert_eq!(list.selected, 2);
        list.select_by(-9);
        assert_eq!(list.selected, 0);
    }

    #[test]
    fn test_pane_follows_engine_calls() {
        let mut pane = LyricsPane {
            area: Some(Rect::new(2, 5, 40, 10)),
            ..Default::default()
        };

        pane.mark_active(12);
        pane.scroll_to(12);
        assert_eq!(pane.scroll_offset, 7);
        pane.reveal(12, &["never".to_string(), "let".to_string()]);
        assert_eq!(pane.display_text(12, "never let go"), "never let");
        assert_eq!(pane.display_text(11, "other"), "other");

        pane.clear_active();
        assert_eq!(pane.active, None);
        assert_eq!(pane.display_text(12, "never let go"), "never let go");
    }

    #[test]
    fn test_line_at_maps_rows() {
        let pane = LyricsPane {
            scroll_offset: 4,
            area: Some(Rect::new(2, 5, 40, 10)),
            ..Default::default()
        };

        assert_eq!(pane.line_at(3, 5), Some(4));
        assert_eq!(pane.line_at(10, 9), Some(8));
        assert_eq!(pane.line_at(1, 9), None);
        assert_eq!(pane.line_at(3, 15), None);
        assert_eq!(LyricsPane::default().line_at(0, 0), None);
    }
}
