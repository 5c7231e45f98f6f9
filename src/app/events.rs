use crate::content::Track;
use crate::lyrics::{LyricsQuery, ResolvedLyrics};

#[derive(Debug, Clone)]
pub enum Event {
    Input(InputEvent),
    Player(PlayerEvent),
    Network(NetworkEvent),
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Key(crossterm::event::KeyEvent),
    Mouse(crossterm::event::MouseEvent),
    Resize,
}

#[derive(Debug, Clone)]
pub enum PlayerEvent {
    Started,
    Paused,
    Position { seconds: f64 },
    Duration { seconds: f64 },
    Ended,
    Error(String),
}

#[derive(Debug, Clone)]
pub enum NetworkEvent {
    Error(String),
    TracksLoaded { tracks: Vec<Track> },
    /// A background run of the provider chain finished
    LyricsResolved {
        query: LyricsQuery,
        result: Option<ResolvedLyrics>,
    },
}
