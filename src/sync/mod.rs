//! Playback-synchronized lyrics
//!
//! - `engine`: Idle/Syncing state machine that maps the player position to
//!   the active lyric line
//! - `typewriter`: timer-driven word reveal for the active line
//! - `ticker`: the repeating frame tick that drives sampling

pub mod engine;
pub mod ticker;
pub mod typewriter;

pub use engine::{LyricsView, SyncEngine};
pub use ticker::FrameTicker;
pub use typewriter::{RevealStep, Typewriter};
