use super::state::Screen;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    NextScreen,
    SetScreen(Screen),

    ListUp,
    ListDown,
    GoTop,
    GoBottom,
    PageUp,
    PageDown,
    Activate,

    // Track filter
    StartFilter,
    FilterChar(char),
    FilterBackspace,
    SubmitFilter,
    CancelFilter,

    TogglePause,
    VolumeUp,
    VolumeDown,
    SeekForward,
    SeekBack,
    PlayNext,
    PlayPrev,
    ToggleShuffle,
    ToggleRepeatMode,

    // Lyrics
    SeekToLine(usize),
    SeekPrevLine,
    SeekNextLine,
    LyricsScrollUp,
    LyricsScrollDown,
    ToggleTypewriter,
    ClearLyricsCache,

    Refresh,
    Resize,
}
