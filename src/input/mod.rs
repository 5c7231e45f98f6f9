use crate::app::actions::Action;
use crate::app::events::{Event, InputEvent};
use crate::app::state::{AppState, Screen};
use crossterm::event::{
    self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use tokio::sync::mpsc;

/// Forward terminal events into the app channel until it closes
pub fn spawn_input_task(tx: mpsc::Sender<Event>, mouse_enabled: bool) {
    tokio::task::spawn_blocking(move || {
        loop {
            if !event::poll(std::time::Duration::from_millis(250)).unwrap_or(false) {
                if tx.is_closed() {
                    break;
                }
                continue;
            }
            let ev = match event::read() {
                Ok(CtEvent::Key(k)) if k.kind == KeyEventKind::Press => InputEvent::Key(k),
                Ok(CtEvent::Mouse(m)) if mouse_enabled => InputEvent::Mouse(m),
                Ok(CtEvent::Resize(_, _)) => InputEvent::Resize,
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!("terminal read failed: {}", e);
                    continue;
                }
            };
            if tx.blocking_send(Event::Input(ev)).is_err() {
                break;
            }
        }
    });
}

pub fn map_input_to_action(state: &AppState, ev: InputEvent) -> Option<Action> {
    match ev {
        InputEvent::Resize => Some(Action::Resize),
        InputEvent::Mouse(m) => handle_mouse(state, m),
        InputEvent::Key(k) if state.filter_input.is_some() => handle_filter_input(k),
        InputEvent::Key(k) => handle_normal_mode(state, k),
    }
}

fn handle_mouse(state: &AppState, m: MouseEvent) -> Option<Action> {
    let on_lyrics = state.screen == Screen::Lyrics;
    match m.kind {
        MouseEventKind::ScrollUp if on_lyrics => Some(Action::LyricsScrollUp),
        MouseEventKind::ScrollDown if on_lyrics => Some(Action::LyricsScrollDown),
        MouseEventKind::ScrollUp => Some(Action::ListUp),
        MouseEventKind::ScrollDown => Some(Action::ListDown),
        MouseEventKind::Down(MouseButton::Left) if on_lyrics => {
            let line = state.lyrics_pane.line_at(m.column, m.row)?;
            let count = state.lyrics_document().map(|d| d.lines.len()).unwrap_or(0);
            (line < count).then_some(Action::SeekToLine(line))
        }
        _ => None,
    }
}

fn handle_filter_input(k: KeyEvent) -> Option<Action> {
    match k.code {
        KeyCode::Esc => Some(Action::CancelFilter),
        KeyCode::Enter => Some(Action::SubmitFilter),
        KeyCode::Backspace => Some(Action::FilterBackspace),
        KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Action::CancelFilter)
        }
        KeyCode::Char(c) => Some(Action::FilterChar(c)),
        _ => None,
    }
}

fn handle_normal_mode(state: &AppState, k: KeyEvent) -> Option<Action> {
    if state.screen == Screen::Lyrics
        && let Some(action) = handle_lyrics_screen(k)
    {
        return Some(action);
    }

    match k.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Esc if state.screen != Screen::Tracks => Some(Action::SetScreen(Screen::Tracks)),
        KeyCode::Esc => Some(Action::Quit),

        KeyCode::Up | KeyCode::Char('k') => Some(Action::ListUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::ListDown),
        KeyCode::Char('g') => Some(Action::GoTop),
        KeyCode::Char('G') => Some(Action::GoBottom),
        KeyCode::Char('d') if k.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::PageDown),
        KeyCode::Char('u') if k.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::PageUp),

        KeyCode::Tab => Some(Action::NextScreen),
        KeyCode::Char('1') => Some(Action::SetScreen(Screen::Tracks)),
        KeyCode::Char('2') | KeyCode::Char('L') => Some(Action::SetScreen(Screen::Lyrics)),
        KeyCode::Char('?') | KeyCode::F(1) => Some(Action::SetScreen(Screen::Help)),

        KeyCode::Char('/') if state.screen == Screen::Tracks => Some(Action::StartFilter),
        KeyCode::Enter => Some(Action::Activate),

        KeyCode::Char('n') => Some(Action::PlayNext),
        KeyCode::Char('p') => Some(Action::PlayPrev),
        KeyCode::Char(' ') => Some(Action::TogglePause),
        KeyCode::Char('=') | KeyCode::Char('+') => Some(Action::VolumeUp),
        KeyCode::Char('-') | KeyCode::Char('_') => Some(Action::VolumeDown),
        KeyCode::Char(']') => Some(Action::SeekForward),
        KeyCode::Char('[') => Some(Action::SeekBack),
        KeyCode::Char(',') => Some(Action::SeekPrevLine),
        KeyCode::Char('.') => Some(Action::SeekNextLine),
        KeyCode::Char('s') => Some(Action::ToggleShuffle),
        KeyCode::Char('R') => Some(Action::ToggleRepeatMode),
        KeyCode::Char('t') => Some(Action::ToggleTypewriter),
        KeyCode::Char('C') => Some(Action::ClearLyricsCache),

        KeyCode::Char('r') if k.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Refresh),
        KeyCode::F(5) => Some(Action::Refresh),
        _ => None,
    }
}

/// On the lyrics screen the list keys scroll the lyrics instead
fn handle_lyrics_screen(k: KeyEvent) -> Option<Action> {
    match k.code {
        KeyCode::Up | KeyCode::Char('k') => Some(Action::LyricsScrollUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::LyricsScrollDown),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::LyricsStatus;
    use crate::lyrics::LyricsDocument;
    use crossterm::event::KeyEventState;
    use ratatui::layout::Rect;
    use std::sync::Arc;

    fn key(code: KeyCode) -> InputEvent {
        InputEvent::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn click(column: u16, row: u16) -> InputEvent {
        InputEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_lyrics_keys() {
        let state = AppState::new();
        let press = |c| map_input_to_action(&state, key(KeyCode::Char(c)));
        assert_eq!(press(','), Some(Action::SeekPrevLine));
        assert_eq!(press('.'), Some(Action::SeekNextLine));
        assert_eq!(press('t'), Some(Action::ToggleTypewriter));
        assert_eq!(press('C'), Some(Action::ClearLyricsCache));
    }

    #[test]
    fn test_filter_mode_captures_keys() {
        let mut state = AppState::new();
        let slash = key(KeyCode::Char('/'));
        assert_eq!(map_input_to_action(&state, slash), Some(Action::StartFilter));

        state.filter_input = Some(String::new());
        let q = key(KeyCode::Char('q'));
        assert_eq!(map_input_to_action(&state, q), Some(Action::FilterChar('q')));
        assert_eq!(map_input_to_action(&state, key(KeyCode::Enter)), Some(Action::SubmitFilter));
        assert_eq!(map_input_to_action(&state, key(KeyCode::Esc)), Some(Action::CancelFilter));
    }

    #[test]
    fn test_click_on_lyric_line_seeks() {
        let mut state = AppState::new();
        state.screen = Screen::Lyrics;
        state.lyrics = LyricsStatus::Loaded {
            document: Arc::new(LyricsDocument::parse("[00:01.00]a\n[00:02.00]b\n[00:03.00]c")),
            source: "Local",
        };
        state.lyrics_pane.area = Some(Rect::new(0, 2, 30, 10));

        assert_eq!(map_input_to_action(&state, click(4, 3)), Some(Action::SeekToLine(1)));
        // Below the last line
        assert_eq!(map_input_to_action(&state, click(4, 8)), None);
        // Outside the pane
        assert_eq!(map_input_to_action(&state, click(4, 0)), None);

        state.screen = Screen::Tracks;
        assert_eq!(map_input_to_action(&state, click(4, 3)), None);
    }
}
