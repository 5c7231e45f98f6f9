//! Root layout
//!
//! ┌─ Tracks │ Lyrics │ Help ───────────────────────┐
//! │                main content                     │
//! ├────────────────────┬────────────────────────────┤
//! │      Player        │     Lyrics (compact)       │
//! └────────────────────┴────────────────────────────┘

use super::{help, lyrics, now_playing, track_list};
use crate::app::state::{AppState, Screen};
use crate::config::Config;
use crate::tui::theme::get_theme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders},
    Frame,
};

pub fn render(frame: &mut Frame, _cfg: &Config, state: &mut AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(7)])
        .split(frame.area());

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(rows[1]);

    render_main(frame, state, rows[0]);
    now_playing::render(frame, state, bottom[0]);
    lyrics::render_compact(frame, state, bottom[1]);
}

fn render_main(frame: &mut Frame, state: &mut AppState, area: Rect) {
    if state.screen == Screen::Lyrics {
        lyrics::render_full(frame, state, area);
        return;
    }
    state.lyrics_pane.area = None;

    let theme = get_theme();
    let tabs: Vec<Span> = [Screen::Tracks, Screen::Lyrics, Screen::Help]
        .into_iter()
        .flat_map(|s| {
            let style = if s == state.screen {
                theme.title().add_modifier(Modifier::BOLD)
            } else {
                theme.dim()
            };
            [Span::styled(format!(" {} ", s.title()), style), Span::raw("│")]
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.border))
        .title(Line::from(tabs));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let padded = Rect::new(inner.x + 1, inner.y, inner.width.saturating_sub(2), inner.height);

    match state.screen {
        Screen::Tracks => track_list::render(frame, state, padded),
        Screen::Help => help::render(frame, padded),
        Screen::Lyrics => {}
    }
}
