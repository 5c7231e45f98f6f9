//! Catalog list with the `/` filter line

use super::truncate_str;
use crate::app::state::AppState;
use crate::tui::theme::get_theme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
    Frame,
};

pub fn render(frame: &mut Frame, state: &AppState, area: Rect) {
    let theme = get_theme();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let filter_line = match (&state.filter_input, state.tracks.filter.is_empty()) {
        (Some(input), _) => Line::from(vec![
            Span::styled("/", theme.title()),
            Span::styled(input.clone(), Style::default().fg(theme.palette.fg_primary)),
            Span::styled("▏", theme.title()),
        ]),
        (None, false) => Line::from(Span::styled(
            format!("filter: {}  (/ to edit, Esc in filter to clear)", state.tracks.filter),
            theme.dim(),
        )),
        (None, true) => Line::from(Span::styled("/ to filter", theme.dim())),
    };
    frame.render_widget(Paragraph::new(filter_line), rows[0]);

    let list_area = rows[1];
    let list = &state.tracks;
    if list.loading {
        frame.render_widget(
            Paragraph::new(Span::styled("Loading tracks...", theme.dim())),
            list_area,
        );
        return;
    }
    if list.is_empty() {
        let msg = if !list.loaded {
            "Catalog not loaded (F5 to retry)"
        } else if list.all().is_empty() {
            "No tracks in the catalog"
        } else {
            "No tracks match the filter"
        };
        frame.render_widget(Paragraph::new(Span::styled(msg, theme.dim())), list_area);
        return;
    }

    let height = list_area.height as usize;
    let width = list_area.width.saturating_sub(4) as usize;
    let playing_id = state.now_playing.as_ref().map(|t| t.id.as_str());

    let items: Vec<ListItem> = list
        .visible()
        .skip(list.scroll_offset)
        .take(height)
        .map(|track| {
            let playing = playing_id == Some(track.id.as_str());
            let style = if playing {
                theme.active_line()
            } else {
                Style::default().fg(theme.palette.fg_primary)
            };
            let duration = track.duration.as_deref().unwrap_or("");
            let label_width = width.saturating_sub(duration.len() + 1);
            let label = truncate_str(&track.display(), label_width);
            let pad = label_width.saturating_sub(label.chars().count());
            ListItem::new(Line::from(vec![
                Span::styled(label, style),
                Span::raw(" ".repeat(pad + 1)),
                Span::styled(duration.to_string(), theme.dim()),
            ]))
        })
        .collect();

    let mut list_state = ListState::default();
    list_state.select(Some(list.selected.saturating_sub(list.scroll_offset)));

    let widget = List::new(items)
        .highlight_style(
            Style::default()
                .bg(theme.palette.bg_highlight)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("› ");
    frame.render_stateful_widget(widget, list_area, &mut list_state);
}
