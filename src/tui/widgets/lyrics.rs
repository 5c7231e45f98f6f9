//! Lyrics views: the full scrolling pane and the compact bottom-bar strip

use super::truncate_str;
use crate::app::state::{AppState, LyricsStatus};
use crate::lyrics::LyricsDocument;
use crate::tui::theme::{get_theme, Theme};
use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

fn status_message(status: &LyricsStatus) -> Option<&'static str> {
    match status {
        LyricsStatus::NoTrack => Some("Nothing playing"),
        LyricsStatus::Loading => Some("Loading lyrics..."),
        LyricsStatus::NotFound => Some("No lyrics available"),
        LyricsStatus::Loaded { document, .. } if document.is_empty() => Some("No lyrics available"),
        LyricsStatus::Loaded { .. } => None,
    }
}

fn centered(frame: &mut Frame, theme: &Theme, text: &str, area: Rect) {
    let top = area.height.saturating_sub(1) / 2;
    let row = Rect::new(area.x, area.y + top, area.width, 1.min(area.height));
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(text.to_string(), theme.dim())))
            .alignment(Alignment::Center),
        row,
    );
}

/// Full-height lyrics. Records where the lines were drawn so clicks can
/// be mapped back to a line.
pub fn render_full(frame: &mut Frame, state: &mut AppState, area: Rect) {
    let theme = get_theme();
    state.lyrics_pane.area = None;

    let title = match &state.lyrics {
        LyricsStatus::Loaded { source, document } if document.is_synced() => {
            format!(" Lyrics · {source} · synced ")
        }
        LyricsStatus::Loaded { source, .. } => format!(" Lyrics · {source} "),
        _ => " Lyrics ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.border))
        .title(title)
        .title_style(theme.title());
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let padded = Rect::new(inner.x + 1, inner.y, inner.width.saturating_sub(2), inner.height);

    if let Some(msg) = status_message(&state.lyrics) {
        centered(frame, &theme, msg, padded);
        return;
    }
    let Some(document) = state.lyrics_document().cloned() else {
        return;
    };

    if !document.is_synced() {
        let para = Paragraph::new(document.plain_text.as_str())
            .style(Style::default().fg(theme.palette.fg_primary))
            .wrap(Wrap { trim: true })
            .scroll((state.lyrics_pane.scroll_offset as u16, 0));
        frame.render_widget(para, padded);
        return;
    }

    state.lyrics_pane.area = Some(padded);
    let lines = synced_lines(
        &theme,
        state,
        &document,
        padded.height as usize,
        padded.width as usize,
    );
    frame.render_widget(Paragraph::new(lines), padded);
}

fn synced_lines(
    theme: &Theme,
    state: &AppState,
    document: &LyricsDocument,
    height: usize,
    width: usize,
) -> Vec<Line<'static>> {
    let pane = &state.lyrics_pane;
    document
        .lines
        .iter()
        .enumerate()
        .skip(pane.scroll_offset)
        .take(height)
        .map(|(i, line)| {
            let active = pane.active == Some(i);
            let (marker, style) = if active {
                ("♪ ", theme.active_line())
            } else {
                ("  ", theme.dim())
            };
            let text = pane.display_text(i, &line.text);
            Line::from(vec![
                Span::styled(marker, style),
                Span::styled(truncate_str(text, width.saturating_sub(2)), style),
            ])
        })
        .collect()
}

/// Three lines around the active one, for the bottom bar
pub fn render_compact(frame: &mut Frame, state: &AppState, area: Rect) {
    let theme = get_theme();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.border))
        .title(" Lyrics ")
        .title_style(theme.title());
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let padded = Rect::new(inner.x + 1, inner.y, inner.width.saturating_sub(2), inner.height);

    if let Some(msg) = status_message(&state.lyrics) {
        centered(frame, &theme, msg, padded);
        return;
    }
    let Some(document) = state.lyrics_document() else {
        return;
    };
    if !document.is_synced() {
        centered(frame, &theme, "Plain lyrics · press L to read", padded);
        return;
    }

    let width = padded.width.saturating_sub(2) as usize;
    let pane = &state.lyrics_pane;
    let current = pane.active.unwrap_or(0);
    let start = current.saturating_sub(1);
    let end = (current + 2).min(document.lines.len());

    let mut lines: Vec<Line> = Vec::new();
    for i in start..end {
        let text = pane.display_text(i, &document.lines[i].text);
        let style = if pane.active == Some(i) {
            theme.active_line()
        } else {
            theme.dim()
        };
        lines.push(Line::from(Span::styled(truncate_str(text, width), style)));
    }

    let top = (padded.height as usize).saturating_sub(lines.len()) / 2;
    let mut centered_lines = vec![Line::default(); top];
    centered_lines.extend(lines);
    frame.render_widget(Paragraph::new(centered_lines).alignment(Alignment::Center), padded);
}
