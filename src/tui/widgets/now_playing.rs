//! Compact player for the bottom bar

use super::{format_clock, truncate_str};
use crate::app::state::{AppState, ToastKind};
use crate::queue::RepeatMode;
use crate::tui::theme::get_theme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(frame: &mut Frame, state: &AppState, area: Rect) {
    let theme = get_theme();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.border))
        .title(" Player ")
        .title_style(theme.title());
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let padded = Rect::new(inner.x + 1, inner.y, inner.width.saturating_sub(2), inner.height);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(1), // artist
            Constraint::Length(1), // progress
            Constraint::Length(1), // time + flags
            Constraint::Min(0),    // toast
        ])
        .split(padded);
    let width = padded.width as usize;

    let (title, artist) = match &state.now_playing {
        Some(t) => (t.title.as_str(), t.artist.as_str()),
        None => ("Not playing", ""),
    };
    frame.render_widget(
        Paragraph::new(Span::styled(
            truncate_str(title, width),
            Style::default()
                .fg(theme.palette.fg_primary)
                .add_modifier(Modifier::BOLD),
        )),
        rows[0],
    );
    frame.render_widget(
        Paragraph::new(Span::styled(truncate_str(artist, width), theme.dim())),
        rows[1],
    );

    let ratio = if state.now_playing.is_some() && state.duration_secs > 0.0 {
        (state.position_secs / state.duration_secs).clamp(0.0, 1.0)
    } else {
        0.0
    };
    frame.render_widget(
        Paragraph::new(Span::styled(progress_bar(width, ratio), theme.title())),
        rows[2],
    );

    let mut spans = vec![
        Span::styled(if state.paused { "▶ " } else { "⏸ " }, theme.title()),
        Span::styled(
            format!(
                "{} / {}",
                format_clock(state.position_secs),
                format_clock(state.duration_secs)
            ),
            theme.dim(),
        ),
        Span::styled(format!("  vol {}%", state.volume), theme.dim()),
    ];
    if state.queue.is_shuffle_enabled() {
        spans.push(Span::styled("  shuffle", Style::default().fg(theme.palette.accent_alt)));
    }
    if state.queue.repeat() != RepeatMode::Off {
        spans.push(Span::styled(
            format!("  repeat {}", state.queue.repeat().label()),
            Style::default().fg(theme.palette.accent_alt),
        ));
    }
    if !state.typewriter_enabled {
        spans.push(Span::styled("  tw off", theme.dim()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), rows[3]);

    let message = match &state.toast {
        Some(toast) if !toast.is_expired() => {
            let color = match toast.kind {
                ToastKind::Success => theme.palette.accent,
                ToastKind::Error => theme.palette.error,
            };
            Some(Span::styled(truncate_str(&toast.message, width), Style::default().fg(color)))
        }
        _ if !state.status.is_empty() => {
            Some(Span::styled(truncate_str(&state.status, width), theme.dim()))
        }
        _ => None,
    };
    if let Some(message) = message {
        frame.render_widget(Paragraph::new(message), rows[4]);
    }
}

fn progress_bar(width: usize, ratio: f64) -> String {
    if width < 3 {
        return String::new();
    }
    let filled = ((width - 1) as f64 * ratio).round() as usize;
    let empty = width.saturating_sub(filled + 1);
    format!("{}●{}", "━".repeat(filled), "─".repeat(empty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(2, 0.5), "");
        assert_eq!(progress_bar(5, 0.0), "●────");
        assert_eq!(progress_bar(5, 1.0), "━━━━●");
        assert_eq!(progress_bar(5, 0.5).chars().count(), 5);
    }
}
