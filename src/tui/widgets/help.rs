use crate::tui::theme::{get_theme, Theme};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

pub fn render(frame: &mut Frame, area: Rect) {
    let theme = get_theme();
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let left = vec![
        section("Navigation", &theme),
        keybind("j / k", "Move down / up", &theme),
        keybind("g / G", "Top / bottom", &theme),
        keybind("Ctrl+d / u", "Page down / up", &theme),
        keybind("Tab", "Next screen", &theme),
        keybind("1 2 ?", "Tracks, lyrics, help", &theme),
        keybind("/", "Filter tracks", &theme),
        keybind("F5", "Reload catalog", &theme),
        keybind("q", "Quit", &theme),
        Line::default(),
        section("Playback", &theme),
        keybind("Enter", "Play selected track", &theme),
        keybind("Space", "Pause / resume", &theme),
        keybind("n / p", "Next / previous track", &theme),
        keybind("[ / ]", "Seek 10s", &theme),
        keybind("- / +", "Volume", &theme),
        keybind("s", "Shuffle", &theme),
        keybind("R", "Repeat off / all / one", &theme),
    ];

    let right = vec![
        section("Lyrics", &theme),
        keybind(", / .", "Jump to previous / next line", &theme),
        keybind("click", "Jump to that line", &theme),
        keybind("j / k", "Scroll (lyrics screen)", &theme),
        keybind("t", "Typewriter on / off", &theme),
        keybind("C", "Clear lyrics cache", &theme),
    ];

    frame.render_widget(Paragraph::new(left).wrap(Wrap { trim: false }), cols[0]);
    frame.render_widget(Paragraph::new(right).wrap(Wrap { trim: false }), cols[1]);
}

fn section(title: &str, theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(
        format!("── {title} ──"),
        theme.title().add_modifier(Modifier::BOLD),
    ))
}

fn keybind(key: &str, desc: &str, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(
            format!("{key:12}"),
            Style::default()
                .fg(theme.palette.accent_alt)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(desc.to_string(), Style::default().fg(theme.palette.fg_primary)),
    ])
}
