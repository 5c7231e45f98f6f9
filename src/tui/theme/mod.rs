//! Colors and borders, after the site's neon look

use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::border;

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg_highlight: Color,
    pub fg_primary: Color,
    pub fg_secondary: Color,
    pub accent: Color,
    pub accent_alt: Color,
    pub border: Color,
    pub error: Color,
}

impl Palette {
    pub const NEON: Self = Self {
        bg_highlight: Color::Rgb(40, 24, 56),
        fg_primary: Color::Rgb(255, 255, 255),
        fg_secondary: Color::Rgb(140, 140, 160),
        accent: Color::Rgb(0, 245, 255),
        accent_alt: Color::Rgb(255, 0, 255),
        border: Color::Rgb(70, 60, 90),
        error: Color::Rgb(231, 76, 60),
    };
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub palette: Palette,
}

impl Theme {
    pub fn border_set(&self) -> border::Set<'static> {
        border::ROUNDED
    }

    pub fn title(&self) -> Style {
        Style::default().fg(self.palette.accent)
    }

    pub fn active_line(&self) -> Style {
        Style::default()
            .fg(self.palette.accent_alt)
            .add_modifier(Modifier::BOLD)
    }

    pub fn dim(&self) -> Style {
        Style::default().fg(self.palette.fg_secondary)
    }
}

pub fn get_theme() -> Theme {
    Theme {
        palette: Palette::NEON,
    }
}
