use ratatui::style::{Color, Modifier, Style};

pub const DEFAULT_ACCENT: Color = Color::Cyan;

const HEADER: Style = Style::new()
    .fg(Color::Rgb(142, 192, 124))
    .add_modifier(Modifier::BOLD);
const SELECTED: Style = Style::new()
    .bg(Color::Rgb(131, 165, 152))
    .fg(Color::Black)
    .add_modifier(Modifier::BOLD);
const MUTED: Style = Style::new().fg(Color::Rgb(146, 131, 116));
const SECTION: Style = Style::new().fg(Color::Blue).add_modifier(Modifier::BOLD);
const LINK: Style = Style::new().fg(Color::Rgb(250, 189, 47));

pub mod icons {
    pub const CURSOR: &str = "> ";
    pub const DEPENDS_ON: &str = "->";
    pub const REQUIRED_BY: &str = "<-";
}

/// Presentation styles, built once from configuration and handed to the
/// renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub accent: Color,
    pub header: Style,
    pub selected: Style,
    pub muted: Style,
    pub section: Style,
    pub link: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self::with_accent(DEFAULT_ACCENT)
    }
}

impl Theme {
    pub fn with_accent(accent: Color) -> Self {
        Self {
            accent,
            header: HEADER,
            selected: SELECTED,
            muted: MUTED,
            section: SECTION,
            link: LINK,
        }
    }

    pub fn border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.accent)
        } else {
            Style::default()
        }
    }
}

pub fn zebra_row_style(index: usize) -> Style {
    let bg = if index % 2 == 0 {
        Color::Rgb(18, 20, 26)
    } else {
        Color::Rgb(24, 27, 34)
    };
    Style::new().bg(bg)
}
