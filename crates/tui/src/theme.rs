//! Colors and styles shared by every panel.

use ratatui::style::{Color, Modifier, Style};

pub const ACCENT: Color = Color::Rgb(8, 171, 237);
pub const FG: Color = Color::Rgb(224, 224, 230);
pub const FG_MUTED: Color = Color::Rgb(168, 168, 175);
pub const BORDER: Color = Color::Rgb(72, 72, 80);
pub const BG_SELECT: Color = Color::Rgb(18, 28, 38);
pub const WARN: Color = Color::Rgb(220, 96, 110);
pub const OK: Color = Color::Rgb(96, 200, 130);

/// Accent border for the focused panel.
pub fn border_style(focused: bool) -> Style {
    Style::default().fg(if focused { ACCENT } else { BORDER })
}

pub fn title_style() -> Style {
    Style::default().fg(FG).add_modifier(Modifier::BOLD)
}

pub fn text_style() -> Style {
    Style::default().fg(FG)
}

pub fn text_muted() -> Style {
    Style::default().fg(FG_MUTED)
}

pub fn key_style() -> Style {
    title_style().fg(ACCENT)
}

pub fn error_style() -> Style {
    Style::default().fg(WARN)
}

pub fn selection_style() -> Style {
    Style::default().bg(BG_SELECT).fg(ACCENT).add_modifier(Modifier::BOLD)
}

/// Execute button: highlighted when enabled, dimmed otherwise.
pub fn trigger_style(enabled: bool, focused: bool) -> Style {
    match (enabled, focused) {
        (false, _) => text_muted().add_modifier(Modifier::DIM),
        (true, true) => Style::default().fg(Color::Black).bg(ACCENT).add_modifier(Modifier::BOLD),
        (true, false) => Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
    }
}
