use ratatui::style::{Color, Modifier, Style};

use laadjefiets_core::models::ServiceState;

use crate::app::ToastKind;

// Color palette
pub const PRIMARY: Color = Color::Rgb(64, 160, 96);
pub const SECONDARY: Color = Color::Rgb(64, 128, 192);
pub const ACCENT: Color = Color::Rgb(192, 160, 64);
pub const ERROR: Color = Color::Rgb(192, 64, 64);
pub const MUTED: Color = Color::Rgb(128, 128, 128);
pub const HIGHLIGHT: Color = Color::Rgb(48, 48, 64);

// Styles
pub fn title_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default().bg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

pub fn highlight_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn success_style() -> Style {
    Style::default().fg(PRIMARY)
}

pub fn info_style() -> Style {
    Style::default().fg(SECONDARY)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR)
}

pub fn tab_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(PRIMARY)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        Style::default().fg(Color::White)
    }
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(PRIMARY)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn search_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn status_bar_style() -> Style {
    Style::default().bg(Color::Rgb(32, 32, 40)).fg(Color::White)
}

pub fn help_key_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn toast_style(kind: ToastKind) -> Style {
    match kind {
        ToastKind::Info => info_style(),
        ToastKind::Success => success_style(),
        ToastKind::Error => error_style(),
    }
}

pub fn service_state_style(state: ServiceState) -> Style {
    match state {
        ServiceState::Online => success_style(),
        ServiceState::Offline => error_style().add_modifier(Modifier::BOLD),
        ServiceState::Checking => muted_style(),
    }
}

/// Socket status as reported by the backend; anything unknown is muted.
pub fn socket_status_style(status: &str) -> Style {
    match status.to_lowercase().as_str() {
        "beschikbaar" | "available" | "online" => success_style(),
        "bezet" | "charging" | "laden" => highlight_style(),
        "offline" | "storing" | "error" => error_style(),
        _ => muted_style(),
    }
}
