//! Colors and the severity/state → style lookups.

use ratatui::style::{Color, Modifier, Style};

use surfacewatch::core::PortState;

pub const STATUS_BAR: Style = Style::new().fg(Color::Gray);
pub const COMMAND: Style = Style::new().fg(Color::Cyan);
pub const COMMAND_DISABLED: Style = Style::new().fg(Color::DarkGray);
pub const TEXT_DIM: Style = Style::new().fg(Color::DarkGray);
pub const TEXT_ERROR: Style = Style::new().fg(Color::Red);
pub const TEXT_BOLD: Style = Style::new().add_modifier(Modifier::BOLD);
pub const HEADING: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
pub const PENDING: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);

// Summary cards
pub const CARD_TOTAL: Style = Style::new().fg(Color::Blue);
pub const CARD_OPEN: Style = Style::new().fg(Color::Red);
pub const CARD_SERVICES: Style = Style::new().fg(Color::Green);
pub const CARD_VULNS: Style = Style::new().fg(Color::Yellow);

pub fn port_state_style(state: PortState) -> Style {
    match state {
        PortState::Open => Style::new().fg(Color::Green),
        PortState::Closed => Style::new().fg(Color::Red),
        PortState::Filtered => Style::new().fg(Color::Gray),
    }
}

/// Style for a severity label; unknown labels get the neutral style.
pub fn severity_style(label: &str) -> Style {
    match label {
        "Critical" | "High" => Style::new().fg(Color::Red),
        "Medium" => Style::new().fg(Color::Yellow),
        "Low" => Style::new().fg(Color::Green),
        _ => Style::new().fg(Color::Blue),
    }
}
