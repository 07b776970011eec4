//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::Urgency;

// Rows are branded by urgency; completed rows are dimmed regardless.

/// Used for Urgent tasks and destructive dialogs
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
/// Used for Normal tasks and the focused field
pub const GOLD: Color = Color::Rgb(255, 215, 0);
/// Used for Not Urgent tasks
pub const DARK_GREEN: Color = Color::Rgb(0, 80, 0);
/// Used for the status bar
pub const DARK_PURPLE: Color = Color::Rgb(86, 60, 92);

/// Accent color for an urgency level.
pub fn urgency_color(urgency: Urgency) -> Color {
    match urgency {
        Urgency::Urgent => DARK_RED,
        Urgency::Normal => GOLD,
        Urgency::NotUrgent => DARK_GREEN,
    }
}

/// Readable foreground on top of `bg`.
pub fn text_on(bg: Color) -> Color {
    match bg {
        GOLD => Color::Rgb(20, 20, 20),
        _ => Color::White,
    }
}
