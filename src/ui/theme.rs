// BotConsole - ui/theme.rs
//
// Colour scheme, level/connection colour mapping, and layout constants.
// No dependencies on app state or business logic.

use crate::core::model::{ConnectionState, LogLevel};
use egui::Color32;

/// Colour for a log level badge.
pub fn level_colour(level: LogLevel, dark_mode: bool) -> Color32 {
    match (level, dark_mode) {
        (LogLevel::Error, _) => Color32::from_rgb(239, 68, 68),      // Red 500
        (LogLevel::Warning, _) => Color32::from_rgb(245, 158, 11),   // Amber 500
        (LogLevel::Success, true) => Color32::from_rgb(74, 222, 128), // Green 400
        (LogLevel::Success, false) => Color32::from_rgb(22, 163, 74), // Green 600
        (LogLevel::Debug, _) => Color32::from_rgb(107, 114, 128),    // Gray 500
        (LogLevel::Info, true) => Color32::from_rgb(96, 165, 250),   // Blue 400
        (LogLevel::Info, false) => Color32::from_rgb(37, 99, 235),   // Blue 600
    }
}

/// Colour of the connection status dot in the terminal header.
pub fn connection_colour(state: ConnectionState) -> Color32 {
    match state {
        ConnectionState::Connected => Color32::from_rgb(34, 197, 94),    // Green 500
        ConnectionState::Connecting => Color32::from_rgb(234, 179, 8),   // Yellow 500
        ConnectionState::Error => Color32::from_rgb(239, 68, 68),        // Red 500
        ConnectionState::Disconnected => Color32::from_rgb(107, 114, 128), // Gray 500
    }
}

/// Terminal body text: near-white on dark, near-black on light.
pub fn terminal_text_colour(dark_mode: bool) -> Color32 {
    if dark_mode {
        Color32::from_rgb(229, 231, 235) // Gray 200
    } else {
        Color32::from_rgb(17, 24, 39) // Gray 900
    }
}

/// Terminal timestamp colour.
pub fn timestamp_colour(dark_mode: bool) -> Color32 {
    if dark_mode {
        Color32::from_rgb(156, 163, 175) // Gray 400
    } else {
        Color32::from_rgb(75, 85, 99) // Gray 600
    }
}

/// Terminal background.
pub fn terminal_bg(dark_mode: bool) -> Color32 {
    if dark_mode {
        Color32::from_rgb(17, 24, 39) // Gray 900
    } else {
        Color32::from_rgb(249, 250, 251) // Gray 50
    }
}

/// Layout constants.
pub const TERMINAL_DEFAULT_WIDTH: f32 = 760.0;
pub const TERMINAL_DEFAULT_HEIGHT: f32 = 360.0;
pub const TERMINAL_FONT_SIZE: f32 = 12.5;
pub const STATUS_BAR_HEIGHT: f32 = 28.0;
