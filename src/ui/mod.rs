//! Terminal user interface components.
//!
//! This module provides the visual components for the rhythm quiz:
//! the transport bar, the quiz and grid demo screens, the notation widget
//! and the help overlay.

mod demo;
mod help;
mod quiz;
mod score;
mod transport;

use crate::app::{App, Screen};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::Frame;

pub use demo::render_demo;
pub use help::render_help;
pub use quiz::render_quiz;
pub use score::render_score;
pub use transport::render_transport;

/// Renders the complete UI.
///
/// The layout is divided into:
/// - Top: Transport bar with playback state and status
/// - Below: The quiz or the grid demo, depending on the screen
pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Transport
            Constraint::Min(10),   // Screen
        ])
        .split(frame.area());

    render_transport(frame, chunks[0], app);

    match app.screen {
        Screen::Quiz => render_quiz(frame, chunks[1], app),
        Screen::Demo => render_demo(frame, chunks[1], app),
    }

    if app.show_help {
        render_help(frame, app.help_scroll);
    }
}

/// Helper function to center a rectangle within another rectangle.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
