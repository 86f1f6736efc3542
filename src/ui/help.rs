//! Help overlay rendering.
//!
//! Displays keyboard shortcuts in a modal overlay.

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::centered_rect;

/// Key binding entry for the help display.
struct KeyBinding {
    key: &'static str,
    description: &'static str,
}

const GENERAL_BINDINGS: &[KeyBinding] = &[
    KeyBinding {
        key: "?",
        description: "Toggle this help",
    },
    KeyBinding {
        key: "q",
        description: "Quit",
    },
    KeyBinding {
        key: "Ctrl+C",
        description: "Force quit",
    },
    KeyBinding {
        key: "Tab",
        description: "Switch between quiz and grid demo",
    },
];

const QUIZ_BINDINGS: &[KeyBinding] = &[
    KeyBinding {
        key: "1-5",
        description: "Play a choice",
    },
    KeyBinding {
        key: "Space / p",
        description: "Play the highlighted choice",
    },
    KeyBinding {
        key: "k / Up",
        description: "Highlight previous choice",
    },
    KeyBinding {
        key: "j / Down",
        description: "Highlight next choice",
    },
    KeyBinding {
        key: "Enter",
        description: "Answer with the highlighted choice",
    },
    KeyBinding {
        key: "n",
        description: "Next rhythm (after a wrong answer)",
    },
];

const DEMO_BINDINGS: &[KeyBinding] = &[
    KeyBinding {
        key: "1 / 2 / 3",
        description: "Pick the 4, 8 or 16 grid",
    },
    KeyBinding {
        key: "h / Left",
        description: "Coarser grid",
    },
    KeyBinding {
        key: "l / Right",
        description: "Finer grid",
    },
    KeyBinding {
        key: "Space / p",
        description: "Play the grid",
    },
];

/// Renders the help overlay.
///
/// # Arguments
///
/// * `frame` - The frame to render to
/// * `scroll` - Vertical scroll offset
pub fn render_help(frame: &mut Frame, scroll: u16) {
    let area = centered_rect(60, 70, frame.area());

    // Clear the area behind the popup
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Help - Keyboard Shortcuts ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Scrollable content
            Constraint::Length(1), // Fixed footer
        ])
        .split(inner);

    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(Color::White);

    let mut lines: Vec<Line<'static>> = Vec::new();
    for (title, bindings) in [
        ("General", GENERAL_BINDINGS),
        ("Quiz", QUIZ_BINDINGS),
        ("Grid Demo", DEMO_BINDINGS),
    ] {
        lines.push(Line::from(Span::styled(title, section_style)));
        for binding in bindings {
            lines.push(Line::from(vec![
                Span::styled(format!("{:15}", binding.key), key_style),
                Span::styled(binding.description, desc_style),
            ]));
        }
        lines.push(Line::from(""));
    }

    let help_text = Paragraph::new(lines).scroll((scroll, 0));
    frame.render_widget(help_text, chunks[0]);

    let footer = Paragraph::new(Line::from(Span::styled(
        "Scroll: Up/Down/j/k  |  Close: ?/Esc",
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    )));
    frame.render_widget(footer, chunks[1]);
}
