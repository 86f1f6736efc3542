//! Grid demo screen: pick a subdivision, see its notation and hear it.

use super::score::{render_score, SCORE_HEIGHT};
use crate::app::App;
use crate::rhythm::{Subdivision, TEMPO_BPM};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

/// Renders the difficulty selector.
pub fn render_demo(frame: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),            // Grid buttons
            Constraint::Length(SCORE_HEIGHT), // Score
            Constraint::Length(2),            // Hint
            Constraint::Min(0),
        ])
        .split(area);

    let mut buttons = vec![Span::raw(" ")];
    for (n, subdivision) in Subdivision::ALL.into_iter().enumerate() {
        let style = if subdivision == app.demo_subdivision {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        buttons.push(Span::styled(format!(" [{}] {} ", n + 1, subdivision), style));
        buttons.push(Span::raw("  "));
    }
    frame.render_widget(Paragraph::new(Line::from(buttons)), chunks[0]);

    render_score(frame, chunks[1], &mut app.demo_pane, Color::Cyan, "");

    let per_beat = app.demo_subdivision.per_beat();
    let hint = Line::from(vec![
        Span::styled(
            format!(
                " {} slot{} per beat at {} BPM. ",
                per_beat,
                if per_beat == 1 { "" } else { "s" },
                TEMPO_BPM
            ),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            "p: play",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
    ]);
    frame.render_widget(Paragraph::new(hint), chunks[2]);
}
