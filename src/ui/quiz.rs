//! Quiz screen rendering.
//!
//! The prompt score on top, one row per choice with its play key and
//! (once answered) its notation, and a banner with the result.

use super::score::{render_score, SCORE_HEIGHT};
use crate::app::App;
use crate::quiz::ChoiceStatus;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

/// Width of the key/label column left of each choice.
const CHOICE_LABEL_WIDTH: u16 = 14;

fn status_color(status: ChoiceStatus) -> Color {
    match status {
        ChoiceStatus::Correct => Color::Green,
        ChoiceStatus::Incorrect => Color::Red,
        ChoiceStatus::Neutral => Color::Gray,
    }
}

/// Renders the quiz screen.
pub fn render_quiz(frame: &mut Frame, area: Rect, app: &mut App) {
    let mut constraints = vec![Constraint::Length(SCORE_HEIGHT)];
    constraints.extend(app.choice_panes.iter().map(|_| Constraint::Length(SCORE_HEIGHT)));
    constraints.push(Constraint::Length(2)); // Banner
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    render_score(frame, chunks[0], &mut app.prompt_pane, Color::Cyan, "");

    for (index, pane) in app.choice_panes.iter_mut().enumerate() {
        let row = chunks[index + 1];
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(CHOICE_LABEL_WIDTH), Constraint::Min(10)])
            .split(row);

        let status = app.quiz.choice_status(index);
        let highlighted = index == app.highlighted_choice;
        let selected = app.quiz.selected() == Some(index);

        let marker = if selected { "(*)" } else { "( )" };
        let mut label_style = Style::default().fg(status_color(status));
        if highlighted {
            label_style = label_style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
        }
        let label = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(format!(" {} [{}] ", marker, index + 1), label_style)),
        ]);
        frame.render_widget(label, columns[0]);

        let border = if highlighted {
            Color::Cyan
        } else {
            status_color(status)
        };
        render_score(
            frame,
            columns[1],
            pane,
            border,
            "Press the number to listen; answer to reveal",
        );
    }

    let banner_area = chunks[app.choice_panes.len() + 1];
    let mut banner = Vec::new();
    match app.quiz.is_correct() {
        Some(true) => banner.push(Span::styled(
            " Correct! Moving on... ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        Some(false) => banner.push(Span::styled(
            " Wrong. Listen again. ",
            Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        )),
        None => banner.push(Span::styled(
            " Which choice sounds like the prompt? ",
            Style::default().fg(Color::DarkGray),
        )),
    }
    if app.quiz.show_advance() {
        banner.push(Span::styled(
            "  n: next rhythm",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(banner)), banner_area);
}
