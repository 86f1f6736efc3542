//! Transport bar rendering.
//!
//! Displays the playback state, the current slot, the tempo and the
//! current quiz item.

use crate::app::{App, Screen};
use crate::audio::PlaybackState;
use crate::rhythm::TEMPO_BPM;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

/// Renders the transport bar at the top of the screen.
pub fn render_transport(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Transport ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(14), // Playback state
            Constraint::Length(14), // Slot
            Constraint::Length(10), // Tempo
            Constraint::Length(22), // Item
            Constraint::Min(20),    // Status/screen
        ])
        .split(inner);

    let play_status = match app.player.state() {
        PlaybackState::Playing => Span::styled(
            " [>] PLAY ",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        PlaybackState::Idle => Span::styled(
            " [.] IDLE ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
    };
    frame.render_widget(Paragraph::new(Line::from(play_status)), chunks[0]);

    let slot = match app.player.progress() {
        Some((current, total)) => format!("{}/{}", current + 1, total),
        None => "-".to_string(),
    };
    let slot_widget = Paragraph::new(Line::from(vec![
        Span::styled("Slot: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            slot,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    frame.render_widget(slot_widget, chunks[1]);

    let tempo_widget = Paragraph::new(Line::from(vec![
        Span::styled("BPM: ", Style::default().fg(Color::DarkGray)),
        Span::styled(format!("{}", TEMPO_BPM), Style::default().fg(Color::White)),
    ]));
    frame.render_widget(tempo_widget, chunks[2]);

    let item = app.quiz.current();
    let item_widget = Paragraph::new(Line::from(vec![
        Span::styled("Item: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!(
                "{}/{} ({})",
                app.quiz.current_index() + 1,
                app.quiz.items().len(),
                item.subdivision()
            ),
            Style::default().fg(Color::White),
        ),
    ]));
    frame.render_widget(item_widget, chunks[3]);

    let status_line = if let Some((msg, _)) = &app.status_message {
        Line::from(Span::styled(
            msg.as_str(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        ))
    } else {
        let (name, color) = match app.screen {
            Screen::Quiz => ("QUIZ", Color::Blue),
            Screen::Demo => ("GRID DEMO", Color::Magenta),
        };
        Line::from(Span::styled(
            format!("-- {} --", name),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
    };
    frame.render_widget(Paragraph::new(status_line), chunks[4]);
}
