//! Notation widget.
//!
//! Draws a [`ScorePane`] fitted to the width it is given. The staff is
//! always black on white, whatever the terminal theme.

use crate::app::ScorePane;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

/// Rows a score needs including its border.
pub const SCORE_HEIGHT: u16 = 5;

/// Renders a notation pane.
///
/// # Arguments
///
/// * `frame` - The frame to render to
/// * `area` - The area to render in
/// * `pane` - The pane; refitted when the width changed
/// * `border` - Border color
/// * `placeholder` - Text shown when nothing is loaded
pub fn render_score(
    frame: &mut Frame,
    area: Rect,
    pane: &mut ScorePane,
    border: Color,
    placeholder: &str,
) {
    let block = Block::default()
        .title(format!(" {} ", pane.label))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    pane.fit(inner.width);

    if let Some(e) = pane.error() {
        let error = Paragraph::new(Line::from(Span::styled(
            format!("Render error: {}", e),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
        frame.render_widget(error, inner);
        return;
    }

    let Some(score) = pane.rendered() else {
        let hidden = Paragraph::new(Line::from(Span::styled(
            placeholder.to_string(),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
        frame.render_widget(hidden, inner);
        return;
    };

    let paper = Style::default().fg(Color::Black).bg(Color::White);
    let lines: Vec<Line> = score
        .rows
        .iter()
        .map(|row| Line::from(Span::styled(row.clone(), paper)))
        .collect();
    frame.render_widget(Paragraph::new(lines).style(paper), inner);
}
