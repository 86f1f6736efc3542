//! Application state and event handling.
//!
//! This module defines the main application state that coordinates
//! between the quiz, the player, the notation viewers and the TUI.

use crate::audio::{Player, ToneOutput};
use crate::config::Settings;
use crate::notation::{RenderError, RenderedScore, ScoreViewer, StaffRenderer};
use crate::quiz::{builtin_items, Quiz, QuizItem, Selection, CHOICE_COUNT};
use crate::rhythm::{compile_with, subdivision_demo, MarkupDocument, RhythmPattern, Subdivision};
use anyhow::{Context, Result};
use std::time::{Duration, Instant};
use tracing::warn;

/// How long a status message stays visible.
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// Which screen is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// Difficulty selector: hear each metronome grid.
    Demo,
    /// The rhythm quiz.
    #[default]
    Quiz,
}

/// One notation panel: a label, a fitted viewer and the last render error.
#[derive(Debug)]
pub struct ScorePane {
    pub label: String,
    viewer: ScoreViewer<StaffRenderer>,
    error: Option<RenderError>,
}

impl ScorePane {
    fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            viewer: ScoreViewer::new(StaffRenderer::new()),
            error: None,
        }
    }

    /// Shows a document, keeping any render error for display.
    fn show(&mut self, document: &MarkupDocument) {
        match self.viewer.set_document(document) {
            Ok(_) => self.error = None,
            Err(e) => {
                warn!(pane = %self.label, error = %e, "Failed to render notation");
                self.error = Some(e);
            }
        }
    }

    fn hide(&mut self) {
        self.viewer.dispose();
        self.error = None;
    }

    /// Fits the notation to the area it is drawn in.
    pub fn fit(&mut self, width: u16) {
        if let Err(e) = self.viewer.resize(width) {
            warn!(pane = %self.label, error = %e, "Failed to fit notation");
            self.error = Some(e);
        }
    }

    pub fn rendered(&self) -> Option<&RenderedScore> {
        self.viewer.rendered()
    }

    pub fn error(&self) -> Option<&RenderError> {
        self.error.as_ref()
    }
}

/// What the notation panes currently show, to skip needless recompiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Shown {
    item: usize,
    choices_revealed: bool,
    demo: Subdivision,
}

/// Main application state.
pub struct App {
    /// Loaded settings.
    pub settings: Settings,
    /// Pattern playback.
    pub player: Player,
    /// Quiz progression.
    pub quiz: Quiz,
    /// Current screen.
    pub screen: Screen,
    /// Grid selected on the demo screen.
    pub demo_subdivision: Subdivision,
    /// Choice row with the cursor.
    pub highlighted_choice: usize,
    /// Prompt notation.
    pub prompt_pane: ScorePane,
    /// Choice notation, revealed after a selection.
    pub choice_panes: Vec<ScorePane>,
    /// Demo grid notation.
    pub demo_pane: ScorePane,
    /// Status message to display.
    pub status_message: Option<(String, Instant)>,
    /// Whether the help overlay is visible.
    pub show_help: bool,
    /// Help menu scroll offset.
    pub help_scroll: u16,
    shown: Option<Shown>,
}

impl App {
    /// Creates the application with the built-in quiz bank.
    ///
    /// # Errors
    ///
    /// Returns error if the quiz bank is invalid.
    pub fn new(settings: Settings, output: Box<dyn ToneOutput>) -> Result<Self> {
        let items = builtin_items().context("Invalid built-in quiz item")?;
        Self::with_items(settings, output, items)
    }

    /// Creates the application with the given quiz items.
    pub fn with_items(
        settings: Settings,
        output: Box<dyn ToneOutput>,
        items: Vec<QuizItem>,
    ) -> Result<Self> {
        let quiz = Quiz::new(items, settings.auto_advance_delay())
            .context("Failed to start quiz")?;
        let player = Player::new(output, settings.player_options());

        let mut app = Self {
            settings,
            player,
            quiz,
            screen: Screen::default(),
            demo_subdivision: Subdivision::Four,
            highlighted_choice: 0,
            prompt_pane: ScorePane::new("Prompt"),
            choice_panes: (1..=CHOICE_COUNT)
                .map(|n| ScorePane::new(format!("Choice {}", n)))
                .collect(),
            demo_pane: ScorePane::new("Rhythm"),
            status_message: None,
            show_help: false,
            help_scroll: 0,
            shown: None,
        };
        app.sync_documents();
        Ok(app)
    }

    /// Advances timers and refreshes derived state. Called every frame.
    pub fn tick(&mut self, now: Instant) {
        self.player.poll(now);
        if self.quiz.poll(now) {
            self.highlighted_choice = 0;
        }
        self.sync_documents();
        self.clear_expired_status(now);
    }

    /// Recompiles the notation panes when the item, the reveal state or the
    /// demo grid changed.
    pub fn sync_documents(&mut self) {
        let shown = Shown {
            item: self.quiz.current_index(),
            choices_revealed: self.quiz.selected().is_some(),
            demo: self.demo_subdivision,
        };
        if self.shown == Some(shown) {
            return;
        }

        let options = self.settings.compile_options();
        let item = self.quiz.current();
        let prompt = compile_with(item.prompt(), Some(self.prompt_pane.label.as_str()), &options);
        self.prompt_pane.show(&prompt);

        for (pane, choice) in self.choice_panes.iter_mut().zip(item.choices()) {
            if shown.choices_revealed {
                let document = compile_with(choice, Some(pane.label.as_str()), &options);
                pane.show(&document);
            } else {
                pane.hide();
            }
        }

        self.demo_pane.show(&subdivision_demo(self.demo_subdivision));
        self.shown = Some(shown);
    }

    /// Plays one of the current item's choices on the item's grid.
    pub fn play_choice(&mut self, index: usize, now: Instant) {
        let item = self.quiz.current();
        let Some(pattern) = item.choice(index).cloned() else {
            return;
        };
        let subdivision = item.subdivision();
        self.highlighted_choice = index;
        if self.player.play(&pattern, subdivision, now) {
            self.set_status(format!("Playing choice {}", index + 1));
        } else {
            self.set_status("Already playing");
        }
    }

    /// Plays the selected demo grid: one note on every slot.
    pub fn play_demo(&mut self, now: Instant) {
        let subdivision = self.demo_subdivision;
        let pattern = grid_pattern(subdivision);
        if self.player.play(&pattern, subdivision, now) {
            self.set_status(format!("Playing {} grid", subdivision));
        } else {
            self.set_status("Already playing");
        }
    }

    /// Selects the highlighted choice as the answer.
    pub fn select(&mut self, now: Instant) -> Selection {
        let playing = self.player.is_playing();
        let selection = self.quiz.select_choice(self.highlighted_choice, playing, now);
        match selection {
            Selection::Correct => self.set_status("Correct!"),
            Selection::Incorrect => self.set_status("Wrong. Listen again."),
            Selection::Ignored if playing => self.set_status("Wait for playback to finish"),
            Selection::Ignored => {}
        }
        self.sync_documents();
        selection
    }

    /// Moves to the next item. Only available once the advance control is
    /// visible.
    pub fn advance(&mut self) -> bool {
        if !self.quiz.show_advance() {
            return false;
        }
        if !self.quiz.advance(self.player.is_playing()) {
            self.set_status("Wait for playback to finish");
            return false;
        }
        self.highlighted_choice = 0;
        self.sync_documents();
        true
    }

    pub fn highlight_up(&mut self) {
        self.highlighted_choice = self.highlighted_choice.saturating_sub(1);
    }

    pub fn highlight_down(&mut self) {
        self.highlighted_choice = (self.highlighted_choice + 1).min(CHOICE_COUNT - 1);
    }

    /// Picks the demo grid by position (0 = 4-beat).
    pub fn set_demo_subdivision(&mut self, index: usize) {
        if let Some(subdivision) = Subdivision::ALL.get(index) {
            self.demo_subdivision = *subdivision;
            self.sync_documents();
        }
    }

    /// Steps the demo grid left or right, clamped at the ends.
    pub fn step_demo_subdivision(&mut self, forward: bool) {
        let current = Subdivision::ALL
            .iter()
            .position(|s| *s == self.demo_subdivision)
            .unwrap_or(0);
        let next = if forward {
            (current + 1).min(Subdivision::ALL.len() - 1)
        } else {
            current.saturating_sub(1)
        };
        self.set_demo_subdivision(next);
    }

    /// Switches between the demo and quiz screens.
    pub fn toggle_screen(&mut self) {
        self.screen = match self.screen {
            Screen::Demo => Screen::Quiz,
            Screen::Quiz => Screen::Demo,
        };
    }

    /// Sets a status message to display temporarily.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    /// Clears expired status messages.
    pub fn clear_expired_status(&mut self, now: Instant) {
        if let Some((_, time)) = &self.status_message {
            if now.saturating_duration_since(*time) > STATUS_TIMEOUT {
                self.status_message = None;
            }
        }
    }
}

/// A measure of equal notes, one per slot of the grid.
fn grid_pattern(subdivision: Subdivision) -> RhythmPattern {
    let value = subdivision.note_value().beats();
    RhythmPattern::new(vec![value; subdivision.count() as usize])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingOutput;
    use std::rc::Rc;

    fn app() -> (App, Rc<RecordingOutput>) {
        let output = Rc::new(RecordingOutput::new());
        let app = App::new(Settings::default(), Box::new(Rc::clone(&output))).unwrap();
        (app, output)
    }

    #[test]
    fn test_choices_hidden_until_selection() {
        let (mut app, _) = app();
        assert!(app.prompt_pane.rendered().is_some());
        assert!(app.choice_panes.iter().all(|p| p.rendered().is_none()));

        app.highlighted_choice = 1;
        assert_eq!(app.select(Instant::now()), Selection::Incorrect);
        assert!(app.choice_panes.iter().all(|p| p.rendered().is_some()));
        assert!(app.quiz.show_advance());
    }

    #[test]
    fn test_selection_blocked_during_playback() {
        let (mut app, output) = app();
        let now = Instant::now();
        app.play_choice(0, now);
        assert!(app.player.is_playing());
        assert_eq!(output.calls().len(), 1);

        assert_eq!(app.select(now), Selection::Ignored);
        assert_eq!(app.quiz.selected(), None);

        // Four 600ms slots plus the trailing sub-beat
        app.tick(now + Duration::from_millis(2400));
        assert!(!app.player.is_playing());
        assert_eq!(app.select(now + Duration::from_millis(2400)), Selection::Correct);
    }

    #[test]
    fn test_correct_answer_moves_on() {
        let (mut app, _) = app();
        let now = Instant::now();
        app.highlighted_choice = 0;
        app.select(now);
        app.tick(now + Duration::from_millis(1000));
        assert_eq!(app.quiz.current_index(), 1);
        assert!(app.choice_panes.iter().all(|p| p.rendered().is_none()));
    }

    #[test]
    fn test_advance_requires_visible_control() {
        let (mut app, _) = app();
        assert!(!app.advance());
        app.highlighted_choice = 4;
        app.select(Instant::now());
        app.highlight_up();
        assert!(app.advance());
        assert_eq!(app.quiz.current_index(), 1);
        assert_eq!(app.highlighted_choice, 0);
    }

    #[test]
    fn test_demo_grid_playback() {
        let (mut app, output) = app();
        let now = Instant::now();
        app.set_demo_subdivision(2);
        assert_eq!(app.demo_subdivision, Subdivision::Sixteen);
        app.play_demo(now);
        app.tick(now + Duration::from_millis(2400));
        let calls = output.calls();
        assert_eq!(calls.len(), 16);
        assert!(calls.iter().all(|c| c.len() == 2));
    }

    #[test]
    fn test_demo_subdivision_steps_clamp() {
        let (mut app, _) = app();
        app.step_demo_subdivision(false);
        assert_eq!(app.demo_subdivision, Subdivision::Four);
        app.step_demo_subdivision(true);
        app.step_demo_subdivision(true);
        app.step_demo_subdivision(true);
        assert_eq!(app.demo_subdivision, Subdivision::Sixteen);
    }

    #[test]
    fn test_status_expires() {
        let (mut app, _) = app();
        app.set_status("hello");
        let now = Instant::now();
        app.clear_expired_status(now);
        assert!(app.status_message.is_some());
        app.clear_expired_status(now + Duration::from_secs(4));
        assert!(app.status_message.is_none());
    }

    #[test]
    fn test_highlight_bounds() {
        let (mut app, _) = app();
        app.highlight_up();
        assert_eq!(app.highlighted_choice, 0);
        for _ in 0..10 {
            app.highlight_down();
        }
        assert_eq!(app.highlighted_choice, CHOICE_COUNT - 1);
    }
}
