//! rhythmtui - A terminal rhythm-reading quiz.
//!
//! Each question shows one measure of rhythm notation and offers five
//! choices to listen to; pick the one that sounds like the notation.
//!
//! # Features
//!
//! - Quiz with five built-in items on 4, 8 and 16 slot grids
//! - Metronome and note tones synthesized with rodio
//! - Terminal staff notation fitted to the window width
//! - Grid demo screen to hear each subdivision
//! - MusicXML, schedule (JSON) and WAV export from the command line
//!
//! # Usage
//!
//! ```bash
//! cargo run                                # Start the quiz
//! cargo run -- compile --item 3 --choice 2 # Print a choice as MusicXML
//! cargo run -- export --item 4 out.wav     # Render a prompt to WAV
//! ```
//!
//! Press `?` for help with keyboard shortcuts.

use rhythmtui::app::{App, Screen};
use rhythmtui::audio::{export_to_wav, open_output, Player, RecordingOutput};
use rhythmtui::config::Settings;
use rhythmtui::quiz::{builtin_items, QuizItem};
use rhythmtui::rhythm::{compile_with, RhythmPattern, SubBeatSchedule, Subdivision};
use rhythmtui::ui;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use serde::Serialize;
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "rhythmtui")]
#[command(about = "Terminal rhythm-reading quiz", long_about = None)]
struct Cli {
    /// Settings file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive quiz (default)
    Tui,

    /// Print a pattern as MusicXML
    Compile {
        #[command(flatten)]
        target: Target,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a pattern's sub-beat schedule as JSON
    Schedule {
        #[command(flatten)]
        target: Target,
    },

    /// Play a pattern through the audio device
    Play {
        #[command(flatten)]
        target: Target,

        /// Print the tones instead of sounding them
        #[arg(long)]
        dry_run: bool,
    },

    /// Render a pattern's playback to a WAV file
    Export {
        #[command(flatten)]
        target: Target,

        /// Output WAV file path
        output: PathBuf,
    },

    /// Validate every built-in pattern
    Check {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Selects a pattern from the built-in bank.
#[derive(Args)]
struct Target {
    /// Quiz item, counting from 1
    #[arg(short, long, default_value = "1")]
    item: usize,

    /// Choice within the item, counting from 1 (the prompt if omitted)
    #[arg(short = 'n', long)]
    choice: Option<usize>,
}

impl Target {
    /// Looks up the pattern, its grid and a label for the part name.
    fn resolve(&self, items: &[QuizItem]) -> Result<(RhythmPattern, Subdivision, String)> {
        let item = self
            .item
            .checked_sub(1)
            .and_then(|i| items.get(i))
            .with_context(|| format!("No quiz item {} (1..={})", self.item, items.len()))?;

        match self.choice {
            None => Ok((item.prompt().clone(), item.subdivision(), "Prompt".to_string())),
            Some(n) => {
                let pattern = n
                    .checked_sub(1)
                    .and_then(|i| item.choice(i))
                    .with_context(|| format!("No choice {} in item {}", n, self.item))?;
                Ok((pattern.clone(), item.subdivision(), format!("Choice {}", n)))
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    let items = builtin_items().context("Invalid built-in quiz item")?;

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => run_tui(settings),
        Commands::Compile { target, output } => {
            let (pattern, _, label) = target.resolve(&items)?;
            let document = compile_with(&pattern, Some(label.as_str()), &settings.compile_options());
            match output {
                Some(path) => std::fs::write(&path, document.as_str())
                    .with_context(|| format!("Failed to write {}", path.display())),
                None => {
                    println!("{}", document);
                    Ok(())
                }
            }
        }
        Commands::Schedule { target } => {
            let (pattern, subdivision, _) = target.resolve(&items)?;
            let report = ScheduleReport {
                schedule: SubBeatSchedule::build(&pattern, subdivision, settings.audio.metronome),
                pattern,
                subdivision,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Commands::Play { target, dry_run } => {
            let (pattern, subdivision, label) = target.resolve(&items)?;
            play(&settings, &pattern, subdivision, &label, dry_run)
        }
        Commands::Export { target, output } => {
            let (pattern, subdivision, _) = target.resolve(&items)?;
            export_to_wav(&pattern, subdivision, &settings.player_options(), &output)?;
            println!("Exported to {}", output.display());
            Ok(())
        }
        Commands::Check { json } => check(&items, json),
    }
}

#[derive(Serialize)]
struct ScheduleReport {
    pattern: RhythmPattern,
    subdivision: Subdivision,
    schedule: SubBeatSchedule,
}

fn play(
    settings: &Settings,
    pattern: &RhythmPattern,
    subdivision: Subdivision,
    label: &str,
    dry_run: bool,
) -> Result<()> {
    println!("{} {} on the {} grid", label, pattern, subdivision);
    if !dry_run {
        let mut player = Player::new(open_output(), settings.player_options());
        player.play_blocking(pattern, subdivision);
        return Ok(());
    }

    let recording = Rc::new(RecordingOutput::new());
    let mut player = Player::new(Box::new(Rc::clone(&recording)), settings.player_options());
    player.play_blocking(pattern, subdivision);
    for (n, tones) in recording.calls().iter().enumerate() {
        let freqs: Vec<String> = tones
            .iter()
            .map(|t| format!("{}Hz/{}ms", t.frequency, t.duration.as_millis()))
            .collect();
        println!("{:3}: {}", n, freqs.join(" + "));
    }
    Ok(())
}

#[derive(Serialize)]
struct CheckEntry {
    item: usize,
    pattern: String,
    total_beats: f64,
    error: Option<String>,
}

fn check(items: &[QuizItem], json: bool) -> Result<()> {
    let mut entries = Vec::new();
    for (n, item) in items.iter().enumerate() {
        for pattern in item.patterns() {
            entries.push(CheckEntry {
                item: n + 1,
                pattern: pattern.to_string(),
                total_beats: pattern.total_beats(),
                error: pattern.validate().err().map(|e| e.to_string()),
            });
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for entry in &entries {
            let verdict = entry.error.as_deref().unwrap_or("ok");
            println!("item {} {:40} {}", entry.item, entry.pattern, verdict);
        }
    }

    let failures = entries.iter().filter(|e| e.error.is_some()).count();
    if failures > 0 {
        bail!("{} invalid pattern(s)", failures);
    }
    Ok(())
}

fn run_tui(settings: Settings) -> Result<()> {
    let mut app = App::new(settings, open_output()).context("Failed to initialize application")?;
    app.set_status(format!("Audio: {}", app.player.output_name()));

    let mut terminal = setup_terminal().context("Failed to setup terminal")?;
    let result = run_app(&mut terminal, &mut app);
    restore_terminal(&mut terminal).context("Failed to restore terminal")?;
    result
}

/// Sets up the terminal for TUI rendering.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;
    Ok(terminal)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Main application loop.
fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        app.tick(Instant::now());

        terminal.draw(|frame| ui::render(frame, app))?;

        // Short timeout so playback and the auto-advance keep running
        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handle_key(app, key.code, key.modifiers) {
                    return Ok(());
                }
            }
        }
    }
}

/// Handles a key press.
///
/// # Returns
///
/// `true` if the application should quit
fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
    if app.show_help {
        match code {
            KeyCode::Char('?') | KeyCode::Esc => {
                app.show_help = false;
                app.help_scroll = 0;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.help_scroll = app.help_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.help_scroll = app.help_scroll.saturating_add(1);
            }
            _ => {}
        }
        return false;
    }

    let now = Instant::now();
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
        KeyCode::Char('q') => return true,
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Tab => app.toggle_screen(),
        _ => match app.screen {
            Screen::Quiz => handle_quiz_key(app, code, now),
            Screen::Demo => handle_demo_key(app, code, now),
        },
    }
    false
}

fn handle_quiz_key(app: &mut App, code: KeyCode, now: Instant) {
    match code {
        KeyCode::Char(c @ '1'..='5') => {
            let index = c as usize - '1' as usize;
            app.play_choice(index, now);
        }
        KeyCode::Char(' ') | KeyCode::Char('p') => app.play_choice(app.highlighted_choice, now),
        KeyCode::Up | KeyCode::Char('k') => app.highlight_up(),
        KeyCode::Down | KeyCode::Char('j') => app.highlight_down(),
        KeyCode::Enter => {
            app.select(now);
        }
        KeyCode::Char('n') => {
            app.advance();
        }
        _ => {}
    }
}

fn handle_demo_key(app: &mut App, code: KeyCode, now: Instant) {
    match code {
        KeyCode::Char(c @ '1'..='3') => app.set_demo_subdivision(c as usize - '1' as usize),
        KeyCode::Left | KeyCode::Char('h') => app.step_demo_subdivision(false),
        KeyCode::Right | KeyCode::Char('l') => app.step_demo_subdivision(true),
        KeyCode::Char(' ') | KeyCode::Char('p') => app.play_demo(now),
        _ => {}
    }
}
