//! Terminal staff rendering of MusicXML documents.
//!
//! The layout is linear in the zoom factor: at zoom 1.0 the header (clef
//! and time signature) takes [`HEADER_COLS`] columns, each division takes
//! one column, and a closing barline takes one more.

use crate::rhythm::{MarkupDocument, NoteValue};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::str::FromStr;
use thiserror::Error;

/// Header width in columns at zoom 1.0.
pub const HEADER_COLS: usize = 8;

/// Widest measure that will be laid out, in divisions.
const MAX_MEASURE_DIVISIONS: u32 = 4096;

/// Header text drawn on the staff row.
const HEADER_TEXT: &str = "G  4/4 ";

/// Errors raised while loading or rendering a document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("no document loaded")]
    NotLoaded,
}

/// Output of a render pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedScore {
    /// Text rows, each exactly `width` characters.
    pub rows: Vec<String>,
    pub width: u16,
    pub height: u16,
}

/// A notation engine: loads a document, renders it at a zoom factor and
/// reports the size of what it drew.
pub trait NotationRenderer {
    /// Parses and stores a document for later rendering.
    fn load(&mut self, document: &MarkupDocument) -> Result<(), RenderError>;

    /// Lays out the loaded document at the current zoom.
    fn render(&mut self) -> Result<&RenderedScore, RenderError>;

    /// Current zoom multiplier.
    fn zoom(&self) -> f64;

    /// Sets the zoom multiplier used by the next render.
    fn set_zoom(&mut self, zoom: f64);

    /// Width of the loaded document at zoom 1.0.
    fn intrinsic_width(&self) -> Option<f64>;

    /// Output of the last render.
    fn rendered(&self) -> Option<&RenderedScore>;

    /// Drops the loaded document and any rendered output.
    fn clear(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
struct StaffNote {
    duration: u32,
    value: Option<NoteValue>,
    rest: bool,
}

/// A `<note>` whose children are still being read.
#[derive(Debug, Default)]
struct PendingNote {
    duration: Option<u32>,
    value: Option<NoteValue>,
    rest: bool,
}

impl PendingNote {
    fn finish(self) -> Result<StaffNote, RenderError> {
        Ok(StaffNote {
            duration: self
                .duration
                .ok_or_else(|| RenderError::Malformed("note without <duration>".into()))?,
            value: self.value,
            rest: self.rest,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Staff {
    beats: u32,
    /// Divisions in one beat of the time signature.
    beat_divisions: u32,
    /// Measure length in divisions, at least the nominal length.
    measure_divisions: u32,
    notes: Vec<StaffNote>,
}

impl Staff {
    fn parse(xml: &str) -> Result<Self, RenderError> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut path: Vec<String> = Vec::new();
        let mut has_root = false;
        let mut divisions: Option<u32> = None;
        let mut beats: Option<u32> = None;
        let mut beat_type: Option<u32> = None;
        let mut pending: Option<PendingNote> = None;
        let mut notes = Vec::new();

        loop {
            let event = reader.read_event().map_err(|e| {
                RenderError::Malformed(format!("at byte {}: {}", reader.buffer_position(), e))
            })?;
            match event {
                Event::Start(start) => {
                    let name = element_name(start.name().as_ref());
                    if path.is_empty() {
                        check_root(&name)?;
                        has_root = true;
                    }
                    match name.as_str() {
                        "note" => pending = Some(PendingNote::default()),
                        "rest" => mark_rest(&mut pending),
                        _ => {}
                    }
                    path.push(name);
                }
                Event::Empty(empty) => {
                    let name = element_name(empty.name().as_ref());
                    if path.is_empty() {
                        check_root(&name)?;
                        has_root = true;
                    }
                    if name == "rest" {
                        mark_rest(&mut pending);
                    }
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| RenderError::Malformed(e.to_string()))?;
                    let text = text.trim();
                    match (path.last().map(String::as_str), pending.as_mut()) {
                        (Some("divisions"), _) => divisions = Some(parse_value("divisions", text)?),
                        (Some("beats"), _) => beats = Some(parse_value("beats", text)?),
                        (Some("beat-type"), _) => beat_type = Some(parse_value("beat-type", text)?),
                        (Some("duration"), Some(note)) => {
                            note.duration = Some(parse_value("duration", text)?)
                        }
                        (Some("type"), Some(note)) => {
                            note.value = Some(NoteValue::from_musicxml_type(text).ok_or_else(
                                || RenderError::Malformed(format!("unknown note type '{}'", text)),
                            )?)
                        }
                        _ => {}
                    }
                }
                Event::End(_) => {
                    if path.pop().as_deref() == Some("note") {
                        if let Some(note) = pending.take() {
                            notes.push(note.finish()?);
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = path.last() {
            return Err(RenderError::Malformed(format!("unclosed <{}>", open)));
        }
        if !has_root {
            return Err(RenderError::Malformed("missing score-partwise root".into()));
        }

        let divisions = divisions.ok_or_else(|| missing("divisions"))?;
        let beats = beats.ok_or_else(|| missing("beats"))?;
        let beat_type = beat_type.ok_or_else(|| missing("beat-type"))?;
        if divisions == 0 || beats == 0 || beat_type == 0 {
            return Err(RenderError::Malformed("zero in time attributes".into()));
        }

        let too_wide = || {
            RenderError::Malformed(format!(
                "measure wider than {} divisions",
                MAX_MEASURE_DIVISIONS
            ))
        };
        let beat_divisions = divisions.checked_mul(4).ok_or_else(too_wide)? / beat_type;
        let nominal = beat_divisions.checked_mul(beats).ok_or_else(too_wide)?;
        let filled = notes
            .iter()
            .try_fold(0u32, |sum, note: &StaffNote| sum.checked_add(note.duration))
            .ok_or_else(too_wide)?;
        let measure_divisions = nominal.max(filled);
        if measure_divisions > MAX_MEASURE_DIVISIONS || beats > MAX_MEASURE_DIVISIONS {
            return Err(too_wide());
        }

        Ok(Self {
            beats,
            beat_divisions,
            measure_divisions,
            notes,
        })
    }

    fn intrinsic_width(&self) -> usize {
        HEADER_COLS + self.measure_divisions as usize + 1
    }
}

fn element_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn check_root(name: &str) -> Result<(), RenderError> {
    if name == "score-partwise" {
        Ok(())
    } else {
        Err(RenderError::Malformed(format!(
            "root is <{}>, expected <score-partwise>",
            name
        )))
    }
}

fn mark_rest(pending: &mut Option<PendingNote>) {
    if let Some(note) = pending.as_mut() {
        note.rest = true;
    }
}

fn missing(tag: &str) -> RenderError {
    RenderError::Malformed(format!("missing <{}>", tag))
}

fn parse_value<T: FromStr>(tag: &str, text: &str) -> Result<T, RenderError> {
    text.parse()
        .map_err(|_| RenderError::Malformed(format!("bad <{}> value '{}'", tag, text)))
}

fn note_glyphs(note: &StaffNote) -> (char, char) {
    if note.rest {
        return ('r', '▬');
    }
    match note.value {
        Some(NoteValue::Whole) => ('o', '○'),
        Some(NoteValue::Half) => ('d', '○'),
        Some(NoteValue::Quarter) => ('♩', '●'),
        Some(NoteValue::Eighth) => ('♪', '●'),
        Some(NoteValue::Sixteenth) => ('♬', '●'),
        None => ('?', '●'),
    }
}

/// Draws a one-measure staff as three text rows: note symbols, the staff
/// line with note heads, and a beat ruler.
#[derive(Debug, Clone)]
pub struct StaffRenderer {
    staff: Option<Staff>,
    zoom: f64,
    output: Option<RenderedScore>,
}

impl Default for StaffRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl StaffRenderer {
    /// Creates a renderer with nothing loaded at zoom 1.0.
    pub fn new() -> Self {
        Self {
            staff: None,
            zoom: 1.0,
            output: None,
        }
    }

    fn layout(staff: &Staff, zoom: f64) -> RenderedScore {
        let intrinsic = staff.intrinsic_width();
        let total = ((intrinsic as f64 * zoom).round() as usize).max(1);
        let column = |x: usize| ((x as f64 * zoom).floor() as usize).min(total - 1);

        let mut symbols = vec![' '; total];
        let mut line = vec!['─'; total];
        let mut ruler = vec![' '; total];

        let header_cols = ((HEADER_COLS as f64 * zoom).round() as usize).min(total);
        for (i, c) in HEADER_TEXT.chars().take(header_cols).enumerate() {
            line[i] = c;
        }

        for beat in 0..staff.beats {
            let x = HEADER_COLS + (beat * staff.beat_divisions) as usize;
            if let Some(digit) = char::from_digit(beat + 1, 10) {
                ruler[column(x)] = digit;
            }
        }

        let mut x = HEADER_COLS;
        for note in &staff.notes {
            let (symbol, head) = note_glyphs(note);
            let c = column(x);
            symbols[c] = symbol;
            line[c] = head;
            x += note.duration as usize;
        }

        line[total - 1] = '│';

        let rows: Vec<String> = [symbols, line, ruler]
            .into_iter()
            .map(|row| row.into_iter().collect())
            .collect();

        RenderedScore {
            height: rows.len() as u16,
            width: total.min(u16::MAX as usize) as u16,
            rows,
        }
    }
}

impl NotationRenderer for StaffRenderer {
    fn load(&mut self, document: &MarkupDocument) -> Result<(), RenderError> {
        let staff = Staff::parse(document.as_str())?;
        self.staff = Some(staff);
        self.output = None;
        Ok(())
    }

    fn render(&mut self) -> Result<&RenderedScore, RenderError> {
        let staff = self.staff.as_ref().ok_or(RenderError::NotLoaded)?;
        let output = Self::layout(staff, self.zoom);
        Ok(self.output.insert(output))
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
    }

    fn intrinsic_width(&self) -> Option<f64> {
        self.staff.as_ref().map(|s| s.intrinsic_width() as f64)
    }

    fn rendered(&self) -> Option<&RenderedScore> {
        self.output.as_ref()
    }

    fn clear(&mut self) {
        self.staff = None;
        self.output = None;
    }
}
