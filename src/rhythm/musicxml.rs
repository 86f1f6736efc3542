//! MusicXML generation for rhythm patterns.
//!
//! Produces a minimal single-measure, single-part, single-voice document:
//! 4/4 time, treble clef, no key signature, every note pitched at C4.

use super::{NoteValue, RhythmPattern, Subdivision, BEATS_PER_MEASURE, DIVISIONS};
use std::fmt;
use tracing::warn;

/// Part name used when no label is supplied.
const DEFAULT_PART_NAME: &str = "Rhythm";

/// Reference pitch for every note (rhythm only, no melody).
const PITCH_STEP: &str = "C";
const PITCH_OCTAVE: u8 = 4;

/// A generated MusicXML document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarkupDocument(String);

impl MarkupDocument {
    /// Wraps existing MusicXML text.
    pub fn new(xml: impl Into<String>) -> Self {
        Self(xml.into())
    }

    /// The document text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the document, returning the text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for MarkupDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Options for [`compile_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Emit `<rest/>` for negative entries.
    ///
    /// Off by default: rests are drawn as ordinary notes of the same
    /// length, which is what the quiz has always shown.
    pub mark_rests: bool,
}

/// Compiles a pattern into a MusicXML document with default options.
///
/// Pure: the same pattern and label always give identical output.
///
/// # Examples
///
/// ```
/// use rhythmtui::rhythm::{compile, RhythmPattern};
///
/// let doc = compile(&RhythmPattern::new([2.0, 2.0]), Some("Prompt"));
/// assert!(doc.as_str().contains("<type>half</type>"));
/// ```
pub fn compile(pattern: &RhythmPattern, label: Option<&str>) -> MarkupDocument {
    compile_with(pattern, label, &CompileOptions::default())
}

/// Compiles a pattern into a MusicXML document.
///
/// Entries are not validated. Lengths outside the supported set are written
/// without a `<type>` element and logged.
pub fn compile_with(
    pattern: &RhythmPattern,
    label: Option<&str>,
    options: &CompileOptions,
) -> MarkupDocument {
    let mut notes = String::new();
    for (index, entry) in pattern.entries().enumerate() {
        let scaled = entry.beats * DIVISIONS as f64;
        let duration = scaled.round() as u32;
        if scaled.fract() != 0.0 {
            warn!(index, beats = entry.beats, "Duration is not a whole number of divisions");
        }

        let value = entry.note_value();
        if value.is_none() {
            warn!(index, beats = entry.beats, "No note value for duration");
        }

        let as_rest = entry.rest && options.mark_rests;
        notes.push_str(&note_to_xml(duration, value, as_rest));
    }

    MarkupDocument(wrap_measure(label.unwrap_or(DEFAULT_PART_NAME), &notes))
}

/// Builds the difficulty-selector document: one measure of equal notes,
/// one per slot of the subdivision grid.
pub fn subdivision_demo(subdivision: Subdivision) -> MarkupDocument {
    let value = subdivision.note_value();
    let notes: String = (0..subdivision.count())
        .map(|_| note_to_xml(value.divisions(), Some(value), false))
        .collect();

    MarkupDocument(wrap_measure(DEFAULT_PART_NAME, &notes))
}

fn note_to_xml(duration: u32, value: Option<NoteValue>, rest: bool) -> String {
    let mut xml = String::new();

    xml.push_str("      <note>\n");
    if rest {
        xml.push_str("        <rest/>\n");
    } else {
        xml.push_str("        <pitch>\n");
        xml.push_str(&format!("          <step>{}</step>\n", PITCH_STEP));
        xml.push_str(&format!("          <octave>{}</octave>\n", PITCH_OCTAVE));
        xml.push_str("        </pitch>\n");
    }
    xml.push_str(&format!("        <duration>{}</duration>\n", duration));
    if let Some(value) = value {
        xml.push_str(&format!("        <type>{}</type>\n", value.musicxml_type()));
    }
    if !rest {
        xml.push_str("        <stem>up</stem>\n");
    }
    xml.push_str("      </note>\n");

    xml
}

fn wrap_measure(part_name: &str, notes: &str) -> String {
    let mut xml = String::new();

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<score-partwise version="3.1">"#);
    xml.push('\n');

    xml.push_str("  <part-list>\n");
    xml.push_str("    <score-part id=\"P1\">\n");
    xml.push_str(&format!(
        "      <part-name>{}</part-name>\n",
        escape_xml(part_name)
    ));
    xml.push_str("    </score-part>\n");
    xml.push_str("  </part-list>\n");

    xml.push_str("  <part id=\"P1\">\n");
    xml.push_str("    <measure number=\"1\">\n");
    xml.push_str("      <attributes>\n");
    xml.push_str(&format!("        <divisions>{}</divisions>\n", DIVISIONS));
    xml.push_str("        <key><fifths>0</fifths></key>\n");
    xml.push_str(&format!(
        "        <time><beats>{}</beats><beat-type>4</beat-type></time>\n",
        BEATS_PER_MEASURE
    ));
    xml.push_str("        <clef><sign>G</sign><line>2</line></clef>\n");
    xml.push_str("      </attributes>\n");
    xml.push_str(notes);
    xml.push_str("    </measure>\n");
    xml.push_str("  </part>\n");
    xml.push_str("</score-partwise>\n");

    xml
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn test_compile_is_deterministic() {
        let pattern = RhythmPattern::new([0.25, 0.25, 0.5, 1.0, 0.25, 0.25, 0.5, 1.0]);
        let a = compile(&pattern, Some("Choice 2"));
        let b = compile(&pattern, Some("Choice 2"));
        assert_eq!(a, b);
        assert_eq!(a.as_str().as_bytes(), b.as_str().as_bytes());
    }

    #[test]
    fn test_document_frame() {
        let xml = compile(&RhythmPattern::new([4.0]), None).into_string();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<divisions>8</divisions>"));
        assert!(xml.contains("<fifths>0</fifths>"));
        assert!(xml.contains("<beats>4</beats><beat-type>4</beat-type>"));
        assert!(xml.contains("<sign>G</sign><line>2</line>"));
        assert!(xml.contains("<part-name>Rhythm</part-name>"));
        assert_eq!(count(&xml, "<measure "), 1);
        assert_eq!(count(&xml, "<part id="), 1);
    }

    #[test]
    fn test_durations_and_types() {
        let xml = compile(&RhythmPattern::new([2.0, 1.0, 0.5, 0.25, 0.25]), None).into_string();
        assert!(xml.contains("<duration>16</duration>\n        <type>half</type>"));
        assert!(xml.contains("<duration>8</duration>\n        <type>quarter</type>"));
        assert!(xml.contains("<duration>4</duration>\n        <type>eighth</type>"));
        assert_eq!(count(&xml, "<duration>2</duration>\n        <type>16th</type>"), 2);
        assert_eq!(count(&xml, "<step>C</step>"), 5);
        assert_eq!(count(&xml, "<octave>4</octave>"), 5);
    }

    #[test]
    fn test_rests_drawn_as_notes_by_default() {
        let pattern = RhythmPattern::new([1.0, -1.0, 2.0]);
        let xml = compile(&pattern, None).into_string();
        assert!(!xml.contains("<rest/>"));
        assert_eq!(count(&xml, "<pitch>"), 3);
        assert_eq!(count(&xml, "<duration>8</duration>"), 2);
    }

    #[test]
    fn test_mark_rests_option() {
        let pattern = RhythmPattern::new([1.0, -1.0, 2.0]);
        let options = CompileOptions { mark_rests: true };
        let xml = compile_with(&pattern, None, &options).into_string();
        assert_eq!(count(&xml, "<rest/>"), 1);
        assert_eq!(count(&xml, "<pitch>"), 2);
    }

    #[test]
    fn test_label_is_escaped() {
        let xml = compile(&RhythmPattern::new([4.0]), Some("A & <B>")).into_string();
        assert!(xml.contains("<part-name>A &amp; &lt;B&gt;</part-name>"));
    }

    #[test]
    fn test_unsupported_value_has_no_type() {
        let xml = compile(&RhythmPattern::new([3.0, 1.0]), None).into_string();
        assert!(xml.contains("<duration>24</duration>\n        <stem>up</stem>"));
        assert_eq!(count(&xml, "<type>"), 1);
    }

    #[test]
    fn test_subdivision_demo() {
        let xml = subdivision_demo(Subdivision::Sixteen).into_string();
        assert_eq!(count(&xml, "<type>16th</type>"), 16);
        let xml = subdivision_demo(Subdivision::Four).into_string();
        assert_eq!(count(&xml, "<type>quarter</type>"), 4);
    }
}
