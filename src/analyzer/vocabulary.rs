//! Reference analyzer: whole-word vocabulary matching.
//!
//! Each vocabulary is a word-to-replacement table compiled into a single
//! case-insensitive alternation. Vocabularies are scanned one after another
//! in their configured order; within a vocabulary, matches are found
//! left-to-right and non-overlapping by one forward scan. Diagnostics and
//! edits keep that discovery order.

use std::collections::HashMap;

use regex::{Regex, RegexBuilder};

use crate::analyzer::{Analysis, Analyzer};
use crate::error::AnalyzerError;
use crate::position::offset_to_position;
use crate::protocol::types::{Diagnostic, DiagnosticSeverity, Range, TextEdit};

/// Color words mapped to hex values.
const COLOR_REPLACEMENTS: &[(&str, &str)] = &[
    ("red", "#FF0000"),
    ("green", "#008000"),
    ("blue", "#0000FF"),
    ("yellow", "#FFFF00"),
    ("orange", "#FFA500"),
    ("purple", "#800080"),
    ("pink", "#FFC0CB"),
    ("black", "#000000"),
    ("white", "#FFFFFF"),
    ("gray", "#808080"),
];

/// Emotion words mapped to emojis.
const EMOTION_REPLACEMENTS: &[(&str, &str)] = &[
    ("happy", "😊"),
    ("sad", "😢"),
    ("angry", "😠"),
    ("love", "❤️"),
    ("smile", "😃"),
];

/// One word-to-replacement table with its diagnostic identity.
pub struct Vocabulary {
    /// Reported as the diagnostic `source` field.
    source: String,
    /// Human-readable kind used in diagnostic messages, e.g. "Color word".
    label: String,
    replacements: HashMap<String, String>,
    pattern: Regex,
}

impl Vocabulary {
    /// Build a vocabulary from `(word, replacement)` entries. Matching is
    /// case-insensitive and whole-word; lookups are keyed by the lowercased
    /// match.
    pub fn new(
        source: impl Into<String>,
        label: impl Into<String>,
        entries: &[(&str, &str)],
    ) -> Result<Self, AnalyzerError> {
        if entries.is_empty() {
            return Err(AnalyzerError::Failed(
                "vocabulary must contain at least one word".to_string(),
            ));
        }
        let alternation = entries
            .iter()
            .map(|(word, _)| regex::escape(word))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = RegexBuilder::new(&format!(r"\b({alternation})\b"))
            .case_insensitive(true)
            .build()?;
        let replacements = entries
            .iter()
            .map(|(word, replacement)| (word.to_lowercase(), replacement.to_string()))
            .collect();
        Ok(Self {
            source: source.into(),
            label: label.into(),
            replacements,
            pattern,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Scan `text` once, left to right, appending one diagnostic and one edit
    /// per match.
    fn scan(&self, text: &str, analysis: &mut Analysis) {
        for found in self.pattern.find_iter(text) {
            let matched = found.as_str();
            let Some(replacement) = self.replacements.get(&matched.to_lowercase()) else {
                continue;
            };
            let range = Range::new(
                offset_to_position(text, found.start()),
                offset_to_position(text, found.end()),
            );
            analysis.diagnostics.push(Diagnostic {
                range,
                severity: DiagnosticSeverity::Information,
                message: format!(
                    "{} \"{}\" will be replaced with {}",
                    self.label, matched, replacement
                ),
                source: self.source.clone(),
            });
            analysis.edits.push(TextEdit {
                range,
                new_text: replacement.clone(),
            });
        }
    }
}

/// The default color-word vocabulary.
pub fn color_vocabulary() -> Result<Vocabulary, AnalyzerError> {
    Vocabulary::new("color-detector", "Color word", COLOR_REPLACEMENTS)
}

/// The default emotion-word vocabulary.
pub fn emotion_vocabulary() -> Result<Vocabulary, AnalyzerError> {
    Vocabulary::new("emoji-detector", "Emotion word", EMOTION_REPLACEMENTS)
}

/// Analyzer that runs a fixed sequence of vocabularies over the text.
pub struct VocabularyAnalyzer {
    vocabularies: Vec<Vocabulary>,
}

impl VocabularyAnalyzer {
    pub fn new(vocabularies: Vec<Vocabulary>) -> Self {
        Self { vocabularies }
    }

    /// Colors first, then emotions. The two word sets are disjoint, so their
    /// matches never overlap.
    pub fn with_default_vocabularies() -> Result<Self, AnalyzerError> {
        Ok(Self::new(vec![color_vocabulary()?, emotion_vocabulary()?]))
    }
}

impl Analyzer for VocabularyAnalyzer {
    fn analyze(&self, text: &str) -> Result<Analysis, AnalyzerError> {
        let mut analysis = Analysis::default();
        for vocabulary in &self.vocabularies {
            vocabulary.scan(text, &mut analysis);
        }
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::protocol::types::Position;

    fn analyzer() -> VocabularyAnalyzer {
        VocabularyAnalyzer::with_default_vocabularies().unwrap()
    }

    #[test]
    fn emotion_word_scenario() {
        let analysis = analyzer().analyze("I feel happy today").unwrap();
        assert_eq!(analysis.diagnostics.len(), 1);
        assert_eq!(analysis.edits.len(), 1);

        let diagnostic = &analysis.diagnostics[0];
        assert_eq!(
            diagnostic.range,
            Range::new(Position::new(0, 7), Position::new(0, 12))
        );
        assert_eq!(diagnostic.severity, DiagnosticSeverity::Information);
        assert_eq!(diagnostic.source, "emoji-detector");
        assert_eq!(
            diagnostic.message,
            "Emotion word \"happy\" will be replaced with 😊"
        );

        let edit = &analysis.edits[0];
        assert_eq!(edit.range, diagnostic.range);
        assert_eq!(edit.new_text, "😊");
    }

    #[test]
    fn one_match_per_vocabulary_yields_two_of_each() {
        let analysis = analyzer().analyze("the red car made me happy").unwrap();
        assert_eq!(analysis.diagnostics.len(), 2);
        assert_eq!(analysis.edits.len(), 2);

        let sources: Vec<&str> = analysis
            .diagnostics
            .iter()
            .map(|d| d.source.as_str())
            .collect();
        assert_eq!(sources, vec!["color-detector", "emoji-detector"]);
    }

    #[test]
    fn vocabularies_keep_scan_order_not_position_order() {
        // "happy" precedes "red" in the text, but colors are scanned first
        let analysis = analyzer().analyze("happy red").unwrap();
        assert_eq!(analysis.edits[0].new_text, "#FF0000");
        assert_eq!(analysis.edits[1].new_text, "😊");
    }

    #[test]
    fn matching_is_case_insensitive_with_original_casing_reported() {
        let analysis = analyzer().analyze("RED Happy").unwrap();
        assert_eq!(analysis.edits[0].new_text, "#FF0000");
        assert!(analysis.diagnostics[0].message.contains("\"RED\""));
        assert!(analysis.diagnostics[1].message.contains("\"Happy\""));
    }

    #[test]
    fn partial_words_do_not_match() {
        let analysis = analyzer().analyze("reddish sadness unhappy").unwrap();
        assert_eq!(analysis, Analysis::default());
    }

    #[test]
    fn matches_within_a_vocabulary_are_left_to_right() {
        let analysis = analyzer().analyze("blue red blue").unwrap();
        let replacements: Vec<&str> = analysis
            .edits
            .iter()
            .map(|e| e.new_text.as_str())
            .collect();
        assert_eq!(replacements, vec!["#0000FF", "#FF0000", "#0000FF"]);
        assert!(analysis
            .edits
            .windows(2)
            .all(|pair| pair[0].range.end.character <= pair[1].range.start.character));
    }

    #[test]
    fn ranges_count_utf16_units() {
        // 😀 is two UTF-16 units, so "happy" starts at character 3
        let analysis = analyzer().analyze("😀 happy").unwrap();
        assert_eq!(
            analysis.edits[0].range,
            Range::new(Position::new(0, 3), Position::new(0, 8))
        );
    }

    #[test]
    fn matches_on_later_lines_carry_the_line_number() {
        let analysis = analyzer().analyze("nothing here\nthe sky is blue").unwrap();
        assert_eq!(
            analysis.edits[0].range,
            Range::new(Position::new(1, 11), Position::new(1, 15))
        );
    }

    #[test]
    fn empty_vocabulary_is_rejected() {
        assert!(Vocabulary::new("x", "X word", &[]).is_err());
    }
}
