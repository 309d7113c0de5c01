//! Pluggable text analysis.
//!
//! An analyzer sees only raw document text and produces diagnostics plus
//! candidate edits; it knows nothing about sessions or the wire protocol, so
//! the matching strategy can change without touching the dispatch layer.

mod vocabulary;

pub use vocabulary::{color_vocabulary, emotion_vocabulary, Vocabulary, VocabularyAnalyzer};

use crate::error::AnalyzerError;
use crate::protocol::types::{Diagnostic, TextEdit};

/// Result of analyzing one document snapshot. Edits are siblings derived from
/// non-overlapping spans of the same text and are listed in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Analysis {
    pub diagnostics: Vec<Diagnostic>,
    pub edits: Vec<TextEdit>,
}

/// Capability that turns document text into diagnostics and edits.
pub trait Analyzer: Send + Sync {
    fn analyze(&self, text: &str) -> Result<Analysis, AnalyzerError>;
}
