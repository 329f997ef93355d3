//! Diagnostic Sink - What Happened, Not How It Is Shown
//!
//! Stages record diagnostics. The CLI decides how to render them.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Book, chapter or verse missing fields or failing coercion
    MalformedUnit,
    /// File is not JSON, or its root is neither a book nor a list of books
    ParseFailure,
    IoFailure,
    DuplicateBook,
    MissingCanonical,
    NonCanonical,
    EmptyResult,
    Progress,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiagnosticContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
}

impl DiagnosticContext {
    pub fn file(path: &Path) -> Self {
        Self { file: Some(path.to_path_buf()), ..Self::default() }
    }

    pub fn book(name: &str) -> Self {
        Self { book: Some(name.to_string()), ..Self::default() }
    }

    pub fn with_file(mut self, path: Option<&Path>) -> Self {
        self.file = path.map(Path::to_path_buf);
        self
    }

    pub fn with_chapter(mut self, chapter: impl Into<String>) -> Self {
        self.chapter = Some(chapter.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    #[serde(default)]
    pub context: DiagnosticContext,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Error => write!(f, "Error: {}", self.message),
            Severity::Warning => write!(f, "Warning: {}", self.message),
            Severity::Info => f.write_str(&self.message),
        }
    }
}

/// Ordered diagnostic sink threaded through every stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, kind: DiagnosticKind, message: impl Into<String>, context: DiagnosticContext) {
        self.record(Severity::Error, kind, message.into(), context);
    }

    pub fn warn(&mut self, kind: DiagnosticKind, message: impl Into<String>, context: DiagnosticContext) {
        self.record(Severity::Warning, kind, message.into(), context);
    }

    pub fn info(&mut self, kind: DiagnosticKind, message: impl Into<String>, context: DiagnosticContext) {
        self.record(Severity::Info, kind, message.into(), context);
    }

    fn record(&mut self, severity: Severity, kind: DiagnosticKind, message: String, context: DiagnosticContext) {
        match severity {
            Severity::Error => tracing::debug!(?kind, "error recorded: {}", message),
            Severity::Warning => tracing::debug!(?kind, "warning recorded: {}", message),
            Severity::Info => tracing::trace!(?kind, "{}", message),
        }
        self.records.push(Diagnostic { severity, kind, message, context });
    }

    pub fn has_errors(&self) -> bool {
        self.records.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.records.iter().filter(|d| d.severity == severity).count()
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.records.iter().filter(move |d| d.kind == kind)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        let mut sink = Diagnostics::new();
        sink.warn(DiagnosticKind::DuplicateBook, "dup", DiagnosticContext::book("Genesis"));
        sink.error(DiagnosticKind::IoFailure, "boom", DiagnosticContext::default());
        sink.info(DiagnosticKind::Progress, "Processing file: a.json", DiagnosticContext::default());

        let lines: Vec<_> = sink.iter().map(|d| d.to_string()).collect();
        assert_eq!(lines, vec!["Warning: dup", "Error: boom", "Processing file: a.json"]);
    }

    #[test]
    fn test_counts_and_kinds() {
        let mut sink = Diagnostics::new();
        assert!(!sink.has_errors());
        sink.warn(DiagnosticKind::MissingCanonical, "a", DiagnosticContext::book("Ruth"));
        sink.warn(DiagnosticKind::MissingCanonical, "b", DiagnosticContext::book("Job"));
        sink.error(DiagnosticKind::ParseFailure, "c", DiagnosticContext::default());

        assert!(sink.has_errors());
        assert_eq!(sink.count(Severity::Warning), 2);
        assert_eq!(sink.of_kind(DiagnosticKind::MissingCanonical).count(), 2);
    }

    #[test]
    fn test_serializes_as_list() {
        let mut sink = Diagnostics::new();
        sink.warn(
            DiagnosticKind::MalformedUnit,
            "bad chapter",
            DiagnosticContext::book("John").with_chapter("3"),
        );
        let value = serde_json::to_value(&sink).unwrap();
        assert_eq!(value[0]["severity"], "warning");
        assert_eq!(value[0]["kind"], "malformed_unit");
        assert_eq!(value[0]["context"]["chapter"], "3");
        assert!(value[0]["context"].get("file").is_none());
    }
}
