//! Consolidator - One Keyed Collection From Many Files
//!
//! Files are ingested strictly in the order given. A later book with the
//! same name replaces the earlier one in full.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::diagnostics::{DiagnosticContext, DiagnosticKind, Diagnostics};
use crate::model::Corpus;
use crate::normalize::Normalizer;

pub struct Consolidator {
    normalizer: Normalizer,
    corpus: Corpus,
    files_ingested: usize,
}

impl Consolidator {
    pub fn new(normalizer: Normalizer) -> Self {
        Self {
            normalizer,
            corpus: Corpus::new(),
            files_ingested: 0,
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn files_ingested(&self) -> usize {
        self.files_ingested
    }

    /// Read, parse and merge one file. Unreadable or unparsable files are
    /// recorded and skipped.
    pub fn ingest_file(&mut self, path: &Path, diags: &mut Diagnostics) {
        diags.info(
            DiagnosticKind::Progress,
            format!("Processing file: {}", path.display()),
            DiagnosticContext::file(path),
        );

        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                diags.error(
                    DiagnosticKind::IoFailure,
                    format!("Error processing file {}: {}", path.display(), e),
                    DiagnosticContext::file(path),
                );
                return;
            }
        };

        let root: Value = match serde_json::from_str(&content) {
            Ok(v) => v,
            Err(e) => {
                diags.error(
                    DiagnosticKind::ParseFailure,
                    format!("Error decoding JSON from file {}: {}", path.display(), e),
                    DiagnosticContext::file(path),
                );
                return;
            }
        };

        self.files_ingested += 1;
        self.ingest_value(&root, Some(path), diags);
    }

    /// Merge the book units held by an already-parsed root value.
    pub fn ingest_value(&mut self, root: &Value, file: Option<&Path>, diags: &mut Diagnostics) {
        let ctx = || DiagnosticContext::default().with_file(file);
        let units: Vec<&Value> = match root {
            Value::Array(items) => {
                diags.info(
                    DiagnosticKind::Progress,
                    format!("  File contains a list. Processing {} items.", items.len()),
                    ctx(),
                );
                items.iter().collect()
            }
            Value::Object(_) => {
                diags.info(
                    DiagnosticKind::Progress,
                    "  File contains a dictionary. Processing directly.",
                    ctx(),
                );
                vec![root]
            }
            _ => {
                diags.warn(
                    DiagnosticKind::ParseFailure,
                    format!(
                        "Skipping file {} - root element is not a list or dictionary.",
                        display_name(file)
                    ),
                    ctx(),
                );
                return;
            }
        };

        for unit in units {
            match self.normalizer.normalize(unit, file, diags) {
                Ok(book) => {
                    let name = book.name.clone();
                    if self.corpus.insert(book).is_some() {
                        diags.warn(
                            DiagnosticKind::DuplicateBook,
                            format!(
                                "Duplicate data found for book '{}' from file {}. Overwriting previous data.",
                                name,
                                display_name(file)
                            ),
                            DiagnosticContext::book(&name).with_file(file),
                        );
                    }
                }
                Err(rejection) => {
                    let context = match rejection.book() {
                        Some(book) => DiagnosticContext::book(book).with_file(file),
                        None => ctx(),
                    };
                    diags.warn(DiagnosticKind::MalformedUnit, rejection.to_string(), context);
                }
            }
        }
    }

    pub fn finish(self) -> Corpus {
        tracing::debug!(
            books = self.corpus.len(),
            files = self.files_ingested,
            "consolidation finished"
        );
        self.corpus
    }
}

fn display_name(file: Option<&Path>) -> String {
    file.and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "<inline>".to_string())
}
