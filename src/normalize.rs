//! Record Normalizer - Loose JSON In, Strict Records Out
//!
//! Each raw unit is decoded into a `BookRecord` or rejected with a
//! `Rejection`. Bad chapters and verses are skipped one at a time and
//! recorded; they never invalidate their siblings.

use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::diagnostics::{DiagnosticContext, DiagnosticKind, Diagnostics};
use crate::model::{BookRecord, ChapterRecord, VerseRecord};

const BOOK_FIELD: &str = "book";
const CHAPTERS_FIELD: &str = "chapters";
const CHAPTER_FIELD: &str = "chapter";
const VERSES_FIELD: &str = "verses";
const VERSE_FIELD: &str = "verse";
const TEXT_FIELD: &str = "text";

/// Why a whole book unit was not accepted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("Skipping item with unexpected format: {0}")]
    MalformedBook(&'static str),

    #[error("Skipping item whose book name is not a string: {0}")]
    BookNameNotString(String),

    #[error("No valid chapters found for book '{0}'. Skipping this book.")]
    NoValidChapters(String),
}

impl Rejection {
    pub fn book(&self) -> Option<&str> {
        match self {
            Rejection::NoValidChapters(name) => Some(name),
            _ => None,
        }
    }
}

/// Failure to turn a field into a positive integer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoercionError {
    #[error("invalid {field} number: {value}")]
    NotANumber { field: &'static str, value: String },

    #[error("{field} number must be positive, got {value}")]
    NotPositive { field: &'static str, value: String },
}

/// Coerce a chapter or verse number. Accepts JSON integers, integral
/// floats, and strings holding a decimal integer.
pub fn coerce_number(field: &'static str, value: &Value) -> Result<u32, CoercionError> {
    let not_a_number = || CoercionError::NotANumber { field, value: render(value) };
    let parsed: i64 = match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i
            } else if let Some(f) = n.as_f64().filter(|f| f.fract() == 0.0 && f.is_finite()) {
                if f > u32::MAX as f64 || f < i64::MIN as f64 {
                    return Err(not_a_number());
                }
                f as i64
            } else {
                return Err(not_a_number());
            }
        }
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| not_a_number())?,
        _ => return Err(not_a_number()),
    };

    if parsed <= 0 {
        return Err(CoercionError::NotPositive { field, value: render(value) });
    }
    u32::try_from(parsed).map_err(|_| not_a_number())
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object missing 'book'",
    }
}

/// Converts raw units into book records.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    sort: bool,
}

impl Normalizer {
    /// Keep chapters and verses in raw input order.
    pub fn preserving() -> Self {
        Self { sort: false }
    }

    /// Sort verses and chapters by number.
    pub fn sorting() -> Self {
        Self { sort: true }
    }

    /// Normalize one raw unit. Skipped chapters and verses are recorded in
    /// `diags`; the rejection of the whole unit is returned to the caller.
    pub fn normalize(
        &self,
        raw: &Value,
        file: Option<&Path>,
        diags: &mut Diagnostics,
    ) -> Result<BookRecord, Rejection> {
        let obj = match raw {
            Value::Object(obj) if obj.contains_key(BOOK_FIELD) => obj,
            other => return Err(Rejection::MalformedBook(type_name(other))),
        };
        let name = match &obj[BOOK_FIELD] {
            Value::String(s) => s.clone(),
            other => return Err(Rejection::BookNameNotString(other.to_string())),
        };

        let mut chapters = Vec::new();
        match obj.get(CHAPTERS_FIELD) {
            Some(Value::Array(raw_chapters)) => {
                for raw_chapter in raw_chapters {
                    if let Some(chapter) = self.normalize_chapter(&name, raw_chapter, file, diags) {
                        chapters.push(chapter);
                    }
                }
            }
            _ => diags.warn(
                DiagnosticKind::MalformedUnit,
                format!("'chapters' key missing or not a list in book '{name}'"),
                DiagnosticContext::book(&name).with_file(file),
            ),
        }

        if chapters.is_empty() {
            return Err(Rejection::NoValidChapters(name));
        }

        let mut book = BookRecord { name, chapters };
        if self.sort {
            for number in book.sort_chapters() {
                diags.warn(
                    DiagnosticKind::MalformedUnit,
                    format!(
                        "Duplicate chapter {number} in book '{}'. Keeping the later one.",
                        book.name
                    ),
                    DiagnosticContext::book(&book.name)
                        .with_file(file)
                        .with_chapter(number.to_string()),
                );
            }
        }
        Ok(book)
    }

    fn normalize_chapter(
        &self,
        book: &str,
        raw: &Value,
        file: Option<&Path>,
        diags: &mut Diagnostics,
    ) -> Option<ChapterRecord> {
        let (raw_number, raw_verses) = match raw {
            Value::Object(obj) => match (obj.get(CHAPTER_FIELD), obj.get(VERSES_FIELD)) {
                (Some(n), Some(Value::Array(v))) => (n, v),
                _ => {
                    diags.warn(
                        DiagnosticKind::MalformedUnit,
                        format!("Skipping chapter with unexpected format in book '{book}': {raw}"),
                        DiagnosticContext::book(book).with_file(file),
                    );
                    return None;
                }
            },
            _ => {
                diags.warn(
                    DiagnosticKind::MalformedUnit,
                    format!("Skipping chapter with unexpected format in book '{book}': {raw}"),
                    DiagnosticContext::book(book).with_file(file),
                );
                return None;
            }
        };
        let label = render(raw_number);

        match self.decode_chapter(book, &label, raw_number, raw_verses, file, diags) {
            Ok(chapter) => Some(chapter),
            Err(e) => {
                diags.warn(
                    DiagnosticKind::MalformedUnit,
                    format!(
                        "Skipping chapter/verse due to invalid data in book '{book}', chapter '{label}': {e}"
                    ),
                    DiagnosticContext::book(book).with_file(file).with_chapter(label),
                );
                None
            }
        }
    }

    fn decode_chapter(
        &self,
        book: &str,
        label: &str,
        raw_number: &Value,
        raw_verses: &[Value],
        file: Option<&Path>,
        diags: &mut Diagnostics,
    ) -> Result<ChapterRecord, CoercionError> {
        let mut verses = Vec::with_capacity(raw_verses.len());
        for raw in raw_verses {
            let fields = raw
                .as_object()
                .and_then(|obj| Some((obj.get(VERSE_FIELD)?, obj.get(TEXT_FIELD)?.as_str()?)));
            match fields {
                Some((number, text)) => verses.push(VerseRecord {
                    number: coerce_number(VERSE_FIELD, number)?,
                    text: text.to_string(),
                }),
                None => diags.warn(
                    DiagnosticKind::MalformedUnit,
                    format!("Skipping verse with unexpected format in book '{book}', chapter '{label}': {raw}"),
                    DiagnosticContext::book(book).with_file(file).with_chapter(label),
                ),
            }
        }

        let mut chapter = ChapterRecord {
            number: coerce_number(CHAPTER_FIELD, raw_number)?,
            verses,
        };
        if self.sort {
            for number in chapter.sort_verses() {
                diags.warn(
                    DiagnosticKind::MalformedUnit,
                    format!(
                        "Duplicate verse {number} in book '{book}', chapter '{label}'. Keeping the later one."
                    ),
                    DiagnosticContext::book(book).with_file(file).with_chapter(label),
                );
            }
        }
        Ok(chapter)
    }
}
