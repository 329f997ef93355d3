//! Canonical Book Order
//!
//! The 66-book KJV sequence. Names must match input data exactly.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Testament {
    Old,
    New,
}

pub const OLD_TESTAMENT: [&str; 39] = [
    "Genesis", "Exodus", "Leviticus", "Numbers", "Deuteronomy", "Joshua", "Judges", "Ruth",
    "1 Samuel", "2 Samuel", "1 Kings", "2 Kings", "1 Chronicles", "2 Chronicles", "Ezra",
    "Nehemiah", "Esther", "Job", "Psalms", "Proverbs", "Ecclesiastes", "Song of Solomon",
    "Isaiah", "Jeremiah", "Lamentations", "Ezekiel", "Daniel", "Hosea", "Joel", "Amos",
    "Obadiah", "Jonah", "Micah", "Nahum", "Habakkuk", "Zephaniah", "Haggai", "Zechariah", "Malachi",
];

pub const NEW_TESTAMENT: [&str; 27] = [
    "Matthew", "Mark", "Luke", "John", "Acts", "Romans", "1 Corinthians", "2 Corinthians",
    "Galatians", "Ephesians", "Philippians", "Colossians", "1 Thessalonians", "2 Thessalonians",
    "1 Timothy", "2 Timothy", "Titus", "Philemon", "Hebrews", "James", "1 Peter", "2 Peter",
    "1 John", "2 John", "3 John", "Jude", "Revelation",
];

pub const CANON_LEN: usize = OLD_TESTAMENT.len() + NEW_TESTAMENT.len();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CanonEntry {
    pub position: usize,
    pub name: &'static str,
    pub testament: Testament,
}

/// Iterate the canonical sequence in order, Old Testament first.
pub fn canonical_order() -> impl Iterator<Item = CanonEntry> {
    OLD_TESTAMENT
        .iter()
        .map(|n| (*n, Testament::Old))
        .chain(NEW_TESTAMENT.iter().map(|n| (*n, Testament::New)))
        .enumerate()
        .map(|(i, (name, testament))| CanonEntry { position: i + 1, name, testament })
}

pub fn is_canonical(name: &str) -> bool {
    position_of(name).is_some()
}

/// 1-based position in the canonical sequence.
pub fn position_of(name: &str) -> Option<usize> {
    canonical_order().find(|e| e.name == name).map(|e| e.position)
}
