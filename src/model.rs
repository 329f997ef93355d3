//! Corpus Model - Books, Chapters, Verses
//!
//! The corpus serializes as one JSON object keyed by book name, in
//! iteration order. Order is part of the contract, so the corpus keeps
//! its books in a `Vec` instead of a hash map.

use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub type BookName = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseRecord {
    #[serde(rename = "verse")]
    pub number: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRecord {
    #[serde(rename = "chapter")]
    pub number: u32,
    pub verses: Vec<VerseRecord>,
}

impl ChapterRecord {
    /// Sort verses by number, collapsing repeats so the later verse wins.
    /// Returns the repeated verse numbers.
    pub fn sort_verses(&mut self) -> Vec<u32> {
        sort_collapsing(&mut self.verses, |v| v.number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRecord {
    pub name: BookName,
    pub chapters: Vec<ChapterRecord>,
}

impl BookRecord {
    pub fn verse_count(&self) -> usize {
        self.chapters.iter().map(|c| c.verses.len()).sum()
    }

    /// Sort chapters by number, collapsing repeats so the later chapter
    /// wins. Returns the repeated chapter numbers.
    pub fn sort_chapters(&mut self) -> Vec<u32> {
        sort_collapsing(&mut self.chapters, |c| c.number)
    }
}

fn sort_collapsing<T>(items: &mut Vec<T>, key: impl Fn(&T) -> u32) -> Vec<u32> {
    // Stable, so among equal numbers the last one in input order is kept.
    items.sort_by_key(|item| key(item));
    let mut repeated = Vec::new();
    let mut kept: Vec<T> = Vec::with_capacity(items.len());
    for item in items.drain(..) {
        match kept.last_mut() {
            Some(prev) if key(&*prev) == key(&item) => {
                repeated.push(key(&item));
                *prev = item;
            }
            _ => kept.push(item),
        }
    }
    *items = kept;
    repeated.dedup();
    repeated
}

/// Serialized body of a book; the name lives in the enclosing map key.
#[derive(Serialize, Deserialize)]
struct BookBody<C> {
    chapters: C,
}

/// Ordered mapping from book name to book record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    books: Vec<BookRecord>,
    index: HashMap<BookName, usize>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&BookRecord> {
        self.index.get(name).map(|&i| &self.books[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Insert a book. An existing entry with the same name is replaced in
    /// place and keeps its position; the replaced record is returned.
    pub fn insert(&mut self, book: BookRecord) -> Option<BookRecord> {
        match self.index.get(&book.name) {
            Some(&i) => Some(std::mem::replace(&mut self.books[i], book)),
            None => {
                self.index.insert(book.name.clone(), self.books.len());
                self.books.push(book);
                None
            }
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.books.iter().map(|b| b.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BookRecord> {
        self.books.iter()
    }

    /// Remove and return the named book, keeping the order of the rest.
    pub fn take(&mut self, name: &str) -> Option<BookRecord> {
        let i = self.index.remove(name)?;
        let book = self.books.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(book)
    }
}

impl IntoIterator for Corpus {
    type Item = BookRecord;
    type IntoIter = std::vec::IntoIter<BookRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.books.into_iter()
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a BookRecord;
    type IntoIter = std::slice::Iter<'a, BookRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.books.iter()
    }
}

impl FromIterator<BookRecord> for Corpus {
    fn from_iter<I: IntoIterator<Item = BookRecord>>(iter: I) -> Self {
        let mut corpus = Corpus::new();
        for book in iter {
            corpus.insert(book);
        }
        corpus
    }
}

impl Serialize for Corpus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.books.len()))?;
        for book in &self.books {
            map.serialize_entry(&book.name, &BookBody { chapters: &book.chapters })?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Corpus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CorpusVisitor;

        impl<'de> Visitor<'de> for CorpusVisitor {
            type Value = Corpus;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of book name to book body")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Corpus, A::Error> {
                let mut corpus = Corpus::new();
                while let Some((name, body)) =
                    access.next_entry::<String, BookBody<Vec<ChapterRecord>>>()?
                {
                    corpus.insert(BookRecord { name, chapters: body.chapters });
                }
                Ok(corpus)
            }
        }

        deserializer.deserialize_map(CorpusVisitor)
    }
}
