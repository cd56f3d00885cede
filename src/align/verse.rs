//! Resolved verses and verse identifiers.
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref VERSE_KEY: Regex = Regex::new(r"(\d+)\.(\d+)$").unwrap();
}

/// `(chapter, verse)` parsed back from a `"<Book> <chapter>.<verse>"` identifier.
///
/// Returns [None] when the identifier does not end with `<chapter>.<verse>`.
pub fn verse_key(verse_id: &str) -> Option<(u32, u32)> {
    let caps = VERSE_KEY.captures(verse_id)?;
    let chapter = caps.get(1)?.as_str().parse().ok()?;
    let verse = caps.get(2)?.as_str().parse().ok()?;
    Some((chapter, verse))
}

pub fn format_verse_id(book: &str, chapter: u32, verse: u32) -> String {
    format!("{} {}.{}", book, chapter, verse)
}

/// An aligned verse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedVerse {
    verse_id: String,
    #[serde(skip)]
    chapter: u32,
    #[serde(skip)]
    verse: u32,
    source_text: String,
    target_text: Option<String>,
}

impl ResolvedVerse {
    pub fn new(
        book: &str,
        chapter: u32,
        verse: u32,
        source_text: String,
        target_text: Option<String>,
    ) -> Self {
        Self {
            verse_id: format_verse_id(book, chapter, verse),
            chapter,
            verse,
            source_text,
            target_text,
        }
    }

    pub fn verse_id(&self) -> &str {
        &self.verse_id
    }

    pub fn chapter(&self) -> u32 {
        self.chapter
    }

    pub fn verse(&self) -> u32 {
        self.verse
    }

    /// Sort key.
    pub fn key(&self) -> (u32, u32) {
        (self.chapter, self.verse)
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn target_text(&self) -> Option<&str> {
        self.target_text.as_deref()
    }
}

/// A verse of a reference translation (Zefania, translation-only layers).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceVerse {
    pub verse_id: String,
    pub text: String,
}

impl ReferenceVerse {
    pub fn new(verse_id: String, text: String) -> Self {
        Self { verse_id, text }
    }
}
