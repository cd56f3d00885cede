//! In-memory annotation layers.
use std::collections::HashMap;
use std::ops::AddAssign;

use serde::Serialize;

/// Character range of a token inside a body text.
///
/// `start` is 1-based and counts Unicode scalar values, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenRange {
    start: usize,
    length: usize,
}

impl TokenRange {
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Extract the range from `body`.
    ///
    /// Returns [None] when the range does not fit in `body` (or when `start` is 0),
    /// the text is never truncated.
    pub fn extract<'a>(&self, body: &'a str) -> Option<&'a str> {
        let begin = self.start.checked_sub(1)?;
        let end = begin.checked_add(self.length)?;

        let mut indices = body
            .char_indices()
            .map(|(idx, _)| idx)
            .chain(std::iter::once(body.len()));

        let byte_begin = indices.nth(begin)?;
        let byte_end = if self.length == 0 {
            byte_begin
        } else {
            indices.nth(end - begin - 1)?
        };

        body.get(byte_begin..byte_end)
    }
}

pub type TokenMap = HashMap<String, TokenRange>;
pub type FeatureMap = HashMap<String, String>;

/// A span: an ordered list of token ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    id: String,
    tokens: Vec<String>,
}

impl Span {
    pub fn new(id: String, tokens: Vec<String>) -> Self {
        Self { id, tokens }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

/// Spans of a mark file, kept in document order.
///
/// The aligner infers chapter boundaries from the order of verse numbers,
/// which makes this order part of the contract: spans are only ever pushed in the
/// order they are read, and are never indexed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanMap {
    spans: Vec<Span>,
}

impl SpanMap {
    pub fn push(&mut self, span: Span) {
        self.spans.push(span);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Span> {
        self.spans.iter()
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

impl FromIterator<Span> for SpanMap {
    fn from_iter<T: IntoIterator<Item = Span>>(iter: T) -> Self {
        Self {
            spans: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SpanMap {
    type Item = &'a Span;
    type IntoIter = std::slice::Iter<'a, Span>;

    fn into_iter(self) -> Self::IntoIter {
        self.spans.iter()
    }
}

/// Counts of entries dropped or overwritten while loading a layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub malformed_locators: usize,
    pub duplicate_ids: usize,
}

impl AddAssign for LoadReport {
    fn add_assign(&mut self, rhs: Self) {
        self.malformed_locators += rhs.malformed_locators;
        self.duplicate_ids += rhs.duplicate_ids;
    }
}

/// The four (or five) layers annotating one chapter folder.
#[derive(Debug, Clone, Default)]
pub struct UnitLayers {
    pub body: String,
    pub tokens: TokenMap,
    pub spans: SpanMap,
    pub verses: FeatureMap,
    pub translations: Option<FeatureMap>,
}
