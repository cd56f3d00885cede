//! Verse alignment of one unit (chapter folder).
use std::collections::{HashMap, HashSet};
use std::ops::AddAssign;
use std::str::FromStr;

use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;
use serde::Serialize;

use super::rollover::{ChapterContext, Rollover, VerseReset};
use super::verse::{format_verse_id, ReferenceVerse, ResolvedVerse};
use crate::annotation::{FeatureMap, Span, TokenMap, UnitLayers};
use crate::error::Error;

lazy_static! {
    static ref UNIT_CHAPTER: Regex = Regex::new(r"_(\d+)\.text\.xml$").unwrap();
    static ref VERSE_NUMBER: Regex = Regex::new(r"^\d+$").unwrap();
    static ref TRAILING_NUMBER: Regex = Regex::new(r"(\d+)$").unwrap();
    static ref CHAPTER_VERSE: Regex = Regex::new(r"(\d+):(\d+)").unwrap();
}

/// Chapter number of a unit, from its body file name (`..._<n>.text.xml`).
///
/// Falls back to 1 when the name carries no chapter number.
pub fn unit_chapter_from_filename(filename: &str) -> u32 {
    UNIT_CHAPTER
        .captures(filename)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(1)
}

/// How a verse span gets its target text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pairing {
    /// The translation annotates the verse span itself.
    /// Spans without a translation are not aligned.
    #[default]
    SameSpan,
    /// Translations annotate their own spans: the target is the translation of the first
    /// span sharing at least one token with the verse span.
    TokenOverlap,
    /// No target.
    SourceOnly,
}

impl Pairing {
    pub fn needs_translations(&self) -> bool {
        !matches!(self, Pairing::SourceOnly)
    }
}

impl FromStr for Pairing {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "same-span" => Ok(Pairing::SameSpan),
            "token-overlap" => Ok(Pairing::TokenOverlap),
            "source-only" => Ok(Pairing::SourceOnly),
            other => Err(Error::Custom(format!(
                "unknown pairing {other:?} (same-span, token-overlap, source-only)"
            ))),
        }
    }
}

/// Counts of what has been dropped while aligning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlignReport {
    pub verses: usize,
    /// spans with a non numeric verse number
    pub skipped_spans: usize,
    /// token ids absent from the token map
    pub missing_tokens: usize,
    /// tokens whose range exceeds the body text
    pub out_of_range_tokens: usize,
    /// verses without a matching translation span ([Pairing::TokenOverlap])
    pub unmatched_targets: usize,
}

impl AddAssign for AlignReport {
    fn add_assign(&mut self, rhs: Self) {
        self.verses += rhs.verses;
        self.skipped_spans += rhs.skipped_spans;
        self.missing_tokens += rhs.missing_tokens;
        self.out_of_range_tokens += rhs.out_of_range_tokens;
        self.unmatched_targets += rhs.unmatched_targets;
    }
}

/// Joins the layers of a unit into [ResolvedVerse]s.
pub struct Aligner<R = VerseReset> {
    book: String,
    pairing: Pairing,
    rollover: R,
}

impl Aligner<VerseReset> {
    pub fn new(book: &str, pairing: Pairing) -> Self {
        Self::with_rollover(book, pairing, VerseReset)
    }
}

impl<R: Rollover> Aligner<R> {
    pub fn with_rollover(book: &str, pairing: Pairing, rollover: R) -> Self {
        Self {
            book: book.to_string(),
            pairing,
            rollover,
        }
    }

    /// Align a unit whose first chapter is `unit_chapter`.
    ///
    /// Spans are visited in document order, which is what chapter inference relies on.
    /// The result is sorted by `(chapter, verse)`.
    pub fn align(
        &self,
        layers: &UnitLayers,
        unit_chapter: u32,
    ) -> Result<(Vec<ResolvedVerse>, AlignReport), Error> {
        let empty = FeatureMap::new();
        let translations = match (&layers.translations, self.pairing.needs_translations()) {
            (Some(t), true) => t,
            (None, true) => {
                return Err(Error::Custom(format!(
                    "{}: {:?} pairing needs a translation layer",
                    self.book, self.pairing
                )))
            }
            (_, false) => &empty,
        };

        // translated spans with their token sets, in document order
        let translated: Vec<(HashSet<&str>, &str)> = match self.pairing {
            Pairing::TokenOverlap => layers
                .spans
                .iter()
                .filter_map(|span| {
                    translations.get(span.id()).map(|t| {
                        let tokens = span.tokens().iter().map(String::as_str).collect();
                        (tokens, t.as_str())
                    })
                })
                .collect(),
            _ => Vec::new(),
        };

        let mut report = AlignReport::default();
        let mut ctx = ChapterContext::default();
        let mut verses = Vec::new();

        for span in &layers.spans {
            let raw_verse = match layers.verses.get(span.id()) {
                Some(v) => v,
                None => continue,
            };
            if self.pairing == Pairing::SameSpan && !translations.contains_key(span.id()) {
                continue;
            }

            let verse_number = match parse_verse_number(raw_verse) {
                Some(v) => v,
                None => {
                    warn!(
                        "{}: skipped span {} with verse number {:?}",
                        self.book,
                        span.id(),
                        raw_verse
                    );
                    report.skipped_spans += 1;
                    continue;
                }
            };

            ctx = self.rollover.next(ctx, verse_number);
            let chapter = match unit_chapter.checked_add(ctx.chapter_offset) {
                Some(c) => c,
                None => {
                    warn!(
                        "{}: skipped span {}, chapter {} + {} overflows",
                        self.book,
                        span.id(),
                        unit_chapter,
                        ctx.chapter_offset
                    );
                    report.skipped_spans += 1;
                    continue;
                }
            };

            let source = self.source_text(span, &layers.tokens, &layers.body, &mut report);
            let target = match self.pairing {
                Pairing::SameSpan => translations.get(span.id()).cloned(),
                Pairing::TokenOverlap => {
                    let target = overlapping_translation(span, &translated);
                    if target.is_none() {
                        debug!("{}: no translation for span {}", self.book, span.id());
                        report.unmatched_targets += 1;
                    }
                    Some(target.unwrap_or_default().to_string())
                }
                Pairing::SourceOnly => None,
            };

            verses.push(ResolvedVerse::new(
                &self.book,
                chapter,
                verse_number,
                source,
                target,
            ));
        }

        // stable: verses sharing a key keep their document order
        verses.sort_by_key(ResolvedVerse::key);
        report.verses = verses.len();
        Ok((verses, report))
    }

    /// Space-joined token texts of a span, in span order.
    fn source_text(
        &self,
        span: &Span,
        tokens: &TokenMap,
        body: &str,
        report: &mut AlignReport,
    ) -> String {
        let mut parts = Vec::with_capacity(span.tokens().len());
        for token_id in span.tokens() {
            let range = match tokens.get(token_id) {
                Some(r) => r,
                None => {
                    report.missing_tokens += 1;
                    continue;
                }
            };
            match range.extract(body) {
                Some(text) => parts.push(text),
                None => {
                    warn!(
                        "{}: token {} ({}+{}) is out of the body text",
                        self.book,
                        token_id,
                        range.start(),
                        range.length()
                    );
                    report.out_of_range_tokens += 1;
                }
            }
        }
        parts.join(" ")
    }
}

/// A verse number is a plain nonnegative integer.
fn parse_verse_number(raw: &str) -> Option<u32> {
    if VERSE_NUMBER.is_match(raw) {
        raw.parse().ok()
    } else {
        None
    }
}

fn overlapping_translation<'a>(
    span: &Span,
    translated: &[(HashSet<&str>, &'a str)],
) -> Option<&'a str> {
    translated
        .iter()
        .find(|(tokens, _)| span.tokens().iter().any(|t| tokens.contains(t.as_str())))
        .map(|(_, translation)| *translation)
}

/// Verse translations of a unit that has no usable token layers.
///
/// `verses` are `(span id, label)` pairs in feature-file order. A span labelled twice keeps
/// its first position and its last label.
///
/// Labels must end with a number. When they hold `<chapter>:<verse>`, both are used,
/// otherwise the chapter is 1 and the verse is the trailing number. Spans without a
/// translation are left out. Sorted by `(chapter, verse)`, ties keeping file order.
pub fn align_translation_only(
    book: &str,
    verses: &[(String, String)],
    translations: &FeatureMap,
) -> Vec<ReferenceVerse> {
    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(verses.len());
    let mut labels: Vec<(&str, &str)> = Vec::with_capacity(verses.len());
    for (span_id, label) in verses {
        match positions.get(span_id.as_str()) {
            Some(&idx) => labels[idx].1 = label.as_str(),
            None => {
                positions.insert(span_id.as_str(), labels.len());
                labels.push((span_id.as_str(), label.as_str()));
            }
        }
    }

    let mut aligned: Vec<((u32, u32), ReferenceVerse)> = labels
        .into_iter()
        .filter_map(|(span_id, label)| {
            let translation = translations.get(span_id)?;
            let trailing: u32 = TRAILING_NUMBER.captures(label)?[1].parse().ok()?;
            let key = match CHAPTER_VERSE.captures(label) {
                Some(caps) => (caps[1].parse().ok()?, caps[2].parse().ok()?),
                None => (1, trailing),
            };
            let verse_id = format_verse_id(book, key.0, key.1);
            Some((key, ReferenceVerse::new(verse_id, translation.clone())))
        })
        .collect();

    aligned.sort_by_key(|(key, _)| *key);
    aligned.into_iter().map(|(_, v)| v).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::rollover::NoRollover;
    use crate::annotation::{SpanMap, TokenRange};

    fn span(id: &str, tokens: &[&str]) -> Span {
        Span::new(id.to_string(), tokens.iter().map(|t| t.to_string()).collect())
    }

    fn features(pairs: &[(&str, &str)]) -> FeatureMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn abc_layers() -> UnitLayers {
        UnitLayers {
            body: "abc def ghi".to_string(),
            tokens: [
                ("t1", TokenRange::new(1, 3)),
                ("t2", TokenRange::new(5, 3)),
                ("t3", TokenRange::new(9, 3)),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
            spans: std::iter::once(span("s1", &["t1", "t2", "t3"])).collect(),
            verses: features(&[("s1", "1")]),
            translations: Some(features(&[("s1", "hello")])),
        }
    }

    /// one token per verse, verse numbers given in document order
    fn numbered_layers(numbers: &[&str]) -> UnitLayers {
        let body: String = numbers.iter().map(|_| "x").collect::<Vec<_>>().join(" ");
        let tokens = (0..numbers.len())
            .map(|i| (format!("t{i}"), TokenRange::new(2 * i + 1, 1)))
            .collect();
        let spans: SpanMap = (0..numbers.len())
            .map(|i| Span::new(format!("s{i}"), vec![format!("t{i}")]))
            .collect();
        let verses = numbers
            .iter()
            .enumerate()
            .map(|(i, n)| (format!("s{i}"), n.to_string()))
            .collect();
        let translations = (0..numbers.len())
            .map(|i| (format!("s{i}"), format!("tr{i}")))
            .collect();
        UnitLayers {
            body,
            tokens,
            spans,
            verses,
            translations: Some(translations),
        }
    }

    #[test]
    fn end_to_end() {
        let aligner = Aligner::new("Test", Pairing::SameSpan);
        let (verses, report) = aligner.align(&abc_layers(), 2).unwrap();
        assert_eq!(
            verses,
            vec![ResolvedVerse::new(
                "Test",
                2,
                1,
                "abc def ghi".to_string(),
                Some("hello".to_string())
            )]
        );
        assert_eq!(verses[0].verse_id(), "Test 2.1");
        assert_eq!(report.verses, 1);
    }

    #[test]
    fn rollover_chapters() {
        let aligner = Aligner::new("Mark", Pairing::SameSpan);
        let (verses, _) = aligner
            .align(&numbered_layers(&["1", "2", "3", "1", "2"]), 4)
            .unwrap();
        let chapters: Vec<u32> = verses.iter().map(ResolvedVerse::chapter).collect();
        assert_eq!(chapters, vec![4, 4, 4, 5, 5]);
        assert_eq!(verses[3].verse_id(), "Mark 5.1");
    }

    #[test]
    fn rollover_strategy_is_swappable() {
        let aligner = Aligner::with_rollover("Mark", Pairing::SameSpan, NoRollover);
        let (verses, _) = aligner
            .align(&numbered_layers(&["1", "2", "1"]), 1)
            .unwrap();
        assert!(verses.iter().all(|v| v.chapter() == 1));
    }

    #[test]
    fn sorted_whatever_the_input_order() {
        // 3, 5 then 4 rolls over into chapter 2: sorted output puts 3 and 5 (chapter 1) first
        let aligner = Aligner::new("B", Pairing::SameSpan);
        let (verses, _) = aligner
            .align(&numbered_layers(&["3", "5", "4", "7"]), 1)
            .unwrap();
        let ids: Vec<&str> = verses.iter().map(ResolvedVerse::verse_id).collect();
        assert_eq!(ids, vec!["B 1.3", "B 1.5", "B 2.4", "B 2.7"]);
        assert!(verses.windows(2).all(|w| w[0].key() <= w[1].key()));
    }

    #[test]
    fn idempotent() {
        let aligner = Aligner::new("B", Pairing::SameSpan);
        let layers = numbered_layers(&["2", "1", "3", "3", "1"]);
        let first = aligner.align(&layers, 1).unwrap();
        let second = aligner.align(&layers, 1).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn source_follows_span_order() {
        let mut layers = abc_layers();
        layers.spans = std::iter::once(span("s1", &["t3", "t1", "t2"])).collect();
        let (verses, _) = Aligner::new("Test", Pairing::SameSpan)
            .align(&layers, 1)
            .unwrap();
        assert_eq!(verses[0].source_text(), "ghi abc def");
    }

    #[test]
    fn join_misses() {
        let mut layers = abc_layers();
        layers.spans = std::iter::once(span("s1", &["t1", "missing", "t3"])).collect();
        layers.tokens.insert("t3".to_string(), TokenRange::new(9, 10));
        let (verses, report) = Aligner::new("Test", Pairing::SameSpan)
            .align(&layers, 1)
            .unwrap();
        assert_eq!(verses[0].source_text(), "abc");
        assert_eq!(report.missing_tokens, 1);
        assert_eq!(report.out_of_range_tokens, 1);
    }

    #[test]
    fn non_numeric_verse_skipped() {
        let layers = numbered_layers(&["1", "2a", "3", "?"]);
        let (verses, report) = Aligner::new("B", Pairing::SameSpan)
            .align(&layers, 1)
            .unwrap();
        assert_eq!(verses.len(), 2);
        assert_eq!(report.skipped_spans, 2);
        // skipped spans don't take part in chapter inference
        assert!(verses.iter().all(|v| v.chapter() == 1));
    }

    #[test]
    fn same_span_requires_translation() {
        let mut layers = numbered_layers(&["1", "2"]);
        layers.translations.as_mut().unwrap().remove("s1");
        let (verses, _) = Aligner::new("B", Pairing::SameSpan)
            .align(&layers, 1)
            .unwrap();
        assert_eq!(verses.len(), 1);
        assert_eq!(verses[0].verse(), 1);
    }

    #[test]
    fn missing_translation_layer() {
        let mut layers = abc_layers();
        layers.translations = None;
        assert!(Aligner::new("B", Pairing::TokenOverlap)
            .align(&layers, 1)
            .is_err());
        let (verses, _) = Aligner::new("B", Pairing::SourceOnly)
            .align(&layers, 1)
            .unwrap();
        assert_eq!(verses[0].target_text(), None);
    }

    #[test]
    fn token_overlap() {
        let layers = UnitLayers {
            body: "abc def ghi".to_string(),
            tokens: abc_layers().tokens,
            spans: [
                span("v1", &["t1", "t2"]),
                span("v2", &["t3"]),
                span("tr1", &["t1", "t2", "t3"]),
                span("tr2", &["t3"]),
            ]
            .into_iter()
            .collect(),
            verses: features(&[("v1", "1"), ("v2", "2")]),
            translations: Some(features(&[("tr2", "second"), ("tr1", "first")])),
        };
        let (verses, report) = Aligner::new("Mark", Pairing::TokenOverlap)
            .align(&layers, 1)
            .unwrap();
        assert_eq!(verses[0].target_text(), Some("first"));
        // tr1 comes first in the document
        assert_eq!(verses[1].target_text(), Some("first"));
        assert_eq!(report.unmatched_targets, 0);
    }

    #[test]
    fn token_overlap_miss() {
        let mut layers = abc_layers();
        layers.spans = [span("v1", &["t1"]), span("tr", &["t2"])]
            .into_iter()
            .collect();
        layers.verses = features(&[("v1", "1")]);
        layers.translations = Some(features(&[("tr", "x")]));
        let (verses, report) = Aligner::new("Mark", Pairing::TokenOverlap)
            .align(&layers, 1)
            .unwrap();
        assert_eq!(verses[0].target_text(), Some(""));
        assert_eq!(report.unmatched_targets, 1);
    }

    #[test]
    fn chapter_overflow_skips_span() {
        let aligner = Aligner::new("Test", Pairing::SameSpan);
        let (verses, report) = aligner
            .align(&numbered_layers(&["1", "1"]), u32::MAX)
            .unwrap();
        assert_eq!(verses.len(), 1);
        assert_eq!(verses[0].chapter(), u32::MAX);
        assert_eq!(report.skipped_spans, 1);
    }

    #[test]
    fn pairing_names() {
        assert_eq!("token-overlap".parse::<Pairing>().unwrap(), Pairing::TokenOverlap);
        assert_eq!("source-only".parse::<Pairing>().unwrap(), Pairing::SourceOnly);
        assert!("overlap".parse::<Pairing>().is_err());
    }

    #[test]
    fn unit_chapter() {
        assert_eq!(unit_chapter_from_filename("41_Mark_03.text.xml"), 3);
        assert_eq!(unit_chapter_from_filename("Tobit.text.xml"), 1);
        assert_eq!(unit_chapter_from_filename("41_Mark_03.tok.xml"), 1);
    }

    fn ordered(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn translation_only() {
        let verses = ordered(&[("s1", "2:4"), ("s2", "verse 3"), ("s3", "none")]);
        let translations = features(&[("s1", "b"), ("s2", "a"), ("s3", "c")]);
        let aligned = align_translation_only("1 Corinthians", &verses, &translations);
        assert_eq!(
            aligned,
            vec![
                ReferenceVerse::new("1 Corinthians 1.3".to_string(), "a".to_string()),
                ReferenceVerse::new("1 Corinthians 2.4".to_string(), "b".to_string()),
            ]
        );
    }

    #[test]
    fn translation_only_label_ends_with_number() {
        let verses = ordered(&[("s1", "2:4a")]);
        let translations = features(&[("s1", "x")]);
        assert!(align_translation_only("B", &verses, &translations).is_empty());
    }

    #[test]
    fn translation_only_ties_keep_file_order() {
        let verses = ordered(&[("s1", "3"), ("s2", "verse 3")]);
        let translations = features(&[("s1", "zzz"), ("s2", "aaa")]);
        let texts: Vec<String> = align_translation_only("B", &verses, &translations)
            .into_iter()
            .map(|v| v.text)
            .collect();
        assert_eq!(texts, vec!["zzz", "aaa"]);
    }

    #[test]
    fn translation_only_relabelled_span() {
        // first position, last label
        let verses = ordered(&[("s1", "5"), ("s2", "5"), ("s1", "5")]);
        let translations = features(&[("s1", "first"), ("s2", "second")]);
        let texts: Vec<String> = align_translation_only("B", &verses, &translations)
            .into_iter()
            .map(|v| v.text)
            .collect();
        assert_eq!(texts, vec!["first", "second"]);
    }
}
