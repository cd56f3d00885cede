//! Layer parsing.
//!
//! Each function parses one annotation file. Nothing is validated across files here:
//! token ids referenced by spans, or spans referenced by features, are resolved (or not)
//! by the aligner.
use std::path::Path;

use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;

use super::layers::{FeatureMap, LoadReport, Span, SpanMap, TokenMap, TokenRange};
use super::xml;
use crate::error::Error;

lazy_static! {
    /// `string-range(<doc>,<unused>,<start>,<length>)`
    static ref LOCATOR: Regex = Regex::new(r"string-range\([^,]+,[^,]+,(\d+),(\d+)\)").unwrap();
}

const HREF: &str = "href";

/// Parse a `string-range` locator into a [TokenRange].
pub fn parse_locator(locator: &str) -> Option<TokenRange> {
    let caps = LOCATOR.captures(locator)?;
    let start = caps.get(1)?.as_str().parse().ok()?;
    let length = caps.get(2)?.as_str().parse().ok()?;
    Some(TokenRange::new(start, length))
}

/// Remove fragment markers (`#`) around a reference.
pub fn strip_fragment(reference: &str) -> &str {
    reference.trim_matches('#')
}

/// Text of the `body` element.
pub fn parse_body(xml: &str) -> Result<String, Error> {
    xml::text_of(xml, "body")?.ok_or_else(|| Error::MissingElement("body".to_string()))
}

/// Token `mark`s into a [TokenMap].
///
/// Marks whose locator is absent or does not follow the `string-range` grammar are left out
/// and counted in [LoadReport::malformed_locators].
pub fn parse_tokens(xml: &str) -> Result<(TokenMap, LoadReport), Error> {
    let mut tokens = TokenMap::new();
    let mut report = LoadReport::default();

    for mark in xml::elements(xml, "mark")? {
        let id = mark.require("id")?;
        let href = mark.get(HREF).unwrap_or_default();
        match parse_locator(href) {
            Some(range) => {
                if tokens.insert(id.to_string(), range).is_some() {
                    report.duplicate_ids += 1;
                }
            }
            None => {
                warn!("token {}: malformed locator {:?}", id, href);
                report.malformed_locators += 1;
            }
        }
    }

    debug!("loaded {} tokens ({:?})", tokens.len(), report);
    Ok((tokens, report))
}

/// Span `mark`s into a [SpanMap], in document order.
pub fn parse_spans(xml: &str) -> Result<SpanMap, Error> {
    let spans = xml::elements(xml, "mark")?
        .into_iter()
        .map(|mark| {
            let id = mark.require("id")?.to_string();
            let tokens = mark
                .require(HREF)?
                .split_whitespace()
                .map(|reference| strip_fragment(reference).to_string())
                .collect();
            Ok(Span::new(id, tokens))
        })
        .collect::<Result<SpanMap, Error>>()?;

    debug!("loaded {} spans", spans.len());
    Ok(spans)
}

/// `feat` elements into a [FeatureMap], keyed by the referenced span id.
///
/// A span id annotated twice keeps its last value, and the overwrite
/// is counted in [LoadReport::duplicate_ids].
pub fn parse_features(xml: &str) -> Result<(FeatureMap, LoadReport), Error> {
    let pairs = parse_features_ordered(xml)?;
    let mut report = LoadReport::default();
    let mut features = FeatureMap::with_capacity(pairs.len());
    for (id, value) in pairs {
        if let Some(previous) = features.insert(id, value) {
            debug!("duplicate feature overwrites {:?}", previous);
            report.duplicate_ids += 1;
        }
    }
    if report.duplicate_ids > 0 {
        warn!("{} duplicate feature ids (last value kept)", report.duplicate_ids);
    }
    Ok((features, report))
}

/// `feat` elements as `(span id, value)` pairs, in document order.
pub fn parse_features_ordered(xml: &str) -> Result<Vec<(String, String)>, Error> {
    xml::elements(xml, "feat")?
        .into_iter()
        .map(|feat| {
            let id = strip_fragment(feat.require(HREF)?).to_string();
            let value = feat.require("value")?.to_string();
            Ok((id, value))
        })
        .collect()
}

fn read(path: &Path) -> Result<String, Error> {
    if !path.exists() {
        return Err(Error::MissingFile(path.to_path_buf()));
    }
    Ok(std::fs::read_to_string(path)?)
}

pub fn parse_body_from_path(path: &Path) -> Result<String, Error> {
    parse_body(&read(path)?)
}

pub fn parse_tokens_from_path(path: &Path) -> Result<(TokenMap, LoadReport), Error> {
    parse_tokens(&read(path)?)
}

pub fn parse_spans_from_path(path: &Path) -> Result<SpanMap, Error> {
    parse_spans(&read(path)?)
}

pub fn parse_features_from_path(path: &Path) -> Result<(FeatureMap, LoadReport), Error> {
    parse_features(&read(path)?)
}

pub fn parse_features_ordered_from_path(path: &Path) -> Result<Vec<(String, String)>, Error> {
    parse_features_ordered(&read(path)?)
}
