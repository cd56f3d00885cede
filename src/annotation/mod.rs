/*! Scriptorium annotation layers

A chapter folder holds several stand-off annotation files over one body text:

- the body text itself (`<body>` character data),
- token `mark`s locating each token with a `string-range` locator,
- span `mark`s grouping tokens (usually one verse per span),
- `feat` files attaching a value (verse number, translation) to a span.

This module parses each of them independently into the maps of [layers].
!*/
pub mod layers;
pub mod loader;
pub(crate) mod xml;

pub use layers::{FeatureMap, LoadReport, Span, SpanMap, TokenMap, TokenRange, UnitLayers};
pub use loader::{
    parse_body, parse_body_from_path, parse_features, parse_features_from_path,
    parse_features_ordered, parse_features_ordered_from_path, parse_locator, parse_spans,
    parse_spans_from_path, parse_tokens, parse_tokens_from_path,
};
