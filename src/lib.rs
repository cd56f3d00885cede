/*! # coptic-corpus

Verse-aligned Coptic parallel corpora, built from [Coptic Scriptorium](https://copticscriptorium.org)
multi-layer annotations and Zefania Bibles.

- [annotation] parses the body, token, span and feature layers of a chapter folder,
- [align] joins them into verses,
- [extract] runs the alignment over whole books,
- [transformers] romanizes and corrupts verses,
- [processing] and [evaluation] prepare training data and summarize scores.
!*/
pub mod align;
pub mod annotation;
pub mod books;
pub mod error;
pub mod evaluation;
pub mod extract;
pub mod io;
pub mod processing;
pub mod transformers;
pub mod zefania;
