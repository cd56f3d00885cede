/*! Verse alignment

Joins the annotation layers of a unit into verse records:

1. spans are visited in document order,
1. each span with a numeric verse number gets a chapter, inferred by a [Rollover] strategy,
1. its tokens are cut out of the body text and joined with spaces,
1. the target text is found according to the [Pairing],
1. verses are sorted by `(chapter, verse)`.
!*/
mod aligner;
pub mod rollover;
mod verse;

pub use aligner::{align_translation_only, unit_chapter_from_filename, AlignReport, Aligner, Pairing};
pub use rollover::{ChapterContext, NoRollover, Rollover, VerseReset};
pub use verse::{format_verse_id, verse_key, ReferenceVerse, ResolvedVerse};
