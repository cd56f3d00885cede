//! Chapter boundary inference.
//!
//! A chapter folder may contain more than one chapter. Scriptorium layers do not mark
//! chapter boundaries, so the chapter is inferred from the sequence of verse numbers.

/// State threaded through the spans of one unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChapterContext {
    pub last_seen_verse: u32,
    pub chapter_offset: u32,
}

/// Chapter inference strategy.
pub trait Rollover {
    /// Returns the context after seeing `verse`.
    fn next(&self, ctx: ChapterContext, verse: u32) -> ChapterContext;
}

/// Verse numbering restart means a new chapter.
///
/// A verse number lower than *or equal to* the previous one increments the chapter offset,
/// so a repeated verse number is read as the first verse of a new chapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerseReset;

impl Rollover for VerseReset {
    fn next(&self, ctx: ChapterContext, verse: u32) -> ChapterContext {
        let chapter_offset = if verse <= ctx.last_seen_verse {
            ctx.chapter_offset + 1
        } else {
            ctx.chapter_offset
        };
        ChapterContext {
            last_seen_verse: verse,
            chapter_offset,
        }
    }
}

/// Every verse belongs to the unit chapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRollover;

impl Rollover for NoRollover {
    fn next(&self, ctx: ChapterContext, verse: u32) -> ChapterContext {
        ChapterContext {
            last_seen_verse: verse,
            chapter_offset: ctx.chapter_offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offsets<R: Rollover>(r: &R, verses: &[u32]) -> Vec<u32> {
        verses
            .iter()
            .scan(ChapterContext::default(), |ctx, v| {
                *ctx = r.next(*ctx, *v);
                Some(ctx.chapter_offset)
            })
            .collect()
    }

    #[test]
    fn reset() {
        assert_eq!(offsets(&VerseReset, &[1, 2, 3, 1, 2]), vec![0, 0, 0, 1, 1]);
    }

    #[test]
    fn repeated_verse_is_a_reset() {
        assert_eq!(offsets(&VerseReset, &[1, 2, 2, 3]), vec![0, 0, 1, 1]);
    }

    #[test]
    fn first_verse_zero() {
        // last_seen starts at 0
        assert_eq!(offsets(&VerseReset, &[0, 1]), vec![1, 1]);
    }

    #[test]
    fn no_rollover() {
        assert_eq!(offsets(&NoRollover, &[1, 2, 1, 1]), vec![0, 0, 0, 0]);
    }
}
