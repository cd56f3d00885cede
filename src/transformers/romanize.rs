//! Romanization of Coptic script.
//!
//! Letters of the Coptic block (U+2C80..U+2CFF) and the Coptic letters of the Greek
//! and Coptic block (U+03E2..U+03EF) are transliterated to Latin letters.
//! Combining marks (supralinear strokes, dots) are removed, other chars are kept as is.
use std::collections::HashMap;

use lazy_static::lazy_static;
use unic_ucd::GeneralCategory;

use crate::error::Error;
use crate::io::Table;

/// Placeholder for missing (lacunar) content. It is never romanized.
pub const MISSING: &str = "[]";

/// Deterministic, pure transliteration.
pub trait Romanize {
    fn romanize(&self, text: &str) -> String;
}

lazy_static! {
    static ref COPTIC: HashMap<char, &'static str> = {
        let mut m = HashMap::new();
        m.insert('ⲁ', "a");
        m.insert('ⲃ', "b");
        m.insert('ⲅ', "g");
        m.insert('ⲇ', "d");
        m.insert('ⲉ', "e");
        m.insert('ⲋ', "s");
        m.insert('ⲍ', "z");
        m.insert('ⲏ', "e");
        m.insert('ⲑ', "th");
        m.insert('ⲓ', "i");
        m.insert('ⲕ', "k");
        m.insert('ⲗ', "l");
        m.insert('ⲙ', "m");
        m.insert('ⲛ', "n");
        m.insert('ⲝ', "ks");
        m.insert('ⲟ', "o");
        m.insert('ⲡ', "p");
        m.insert('ⲣ', "r");
        m.insert('ⲥ', "s");
        m.insert('ⲧ', "t");
        m.insert('ⲩ', "u");
        m.insert('ⲫ', "ph");
        m.insert('ⲭ', "kh");
        m.insert('ⲯ', "ps");
        m.insert('ⲱ', "o");
        m.insert('ϣ', "sh");
        m.insert('ϥ', "f");
        m.insert('ϧ', "kh");
        m.insert('ϩ', "h");
        m.insert('ϫ', "j");
        m.insert('ϭ', "c");
        m.insert('ϯ', "ti");
        m
    };
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CopticRomanizer;

impl CopticRomanizer {
    fn push_char(out: &mut String, c: char) {
        if GeneralCategory::of(c).is_mark() {
            return;
        }
        let lower = c.to_lowercase().next().unwrap_or(c);
        match COPTIC.get(&lower) {
            Some(latin) if lower != c => {
                let mut chars = latin.chars();
                if let Some(first) = chars.next() {
                    out.extend(first.to_uppercase());
                    out.extend(chars);
                }
            }
            Some(latin) => out.push_str(latin),
            None => out.push(c),
        }
    }
}

impl Romanize for CopticRomanizer {
    fn romanize(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            Self::push_char(&mut out, c);
        }
        out
    }
}

/// Romanize `text`, keeping occurrences of [MISSING] untouched.
pub fn romanize_preserving<R: Romanize + ?Sized>(romanizer: &R, text: &str) -> String {
    text.split(MISSING)
        .map(|part| romanizer.romanize(part))
        .collect::<Vec<_>>()
        .join(MISSING)
}

/// Add a romanized copy of `column` named `output`, optionally dropping `column`.
pub fn romanize_column<R: Romanize + ?Sized>(
    table: &mut Table,
    romanizer: &R,
    column: &str,
    output: &str,
    drop_source: bool,
) -> Result<(), Error> {
    let romanized = table
        .column(column)?
        .into_iter()
        .map(|text| romanize_preserving(romanizer, text))
        .collect();
    table.set_column(output, romanized)?;
    if drop_source && column != output {
        table.drop_column(column)?;
    }
    Ok(())
}
