/*! Synthetic noise

Simulates OCR/transcription errors on (romanized) verses:

- substitution: a char listed in a [ConfusionTable] is replaced by one of its look-alikes,
- typos: a char is marked as deleted ([DELETED]) or swapped with the next one.
!*/
use std::collections::HashMap;
use std::str::FromStr;

use log::info;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::error::Error;
use crate::io::Table;

/// What a deleted char is replaced with.
pub const DELETED: &str = "[]";

/// Look-alike chars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionTable(HashMap<char, Vec<char>>);

impl ConfusionTable {
    /// Build a table. Every char must have at least one alternative.
    pub fn new<I>(entries: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (char, Vec<char>)>,
    {
        let mut table = HashMap::new();
        for (c, alternatives) in entries {
            if alternatives.is_empty() {
                return Err(Error::EmptyConfusion(c));
            }
            table.insert(c, alternatives);
        }
        Ok(Self(table))
    }

    /// Confusions of romanized Coptic.
    pub fn romanized() -> Self {
        Self::from_static(&[
            ('a', "oe"),
            ('o', "ae"),
            ('e', "ao"),
            ('i', "lj"),
            ('l', "i1"),
            ('c', "e"),
            ('u', "v"),
            ('v', "u"),
            ('n', "m"),
            ('m', "n"),
            ('r', "ns"),
            ('s', "r"),
            ('t', "f"),
            ('f', "t"),
        ])
    }

    /// Confusions of Coptic script.
    pub fn coptic() -> Self {
        Self::from_static(&[
            ('ⲁ', "ⲟⲉ"),
            ('ⲟ', "ⲁⲉ"),
            ('ⲉ', "ⲁⲟ"),
            ('ⲓ', "ⲏⲩ"),
            ('ⲏ', "ⲓⲉ"),
            ('ⲩ', "ⲓⲛ"),
            ('ⲥ', "ⲓⲏ"),
            ('ϣ', "ϥϫ"),
            ('ϥ', "ϣϫ"),
            ('ϫ', "ϣϥ"),
            ('ϯ', "ⲧⲑ"),
            ('ⲧ', "ϯⲑ"),
            ('ⲑ', "ⲧϯ"),
            ('ⲛ', "ⲩ"),
            ('ⲙ', "ⲛ"),
            ('ⲣ', "ⲩⲙ"),
        ])
    }

    /// `(char, alternatives)` pairs, alternatives given as a string.
    fn from_static(entries: &[(char, &str)]) -> Self {
        Self(
            entries
                .iter()
                .map(|(c, alternatives)| (*c, alternatives.chars().collect()))
                .collect(),
        )
    }

    pub fn alternatives(&self, c: char) -> Option<&[char]> {
        self.0.get(&c).map(Vec::as_slice)
    }
}

impl Default for ConfusionTable {
    fn default() -> Self {
        Self::romanized()
    }
}

fn check_probability(p: f64) -> Result<f64, Error> {
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(Error::InvalidProbability(p))
    }
}

/// Noise parameters. Probabilities are per char.
#[derive(Debug, Clone)]
pub struct NoiseModel {
    substitution: f64,
    deletion: f64,
    swap: f64,
    confusion: ConfusionTable,
}

impl Default for NoiseModel {
    fn default() -> Self {
        Self {
            substitution: 0.1,
            deletion: 0.02,
            swap: 0.02,
            confusion: ConfusionTable::default(),
        }
    }
}

impl NoiseModel {
    pub fn new(
        substitution: f64,
        deletion: f64,
        swap: f64,
        confusion: ConfusionTable,
    ) -> Result<Self, Error> {
        Ok(Self {
            substitution: check_probability(substitution)?,
            deletion: check_probability(deletion)?,
            swap: check_probability(swap)?,
            confusion,
        })
    }

    pub fn confusion(&self) -> &ConfusionTable {
        &self.confusion
    }

    /// Replace confusable chars with one of their alternatives.
    pub fn substitute<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> String {
        text.chars()
            .map(|c| match self.confusion.alternatives(c) {
                Some(alternatives) => {
                    if rng.gen_bool(self.substitution) {
                        // tables never hold empty alternatives
                        *alternatives.choose(rng).unwrap_or(&c)
                    } else {
                        c
                    }
                }
                None => c,
            })
            .collect()
    }

    /// Mark chars as deleted, or swap them with the next one.
    ///
    /// Deletion is tried first: a char is never both deleted and swapped.
    /// A swapped pair is not considered again.
    pub fn typo<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> String {
        let mut chars: Vec<String> = text.chars().map(String::from).collect();
        let mut idx = 0;
        while idx < chars.len() {
            if rng.gen_bool(self.deletion) {
                chars[idx] = DELETED.to_string();
                idx += 1;
            } else if idx + 1 < chars.len() && rng.gen_bool(self.swap) {
                chars.swap(idx, idx + 1);
                idx += 2;
            } else {
                idx += 1;
            }
        }
        chars.concat()
    }

    /// Substitution then typos.
    pub fn apply<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> String {
        let substituted = self.substitute(text, rng);
        self.typo(&substituted, rng)
    }
}

/// Label and ratio of verses to corrupt.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseLevel {
    pub label: String,
    pub ratio: f64,
}

impl NoiseLevel {
    pub fn new(label: &str, ratio: f64) -> Result<Self, Error> {
        Ok(Self {
            label: label.to_string(),
            ratio: check_probability(ratio)?,
        })
    }

    /// 10%, 30%, 50% and 100% of the verses.
    pub fn defaults() -> Vec<Self> {
        [("10", 0.1), ("30", 0.3), ("50", 0.5), ("100", 1.0)]
            .iter()
            .map(|(label, ratio)| Self {
                label: label.to_string(),
                ratio: *ratio,
            })
            .collect()
    }
}

/// `<label>:<ratio>`, like `30:0.3`.
impl FromStr for NoiseLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (label, ratio) = s
            .split_once(':')
            .ok_or_else(|| Error::Custom(format!("invalid noise level {s:?}")))?;
        let ratio = ratio
            .trim()
            .parse()
            .map_err(|_| Error::Custom(format!("invalid noise ratio in {s:?}")))?;
        Self::new(label.trim(), ratio)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NoisyReport {
    pub label: String,
    pub verses: usize,
    pub modified: usize,
}

/// Copy of `table` where each `column` cell is corrupted with probability `level.ratio`.
pub fn noisy_table<R: Rng + ?Sized>(
    table: &Table,
    column: &str,
    model: &NoiseModel,
    level: &NoiseLevel,
    rng: &mut R,
) -> Result<(Table, NoisyReport), Error> {
    let original = table.column(column)?;
    let noisy: Vec<String> = original
        .iter()
        .map(|text| {
            if rng.gen_bool(level.ratio) {
                model.apply(text, rng)
            } else {
                text.to_string()
            }
        })
        .collect();

    let modified = original
        .iter()
        .zip(&noisy)
        .filter(|&(o, n)| *o != n.as_str())
        .count();

    let mut out = table.clone();
    out.set_column(column, noisy)?;

    let report = NoisyReport {
        label: level.label.clone(),
        verses: out.len(),
        modified,
    };
    info!(
        "noise {}%: {}/{} verses modified",
        report.label, report.modified, report.verses
    );
    Ok((out, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const TEXT: &str = "auo pejaf naf je ntok pe pnoute etonh";

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn zero_probability_is_identity() {
        let model = NoiseModel::new(0.0, 0.0, 0.0, ConfusionTable::romanized()).unwrap();
        let mut rng = rng();
        for text in [TEXT, "", "a", "ⲁⲩⲱ []"] {
            assert_eq!(model.substitute(text, &mut rng), text);
            assert_eq!(model.typo(text, &mut rng), text);
            assert_eq!(model.apply(text, &mut rng), text);
        }
    }

    #[test]
    fn full_substitution() {
        let table = ConfusionTable::romanized();
        let model = NoiseModel::new(1.0, 0.0, 0.0, table.clone()).unwrap();
        let text = "aoeilcuvnmrstf";
        let out = model.substitute(text, &mut rng());
        assert_eq!(out.chars().count(), text.chars().count());
        for (orig, new) in text.chars().zip(out.chars()) {
            assert!(table.alternatives(orig).unwrap().contains(&new));
        }
    }

    #[test]
    fn unknown_chars_never_substituted() {
        let model = NoiseModel::new(1.0, 0.0, 0.0, ConfusionTable::romanized()).unwrap();
        assert_eq!(model.substitute("bdghkpz 123", &mut rng()), "bdghkpz 123");
    }

    #[test]
    fn full_deletion() {
        let model = NoiseModel::new(0.0, 1.0, 1.0, ConfusionTable::romanized()).unwrap();
        assert_eq!(model.typo("abc", &mut rng()), "[][][]");
    }

    #[test]
    fn full_swap() {
        let model = NoiseModel::new(0.0, 0.0, 1.0, ConfusionTable::romanized()).unwrap();
        // pairs are swapped, a trailing char stays
        assert_eq!(model.typo("abcde", &mut rng()), "badce");
    }

    #[test]
    fn deletion_rate() {
        let model = NoiseModel::new(0.0, 0.2, 0.0, ConfusionTable::romanized()).unwrap();
        let text: String = ['x'; 10_000].iter().collect();
        let out = model.typo(&text, &mut rng());
        let deleted = out.matches(DELETED).count() as f64;
        assert!((deleted / 10_000.0 - 0.2).abs() < 0.02);
    }

    #[test]
    fn seeded_is_reproducible() {
        let model = NoiseModel::new(0.5, 0.1, 0.1, ConfusionTable::romanized()).unwrap();
        assert_eq!(model.apply(TEXT, &mut rng()), model.apply(TEXT, &mut rng()));
    }

    #[test]
    fn invalid_parameters() {
        assert!(matches!(
            NoiseModel::new(1.5, 0.0, 0.0, ConfusionTable::default()),
            Err(Error::InvalidProbability(_))
        ));
        assert!(matches!(
            ConfusionTable::new(vec![('a', vec![])]),
            Err(Error::EmptyConfusion('a'))
        ));
    }

    #[test]
    fn level_parsing() {
        assert_eq!(
            "30:0.3".parse::<NoiseLevel>().unwrap(),
            NoiseLevel::new("30", 0.3).unwrap()
        );
        assert!("30".parse::<NoiseLevel>().is_err());
        assert!("30:x".parse::<NoiseLevel>().is_err());
        assert!(matches!(
            "200:2".parse::<NoiseLevel>(),
            Err(Error::InvalidProbability(_))
        ));
    }

    #[test]
    fn noisy_levels() {
        let mut table = Table::new(&["verse_id", "coptic_text_romanized"]);
        for i in 0..50 {
            table.push_row(vec![format!("Mark 1.{i}"), TEXT.to_string()]);
        }
        let model = NoiseModel::new(1.0, 0.0, 0.0, ConfusionTable::romanized()).unwrap();

        let none = NoiseLevel::new("0", 0.0).unwrap();
        let (out, report) =
            noisy_table(&table, "coptic_text_romanized", &model, &none, &mut rng()).unwrap();
        assert_eq!(out, table);
        assert_eq!(report.modified, 0);

        let all = NoiseLevel::new("100", 1.0).unwrap();
        let (out, report) =
            noisy_table(&table, "coptic_text_romanized", &model, &all, &mut rng()).unwrap();
        assert_eq!(report.modified, 50);
        assert_eq!(out.column("verse_id").unwrap(), table.column("verse_id").unwrap());
    }
}
