//! Corpus extraction from Scriptorium chapter folders.
//!
//! A book is stored as a set of chapter folders (`41_Mark_01`, `41_Mark_02`...) under a root
//! folder. Each folder `F` holds:
//!
//! - `F.text.xml`: body text
//! - `F.tok.xml`: token locators
//! - `scriptorium.F.mark.xml`: spans
//! - `scriptorium.F.mark_verse_n.xml`: verse numbers
//! - `scriptorium.F.mark_translation.xml`: translations
//!
//! A folder that can't be read or parsed is logged and skipped: it never stops the extraction.
//!
//! Aligned verse ids are unique within a book: when two units yield the same id (a unit rolling over
//! into the chapter of the next folder), the first verse is kept and the others are dropped,
//! logged and counted in [ExtractSummary::duplicate_verse_ids].
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use serde::Serialize;

use crate::align::{
    align_translation_only, unit_chapter_from_filename, AlignReport, Aligner, Pairing,
    ReferenceVerse, ResolvedVerse,
};
use crate::annotation::{self, LoadReport, UnitLayers};
use crate::books::Book;
use crate::error::Error;
use crate::io::{Table, VERSE_ID};

/// Paths of the annotation files of a chapter folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitFiles {
    name: String,
    pub body: PathBuf,
    pub tokens: PathBuf,
    pub spans: PathBuf,
    pub verses: PathBuf,
    pub translations: PathBuf,
}

impl UnitFiles {
    pub fn in_folder(folder: &Path) -> Result<Self, Error> {
        let name = folder
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::Custom(format!("invalid folder name {:?}", folder)))?
            .to_string();
        let path = |filename: String| folder.join(filename);
        Ok(Self {
            body: path(format!("{name}.text.xml")),
            tokens: path(format!("{name}.tok.xml")),
            spans: path(format!("scriptorium.{name}.mark.xml")),
            verses: path(format!("scriptorium.{name}.mark_verse_n.xml")),
            translations: path(format!("scriptorium.{name}.mark_translation.xml")),
            name,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Chapter number of the unit, from the body file name.
    pub fn unit_chapter(&self) -> u32 {
        let filename = self
            .body
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        unit_chapter_from_filename(&filename)
    }

    /// Load every layer. The translation layer is only loaded when `with_translations` is set.
    pub fn load(&self, with_translations: bool) -> Result<(UnitLayers, LoadReport), Error> {
        let mut report = LoadReport::default();

        let body = annotation::parse_body_from_path(&self.body)?;
        let (tokens, r) = annotation::parse_tokens_from_path(&self.tokens)?;
        report += r;
        let spans = annotation::parse_spans_from_path(&self.spans)?;
        let (verses, r) = annotation::parse_features_from_path(&self.verses)?;
        report += r;
        let translations = if with_translations {
            let (translations, r) = annotation::parse_features_from_path(&self.translations)?;
            report += r;
            Some(translations)
        } else {
            None
        };

        let layers = UnitLayers {
            body,
            tokens,
            spans,
            verses,
            translations,
        };
        Ok((layers, report))
    }
}

/// End-of-run health report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractSummary {
    pub units_processed: usize,
    pub units_skipped: usize,
    pub skipped_units: Vec<String>,
    /// verses dropped because their id was already extracted for the book
    pub duplicate_verse_ids: usize,
    pub load: LoadReport,
    pub align: AlignReport,
}

impl ExtractSummary {
    pub fn log(&self) {
        info!(
            "units: {} processed, {} skipped",
            self.units_processed, self.units_skipped
        );
        info!(
            "verses: {}, skipped spans: {}, malformed locators: {}, duplicate ids: {}",
            self.align.verses,
            self.align.skipped_spans,
            self.load.malformed_locators,
            self.load.duplicate_ids
        );
        info!(
            "tokens: {} missing, {} out of range; {} verses without translation span",
            self.align.missing_tokens, self.align.out_of_range_tokens, self.align.unmatched_targets
        );
        if self.duplicate_verse_ids > 0 {
            warn!("{} duplicate verse ids dropped", self.duplicate_verse_ids);
        }
        for unit in &self.skipped_units {
            warn!("skipped unit: {}", unit);
        }
    }
}

/// Extracts books from a root folder of chapter folders.
pub struct Extractor {
    root: PathBuf,
    books: Vec<Book>,
    pairing: Pairing,
}

impl Extractor {
    pub fn new(root: PathBuf, books: Vec<Book>, pairing: Pairing) -> Self {
        Self {
            root,
            books,
            pairing,
        }
    }

    /// Chapter folders of `book`, sorted by name.
    ///
    /// Unreadable entries are logged and left out.
    pub fn chapter_folders(&self, book: &Book) -> Result<Vec<PathBuf>, Error> {
        let mut folders: Vec<PathBuf> = std::fs::read_dir(&self.root)?
            .filter_map(|entry| {
                entry.map_or_else(
                    |e| {
                        error!("error reading {:?}: {}", self.root, e);
                        None
                    },
                    Some,
                )
            })
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with(book.folder_prefix()))
                    .unwrap_or(false)
            })
            .collect();
        folders.sort();
        debug!("{}: {} chapter folders", book.name(), folders.len());
        Ok(folders)
    }

    fn process_unit(
        &self,
        book: &Book,
        folder: &Path,
    ) -> Result<(Vec<ResolvedVerse>, LoadReport, AlignReport), Error> {
        let files = UnitFiles::in_folder(folder)?;
        let (layers, load_report) = files.load(self.pairing.needs_translations())?;
        let aligner = Aligner::new(book.name(), self.pairing);
        let (verses, align_report) = aligner.align(&layers, files.unit_chapter())?;
        Ok((verses, load_report, align_report))
    }

    /// Align every chapter folder of every book.
    ///
    /// Only fails when the root folder can't be listed.
    pub fn run(&self) -> Result<(Vec<ResolvedVerse>, ExtractSummary), Error> {
        let mut summary = ExtractSummary::default();
        let mut corpus = Vec::new();

        for book in &self.books {
            info!("extracting {} ({})", book.name(), book.code());
            let mut seen: HashSet<String> = HashSet::new();
            for folder in self.chapter_folders(book)? {
                let name = folder_name(&folder);
                match self.process_unit(book, &folder) {
                    Ok((verses, load_report, align_report)) => {
                        info!("{} processed ({} verses)", name, verses.len());
                        summary.units_processed += 1;
                        summary.load += load_report;
                        summary.align += align_report;
                        for verse in verses {
                            if seen.insert(verse.verse_id().to_string()) {
                                corpus.push(verse);
                            } else {
                                warn!("{}: duplicate verse id {}, dropped", name, verse.verse_id());
                                summary.duplicate_verse_ids += 1;
                            }
                        }
                    }
                    Err(e) => {
                        error!("error in {}: {}", name, e);
                        summary.units_skipped += 1;
                        summary.skipped_units.push(name);
                    }
                }
            }
        }

        Ok((corpus, summary))
    }

    /// Extract translations only, from verse number and translation layers.
    pub fn run_translation_only(&self) -> Result<(Vec<ReferenceVerse>, ExtractSummary), Error> {
        let mut summary = ExtractSummary::default();
        let mut verses = Vec::new();

        for book in &self.books {
            for folder in self.chapter_folders(book)? {
                let name = folder_name(&folder);
                let unit = UnitFiles::in_folder(&folder).and_then(|files| {
                    let verse_numbers =
                        annotation::parse_features_ordered_from_path(&files.verses)?;
                    let (translations, r) =
                        annotation::parse_features_from_path(&files.translations)?;
                    let labelled: HashSet<&str> =
                        verse_numbers.iter().map(|(id, _)| id.as_str()).collect();
                    summary.load.duplicate_ids += verse_numbers.len() - labelled.len();
                    summary.load += r;
                    Ok(align_translation_only(
                        book.name(),
                        &verse_numbers,
                        &translations,
                    ))
                });
                match unit {
                    Ok(unit_verses) => {
                        info!("{} processed ({} verses)", name, unit_verses.len());
                        summary.units_processed += 1;
                        summary.align.verses += unit_verses.len();
                        verses.extend(unit_verses);
                    }
                    Err(e) => {
                        error!("error in {}: {}", name, e);
                        summary.units_skipped += 1;
                        summary.skipped_units.push(name);
                    }
                }
            }
        }

        Ok((verses, summary))
    }
}

fn folder_name(folder: &Path) -> String {
    folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| folder.to_string_lossy().into_owned())
}

/// Corpus table: `verse_id`, source column and, if given, target column.
pub fn corpus_table(
    verses: &[ResolvedVerse],
    source_column: &str,
    target_column: Option<&str>,
) -> Table {
    let mut headers = vec![VERSE_ID, source_column];
    headers.extend(target_column);
    let mut table = Table::new(&headers[..]);
    for verse in verses {
        let mut row = vec![verse.verse_id().to_string(), verse.source_text().to_string()];
        if target_column.is_some() {
            row.push(verse.target_text().unwrap_or_default().to_string());
        }
        table.push_row(row);
    }
    table
}

/// Reference table: `verse_id` and a text column.
pub fn reference_table(verses: &[ReferenceVerse], column: &str) -> Table {
    let mut table = Table::new(&[VERSE_ID, column]);
    for verse in verses {
        table.push_row(vec![verse.verse_id.clone(), verse.text.clone()]);
    }
    table
}
