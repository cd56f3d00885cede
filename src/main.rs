//! # coptic-corpus
//!
//! Preparation of verse-aligned Coptic parallel corpora, from Scriptorium annotation layers and
//! Zefania Bibles, to noisy training and evaluation data.
//!
//! ## Getting started
//!
//! ```sh
//! USAGE:
//!     coptic-corpus <SUBCOMMAND>
//!
//! SUBCOMMANDS:
//!     clean        Remove lacunar and untranslated verses
//!     concat       Concatenate corpus files into training data
//!     extract      Extract a verse-aligned corpus from Scriptorium chapter folders
//!     merge        Add the columns of reference tables to a corpus, by verse id
//!     noise        Generate noisy copies of a corpus
//!     romanize     Add a romanized copy of a Coptic column
//!     summarize    Summarize metric score files
//!     zefania      Extract verses from a Zefania XML Bible
//! ```
//!
//! Logging is configured with `RUST_LOG` (`RUST_LOG=info coptic-corpus extract ...`).
use std::fs::File;

use rand::rngs::StdRng;
use rand::SeedableRng;
use structopt::StructOpt;

use coptic_corpus::books::{self, Book, BOOKS};
use coptic_corpus::error::Error;
use coptic_corpus::evaluation::score::{self, Summary};
use coptic_corpus::extract::{self, Extractor};
use coptic_corpus::io::{Table, VERSE_ID};
use coptic_corpus::processing::{self, concat, Selection};
use coptic_corpus::transformers::{
    noisy_table, romanize_column, ConfusionTable, CopticRomanizer, NoiseLevel, NoiseModel,
};
use coptic_corpus::zefania;

#[macro_use]
extern crate log;

mod cli;

fn book_name(code: u32, name: &Option<String>) -> Result<String, Error> {
    match name {
        Some(name) => Ok(name.clone()),
        None => BOOKS
            .get(&code)
            .map(|name| name.to_string())
            .ok_or_else(|| Error::Custom(format!("unknown book code {code}, use --book-name"))),
    }
}

fn extract_books(e: &cli::Extract) -> Result<Vec<Book>, Error> {
    match e.book_code {
        Some(code) => {
            let name = book_name(code, &e.book_name)?;
            let book = match &e.prefix {
                Some(prefix) => Book::with_prefix(code, &name, prefix),
                None => Book::new(code, &name),
            };
            Ok(vec![book])
        }
        None => books::catalogue(&e.testament)
            .map(books::books_of)
            .ok_or_else(|| Error::Custom(format!("unknown testament {:?}", e.testament))),
    }
}

fn run_extract(e: cli::Extract) -> Result<(), Error> {
    let extractor = Extractor::new(e.root.clone(), extract_books(&e)?, e.pairing);
    let (table, summary) = if e.translation_only {
        let (verses, summary) = extractor.run_translation_only()?;
        (extract::reference_table(&verses, &e.translation_col), summary)
    } else {
        let (verses, summary) = extractor.run()?;
        let target = e
            .pairing
            .needs_translations()
            .then_some(e.translation_col.as_str());
        (extract::corpus_table(&verses, &e.source_col, target), summary)
    };

    table.to_path(&e.dst)?;
    summary.log();
    info!("{} verses written to {:?}", table.len(), e.dst);
    if let Some(path) = e.summary {
        serde_json::to_writer_pretty(File::create(path)?, &summary)?;
    }
    Ok(())
}

fn run_zefania(z: cli::Zefania) -> Result<(), Error> {
    let xml = zefania::read(&z.src)?;
    let verses = match z.book_code {
        Some(code) => zefania::extract_book(&xml, code, &book_name(code, &z.book_name)?)?,
        None => zefania::extract_catalogue(&xml, &BOOKS)?,
    };
    let column = z
        .column
        .unwrap_or_else(|| format!("french_{}", z.version.to_lowercase()));
    let table = extract::reference_table(&verses, &column);
    table.to_path(&z.dst)?;
    info!("{} verses written to {:?}", table.len(), z.dst);
    Ok(())
}

fn run_merge(m: cli::Merge) -> Result<(), Error> {
    let mut merged = Table::from_path(&m.base)?;
    for path in &m.references {
        let reference = Table::from_path(path)?;
        let columns: Vec<&String> = reference
            .headers()
            .iter()
            .filter(|h| h.as_str() != VERSE_ID && !merged.has_column(h))
            .collect();
        info!("adding {:?} from {:?}", columns, path);
        merged = merged.left_join(&reference, &columns)?;
    }
    merged.to_path(&m.dst)
}

fn run_clean(c: cli::Clean) -> Result<(), Error> {
    let table = Table::from_path(&c.src)?;
    let (cleaned, removed, _) = processing::clean(&table, &c.source_col, &c.target_col)?;
    cleaned.to_path(&c.dst)?;
    if let Some(path) = c.removed {
        removed.to_path(&path)?;
    }
    Ok(())
}

fn run_romanize(r: cli::Romanize) -> Result<(), Error> {
    let mut table = Table::from_path(&r.src)?;
    let output = r
        .output_col
        .unwrap_or_else(|| format!("{}_romanized", r.column));
    romanize_column(&mut table, &CopticRomanizer, &r.column, &output, r.drop_source)?;
    table.to_path(&r.dst)
}

fn run_noise(n: cli::Noise) -> Result<(), Error> {
    let table = Table::from_path(&n.src)?;
    let confusion = if n.coptic_script {
        ConfusionTable::coptic()
    } else {
        ConfusionTable::romanized()
    };
    let model = NoiseModel::new(n.substitution, n.deletion, n.swap, confusion)?;
    let levels = if n.levels.is_empty() {
        NoiseLevel::defaults()
    } else {
        n.levels
            .iter()
            .map(|level| level.parse())
            .collect::<Result<Vec<NoiseLevel>, Error>>()?
    };
    let mut rng = match n.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let stem = n
        .src
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "corpus".to_string());
    for level in &levels {
        let (noisy, _) = noisy_table(&table, &n.column, &model, level, &mut rng)?;
        noisy.to_path(&n.dst.join(format!("{}_noisy_{}.csv", stem, level.label)))?;
    }
    Ok(())
}

fn run_summarize(s: cli::Summarize) -> Result<(), Error> {
    let files = score::score_files(&s.src)?;
    if files.is_empty() {
        warn!("no score file in {:?}", s.src);
        return Ok(());
    }
    let summary = Summary::from_files(&files)?;
    for bw in summary.best_worst() {
        info!(
            "[{}/{}] best: {} ({:.4}), worst: {} ({:.4})",
            bw.model, bw.metric, bw.best_dataset, bw.best_score, bw.worst_dataset, bw.worst_score
        );
    }
    summary.write(s.dst.as_ref().unwrap_or(&s.src))
}

fn run_concat(c: cli::Concat) -> Result<(), Error> {
    let selection = Selection::from_flags(c.only_clean, c.only_noisy)?;
    let files = concat::find_files(&c.root, &c.pattern, c.version.as_deref())?;
    info!("{} files found", files.len());
    for file in &files {
        debug!("- {:?}", file);
    }
    let columns = if c.columns.is_empty() {
        concat::default_columns()
    } else {
        c.columns
    };

    let (table, report) = concat::concat_files(&files, &columns, selection)?;
    report.log();
    if table.is_empty() {
        warn!("no valid file found, nothing to merge");
        return Ok(());
    }
    table.to_path(&c.dst)
}

fn main() -> Result<(), Error> {
    env_logger::init();

    let opt = cli::CopticCorpus::from_args();
    debug!("cli args\n{:#?}", opt);

    match opt {
        cli::CopticCorpus::Extract(e) => run_extract(e),
        cli::CopticCorpus::Zefania(z) => run_zefania(z),
        cli::CopticCorpus::Merge(m) => run_merge(m),
        cli::CopticCorpus::Clean(c) => run_clean(c),
        cli::CopticCorpus::Romanize(r) => run_romanize(r),
        cli::CopticCorpus::Noise(n) => run_noise(n),
        cli::CopticCorpus::Summarize(s) => run_summarize(s),
        cli::CopticCorpus::Concat(c) => run_concat(c),
    }
}
