//! Command line arguments and parameters management/parsing.
use std::path::PathBuf;

use coptic_corpus::align::Pairing;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "coptic-corpus", about = "Coptic parallel corpus preparation.")]
/// Holds every command that is callable by the `coptic-corpus` command.
pub enum CopticCorpus {
    #[structopt(about = "Extract a verse-aligned corpus from Scriptorium chapter folders")]
    Extract(Extract),
    #[structopt(about = "Extract verses from a Zefania XML Bible")]
    Zefania(Zefania),
    #[structopt(about = "Add the columns of reference tables to a corpus, by verse id")]
    Merge(Merge),
    #[structopt(about = "Remove lacunar and untranslated verses")]
    Clean(Clean),
    #[structopt(about = "Add a romanized copy of a Coptic column")]
    Romanize(Romanize),
    #[structopt(about = "Generate noisy copies of a corpus")]
    Noise(Noise),
    #[structopt(about = "Summarize metric score files")]
    Summarize(Summarize),
    #[structopt(about = "Concatenate corpus files into training data")]
    Concat(Concat),
}

#[derive(Debug, StructOpt)]
/// Extract command and parameters.
///
/// Without `--book-code`, every book of `--testament` is extracted.
pub struct Extract {
    #[structopt(parse(from_os_str), help = "folder holding the chapter folders")]
    pub root: PathBuf,
    #[structopt(parse(from_os_str), help = "destination csv file")]
    pub dst: PathBuf,
    #[structopt(long = "book-code", help = "code of a single book to extract")]
    pub book_code: Option<u32>,
    #[structopt(
        long = "book-name",
        help = "display name of the book, defaults to the catalogue name"
    )]
    pub book_name: Option<String>,
    #[structopt(long = "prefix", help = "chapter folder prefix, like 41_Mark_")]
    pub prefix: Option<String>,
    #[structopt(
        long = "testament",
        default_value = "all",
        help = "books to extract: old, new, deuterocanonical or all"
    )]
    pub testament: String,
    #[structopt(
        long = "pairing",
        default_value = "same-span",
        help = "same-span, token-overlap or source-only"
    )]
    pub pairing: Pairing,
    #[structopt(
        long = "translation-only",
        help = "only extract translations, from verse and translation layers"
    )]
    pub translation_only: bool,
    #[structopt(long = "source-col", default_value = "coptic_text")]
    pub source_col: String,
    #[structopt(long = "translation-col", default_value = "english_translation")]
    pub translation_col: String,
    #[structopt(
        parse(from_os_str),
        long = "summary",
        help = "write the run summary as json"
    )]
    pub summary: Option<PathBuf>,
}

#[derive(Debug, StructOpt)]
pub struct Zefania {
    #[structopt(parse(from_os_str), help = "Zefania xml file")]
    pub src: PathBuf,
    #[structopt(parse(from_os_str), help = "destination csv file")]
    pub dst: PathBuf,
    #[structopt(long = "book-code", help = "Zefania book number. All books if absent")]
    pub book_code: Option<u32>,
    #[structopt(long = "book-name", help = "verse id book name")]
    pub book_name: Option<String>,
    #[structopt(long = "version", default_value = "segond", help = "Bible version")]
    pub version: String,
    #[structopt(long = "column", help = "text column, defaults to french_<version>")]
    pub column: Option<String>,
}

#[derive(Debug, StructOpt)]
pub struct Merge {
    #[structopt(parse(from_os_str), help = "corpus csv file")]
    pub base: PathBuf,
    #[structopt(parse(from_os_str), help = "destination csv file")]
    pub dst: PathBuf,
    #[structopt(parse(from_os_str), required = true, help = "reference csv files")]
    pub references: Vec<PathBuf>,
}

#[derive(Debug, StructOpt)]
pub struct Clean {
    #[structopt(parse(from_os_str), help = "corpus csv file")]
    pub src: PathBuf,
    #[structopt(parse(from_os_str), help = "cleaned corpus destination")]
    pub dst: PathBuf,
    #[structopt(parse(from_os_str), long = "removed", help = "removed verses destination")]
    pub removed: Option<PathBuf>,
    #[structopt(long = "source-col", default_value = "coptic_text")]
    pub source_col: String,
    #[structopt(long = "target-col", default_value = "french_translation")]
    pub target_col: String,
}

#[derive(Debug, StructOpt)]
pub struct Romanize {
    #[structopt(parse(from_os_str), help = "corpus csv file")]
    pub src: PathBuf,
    #[structopt(parse(from_os_str), help = "destination csv file")]
    pub dst: PathBuf,
    #[structopt(long = "column", default_value = "coptic_text")]
    pub column: String,
    #[structopt(long = "output-col", help = "defaults to <column>_romanized")]
    pub output_col: Option<String>,
    #[structopt(short = "d", long = "drop-source", help = "remove the Coptic column")]
    pub drop_source: bool,
}

#[derive(Debug, StructOpt)]
/// Noise command and parameters.
///
/// Writes `<dst>/<stem>_noisy_<label>.csv` for each level.
pub struct Noise {
    #[structopt(parse(from_os_str), help = "corpus csv file")]
    pub src: PathBuf,
    #[structopt(parse(from_os_str), help = "destination folder")]
    pub dst: PathBuf,
    #[structopt(long = "column", default_value = "coptic_text_romanized")]
    pub column: String,
    #[structopt(long = "substitution", default_value = "0.1")]
    pub substitution: f64,
    #[structopt(long = "deletion", default_value = "0.02")]
    pub deletion: f64,
    #[structopt(long = "swap", default_value = "0.02")]
    pub swap: f64,
    #[structopt(
        long = "level",
        help = "<label>:<ratio> of verses to corrupt. Defaults to 10:0.1 30:0.3 50:0.5 100:1"
    )]
    pub levels: Vec<String>,
    #[structopt(long = "coptic-script", help = "use the Coptic script confusion table")]
    pub coptic_script: bool,
    #[structopt(long = "seed", help = "random seed, for reproducible noise")]
    pub seed: Option<u64>,
}

#[derive(Debug, StructOpt)]
pub struct Summarize {
    #[structopt(
        parse(from_os_str),
        help = "folder of *_other_scores.csv and *_bleurt.csv files"
    )]
    pub src: PathBuf,
    #[structopt(parse(from_os_str), help = "destination folder. Defaults to src")]
    pub dst: Option<PathBuf>,
}

#[derive(Debug, StructOpt)]
pub struct Concat {
    #[structopt(parse(from_os_str), help = "root folder of the corpus files")]
    pub root: PathBuf,
    #[structopt(parse(from_os_str), help = "destination csv file")]
    pub dst: PathBuf,
    #[structopt(long = "pattern", default_value = "*_romanized.csv")]
    pub pattern: String,
    #[structopt(long = "version", help = "only keep files of a Bible version")]
    pub version: Option<String>,
    #[structopt(long = "only-clean", conflicts_with = "only-noisy")]
    pub only_clean: bool,
    #[structopt(long = "only-noisy")]
    pub only_noisy: bool,
    #[structopt(long = "column", help = "columns to keep")]
    pub columns: Vec<String>,
}
