//! Translation models interface and multi-model runner.
//!
//! Models are not bundled: anything implementing [Translate] can be run.
//! Each model gets its own rayon task, and results are merged on `verse_id` afterwards.
use log::{error, info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::error::Error;
use crate::io::{Table, VERSE_ID};

pub const OUTPUT_PREFIX: &str = "generated_translation_";

pub trait Translate: Sync {
    fn name(&self) -> &str;

    /// Called once before translating anything. A failure here disables the model.
    fn load(&self) -> Result<(), Error> {
        Ok(())
    }

    fn translate(&self, text: &str, src_lang: &str, tgt_lang: &str) -> Result<String, Error>;
}

/// Source and target languages, as understood by the models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl LanguagePair {
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}

pub fn output_column(model: &str) -> String {
    format!("{OUTPUT_PREFIX}{model}")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModelReport {
    pub model: String,
    pub translated: usize,
    pub failed_rows: usize,
    /// Set when the model could not be used at all.
    pub failure: Option<String>,
}

/// Translate `source_column` of `table` with one model.
///
/// Returns a `verse_id` + output column table. Rows that fail are left empty.
pub fn translate_table<T: Translate + ?Sized>(
    model: &T,
    table: &Table,
    source_column: &str,
    languages: &LanguagePair,
) -> Result<(Table, ModelReport), Error> {
    let ids = table.column(VERSE_ID)?;
    let texts = table.column(source_column)?;
    model.load()?;

    let mut report = ModelReport {
        model: model.name().to_string(),
        ..Default::default()
    };
    let column = output_column(model.name());
    let mut out = Table::new(&[VERSE_ID, column.as_str()]);
    for (id, text) in ids.into_iter().zip(texts) {
        let translation = match model.translate(text, &languages.source, &languages.target) {
            Ok(t) => {
                report.translated += 1;
                t
            }
            Err(e) => {
                warn!("[{}] failed on {}: {}", model.name(), id, e);
                report.failed_rows += 1;
                String::new()
            }
        };
        out.push_row(vec![id.to_string(), translation]);
    }
    Ok((out, report))
}

/// Run every model on `table` in parallel, and add one output column per model.
///
/// A model that fails is logged and reported, and gets no column.
pub fn run_models(
    models: &[Box<dyn Translate>],
    table: &Table,
    source_column: &str,
    languages: &LanguagePair,
) -> Result<(Table, Vec<ModelReport>), Error> {
    // fail early rather than once per model
    table.column_index(VERSE_ID)?;
    table.column_index(source_column)?;

    let results: Vec<(String, Result<(Table, ModelReport), Error>)> = models
        .par_iter()
        .map(|model| {
            info!("[{}] translating {} verses", model.name(), table.len());
            (
                model.name().to_string(),
                translate_table(model.as_ref(), table, source_column, languages),
            )
        })
        .collect();

    let mut tables = vec![table.clone()];
    let mut reports = Vec::with_capacity(results.len());
    for (name, result) in results {
        match result {
            Ok((t, report)) => {
                info!(
                    "[{}] {} translated, {} failed",
                    name, report.translated, report.failed_rows
                );
                tables.push(t);
                reports.push(report);
            }
            Err(e) => {
                error!("[{}] model failed: {}", name, e);
                reports.push(ModelReport {
                    model: name,
                    failure: Some(e.to_string()),
                    ..Default::default()
                });
            }
        }
    }

    Ok((Table::outer_join(&tables)?, reports))
}
