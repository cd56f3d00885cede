//! Corpus clean-up.
//!
//! Removes verses that can't be used for training (lacunar source, missing target) and strips
//! the biblical reference some editions put at the start of a verse, like `(1:2) `.
use lazy_static::lazy_static;
use log::info;
use regex::Regex;
use serde::Serialize;

use crate::error::Error;
use crate::io::Table;

/// Source text of a fully lacunar verse.
pub const LACUNA: &str = "[...]";

lazy_static! {
    static ref LEADING_REFERENCE: Regex = Regex::new(r"^\(\s*[\d.:]+\s*\)\s*").unwrap();
}

/// Removal counts. A row can be counted in both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    pub lacunar_source: usize,
    pub missing_target: usize,
    pub remaining: usize,
}

pub fn strip_reference(text: &str) -> String {
    LEADING_REFERENCE.replace(text, "").into_owned()
}

/// Split `table` into cleaned and removed rows.
///
/// Only kept rows have their target stripped of a leading reference.
pub fn clean(
    table: &Table,
    source_column: &str,
    target_column: &str,
) -> Result<(Table, Table, CleanReport), Error> {
    let source = table.column_index(source_column)?;
    let target = table.column_index(target_column)?;

    let mut report = CleanReport::default();
    let (mut kept, removed) = table.partition(|row| {
        let lacunar = row[source].trim() == LACUNA;
        let missing = row[target].trim().is_empty();
        report.lacunar_source += lacunar as usize;
        report.missing_target += missing as usize;
        !(lacunar || missing)
    });
    kept.map_column(target_column, strip_reference)?;
    report.remaining = kept.len();

    info!(
        "removed {} verses ({} lacunar, {} without target), {} remaining",
        removed.len(),
        report.lacunar_source,
        report.missing_target,
        report.remaining
    );
    Ok((kept, removed, report))
}
