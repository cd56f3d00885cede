/*! Training data concatenation

Gathers corpus files found under a root folder into a single training table.
Files are found with a recursive glob, and are considered noisy when their path contains `noisy`.
Files already in a `training data` folder are never picked up again.
!*/
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use serde::Serialize;

use crate::error::Error;
use crate::io::{Table, VERSE_ID};

pub const DEFAULT_PATTERN: &str = "*_romanized.csv";
const EXCLUDED_FOLDER: &str = "training data";

/// Columns kept by default.
pub fn default_columns() -> Vec<String> {
    [VERSE_ID, "coptic_text_romanized", "french_translation"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    All,
    OnlyClean,
    OnlyNoisy,
}

impl Selection {
    pub fn from_flags(only_clean: bool, only_noisy: bool) -> Result<Self, Error> {
        match (only_clean, only_noisy) {
            (true, true) => Err(Error::Custom(
                "--only-clean and --only-noisy are mutually exclusive".to_string(),
            )),
            (true, false) => Ok(Self::OnlyClean),
            (false, true) => Ok(Self::OnlyNoisy),
            (false, false) => Ok(Self::All),
        }
    }

    fn accepts(&self, noisy: bool) -> bool {
        match self {
            Self::All => true,
            Self::OnlyClean => !noisy,
            Self::OnlyNoisy => noisy,
        }
    }
}

pub fn is_noisy(path: &Path) -> bool {
    path.to_string_lossy().to_lowercase().contains("noisy")
}

/// Files matching `**/<pattern>` under `root`, optionally restricted to paths containing `version`
/// (case insensitive).
pub fn find_files(root: &Path, pattern: &str, version: Option<&str>) -> Result<Vec<PathBuf>, Error> {
    let full_pattern = format!(
        "{}/**/{}",
        glob::Pattern::escape(&root.to_string_lossy()),
        pattern
    );
    debug!("looking for {}", full_pattern);
    let version = version.map(str::to_lowercase);

    let mut files = Vec::new();
    for path in glob::glob(&full_pattern)? {
        let path = path?;
        let normalized = path.to_string_lossy().replace('\\', "/");
        if normalized.contains(EXCLUDED_FOLDER) {
            continue;
        }
        if let Some(v) = &version {
            if !normalized.to_lowercase().contains(v.as_str()) {
                continue;
            }
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConcatReport {
    pub files_found: usize,
    pub files_used: usize,
    pub skipped_files: Vec<PathBuf>,
    pub clean_rows: usize,
    pub noisy_rows: usize,
}

impl ConcatReport {
    pub fn total_rows(&self) -> usize {
        self.clean_rows + self.noisy_rows
    }

    /// Share of clean rows, in percent.
    pub fn clean_ratio(&self) -> f64 {
        match self.total_rows() {
            0 => 0.0,
            total => self.clean_rows as f64 / total as f64 * 100.0,
        }
    }

    pub fn log(&self) {
        info!(
            "{} files found, {} used, {} skipped",
            self.files_found,
            self.files_used,
            self.skipped_files.len()
        );
        info!(
            "{} verses ({} clean, {} noisy), clean ratio {:.2}%",
            self.total_rows(),
            self.clean_rows,
            self.noisy_rows,
            self.clean_ratio()
        );
    }
}

/// Stack `columns` of every selected file.
///
/// Files lacking a column, or that can't be read, are logged and skipped.
pub fn concat_files<S: AsRef<str>>(
    files: &[PathBuf],
    columns: &[S],
    selection: Selection,
) -> Result<(Table, ConcatReport), Error> {
    let mut report = ConcatReport {
        files_found: files.len(),
        ..Default::default()
    };
    let mut tables = Vec::new();

    for file in files {
        let noisy = is_noisy(file);
        if !selection.accepts(noisy) {
            debug!("{:?} left out ({:?})", file, selection);
            continue;
        }
        let table = match Table::from_path(file) {
            Ok(t) => t,
            Err(e) => {
                error!("error reading {:?}: {}", file, e);
                report.skipped_files.push(file.clone());
                continue;
            }
        };
        if let Some(missing) = columns.iter().find(|c| !table.has_column(c.as_ref())) {
            warn!("{:?} has no {} column, skipped", file, missing.as_ref());
            report.skipped_files.push(file.clone());
            continue;
        }
        if noisy {
            report.noisy_rows += table.len();
        } else {
            report.clean_rows += table.len();
        }
        report.files_used += 1;
        tables.push(table);
    }

    let stacked = Table::concat(&tables, columns)?;
    Ok((stacked, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    const GOOD: &str = "verse_id,coptic_text_romanized,french_translation,extra\nMark 1.1,tarkhe,Commencement,x\n";
    const NOISY: &str = "verse_id,coptic_text_romanized,french_translation\nMark 1.1,t[]rkhe,Commencement\nMark 1.2,ouerme,Voix\n";

    fn corpus() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("segond/mark_segond_romanized.csv"), GOOD);
        write(&root.join("segond/mark_segond_noisy_10_romanized.csv"), NOISY);
        write(&root.join("darby/mark_darby_romanized.csv"), GOOD);
        write(
            &root.join("darby/broken_romanized.csv"),
            "verse_id,coptic_text_romanized\nMark 1.1,x\n",
        );
        write(&root.join("training data/train_romanized.csv"), GOOD);
        write(&root.join("segond/mark_segond.csv"), GOOD);
        dir
    }

    #[test]
    fn finds_files() {
        let dir = corpus();
        let files = find_files(dir.path(), DEFAULT_PATTERN, None).unwrap();
        assert_eq!(files.len(), 4);
        assert!(files
            .iter()
            .all(|f| !f.to_string_lossy().contains("training data")));

        let segond = find_files(dir.path(), DEFAULT_PATTERN, Some("SEGOND")).unwrap();
        assert_eq!(segond.len(), 2);
    }

    #[test]
    fn merges_and_counts() {
        let dir = corpus();
        let files = find_files(dir.path(), DEFAULT_PATTERN, None).unwrap();
        let (table, report) = concat_files(&files, &default_columns(), Selection::All).unwrap();
        assert_eq!(table.headers(), default_columns().as_slice());
        assert_eq!(table.len(), 4);
        assert_eq!(report.files_used, 3);
        assert_eq!(report.skipped_files.len(), 1);
        assert_eq!(report.clean_rows, 2);
        assert_eq!(report.noisy_rows, 2);
        assert!((report.clean_ratio() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn selections() {
        let dir = corpus();
        let files = find_files(dir.path(), DEFAULT_PATTERN, None).unwrap();

        let (_, clean) = concat_files(&files, &default_columns(), Selection::OnlyClean).unwrap();
        assert_eq!((clean.clean_rows, clean.noisy_rows), (2, 0));

        let (_, noisy) = concat_files(&files, &default_columns(), Selection::OnlyNoisy).unwrap();
        assert_eq!((noisy.clean_rows, noisy.noisy_rows), (0, 2));

        assert!(Selection::from_flags(true, true).is_err());
    }
}
