//! Metric scores.
//!
//! Metrics are computed elsewhere, through [Score]. This module checks their output and
//! aggregates score files into summary tables.
//!
//! Score columns are named `<metric>_<x>_<y>_<model>`, like `bleurt_score_generated_translation_helsinki`.
//! Score file stems say which dataset was scored (`..._noisy_30_...`, `..._clean_...`).
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::{debug, info};
use serde::Serialize;

use crate::error::Error;
use crate::io::Table;

pub const METRIC_PREFIXES: [&str; 4] = ["bleurt_", "meteor_", "bertscore_", "comet_"];
pub const UNKNOWN_MODEL: &str = "unknown_model";
pub const BEST_MARKER: &str = " 🏆";

pub trait Score {
    fn name(&self) -> &str;

    /// One score per candidate, in order.
    fn score(&self, candidates: &[&str], references: &[&str]) -> Result<Vec<f64>, Error>;
}

/// Run `scorer`, checking that there is exactly one score per candidate.
pub fn score_checked<S: Score + ?Sized>(
    scorer: &S,
    candidates: &[&str],
    references: &[&str],
) -> Result<Vec<f64>, Error> {
    if candidates.len() != references.len() {
        return Err(Error::Custom(format!(
            "{} candidates for {} references",
            candidates.len(),
            references.len()
        )));
    }
    let scores = scorer.score(candidates, references)?;
    if scores.len() != candidates.len() {
        return Err(Error::Custom(format!(
            "{} returned {} scores for {} candidates",
            scorer.name(),
            scores.len(),
            candidates.len()
        )));
    }
    Ok(scores)
}

/// Metric and model of a score column, if it is one.
pub fn parse_score_column(column: &str) -> Option<(String, String)> {
    if !METRIC_PREFIXES.iter().any(|p| column.starts_with(p)) {
        return None;
    }
    let parts: Vec<&str> = column.split('_').collect();
    let model = if parts.len() > 3 {
        parts[3..].join("_")
    } else {
        UNKNOWN_MODEL.to_string()
    };
    Some((parts[0].to_string(), model))
}

/// Dataset of a score file, from its stem.
pub fn dataset_label(stem: &str) -> &'static str {
    // noisy_10 is a prefix of noisy_100
    ["noisy_100", "noisy_50", "noisy_30", "noisy_10", "clean"]
        .iter()
        .find(|label| stem.contains(*label))
        .copied()
        .unwrap_or("unknown")
}

/// Mean of the numeric cells, if any.
pub fn column_mean(values: &[&str]) -> Option<f64> {
    let numbers: Vec<f64> = values
        .iter()
        .filter_map(|v| v.trim().parse::<f64>().ok())
        .filter(|v| !v.is_nan())
        .collect();
    match numbers.len() {
        0 => None,
        n => Some(numbers.iter().sum::<f64>() / n as f64),
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Average of a score column on a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreEntry {
    pub metric: String,
    pub dataset: String,
    pub model: String,
    pub avg_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestWorst {
    pub model: String,
    pub metric: String,
    pub best_dataset: String,
    pub best_score: f64,
    pub worst_dataset: String,
    pub worst_score: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Summary {
    entries: Vec<ScoreEntry>,
}

impl Summary {
    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    /// Add the score columns of `table`. Columns without any numeric cell are ignored.
    pub fn add_table(&mut self, table: &Table, dataset: &str) -> Result<(), Error> {
        for header in table.headers() {
            if let Some((metric, model)) = parse_score_column(header) {
                match column_mean(&table.column(header)?) {
                    Some(avg_score) => self.entries.push(ScoreEntry {
                        metric,
                        dataset: dataset.to_string(),
                        model,
                        avg_score,
                    }),
                    None => debug!("{} has no numeric value", header),
                }
            }
        }
        Ok(())
    }

    pub fn from_files(files: &[PathBuf]) -> Result<Self, Error> {
        let mut summary = Self::default();
        for file in files {
            let stem = file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let dataset = dataset_label(&stem);
            info!("{:?}: {}", file, dataset);
            summary.add_table(&Table::from_path(file)?, dataset)?;
        }
        Ok(summary)
    }

    fn metrics(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|e| e.metric.as_str())
            .sorted()
            .dedup()
            .collect()
    }

    /// Mean of entries grouped by `key`.
    fn grouped_means<'a, K, F>(&'a self, key: F) -> BTreeMap<K, f64>
    where
        K: Ord,
        F: Fn(&'a ScoreEntry) -> K,
    {
        let mut sums: BTreeMap<K, (f64, usize)> = BTreeMap::new();
        for entry in &self.entries {
            let sum = sums.entry(key(entry)).or_insert((0.0, 0));
            sum.0 += entry.avg_score;
            sum.1 += 1;
        }
        sums.into_iter()
            .map(|(k, (sum, n))| (k, sum / n as f64))
            .collect()
    }

    /// Mean score of every (model, metric) over all datasets.
    pub fn global(&self) -> BTreeMap<(&str, &str), f64> {
        self.grouped_means(|e| (e.model.as_str(), e.metric.as_str()))
    }

    /// `model` × metric table, rounded. The best model of each metric is marked.
    pub fn global_table(&self) -> Table {
        let metrics = self.metrics();
        let global: BTreeMap<(&str, &str), f64> = self
            .global()
            .into_iter()
            .map(|(k, v)| (k, round4(v)))
            .collect();

        let mut best: BTreeMap<&str, (&str, f64)> = BTreeMap::new();
        for (&(model, metric), &score) in &global {
            match best.get(metric) {
                Some((_, top)) if *top >= score => (),
                _ => {
                    best.insert(metric, (model, score));
                }
            }
        }

        let mut headers = vec!["model"];
        headers.extend(metrics.iter());
        let mut table = Table::new(&headers[..]);
        for model in global.keys().map(|(model, _)| *model).dedup() {
            let mut row = vec![model.to_string()];
            for metric in &metrics {
                let cell = match global.get(&(model, *metric)) {
                    Some(score) if best.get(metric).map(|b| b.0) == Some(model) => {
                        format!("{score}{BEST_MARKER}")
                    }
                    Some(score) => score.to_string(),
                    None => String::new(),
                };
                row.push(cell);
            }
            table.push_row(row);
        }
        table
    }

    /// (`dataset`, `model`) × metric table, rounded.
    pub fn detailed_table(&self) -> Table {
        let metrics = self.metrics();
        let detailed = self.grouped_means(|e| (e.dataset.as_str(), e.model.as_str(), e.metric.as_str()));

        let mut headers = vec!["dataset", "model"];
        headers.extend(metrics.iter());
        let mut table = Table::new(&headers[..]);
        for (dataset, model) in detailed.keys().map(|(d, m, _)| (*d, *m)).dedup() {
            let mut row = vec![dataset.to_string(), model.to_string()];
            row.extend(metrics.iter().map(|metric| {
                detailed
                    .get(&(dataset, model, *metric))
                    .map(|s| round4(*s).to_string())
                    .unwrap_or_default()
            }));
            table.push_row(row);
        }
        table
    }

    /// Best and worst dataset of each (model, metric). Ties go to the first entry.
    pub fn best_worst(&self) -> Vec<BestWorst> {
        let mut groups: BTreeMap<(&str, &str), Vec<&ScoreEntry>> = BTreeMap::new();
        for entry in &self.entries {
            groups
                .entry((entry.model.as_str(), entry.metric.as_str()))
                .or_default()
                .push(entry);
        }

        groups
            .into_iter()
            .filter_map(|((model, metric), entries)| {
                let first = *entries.first()?;
                let (best, worst) = entries.iter().fold((first, first), |(best, worst), &e| {
                    (
                        if e.avg_score > best.avg_score { e } else { best },
                        if e.avg_score < worst.avg_score { e } else { worst },
                    )
                });
                Some(BestWorst {
                    model: model.to_string(),
                    metric: metric.to_string(),
                    best_dataset: best.dataset.clone(),
                    best_score: best.avg_score,
                    worst_dataset: worst.dataset.clone(),
                    worst_score: worst.avg_score,
                })
            })
            .collect()
    }

    pub fn best_worst_table(&self) -> Table {
        let mut table = Table::new(&[
            "model",
            "metric",
            "best_dataset",
            "best_score",
            "worst_dataset",
            "worst_score",
        ]);
        for bw in self.best_worst() {
            table.push_row(vec![
                bw.model,
                bw.metric,
                bw.best_dataset,
                bw.best_score.to_string(),
                bw.worst_dataset,
                bw.worst_score.to_string(),
            ]);
        }
        table
    }

    /// Write the three summary files in `dir`.
    pub fn write(&self, dir: &Path) -> Result<(), Error> {
        self.global_table()
            .to_path(&dir.join("summary_best_model_per_metric.csv"))?;
        self.detailed_table()
            .to_path(&dir.join("detailed_model_performance_per_dataset.csv"))?;
        self.best_worst_table()
            .to_path(&dir.join("best_worst_dataset_per_model_metric.csv"))?;
        Ok(())
    }
}

/// Score files of `dir`: `*_other_scores.csv` and `*_bleurt.csv`.
pub fn score_files(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let dir = glob::Pattern::escape(&dir.to_string_lossy());
    let mut files = Vec::new();
    for pattern in ["*_other_scores.csv", "*_bleurt.csv"] {
        for path in glob::glob(&format!("{dir}/{pattern}"))? {
            files.push(path?);
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Length;
    impl Score for Length {
        fn name(&self) -> &str {
            "length"
        }
        fn score(&self, candidates: &[&str], _: &[&str]) -> Result<Vec<f64>, Error> {
            Ok(candidates.iter().map(|c| c.len() as f64).collect())
        }
    }

    struct Broken;
    impl Score for Broken {
        fn name(&self) -> &str {
            "broken"
        }
        fn score(&self, _: &[&str], _: &[&str]) -> Result<Vec<f64>, Error> {
            Ok(vec![1.0])
        }
    }

    fn scores(columns: &[&str], rows: &[&[&str]]) -> Table {
        let mut headers = vec!["verse_id"];
        headers.extend(columns);
        let mut t = Table::new(&headers[..]);
        for (idx, row) in rows.iter().enumerate() {
            let mut r = vec![format!("Mark 1.{}", idx + 1)];
            r.extend(row.iter().map(|c| c.to_string()));
            t.push_row(r);
        }
        t
    }

    #[test]
    fn checked_scores() {
        assert_eq!(score_checked(&Length, &["ab", "c"], &["x", "y"]).unwrap(), vec![2.0, 1.0]);
        assert!(score_checked(&Length, &["ab"], &["x", "y"]).is_err());
        assert!(score_checked(&Broken, &["a", "b"], &["x", "y"]).is_err());
    }

    #[test]
    fn score_columns() {
        assert_eq!(
            parse_score_column("bleurt_score_generated_helsinki"),
            Some(("bleurt".to_string(), "helsinki".to_string()))
        );
        assert_eq!(
            parse_score_column("comet_score_gen_opus_mt_fr"),
            Some(("comet".to_string(), "opus_mt_fr".to_string()))
        );
        assert_eq!(
            parse_score_column("meteor_score"),
            Some(("meteor".to_string(), UNKNOWN_MODEL.to_string()))
        );
        assert_eq!(parse_score_column("french_translation"), None);
        assert_eq!(parse_score_column("bleu_score_x_y"), None);
    }

    #[test]
    fn datasets() {
        assert_eq!(dataset_label("generated_translations_exp_4_hiero_noisy_100_bleurt"), "noisy_100");
        assert_eq!(dataset_label("generated_translations_noisy_10_other_scores"), "noisy_10");
        assert_eq!(dataset_label("generated_translations_clean_bleurt"), "clean");
        assert_eq!(dataset_label("whatever"), "unknown");
    }

    #[test]
    fn means_ignore_text() {
        assert_eq!(column_mean(&["0.5", "x", "", "1.5"]), Some(1.0));
        assert_eq!(column_mean(&["nan", ""]), None);
    }

    fn summary() -> Summary {
        let mut summary = Summary::default();
        let clean = scores(
            &["bleurt_score_gen_a", "bleurt_score_gen_b", "meteor_score_gen_a"],
            &[&["0.5", "0.7", "0.2"], &["0.7", "0.9", "0.4"]],
        );
        let noisy = scores(
            &["bleurt_score_gen_a", "bleurt_score_gen_b", "meteor_score_gen_a"],
            &[&["0.2", "0.5", "0.6"], &["0.2", "0.5", "0.6"]],
        );
        summary.add_table(&clean, "clean").unwrap();
        summary.add_table(&noisy, "noisy_50").unwrap();
        summary
    }

    #[test]
    fn global_summary() {
        let summary = summary();
        assert_eq!(summary.entries().len(), 6);

        let global = summary.global();
        assert!((global[&("a", "bleurt")] - 0.4).abs() < 1e-9);
        assert!((global[&("b", "bleurt")] - 0.65).abs() < 1e-9);

        let table = summary.global_table();
        assert_eq!(table.headers(), &["model", "bleurt", "meteor"]);
        assert_eq!(table.column("model").unwrap(), vec!["a", "b"]);
        assert_eq!(table.column("bleurt").unwrap(), vec!["0.4", "0.65 🏆"]);
        assert_eq!(table.column("meteor").unwrap(), vec!["0.45 🏆", ""]);
    }

    #[test]
    fn detailed_summary() {
        let table = summary().detailed_table();
        assert_eq!(table.headers(), &["dataset", "model", "bleurt", "meteor"]);
        assert_eq!(table.rows()[0], vec!["clean", "a", "0.6", "0.3"]);
        assert_eq!(table.rows()[3], vec!["noisy_50", "b", "0.5", ""]);
    }

    #[test]
    fn best_and_worst() {
        let bw = summary().best_worst();
        assert_eq!(bw.len(), 3);
        assert_eq!(bw[0].model, "a");
        assert_eq!(bw[0].metric, "bleurt");
        assert_eq!(bw[0].best_dataset, "clean");
        assert_eq!(bw[0].worst_dataset, "noisy_50");
        assert_eq!(bw[1].metric, "meteor");
        assert_eq!(bw[1].best_dataset, "noisy_50");
    }

    #[test]
    fn files() {
        let dir = tempfile::tempdir().unwrap();
        let clean = scores(&["bleurt_score_gen_a"], &[&["0.5"]]);
        clean
            .to_path(&dir.path().join("gen_clean_bleurt.csv"))
            .unwrap();
        scores(&["comet_score_gen_a"], &[&["0.1"]])
            .to_path(&dir.path().join("gen_noisy_30_other_scores.csv"))
            .unwrap();
        clean.to_path(&dir.path().join("ignored.csv")).unwrap();

        let files = score_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        let summary = Summary::from_files(&files).unwrap();
        summary.write(dir.path()).unwrap();
        let written = Table::from_path(&dir.path().join("best_worst_dataset_per_model_metric.csv")).unwrap();
        assert_eq!(written.len(), 2);
    }
}
