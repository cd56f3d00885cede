//! Verse tables.
//!
//! Every file produced by the pipeline is a CSV file with a header row and a
//! `verse_id` column used as the join key between corpora, reference translations,
//! generated translations and scores.
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;

use log::debug;

use crate::error::Error;

pub const VERSE_ID: &str = "verse_id";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: AsRef<str>>(headers: &[S]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.as_ref().to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .enumerate()
            // files written with a BOM
            .map(|(idx, h)| match idx {
                0 => h.trim_start_matches('\u{feff}').to_string(),
                _ => h.to_string(),
            })
            .collect();

        let mut table = Self {
            headers,
            rows: Vec::new(),
        };
        for record in reader.records() {
            let record = record?;
            table.push_row(record.iter().map(String::from).collect());
        }
        Ok(table)
    }

    pub fn from_path(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            return Err(Error::MissingFile(path.to_path_buf()));
        }
        debug!("reading table {:?}", path);
        Self::from_reader(std::fs::File::open(path)?)
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(&self.headers)?;
        for row in &self.rows {
            out.write_record(row)?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn to_path(&self, path: &Path) -> Result<(), Error> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        debug!("writing {} rows to {:?}", self.len(), path);
        self.to_writer(std::fs::File::create(path)?)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    pub fn column_index(&self, name: &str) -> Result<usize, Error> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }

    /// Push a row, padding it with empty cells (or truncating it) to the header width.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn column(&self, name: &str) -> Result<Vec<&str>, Error> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// Keep `columns`, in that order.
    pub fn select<S: AsRef<str>>(&self, columns: &[S]) -> Result<Table, Error> {
        let indices = columns
            .iter()
            .map(|c| self.column_index(c.as_ref()))
            .collect::<Result<Vec<_>, Error>>()?;
        let mut table = Table::new(columns);
        for row in &self.rows {
            table.push_row(indices.iter().map(|idx| row[*idx].clone()).collect());
        }
        Ok(table)
    }

    /// Add a column, or replace it if it already exists.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) -> Result<(), Error> {
        if values.len() != self.rows.len() {
            return Err(Error::Custom(format!(
                "column {:?} has {} values for {} rows",
                name,
                values.len(),
                self.rows.len()
            )));
        }
        let idx = match self.column_index(name) {
            Ok(idx) => idx,
            Err(_) => {
                self.headers.push(name.to_string());
                self.rows.iter_mut().for_each(|row| row.push(String::new()));
                self.headers.len() - 1
            }
        };
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[idx] = value;
        }
        Ok(())
    }

    pub fn drop_column(&mut self, name: &str) -> Result<(), Error> {
        let idx = self.column_index(name)?;
        self.headers.remove(idx);
        self.rows.iter_mut().for_each(|row| {
            row.remove(idx);
        });
        Ok(())
    }

    /// Rewrite every cell of `name` in place.
    pub fn map_column<F>(&mut self, name: &str, mut f: F) -> Result<(), Error>
    where
        F: FnMut(&str) -> String,
    {
        let idx = self.column_index(name)?;
        for row in &mut self.rows {
            row[idx] = f(&row[idx]);
        }
        Ok(())
    }

    pub fn filter_rows<F>(&self, pred: F) -> Table
    where
        F: FnMut(&[String]) -> bool,
    {
        self.partition(pred).0
    }

    /// Split rows between those matching `pred` and the others.
    pub fn partition<F>(&self, mut pred: F) -> (Table, Table)
    where
        F: FnMut(&[String]) -> bool,
    {
        let (kept, removed): (Vec<_>, Vec<_>) =
            self.rows.iter().cloned().partition(|row| pred(row));
        (
            Table {
                headers: self.headers.clone(),
                rows: kept,
            },
            Table {
                headers: self.headers.clone(),
                rows: removed,
            },
        )
    }

    /// Add `columns` of `other` to each row, matched on `verse_id`.
    ///
    /// Rows of `self` are all kept, in order. Rows without a match get empty cells.
    /// If `other` has several rows with the same id, the first one is used.
    pub fn left_join<S: AsRef<str>>(&self, other: &Table, columns: &[S]) -> Result<Table, Error> {
        let key = self.column_index(VERSE_ID)?;
        let other_key = other.column_index(VERSE_ID)?;
        let indices = columns
            .iter()
            .map(|c| other.column_index(c.as_ref()))
            .collect::<Result<Vec<_>, Error>>()?;

        let mut lookup: HashMap<&str, &Vec<String>> = HashMap::with_capacity(other.len());
        for row in &other.rows {
            lookup.entry(row[other_key].as_str()).or_insert(row);
        }

        let mut headers = self.headers.clone();
        headers.extend(columns.iter().map(|c| c.as_ref().to_string()));
        let mut joined = Table {
            headers,
            rows: Vec::with_capacity(self.len()),
        };
        for row in &self.rows {
            let mut new_row = row.clone();
            match lookup.get(row[key].as_str()) {
                Some(other_row) => {
                    new_row.extend(indices.iter().map(|idx| other_row[*idx].clone()))
                }
                None => new_row.extend(indices.iter().map(|_| String::new())),
            }
            joined.push_row(new_row);
        }
        Ok(joined)
    }

    /// Join tables on `verse_id`, keeping every id.
    ///
    /// Ids appear in first-seen order (tables in order, then rows in order).
    /// A column present in several tables is filled by the first table that has a value for it.
    pub fn outer_join(tables: &[Table]) -> Result<Table, Error> {
        let mut headers: Vec<String> = vec![VERSE_ID.to_string()];
        for table in tables {
            table.column_index(VERSE_ID)?;
            for h in table.headers() {
                if !headers.contains(h) {
                    headers.push(h.clone());
                }
            }
        }
        let positions: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(idx, h)| (h.as_str(), idx))
            .collect();

        let mut ids: HashMap<String, usize> = HashMap::new();
        let mut rows: Vec<Vec<String>> = Vec::new();
        for table in tables {
            let key = table.column_index(VERSE_ID)?;
            for row in &table.rows {
                let id = &row[key];
                let row_idx = *ids.entry(id.clone()).or_insert_with(|| {
                    rows.push(vec![String::new(); headers.len()]);
                    rows.len() - 1
                });
                for (h, value) in table.headers.iter().zip(row) {
                    let cell = &mut rows[row_idx][positions[h.as_str()]];
                    if cell.is_empty() {
                        *cell = value.clone();
                    }
                }
            }
        }
        Ok(Table { headers, rows })
    }

    /// Stack tables, keeping `columns`.
    pub fn concat<S: AsRef<str>>(tables: &[Table], columns: &[S]) -> Result<Table, Error> {
        let mut stacked = Table::new(columns);
        for table in tables {
            stacked.rows.extend(table.select(columns)?.rows);
        }
        Ok(stacked)
    }
}
