//! Reading labels from text and CSV sources

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use crate::error::{DedupError, DedupResult};

/// Where labels come from within an input document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LabelSource {
    /// One label per line; blank lines are skipped
    #[default]
    Lines,
    /// One CSV column, selected by header name
    CsvColumn(String),
}

/// Read one label per line.
pub fn read_lines<R: BufRead>(reader: R) -> DedupResult<Vec<String>> {
    let mut labels = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if !line.trim().is_empty() {
            labels.push(line);
        }
    }
    Ok(labels)
}

/// Read every value of the column named `column` from a CSV document with
/// a header row. Empty cells are kept as empty labels.
pub fn read_csv_column<R: Read>(reader: R, column: &str) -> DedupResult<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| DedupError::InvalidInput(e.to_string()))?;
    let index = headers
        .iter()
        .position(|header| header.trim() == column)
        .ok_or_else(|| DedupError::InvalidInput(format!("Column not found: {}", column)))?;

    let mut labels = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.map_err(|e| DedupError::InvalidInput(e.to_string()))?;
        let value = record.get(index).ok_or_else(|| {
            DedupError::InvalidInput(format!("Row {} has no column {}", row + 1, column))
        })?;
        labels.push(value.to_string());
    }
    Ok(labels)
}

/// Read labels from a file, or from stdin when `path` is `None`.
pub fn read_labels(path: Option<&Path>, source: &LabelSource) -> DedupResult<Vec<String>> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .map_err(|e| DedupError::Io(format!("{}: {}", path.display(), e)))?;
            read_from(BufReader::new(file), source)
        }
        None => read_from(io::stdin().lock(), source),
    }
}

fn read_from<R: BufRead>(reader: R, source: &LabelSource) -> DedupResult<Vec<String>> {
    match source {
        LabelSource::Lines => read_lines(reader),
        LabelSource::CsvColumn(column) => read_csv_column(reader, column),
    }
}
