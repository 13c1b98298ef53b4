//! Raw CSV ingestion into an untyped table of named columns

use crate::error::{Result, SegmentError};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Header row plus string cells, as read from the input stream
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table, checking that every row matches the header width
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if let Some((line, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(SegmentError::Parse(format!(
                "row {} has {} fields, expected {}",
                line + 1,
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by exact name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Same cells under new column names; `columns` must have the same width
    pub fn with_columns(&self, columns: Vec<String>) -> Result<Self> {
        if columns.len() != self.columns.len() {
            return Err(SegmentError::Parse(format!(
                "expected {} column names, got {}",
                self.columns.len(),
                columns.len()
            )));
        }
        Ok(Self {
            columns,
            rows: self.rows.clone(),
        })
    }
}

/// Decode ISO-8859-1 bytes: each byte is the code point of the same value
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Parse a Latin-1 encoded, comma-separated stream with a header row
pub fn read_table<R: Read>(mut reader: R) -> Result<Table> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    parse_table(&bytes)
}

/// Load a transactions file from disk
pub fn load_table(path: &Path) -> Result<Table> {
    let file = File::open(path)?;
    let table = read_table(file)?;
    debug!(
        path = %path.display(),
        rows = table.height(),
        columns = table.columns().len(),
        "loaded input table"
    );
    Ok(table)
}

fn parse_table(bytes: &[u8]) -> Result<Table> {
    let text = decode_latin1(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| SegmentError::Parse(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();

    if columns.is_empty() || columns.iter().all(|c| c.trim().is_empty()) {
        return Err(SegmentError::Parse("no columns to parse from input".to_string()));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| SegmentError::Parse(e.to_string()))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Table::new(columns, rows)
}
