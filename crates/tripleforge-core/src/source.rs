//! # Record Sources
//!
//! Suppliers of records for the transformer. A source is any iterator of
//! `Result<Record, ForgeError>`:
//! - `Err` with a per-record error (`InvalidRecord`) skips one record
//! - `Err` with any other error aborts the import
//!
//! Two file-backed sources are provided: delimited text with a header row,
//! and JSON documents (an array of objects, or one object per line).

use crate::{ForgeError, Record, Value};
use std::fs::File;
use std::io::Read;
use std::path::Path;

// =============================================================================
// CSV SOURCE
// =============================================================================

/// Rows of a delimited file, keyed by the header row.
///
/// Short rows yield `Value::Null` for the missing trailing fields; cells
/// beyond the header width are ignored.
pub struct CsvSource<R: Read> {
    headers: Vec<String>,
    rows: csv::StringRecordsIntoIter<R>,
}

impl CsvSource<File> {
    /// Open a delimited file.
    pub fn open(path: &Path, delimiter: u8) -> Result<Self, ForgeError> {
        let file = File::open(path)
            .map_err(|e| ForgeError::Source(format!("Open '{}': {}", path.display(), e)))?;
        Self::from_reader(file, delimiter)
    }
}

impl<R: Read> CsvSource<R> {
    /// Read delimited text from any reader. The header row is consumed here.
    pub fn from_reader(reader: R, delimiter: u8) -> Result<Self, ForgeError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        let headers = reader
            .headers()
            .map_err(|e| ForgeError::Source(format!("Read header: {}", e)))?
            .iter()
            .map(str::to_string)
            .collect();
        Ok(Self {
            headers,
            rows: reader.into_records(),
        })
    }

    /// Field names from the header row.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl<R: Read> Iterator for CsvSource<R> {
    type Item = Result<Record, ForgeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = match self.rows.next()? {
            Ok(row) => row,
            Err(e) if e.is_io_error() => {
                return Some(Err(ForgeError::Source(format!("Read row: {}", e))));
            }
            Err(e) => return Some(Err(ForgeError::InvalidRecord(e.to_string()))),
        };
        let record = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), row.get(i).map_or(Value::Null, Value::from)))
            .collect();
        Some(Ok(record))
    }
}

// =============================================================================
// JSON SOURCE
// =============================================================================

/// JSON documents, one record per top-level object.
///
/// Scalars become text (`42`, `true`), `null` becomes `Value::Null`, nested
/// arrays and objects keep their compact JSON text.
pub struct JsonSource {
    documents: std::vec::IntoIter<Result<serde_json::Value, ForgeError>>,
}

impl JsonSource {
    /// Open a JSON or JSON-lines file.
    pub fn open(path: &Path) -> Result<Self, ForgeError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ForgeError::Source(format!("Read '{}': {}", path.display(), e)))?;
        Self::parse(&text)
    }

    /// Parse documents from text.
    ///
    /// Text starting with `[` must be one well-formed array. Anything else is
    /// read as JSON lines, where a malformed line only skips that record.
    pub fn parse(text: &str) -> Result<Self, ForgeError> {
        let documents = if text.trim_start().starts_with('[') {
            serde_json::from_str::<Vec<serde_json::Value>>(text)
                .map_err(|e| ForgeError::Source(format!("Parse JSON array: {}", e)))?
                .into_iter()
                .map(Ok)
                .collect::<Vec<_>>()
        } else {
            text.lines()
                .filter(|line| !line.trim().is_empty())
                .map(|line| {
                    serde_json::from_str(line)
                        .map_err(|e| ForgeError::InvalidRecord(format!("Parse JSON line: {}", e)))
                })
                .collect()
        };
        Ok(Self {
            documents: documents.into_iter(),
        })
    }
}

impl Iterator for JsonSource {
    type Item = Result<Record, ForgeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let document = match self.documents.next()? {
            Ok(document) => document,
            Err(e) => return Some(Err(e)),
        };
        match document {
            serde_json::Value::Object(map) => Some(Ok(map
                .into_iter()
                .map(|(k, v)| (k, Value::from(v)))
                .collect())),
            other => Some(Err(ForgeError::InvalidRecord(format!(
                "Expected JSON object, found {}",
                other
            )))),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
