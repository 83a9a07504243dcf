//! # Triples Format
//!
//! Line-oriented text serialization for datasets.
//!
//! Files:
//! - Triples file: one `subject <predicate> object .` per line, UTF-8,
//!   newline-terminated
//! - Identifier table: `<triples file>.blanks.tsv`, one `id<TAB>value` row
//!   per identifier in registration order
//! - Mutation payload: the triple lines wrapped in `{ set { ... } }`
//!
//! Reload is triple-only: the identifier table is written for reference and
//! never read back.

use crate::primitives::{IDENTIFIER_TABLE_SUFFIX, MUTATION_CLOSE, MUTATION_OPEN};
use crate::{Dataset, ForgeError, Triple};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

// =============================================================================
// WRITERS
// =============================================================================

/// Write every triple as one line. Returns the number of lines written.
pub fn write_triples<W: Write>(dataset: &Dataset, out: &mut W) -> io::Result<usize> {
    let mut count = 0;
    for triple in dataset.triples() {
        writeln!(out, "{triple}")?;
        count += 1;
    }
    Ok(count)
}

/// Write the identifier table as tab-separated rows.
///
/// Tabs and line breaks inside source values are flattened to spaces so that
/// every identifier stays on exactly one row.
pub fn write_identifier_table<W: Write>(dataset: &Dataset, out: &mut W) -> io::Result<usize> {
    let mut count = 0;
    for (id, source) in dataset.identifiers().iter() {
        let text = source.to_text().replace(['\t', '\n', '\r'], " ");
        writeln!(out, "{id}\t{text}")?;
        count += 1;
    }
    Ok(count)
}

/// Write the triples wrapped as a mutation payload.
pub fn write_mutation_payload<W: Write>(dataset: &Dataset, out: &mut W) -> io::Result<usize> {
    writeln!(out, "{MUTATION_OPEN}")?;
    let count = write_triples(dataset, out)?;
    writeln!(out, "{MUTATION_CLOSE}")?;
    Ok(count)
}

/// Render the mutation payload in memory.
pub fn mutation_payload(dataset: &Dataset) -> String {
    let mut buf = Vec::with_capacity(64 * (dataset.len() + 1));
    // Writing into a Vec<u8> does not fail.
    if write_mutation_payload(dataset, &mut buf).is_err() {
        return String::new();
    }
    String::from_utf8_lossy(&buf).into_owned()
}

// =============================================================================
// READERS
// =============================================================================

/// Read triple lines into a fresh dataset. Blank lines are skipped; all other
/// lines are kept verbatim apart from surrounding whitespace.
pub fn read_triples<R: BufRead>(input: R) -> Result<Dataset, ForgeError> {
    let mut dataset = Dataset::new();
    for line in input.lines() {
        let line = line.map_err(|e| ForgeError::SerializationIo(format!("Read line: {}", e)))?;
        if let Some(triple) = Triple::from_line(&line) {
            dataset.push_line(triple);
        }
    }
    Ok(dataset)
}

// =============================================================================
// FILE OPERATIONS
// =============================================================================

/// Path of the identifier table written next to `path`.
#[must_use]
pub fn identifier_table_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(IDENTIFIER_TABLE_SUFFIX);
    PathBuf::from(name)
}

/// Save the triples file and its identifier table.
///
/// Returns the number of triple lines written.
pub fn save(dataset: &Dataset, path: &Path) -> Result<usize, ForgeError> {
    let count = write_file(path, |out| write_triples(dataset, out))?;
    write_file(&identifier_table_path(path), |out| {
        write_identifier_table(dataset, out)
    })?;
    Ok(count)
}

/// Save the triples wrapped as a mutation payload.
pub fn save_mutation_payload(dataset: &Dataset, path: &Path) -> Result<usize, ForgeError> {
    write_file(path, |out| write_mutation_payload(dataset, out))
}

/// Load a triples file into a fresh dataset.
pub fn load(path: &Path) -> Result<Dataset, ForgeError> {
    let file = File::open(path).map_err(|e| {
        ForgeError::SerializationIo(format!("Open '{}': {}", path.display(), e))
    })?;
    read_triples(BufReader::new(file))
}

fn write_file<F>(path: &Path, body: F) -> Result<usize, ForgeError>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<usize>,
{
    let io_err =
        |e: io::Error| ForgeError::SerializationIo(format!("Write '{}': {}", path.display(), e));
    let file = File::create(path).map_err(io_err)?;
    let mut out = BufWriter::new(file);
    let count = body(&mut out).map_err(io_err)?;
    out.flush().map_err(io_err)?;
    Ok(count)
}

// =============================================================================
// TESTS
// =============================================================================
