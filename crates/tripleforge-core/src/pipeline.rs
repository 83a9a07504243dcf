//! # Import Pipeline
//!
//! Drains a record source into a dataset and persists it.
//!
//! Per-record failures (empty identity, undecodable row) are collected in the
//! [`ImportReport`] and never abort the batch. Source and file failures abort
//! the import and propagate.

use crate::formats::triples;
use crate::source::CsvSource;
use crate::transformer::RecordOutcome;
use crate::{Dataset, ForgeError, Predicate, Record, Transformer};
use std::path::Path;

/// A record that was not transformed.
#[derive(Debug)]
pub struct SkippedRecord {
    /// 1-based position of the record in its source.
    pub position: usize,
    pub reason: ForgeError,
}

/// Counters for one import run.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Records read from the source, skipped ones included.
    pub records: usize,
    /// Records whose identity was seen for the first time.
    pub registered: usize,
    /// Records whose identity had been seen before.
    pub repeated: usize,
    pub skipped: Vec<SkippedRecord>,
    /// Triples in the dataset after the run.
    pub triples: usize,
}

/// Transform every record from `source` into `dataset`.
///
/// `identity_field` names the field identifying each record; `predicates` are
/// applied to every record.
pub fn ingest<S>(
    dataset: &mut Dataset,
    transformer: &Transformer,
    source: S,
    identity_field: &str,
    predicates: &[Predicate],
) -> Result<ImportReport, ForgeError>
where
    S: IntoIterator<Item = Result<Record, ForgeError>>,
{
    let mut report = ImportReport::default();

    for (index, item) in source.into_iter().enumerate() {
        report.records += 1;
        let position = index + 1;

        let outcome = item.and_then(|element| {
            transformer.record(dataset, &element, identity_field, predicates)
        });

        match outcome {
            Ok(RecordOutcome::Registered(_)) => report.registered += 1,
            Ok(RecordOutcome::Repeated(_)) => report.repeated += 1,
            Err(reason) if reason.is_per_record() => {
                report.skipped.push(SkippedRecord { position, reason });
            }
            Err(fatal) => return Err(fatal),
        }
    }

    report.triples = dataset.len();
    Ok(report)
}

/// Convert a comma-separated file with a header row into a triples file.
///
/// Writes `output` and its identifier table.
pub fn import_csv(
    path: &Path,
    output: &Path,
    identity_field: &str,
) -> Result<ImportReport, ForgeError> {
    let source = CsvSource::open(path, b',')?;
    let mut dataset = Dataset::new();
    let mut report = ingest(&mut dataset, &Transformer::new(), source, identity_field, &[])?;
    report.triples = triples::save(&dataset, output)?;
    Ok(report)
}

// =============================================================================
// TESTS
// =============================================================================
