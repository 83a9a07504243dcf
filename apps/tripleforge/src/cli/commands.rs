//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::config::Config;
use crate::publisher::{Publisher, republish};
use std::path::{Path, PathBuf};
use tripleforge_core::formats::triples::{identifier_table_path, save, save_mutation_payload};
use tripleforge_core::{
    CsvSource, Dataset, ForgeError, ImportReport, JsonSource, Transformer, ingest,
};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum input file size for conversion (1 GB).
///
/// The whole dataset is held in memory; inputs beyond this are refused.
const MAX_SOURCE_FILE_SIZE: u64 = 1024 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), ForgeError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| ForgeError::Source(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(ForgeError::Source(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Validate an input path: it must exist and be a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, ForgeError> {
    let canonical = path.canonicalize().map_err(|e| {
        ForgeError::Source(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(ForgeError::Source(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Validate an output path: its parent directory must exist.
fn validate_output_path(path: &Path) -> Result<PathBuf, ForgeError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        ForgeError::SerializationIo(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(ForgeError::SerializationIo(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| ForgeError::SerializationIo("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

// =============================================================================
// CONVERT COMMAND
// =============================================================================

/// Arguments of the convert command, after config resolution.
#[derive(Debug, Clone)]
pub struct ConvertRequest {
    pub source: PathBuf,
    pub output: PathBuf,
    pub identity_field: String,
    pub format: String,
    pub delimiter: char,
    pub mutation: Option<PathBuf>,
    pub tenant: Option<String>,
    pub internal_fields: Vec<String>,
}

/// Transform a record file into a triples file.
///
/// Returns the import report; records without identity are logged and
/// skipped.
pub fn convert(request: &ConvertRequest) -> Result<ImportReport, ForgeError> {
    tracing::info!(
        "processing data from {:?} into {:?} (format: {}, identity: {})",
        request.source,
        request.output,
        request.format,
        request.identity_field
    );

    let source_path = validate_file_path(&request.source)?;
    validate_file_size(&source_path, MAX_SOURCE_FILE_SIZE)?;
    let output = validate_output_path(&request.output)?;
    let mutation = request
        .mutation
        .as_deref()
        .map(validate_output_path)
        .transpose()?;

    let mut dataset = match &request.tenant {
        Some(tenant) => Dataset::with_tenant(tenant.clone()),
        None => Dataset::new(),
    };
    let transformer = Transformer::with_internal_fields(request.internal_fields.iter().cloned());

    let mut report = match request.format.as_str() {
        "csv" => {
            let delimiter = ascii_delimiter(request.delimiter)?;
            let source = CsvSource::open(&source_path, delimiter)?;
            ingest(
                &mut dataset,
                &transformer,
                source,
                &request.identity_field,
                &[],
            )?
        }
        "json" => {
            let source = JsonSource::open(&source_path)?;
            ingest(
                &mut dataset,
                &transformer,
                source,
                &request.identity_field,
                &[],
            )?
        }
        other => {
            return Err(ForgeError::Source(format!(
                "Unknown format: {}. Use: csv, json",
                other
            )));
        }
    };

    for skipped in &report.skipped {
        tracing::error!(
            record = skipped.position,
            identity_field = %request.identity_field,
            "skipping record: {}",
            skipped.reason
        );
    }

    report.triples = save(&dataset, &output)?;
    tracing::info!(
        "wrote {} triples to {:?} and {} identifiers to {:?}",
        report.triples,
        output,
        dataset.identifiers().len(),
        identifier_table_path(&output)
    );

    if let Some(path) = mutation {
        save_mutation_payload(&dataset, &path)?;
        tracing::info!("wrote mutation payload to {:?}", path);
    }

    Ok(report)
}

/// Run the convert command and print its summary.
pub fn cmd_convert(request: &ConvertRequest, json_mode: bool) -> Result<(), ForgeError> {
    let report = convert(request)?;

    if json_mode {
        let output = serde_json::json!({
            "source": request.source.to_string_lossy(),
            "output": request.output.to_string_lossy(),
            "records": report.records,
            "registered": report.registered,
            "repeated": report.repeated,
            "skipped": report.skipped.len(),
            "triples": report.triples,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Converted {} records into {} triples", report.records, report.triples);
    println!(
        "  New identities: {}, repeated: {}, skipped: {}",
        report.registered,
        report.repeated,
        report.skipped.len()
    );

    Ok(())
}

fn ascii_delimiter(delimiter: char) -> Result<u8, ForgeError> {
    u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| {
            ForgeError::Source(format!(
                "Delimiter '{}' must be a single ASCII character",
                delimiter
            ))
        })
}

// =============================================================================
// PUBLISH COMMAND
// =============================================================================

/// Publish a triples file.
pub async fn cmd_publish(config: &Config, file: &Path, json_mode: bool) -> Result<(), ForgeError> {
    tracing::info!("publish dataset from {:?} to {}", file, config.endpoint);

    let path = validate_file_path(file)?;
    let publisher = Publisher::from_config(config)?;
    let summary = republish(&path, &publisher).await?;

    if json_mode {
        let output = serde_json::json!({
            "file": file.to_string_lossy(),
            "endpoint": publisher.endpoint(),
            "summary": summary,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!(
        "Published {} triples to {} (commit ts {})",
        summary.triples,
        publisher.endpoint(),
        summary.commit_ts
    );

    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn request(dir: &Path, source: &str, format: &str) -> ConvertRequest {
        ConvertRequest {
            source: dir.join(source),
            output: dir.join("triples.rdf"),
            identity_field: "Document_No".to_string(),
            format: format.to_string(),
            delimiter: ',',
            mutation: None,
            tenant: None,
            internal_fields: Vec::new(),
        }
    }

    #[test]
    fn convert_csv_and_json_agree() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("docs.csv"), "Document_No,Title\n42,Example\n")
            .expect("write");
        std::fs::write(
            dir.path().join("docs.json"),
            r#"[{"Document_No": "42", "Title": "Example"}]"#,
        )
        .expect("write");

        convert(&request(dir.path(), "docs.csv", "csv")).expect("csv");
        let from_csv = std::fs::read_to_string(dir.path().join("triples.rdf")).expect("read");
        convert(&request(dir.path(), "docs.json", "json")).expect("json");
        let from_json = std::fs::read_to_string(dir.path().join("triples.rdf")).expect("read");

        assert_eq!(from_csv.lines().count(), 2);
        assert_eq!(from_csv, from_json);
    }

    #[test]
    fn convert_writes_mutation_payload() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("docs.csv"), "Document_No;Title\n1;One\n").expect("write");
        let mut req = request(dir.path(), "docs.csv", "csv");
        req.delimiter = ';';
        req.mutation = Some(dir.path().join("triples.mut.rdf"));

        let report = convert(&req).expect("convert");

        let payload = std::fs::read_to_string(dir.path().join("triples.mut.rdf")).expect("read");
        assert_eq!(report.triples, 2);
        assert!(payload.starts_with("{ set {\n"));
        assert!(payload.ends_with("} }\n"));
        assert_eq!(payload.lines().count(), 4);
    }

    #[test]
    fn convert_rejects_unknown_format() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("docs.xml"), "<docs/>").expect("write");

        let result = convert(&request(dir.path(), "docs.xml", "xml"));
        assert!(matches!(result, Err(ForgeError::Source(msg)) if msg.contains("Unknown format")));
    }

    #[test]
    fn convert_missing_source_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = convert(&request(dir.path(), "absent.csv", "csv"));
        assert!(matches!(result, Err(ForgeError::Source(_))));
    }

    #[test]
    fn delimiter_must_be_ascii() {
        assert_eq!(ascii_delimiter('\t').expect("tab"), b'\t');
        assert!(ascii_delimiter('§').is_err());
    }

    #[test]
    fn output_in_working_directory_is_valid() {
        let validated = validate_output_path(Path::new("triples.rdf")).expect("validate");
        assert!(validated.ends_with("triples.rdf"));
    }
}
