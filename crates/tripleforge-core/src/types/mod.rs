//! # Core Type Definitions
//!
//! This module contains all core types for the tripleforge engine:
//! - Node identifiers (`NodeId`)
//! - Field values and records (`Value`, `Record`)
//! - Relationship descriptors (`Predicate`)
//! - Rendered statements (`Triple`)
//! - Error types (`ForgeError`)
//!
//! ## Determinism Guarantees
//!
//! - `NodeId` is derived from content only (see [`crate::identity`])
//! - `Record` keeps field order as supplied, so emitted triples follow it
//! - `Value` renders to text the same way on every platform

use crate::primitives::{IDENTIFIER_SENTINEL, TRIPLE_TERMINATOR};
use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

// =============================================================================
// NODE IDENTIFIER
// =============================================================================

/// Content-addressed identifier of a graph node.
///
/// Always starts with [`IDENTIFIER_SENTINEL`]. Only [`crate::identity::resolve`]
/// constructs new identifiers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(String);

impl NodeId {
    pub(crate) fn from_digest(hex_digest: &str) -> Self {
        Self(format!("{IDENTIFIER_SENTINEL}{hex_digest}"))
    }

    /// Get the identifier as a string slice, sentinel included.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// VALUE
// =============================================================================

/// A scalar carried by a record field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// Plain text.
    Text(String),
    /// Timestamp with a UTC offset.
    Timestamp(DateTime<FixedOffset>),
    /// Timestamp without zone information.
    LocalTimestamp(NaiveDateTime),
    /// Reference to an already resolved node.
    Node(NodeId),
    /// Absent value. Renders as empty text.
    Null,
}

impl Value {
    /// Create a text value.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Render the value as text, without quoting or escaping.
    ///
    /// Timestamps use ISO-8601 with a `T` separator; fractional seconds
    /// appear only when non-zero.
    #[must_use]
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) => Cow::Borrowed(s.as_str()),
            Self::Timestamp(dt) => Cow::Owned(dt.to_rfc3339_opts(SecondsFormat::AutoSi, false)),
            Self::LocalTimestamp(dt) => Cow::Owned(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
            Self::Node(id) => Cow::Borrowed(id.as_str()),
            Self::Null => Cow::Borrowed(""),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Self::Text(s.clone())
    }
}

impl From<NodeId> for Value {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<&NodeId> for Value {
    fn from(id: &NodeId) -> Self {
        Self::Node(id.clone())
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self::Timestamp(dt)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::Timestamp(dt.fixed_offset())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Self::LocalTimestamp(dt)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::String(s) => Self::Text(s),
            // Numbers, booleans and nested structures keep their JSON text.
            other => Self::Text(other.to_string()),
        }
    }
}

// =============================================================================
// RECORD
// =============================================================================

/// One input record: field name to value, in source order.
pub type Record = IndexMap<String, Value>;

// =============================================================================
// PREDICATE
// =============================================================================

/// An additional relationship attached to a record's node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `record <predicate> value`
    Forward { predicate: String, value: Value },
    /// `subject <predicate> record`
    Reverse { predicate: String, subject: String },
}

impl Predicate {
    /// The record's node is the subject.
    #[must_use]
    pub fn forward(predicate: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Forward {
            predicate: predicate.into(),
            value: value.into(),
        }
    }

    /// The record's node is the object; `subject` points at it.
    #[must_use]
    pub fn reverse(predicate: impl Into<String>, subject: impl Into<String>) -> Self {
        Self::Reverse {
            predicate: predicate.into(),
            subject: subject.into(),
        }
    }
}

// =============================================================================
// TRIPLE
// =============================================================================

/// One rendered statement: `subject <predicate> object .`
///
/// The rendered line is the unit of storage, so a reloaded triple is
/// byte-identical to the one that was written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    line: String,
}

impl Triple {
    /// Assemble a triple from a subject, a bare predicate name and an already
    /// rendered object.
    pub(crate) fn from_rendered(subject: &str, predicate: &str, object: &str) -> Self {
        Self {
            line: format!("{subject} <{predicate}> {object}{TRIPLE_TERMINATOR}"),
        }
    }

    /// Adopt a line read from a triples file. Surrounding whitespace is
    /// removed; blank lines yield `None`.
    #[must_use]
    pub fn from_line(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            line: trimmed.to_string(),
        })
    }

    /// The rendered line, without trailing newline.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.line
    }

    /// Split the line into subject, predicate (without brackets) and object.
    ///
    /// Returns `None` for lines that do not follow the rendered layout, which
    /// can happen for lines loaded from foreign files.
    #[must_use]
    pub fn parts(&self) -> Option<(&str, &str, &str)> {
        let (subject, rest) = self.line.split_once(" <")?;
        let (predicate, rest) = rest.split_once("> ")?;
        let object = rest.strip_suffix(TRIPLE_TERMINATOR)?;
        Some((subject, predicate, object))
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the tripleforge system.
///
/// - `EmptyIdentitySource` and `InvalidRecord` are per-record: the batch
///   skips the record and keeps going
/// - Everything else aborts the current operation
#[derive(Debug, Error)]
pub enum ForgeError {
    /// The identity field was missing or blank.
    #[error("Empty identity source in field '{field}'")]
    EmptyIdentitySource { field: String },

    /// A single input record could not be decoded.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Reading the record source failed.
    #[error("Record source error: {0}")]
    Source(String),

    /// Writing or reading a triples file failed.
    #[error("Serialization I/O error: {0}")]
    SerializationIo(String),

    /// The configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Publishing to the graph store failed.
    #[error("Publish error: {0}")]
    Publish(String),
}

impl ForgeError {
    /// True for failures that only affect one record.
    #[must_use]
    pub fn is_per_record(&self) -> bool {
        matches!(
            self,
            Self::EmptyIdentitySource { .. } | Self::InvalidRecord(_)
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    #[test]
    fn local_timestamp_uses_t_separator() {
        let dt = NaiveDate::from_ymd_opt(2020, 3, 14)
            .and_then(|d| d.and_hms_opt(15, 9, 26))
            .expect("valid date");
        assert_eq!(Value::from(dt).to_text(), "2020-03-14T15:09:26");
    }

    #[test]
    fn offset_timestamp_keeps_offset() {
        let dt = Utc
            .with_ymd_and_hms(2021, 1, 2, 3, 4, 5)
            .single()
            .expect("valid date");
        assert_eq!(Value::from(dt).to_text(), "2021-01-02T03:04:05+00:00");
    }

    #[test]
    fn null_renders_empty() {
        assert_eq!(Value::Null.to_text(), "");
        assert_eq!(Value::from(None::<String>), Value::Null);
    }

    #[test]
    fn json_scalars_keep_their_text() {
        assert_eq!(Value::from(serde_json::json!(42)), Value::text("42"));
        assert_eq!(Value::from(serde_json::json!(true)), Value::text("true"));
        assert_eq!(Value::from(serde_json::json!("x")), Value::text("x"));
        assert_eq!(Value::from(serde_json::Value::Null), Value::Null);
    }

    #[test]
    fn triple_parts_split_rendered_line() {
        let triple = Triple::from_rendered("_:abc", "Title", "\"Example\"");
        assert_eq!(triple.as_str(), "_:abc <Title> \"Example\" .");
        assert_eq!(triple.parts(), Some(("_:abc", "Title", "\"Example\"")));
    }

    #[test]
    fn triple_from_blank_line_is_none() {
        assert!(Triple::from_line("   \n").is_none());
        let t = Triple::from_line("  a <b> c .\n").expect("non-blank");
        assert_eq!(t.as_str(), "a <b> c .");
    }

    #[test]
    fn per_record_errors_are_classified() {
        let empty = ForgeError::EmptyIdentitySource {
            field: "id".to_string(),
        };
        assert!(empty.is_per_record());
        assert!(!ForgeError::SerializationIo("disk full".to_string()).is_per_record());
    }
}
