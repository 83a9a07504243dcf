//! # Record Transformer
//!
//! Maps one input record onto triples in a [`Dataset`].
//!
//! - The identity field seeds the subject's `NodeId`
//! - Extra predicates are applied on every call
//! - Record fields are emitted only the first time an identity is seen

use crate::{Dataset, ForgeError, NodeId, Predicate, Record, Value};
use std::collections::BTreeSet;

/// What happened to a record that was transformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// First sighting: fields and predicates were emitted.
    Registered(NodeId),
    /// Identity already known: only predicates were emitted.
    Repeated(NodeId),
}

impl RecordOutcome {
    /// The subject identifier of the record.
    #[must_use]
    pub fn node(&self) -> &NodeId {
        match self {
            Self::Registered(id) | Self::Repeated(id) => id,
        }
    }
}

/// Turns records into triples.
///
/// Fields listed as internal are structural bookkeeping of the record source
/// and never become triples.
#[derive(Debug, Clone, Default)]
pub struct Transformer {
    internal_fields: BTreeSet<String>,
}

impl Transformer {
    /// Create a transformer that emits every field.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transformer that skips the given fields.
    #[must_use]
    pub fn with_internal_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            internal_fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn is_internal(&self, field: &str) -> bool {
        self.internal_fields.contains(field)
    }

    /// Transform one record.
    ///
    /// `identity_key` names the field whose value identifies the record. A
    /// missing or blank identity returns `ForgeError::EmptyIdentitySource`
    /// and leaves the dataset untouched; the caller decides whether to
    /// continue with the next record.
    pub fn record(
        &self,
        dataset: &mut Dataset,
        element: &Record,
        identity_key: &str,
        predicates: &[Predicate],
    ) -> Result<RecordOutcome, ForgeError> {
        let identity = element.get(identity_key).unwrap_or(&Value::Null);
        let (subject, seen) = dataset.resolve_or_register(identity).map_err(|e| match e {
            ForgeError::EmptyIdentitySource { .. } => ForgeError::EmptyIdentitySource {
                field: identity_key.to_string(),
            },
            other => other,
        })?;

        for predicate in predicates {
            match predicate {
                Predicate::Forward { predicate, value } => {
                    dataset.push(subject.as_str(), predicate, value.clone());
                }
                Predicate::Reverse { predicate, subject: other } => {
                    dataset.push(other, predicate, &subject);
                }
            }
        }

        if seen {
            return Ok(RecordOutcome::Repeated(subject));
        }

        for (field, value) in element {
            if self.is_internal(field) {
                continue;
            }
            dataset.push(subject.as_str(), field, value.clone());
        }

        Ok(RecordOutcome::Registered(subject))
    }
}

// =============================================================================
// TESTS
// =============================================================================
