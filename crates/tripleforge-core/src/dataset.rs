//! # Dataset
//!
//! The triple accumulator: an ordered sequence of rendered triples plus the
//! identifier table mapping each `NodeId` back to the value it was derived
//! from.
//!
//! - Triples keep insertion order; identical lines are NOT collapsed
//! - Identifier registration is the only deduplicated operation
//! - Malformed triples are dropped without error: an empty component, a
//!   subject with inner whitespace, a predicate holding a line break or an
//!   angle bracket

use crate::identity::resolve;
use crate::primitives::{IDENTIFIER_SENTINEL, SOFT_BREAK};
use crate::{ForgeError, NodeId, Triple, Value};
use indexmap::IndexMap;
use indexmap::map::Entry;

// =============================================================================
// IDENTIFIER TABLE
// =============================================================================

/// Insertion-ordered mapping from identifier to original source value.
///
/// Entries are never removed or overwritten.
#[derive(Debug, Clone, Default)]
pub struct IdentifierTable {
    entries: IndexMap<NodeId, Value>,
}

impl IdentifierTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` with its source value. Returns `false` if `id` was
    /// already present, in which case the table is left untouched.
    pub fn register(&mut self, id: NodeId, source: &Value) -> bool {
        match self.entries.entry(id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(source.clone());
                true
            }
        }
    }

    #[must_use]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.entries.contains_key(id)
    }

    /// Source value for an identifier.
    #[must_use]
    pub fn get(&self, id: &NodeId) -> Option<&Value> {
        self.entries.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &Value)> {
        self.entries.iter()
    }
}

// =============================================================================
// DATASET
// =============================================================================

/// Triples and identifiers produced by one processing run.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    triples: Vec<Triple>,
    identifiers: IdentifierTable,
    tenant: Option<String>,
}

impl Dataset {
    /// Create an empty dataset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty dataset tagged with a tenant scope.
    ///
    /// The tag is carried for callers; the engine does not interpret it.
    #[must_use]
    pub fn with_tenant(tenant: impl Into<String>) -> Self {
        Self {
            tenant: Some(tenant.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }

    /// Triples in insertion order.
    #[must_use]
    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    #[must_use]
    pub fn identifiers(&self) -> &IdentifierTable {
        &self.identifiers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Resolve the identifier of `value` and register it if new.
    ///
    /// Returns the identifier and whether it had already been seen.
    /// `ForgeError::EmptyIdentitySource` leaves the dataset unchanged.
    pub fn resolve_or_register(&mut self, value: &Value) -> Result<(NodeId, bool), ForgeError> {
        let id = resolve(value)?;
        let fresh = self.identifiers.register(id.clone(), value);
        Ok((id, !fresh))
    }

    /// Append `subject <predicate> object .`
    ///
    /// Subject and predicate are trimmed. The call is a no-op when the
    /// triple would be malformed: an empty part, whitespace inside the
    /// subject, a line break or angle bracket in the predicate, or a line
    /// break in an identifier object. Returns whether a triple was appended.
    pub fn push(&mut self, subject: &str, predicate: &str, object: impl Into<Value>) -> bool {
        let subject = subject.trim();
        let predicate = predicate.trim();
        if !is_subject(subject) || !is_predicate(predicate) {
            return false;
        }
        let object = object.into();
        let text = object.to_text();
        let Some(rendered) = render_object(&text) else {
            return false;
        };
        self.triples
            .push(Triple::from_rendered(subject, predicate, &rendered));
        true
    }

    /// Append an already rendered triple, as read back from a triples file.
    pub(crate) fn push_line(&mut self, triple: Triple) {
        self.triples.push(triple);
    }
}

// =============================================================================
// TRIPLE PARTS
// =============================================================================

fn is_subject(subject: &str) -> bool {
    !subject.is_empty() && !subject.contains(char::is_whitespace)
}

fn is_predicate(predicate: &str) -> bool {
    !predicate.is_empty() && !predicate.contains(['\n', '\r', '<', '>'])
}

/// Render an object's text for the triples file. `None` when there is
/// nothing to write.
///
/// Identifier references pass through bare and must fit on one line.
/// Everything else, timestamps included, becomes a quoted literal after
/// escaping, in order: `"` to `'`, `\` to `-`, line feed to the soft-break
/// marker, carriage returns removed.
fn render_object(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    if text.starts_with(IDENTIFIER_SENTINEL) {
        return (!text.contains(['\n', '\r'])).then(|| text.to_string());
    }
    let escaped = text
        .replace('"', "'")
        .replace('\\', "-")
        .replace('\n', SOFT_BREAK)
        .replace('\r', "");
    Some(format!("\"{escaped}\""))
}

// =============================================================================
// TESTS
// =============================================================================
