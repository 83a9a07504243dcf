//! # Identity Resolver
//!
//! Derives content-addressed node identifiers.
//!
//! `resolve` is a pure function: equal normalized input always yields the
//! same `NodeId`, in one process and across restarts. Reuse is guaranteed by
//! construction, not by lookup.

use crate::{ForgeError, NodeId, Value};
use sha2::{Digest, Sha224};

/// Resolve the identifier of a value.
///
/// The value is rendered as text and trimmed; the SHA-224 digest of the
/// result, hex encoded and prefixed with the identifier sentinel, is the
/// identifier.
///
/// Returns `ForgeError::EmptyIdentitySource` if the normalized text is empty.
/// The error's `field` is left blank; callers that know the field fill it in.
pub fn resolve(value: &Value) -> Result<NodeId, ForgeError> {
    let text = value.to_text();
    let normalized = text.trim();
    if normalized.is_empty() {
        return Err(ForgeError::EmptyIdentitySource {
            field: String::new(),
        });
    }
    let digest = Sha224::digest(normalized.as_bytes());
    Ok(NodeId::from_digest(&hex::encode(digest)))
}

// =============================================================================
// TESTS
// =============================================================================
