//! # Publisher Types
//!
//! Error type and the JSON shapes exchanged with the Dgraph HTTP interface.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tripleforge_core::ForgeError;

// =============================================================================
// ERRORS
// =============================================================================

/// Errors from the publisher. Every variant means the transaction did not
/// commit.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Cannot reach the graph store.
    #[error("Cannot connect to graph store at {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// 401/403 - invalid or missing access token.
    #[error("Unauthorized ({0}): graph store rejected the access token")]
    Unauthorized(u16),

    /// The server rejected the request.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The server aborted the transaction (conflict or expiry).
    #[error("Transaction aborted: {0}")]
    Aborted(String),

    /// The response body did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Commit or mutate on a transaction that was already committed or
    /// discarded.
    #[error("Transaction already finished")]
    TransactionFinished,
}

impl From<PublishError> for ForgeError {
    fn from(e: PublishError) -> Self {
        ForgeError::Publish(e.to_string())
    }
}

// =============================================================================
// SUMMARY
// =============================================================================

/// Result of a committed publish.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublishSummary {
    /// Triples submitted in the mutation.
    pub triples: usize,
    /// Blank nodes the server assigned uids to.
    pub uids: usize,
    pub start_ts: u64,
    pub commit_ts: u64,
}

// =============================================================================
// WIRE TYPES
// =============================================================================

/// Envelope of every Dgraph HTTP response.
#[derive(Debug, Deserialize)]
pub(crate) struct DgraphResponse {
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub errors: Vec<DgraphErrorBody>,
    #[serde(default)]
    pub extensions: Option<DgraphExtensions>,
}

/// Error code the server attaches to transaction conflicts.
pub(crate) const ABORTED_CODE: &str = "ErrorAborted";

#[derive(Debug, Deserialize)]
pub(crate) struct DgraphErrorBody {
    pub message: String,
    #[serde(default)]
    pub extensions: Option<DgraphErrorExtensions>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DgraphErrorExtensions {
    #[serde(default)]
    pub code: String,
}

impl DgraphErrorBody {
    pub fn is_aborted(&self) -> bool {
        self.extensions
            .as_ref()
            .is_some_and(|e| e.code == ABORTED_CODE)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DgraphExtensions {
    #[serde(default)]
    pub txn: Option<TxnContext>,
}

/// Transaction state reported by the server.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct TxnContext {
    #[serde(default)]
    pub start_ts: u64,
    #[serde(default)]
    pub commit_ts: u64,
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub preds: Vec<String>,
    #[serde(default)]
    pub aborted: bool,
}

/// Body of a commit request: the conflict keys and predicates touched by the
/// transaction's mutations.
#[derive(Debug, Serialize)]
pub(crate) struct CommitRequest<'a> {
    pub keys: &'a [String],
    pub preds: &'a [String],
}

impl DgraphResponse {
    /// Number of blank nodes mapped to uids by a mutation.
    pub fn uid_count(&self) -> usize {
        self.data
            .as_ref()
            .and_then(|d| d.get("uids"))
            .and_then(serde_json::Value::as_object)
            .map_or(0, serde_json::Map::len)
    }

    pub fn txn(&self) -> Option<&TxnContext> {
        self.extensions.as_ref().and_then(|e| e.txn.as_ref())
    }
}

// =============================================================================
// TESTS
// =============================================================================
