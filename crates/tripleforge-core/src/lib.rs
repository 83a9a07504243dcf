//! # tripleforge-core
//!
//! The deterministic record-to-triple engine for tripleforge - THE LOGIC.
//!
//! Records (CSV rows, JSON documents) become subject-predicate-object
//! triples. Each record's subject is a content-addressed blank node, so the
//! same identity always lands on the same node, in every run.
//!
//! ## Pipeline
//!
//! ```text
//! record source ──► Transformer ──► Dataset ──► formats::triples::save
//!                       │              ▲
//!                       └─ identity ───┘
//! ```
//!
//! ## Architectural Constraints
//!
//! - Has NO async, NO network dependencies (pure Rust)
//! - Never logs: outcomes and skipped records are returned to the caller
//! - Single-threaded: a `Dataset` is owned by one run and never shared

// =============================================================================
// MODULES
// =============================================================================

pub mod dataset;
pub mod formats;
pub mod identity;
pub mod pipeline;
pub mod primitives;
pub mod source;
pub mod transformer;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{ForgeError, NodeId, Predicate, Record, Triple, Value};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use dataset::{Dataset, IdentifierTable};
pub use identity::resolve;
pub use pipeline::{ImportReport, SkippedRecord, import_csv, ingest};
pub use source::{CsvSource, JsonSource};
pub use transformer::{RecordOutcome, Transformer};
