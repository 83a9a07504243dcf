//! # Formats Module
//!
//! Serialization formats for tripleforge datasets.

pub mod triples;

pub use triples::{
    identifier_table_path, load, mutation_payload, read_triples, save, save_mutation_payload,
    write_identifier_table, write_mutation_payload, write_triples,
};
