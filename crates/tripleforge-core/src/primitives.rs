//! # Innate Primitives
//!
//! Hardcoded constants for the tripleforge CORE.
//!
//! These values define the exchange format. Changing any of them changes the
//! bytes written to triples files and therefore breaks identity stability
//! between runs.

/// Prefix marking a value as a graph-internal node reference (blank node)
/// rather than a literal.
pub const IDENTIFIER_SENTINEL: &str = "_:";

/// Replacement for line feeds inside quoted literals.
///
/// Each triple must occupy exactly one line of the triples file.
pub const SOFT_BREAK: &str = "<br>";

/// Terminator appended to every rendered triple.
pub const TRIPLE_TERMINATOR: &str = " .";

/// Suffix of the identifier-mapping file written next to a triples file.
pub const IDENTIFIER_TABLE_SUFFIX: &str = ".blanks.tsv";

/// Opening line of a mutation payload.
pub const MUTATION_OPEN: &str = "{ set {";

/// Closing line of a mutation payload.
pub const MUTATION_CLOSE: &str = "} }";

/// Field used as identity source when the caller does not name one.
pub const DEFAULT_IDENTITY_FIELD: &str = "Document_No";

/// Default triples file name.
pub const DEFAULT_TRIPLES_FILE: &str = "triples.rdf";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_blank_node_prefix() {
        assert_eq!(IDENTIFIER_SENTINEL, "_:");
    }

    #[test]
    fn mutation_delimiters_balance() {
        let opens = MUTATION_OPEN.matches('{').count();
        let closes = MUTATION_CLOSE.matches('}').count();
        assert_eq!(opens, closes);
    }
}
