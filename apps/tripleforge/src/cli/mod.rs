//! # tripleforge CLI Module
//!
//! This module implements the CLI interface for tripleforge.
//!
//! ## Available Commands
//!
//! - `convert` (alias `c2t`) - Transform a CSV or JSON file into a triples file
//! - `publish` - Publish a triples file to the graph store in one transaction

mod commands;

use crate::config::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tripleforge_core::ForgeError;
use tripleforge_core::primitives::DEFAULT_TRIPLES_FILE;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// tripleforge - records to RDF triples, published to Dgraph.
///
/// Every record's subject is a content-addressed blank node, so re-running a
/// conversion always produces the same identifiers.
#[derive(Parser, Debug)]
#[command(name = "tripleforge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a TOML config file (default: ./tripleforge.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transform a record file into RDF triples
    #[command(alias = "c2t")]
    Convert {
        /// Path to the input file
        source: PathBuf,

        /// Path to the triples file (identifier table goes next to it)
        #[arg(short, long, default_value = DEFAULT_TRIPLES_FILE)]
        output: PathBuf,

        /// Field identifying each record (default: Document_No)
        #[arg(short = 'k', long)]
        identity_field: Option<String>,

        /// Input format (csv, json)
        #[arg(short = 't', long, default_value = "csv")]
        format: String,

        /// Field delimiter for csv input
        #[arg(short, long, default_value = ",")]
        delimiter: char,

        /// Also write the triples as a mutation payload to this path
        #[arg(short, long)]
        mutation: Option<PathBuf>,

        /// Tenant tag carried on the dataset
        #[arg(long)]
        tenant: Option<String>,

        /// Field to leave out of the triples (repeatable)
        #[arg(long = "internal-field")]
        internal_fields: Vec<String>,
    },

    /// Publish a triples file in one transaction
    Publish {
        /// Triples file to load
        #[arg(short, long, default_value = DEFAULT_TRIPLES_FILE)]
        file: PathBuf,

        /// Graph store host:port (default: localhost:8080)
        #[arg(short = 'H', long)]
        endpoint: Option<String>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), ForgeError> {
    let config = Config::load(cli.config.as_deref())?;
    let json_mode = cli.json_mode;

    match cli.command {
        Commands::Convert {
            source,
            output,
            identity_field,
            format,
            delimiter,
            mutation,
            tenant,
            internal_fields,
        } => {
            let request = ConvertRequest {
                source,
                output,
                identity_field: identity_field.unwrap_or(config.identity_field),
                format,
                delimiter,
                mutation,
                tenant,
                internal_fields,
            };
            cmd_convert(&request, json_mode)
        }
        Commands::Publish { file, endpoint } => {
            let config = Config {
                endpoint: endpoint.unwrap_or(config.endpoint),
                ..config
            };
            cmd_publish(&config, &file, json_mode).await
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
