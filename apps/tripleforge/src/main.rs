//! # tripleforge
//!
//! Convert records to RDF triples and publish them to Dgraph.
//!
//! ## Usage
//!
//! ```bash
//! # CSV to triples (writes triples.rdf and triples.rdf.blanks.tsv)
//! tripleforge convert documents.csv -o triples.rdf -k Document_No
//!
//! # Publish a triples file in one transaction
//! tripleforge publish -f triples.rdf -H localhost:8080
//! ```

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tripleforge::{cli, config};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // TRIPLEFORGE_LOG_FORMAT=json enables machine-parseable output.
    let log_format =
        std::env::var(config::ENV_LOG_FORMAT).unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "tripleforge=debug,tripleforge_core=debug"
    } else {
        "tripleforge=info,tripleforge_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
