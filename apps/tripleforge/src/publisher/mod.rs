//! # Publisher Module
//!
//! Delivers a dataset to a Dgraph endpoint as one transaction.
//!
//! The whole triple sequence goes out as a single mutation and is committed
//! as a unit. Whatever happens between mutate and commit, the transaction is
//! discarded before `publish` returns unless it committed.

mod client;
mod types;

pub use client::{DgraphClient, MutationResult, Transaction, endpoint_url};
pub use types::{PublishError, PublishSummary};

use crate::config::Config;
use std::path::Path;
use std::time::Instant;
use tripleforge_core::formats::triples::{load, mutation_payload};
use tripleforge_core::{Dataset, ForgeError};

/// Publishes datasets to one graph store.
#[derive(Clone)]
pub struct Publisher {
    client: DgraphClient,
}

impl Publisher {
    /// Create a publisher around an existing client.
    #[must_use]
    pub fn new(client: DgraphClient) -> Self {
        Self { client }
    }

    /// Create a publisher from resolved configuration.
    pub fn from_config(config: &Config) -> Result<Self, PublishError> {
        let client = DgraphClient::new(
            &config.endpoint,
            config.access_token.clone(),
            config.timeout,
        )?;
        Ok(Self::new(client))
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.client.base_url()
    }

    /// Submit every triple of `dataset` in one transaction and commit it.
    ///
    /// On any failure the transaction is discarded before the error is
    /// returned; nothing is applied.
    #[tracing::instrument(skip_all, fields(endpoint = %self.client.base_url(), triples = dataset.len()))]
    pub async fn publish(&self, dataset: &Dataset) -> Result<PublishSummary, PublishError> {
        if dataset.is_empty() {
            tracing::info!("dataset is empty, nothing to publish");
            return Ok(PublishSummary::default());
        }

        let payload = mutation_payload(dataset);
        let mut txn = self.client.new_txn();

        let outcome = mutate_and_commit(&mut txn, &payload, dataset.len()).await;

        if let Err(e) = txn.discard().await {
            tracing::warn!(error = %e, "discard failed");
        }
        outcome
    }
}

async fn mutate_and_commit(
    txn: &mut Transaction<'_>,
    payload: &str,
    triples: usize,
) -> Result<PublishSummary, PublishError> {
    let mutation = txn.mutate(payload).await?;
    let commit_ts = txn.commit().await?;
    Ok(PublishSummary {
        triples,
        uids: mutation.uids,
        start_ts: mutation.start_ts,
        commit_ts,
    })
}

/// Load a triples file and publish it.
pub async fn republish(path: &Path, publisher: &Publisher) -> Result<PublishSummary, ForgeError> {
    let dataset = load(path)?;
    tracing::info!("loaded {} lines from {:?}", dataset.len(), path);

    let start = Instant::now();
    let summary = publisher.publish(&dataset).await?;
    tracing::info!(
        commit_ts = summary.commit_ts,
        uids = summary.uids,
        "dataset published in {:?}: {:?}",
        start.elapsed(),
        path
    );
    Ok(summary)
}
