//! # Dgraph HTTP Client
//!
//! Transactional access to a Dgraph alpha over HTTP.
//!
//! - `POST /mutate` opens the transaction and returns its `start_ts`
//! - `POST /commit?startTs=N` commits with the returned keys and preds
//! - `POST /commit?startTs=N&abort=true` discards

use super::types::{CommitRequest, DgraphErrorBody, DgraphResponse, PublishError, TxnContext};
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

/// Header carrying an ACL access token.
const ACCESS_TOKEN_HEADER: &str = "X-Dgraph-AccessToken";

/// Content type of an RDF mutation body.
const RDF_CONTENT_TYPE: &str = "application/rdf";

/// Normalize `host:port` (scheme optional) into a base URL.
#[must_use]
pub fn endpoint_url(endpoint: &str) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

// =============================================================================
// CLIENT
// =============================================================================

/// HTTP client for one Dgraph endpoint.
#[derive(Clone)]
pub struct DgraphClient {
    http: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl DgraphClient {
    /// Create a client for `endpoint`.
    ///
    /// `timeout` bounds each request; `None` waits indefinitely.
    pub fn new(
        endpoint: &str,
        access_token: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, PublishError> {
        let base_url = endpoint_url(endpoint);
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|source| PublishError::Transport {
            endpoint: base_url.clone(),
            source,
        })?;
        Ok(Self {
            http,
            base_url,
            access_token,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start a new transaction. Nothing is sent until the first mutation.
    #[must_use]
    pub fn new_txn(&self) -> Transaction<'_> {
        Transaction {
            client: self,
            context: None,
            state: TxnState::Open,
        }
    }

    /// Build a POST request with optional access token.
    fn request(&self, path_and_query: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path_and_query);
        let mut req = self.http.post(&url);
        if let Some(ref token) = self.access_token {
            req = req.header(ACCESS_TOKEN_HEADER, token);
        }
        req
    }

    /// Send a request, check the status and decode the envelope.
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<DgraphResponse, PublishError> {
        let resp = req.send().await.map_err(|source| PublishError::Transport {
            endpoint: self.base_url.clone(),
            source,
        })?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(PublishError::Unauthorized(status.as_u16()));
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(PublishError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let body: DgraphResponse = resp
            .json()
            .await
            .map_err(|e| PublishError::InvalidResponse(e.to_string()))?;

        if !body.errors.is_empty() {
            let message = body
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            if body.errors.iter().any(DgraphErrorBody::is_aborted) {
                return Err(PublishError::Aborted(message));
            }
            return Err(PublishError::Server {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}

// =============================================================================
// TRANSACTION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxnState {
    Open,
    Committed,
    Discarded,
}

/// Outcome of one mutation inside a transaction.
#[derive(Debug, Clone, Copy)]
pub struct MutationResult {
    pub start_ts: u64,
    pub uids: usize,
}

/// One server-side transaction.
///
/// Callers must finish every transaction with `commit` or `discard`;
/// `discard` after `commit` is a no-op. A transaction dropped while open with
/// server-side state (for example when the publishing future is cancelled
/// between mutate and commit) is discarded in the background on the current
/// tokio runtime. Without a runtime it only logs a warning and the server
/// expires it on its own.
pub struct Transaction<'a> {
    client: &'a DgraphClient,
    context: Option<TxnContext>,
    state: TxnState,
}

impl Transaction<'_> {
    /// True once committed or discarded.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state != TxnState::Open
    }

    /// Submit an RDF mutation payload (`{ set { ... } }`).
    pub async fn mutate(&mut self, payload: &str) -> Result<MutationResult, PublishError> {
        if self.is_finished() {
            return Err(PublishError::TransactionFinished);
        }

        let path = match &self.context {
            Some(ctx) => format!("/mutate?startTs={}", ctx.start_ts),
            None => "/mutate".to_string(),
        };
        let req = self
            .client
            .request(&path)
            .header(CONTENT_TYPE, RDF_CONTENT_TYPE)
            .body(payload.to_string());
        let response = self.client.send(req).await?;

        let txn = response.txn().ok_or_else(|| {
            PublishError::InvalidResponse("mutation response carries no transaction".to_string())
        })?;
        let context = self.context.get_or_insert_with(|| TxnContext {
            start_ts: txn.start_ts,
            ..TxnContext::default()
        });
        context.keys.extend(txn.keys.iter().cloned());
        context.preds.extend(txn.preds.iter().cloned());

        tracing::debug!(
            start_ts = context.start_ts,
            keys = context.keys.len(),
            "mutation accepted"
        );

        Ok(MutationResult {
            start_ts: context.start_ts,
            uids: response.uid_count(),
        })
    }

    /// Commit. Returns the commit timestamp (0 when nothing was mutated).
    ///
    /// On failure the transaction stays open so the caller can discard it.
    pub async fn commit(&mut self) -> Result<u64, PublishError> {
        if self.is_finished() {
            return Err(PublishError::TransactionFinished);
        }
        let Some(context) = &self.context else {
            self.state = TxnState::Committed;
            return Ok(0);
        };

        let body = CommitRequest {
            keys: &context.keys,
            preds: &context.preds,
        };
        let req = self
            .client
            .request(&format!("/commit?startTs={}", context.start_ts))
            .json(&body);
        let response = self.client.send(req).await?;

        let txn = response.txn().cloned().unwrap_or_default();
        if txn.aborted {
            return Err(PublishError::Aborted(format!(
                "transaction {} aborted at commit",
                context.start_ts
            )));
        }

        self.state = TxnState::Committed;
        Ok(txn.commit_ts)
    }

    /// Discard the transaction. No-op when already committed or discarded, or
    /// when nothing was sent to the server.
    pub async fn discard(&mut self) -> Result<(), PublishError> {
        if self.is_finished() {
            return Ok(());
        }
        self.state = TxnState::Discarded;
        let Some(context) = &self.context else {
            return Ok(());
        };

        let req = self.client.request(&abort_path(context.start_ts));
        self.client.send(req).await?;
        tracing::debug!(start_ts = context.start_ts, "transaction discarded");
        Ok(())
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        let (TxnState::Open, Some(context)) = (self.state, &self.context) else {
            return;
        };
        let start_ts = context.start_ts;

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(start_ts, "transaction dropped without commit or discard");
            return;
        };
        tracing::warn!(start_ts, "transaction dropped while open, discarding");
        let client = self.client.clone();
        runtime.spawn(async move {
            let req = client.request(&abort_path(start_ts));
            if let Err(e) = client.send(req).await {
                tracing::warn!(start_ts, error = %e, "background discard failed");
            }
        });
    }
}

fn abort_path(start_ts: u64) -> String {
    format!("/commit?startTs={start_ts}&abort=true")
}

// =============================================================================
// TESTS
// =============================================================================
