//! Integration tests for the transactional publisher.
//!
//! Runs the publisher against an in-process fake of the Dgraph HTTP
//! interface (`/mutate`, `/commit`) served by axum on a random port.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum::{Json, Router};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use serde_json::{Value as JsonValue, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tripleforge::publisher::{DgraphClient, PublishError, Publisher, republish};
use tripleforge_core::formats::triples::{mutation_payload, save};
use tripleforge_core::{Dataset, ForgeError, Record, Transformer, Value};

// =============================================================================
// FAKE GRAPH STORE
// =============================================================================

#[derive(Default)]
struct Store {
    next_ts: u64,
    pending: HashMap<u64, Vec<String>>,
    committed: Vec<String>,
    aborted: Vec<u64>,
    commit_bodies: Vec<JsonValue>,
    content_types: Vec<String>,
    tokens: Vec<Option<String>>,
    required_token: Option<String>,
    reject_mutation: bool,
    abort_on_commit: bool,
}

type Shared = Arc<Mutex<Store>>;

fn authorized(store: &mut Store, headers: &HeaderMap) -> bool {
    let token = headers
        .get("X-Dgraph-AccessToken")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    store.tokens.push(token.clone());
    match &store.required_token {
        Some(required) => token.as_deref() == Some(required.as_str()),
        None => true,
    }
}

async fn mutate(
    State(store): State<Shared>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let mut store = store.lock().unwrap();
    if !authorized(&mut store, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    store.content_types.push(
        headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string(),
    );
    if store.reject_mutation {
        return Json(json!({
            "errors": [{
                "message": "while lexing line 2: invalid input, mutation not applied (abort)",
                "extensions": {"code": "ErrorInvalidRequest"}
            }],
            "data": null
        }))
        .into_response();
    }

    let lines: Vec<String> = body
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && *l != "{ set {" && *l != "} }")
        .map(str::to_string)
        .collect();
    let mut uids = serde_json::Map::new();
    for line in &lines {
        if let Some(blank) = line.strip_prefix("_:").and_then(|s| s.split(' ').next()) {
            let uid = format!("0x{:x}", uids.len() + 1);
            uids.entry(blank.to_string()).or_insert(JsonValue::String(uid));
        }
    }

    store.next_ts += 10;
    let start_ts = store.next_ts;
    store.pending.insert(start_ts, lines);

    Json(json!({
        "data": {"code": "Success", "message": "Done", "uids": uids},
        "extensions": {"txn": {"start_ts": start_ts, "keys": ["k1"], "preds": ["1-Title"]}}
    }))
    .into_response()
}

async fn commit(
    State(store): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let mut store = store.lock().unwrap();
    if !authorized(&mut store, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let start_ts: u64 = params["startTs"].parse().unwrap();

    if params.get("abort").map(String::as_str) == Some("true") {
        store.pending.remove(&start_ts);
        store.aborted.push(start_ts);
        return Json(json!({"data": {"code": "Success", "message": "Done"}})).into_response();
    }

    store
        .commit_bodies
        .push(serde_json::from_str(&body).unwrap_or(JsonValue::Null));
    if store.abort_on_commit {
        return Json(json!({
            "errors": [{
                "message": "Transaction has been aborted. Please retry",
                "extensions": {"code": "ErrorAborted"}
            }]
        }))
        .into_response();
    }

    let lines = store.pending.remove(&start_ts).unwrap_or_default();
    store.committed.extend(lines);
    Json(json!({
        "data": {"code": "Success", "message": "Done"},
        "extensions": {"txn": {"start_ts": start_ts, "commit_ts": start_ts + 1}}
    }))
    .into_response()
}

/// Serve the fake store on a random local port; returns `host:port`.
async fn spawn_store(store: Store) -> (String, Shared) {
    let shared: Shared = Arc::new(Mutex::new(store));
    let app = Router::new()
        .route("/mutate", post(mutate))
        .route("/commit", post(commit))
        .with_state(shared.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr.to_string(), shared)
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn sample_dataset() -> Dataset {
    let transformer = Transformer::new();
    let mut dataset = Dataset::new();
    for (no, title) in [("1", "First"), ("2", "Second")] {
        let mut record = Record::new();
        record.insert("Document_No".to_string(), Value::from(no));
        record.insert("Title".to_string(), Value::from(title));
        transformer
            .record(&mut dataset, &record, "Document_No", &[])
            .unwrap();
    }
    dataset
}

fn publisher(endpoint: &str, token: Option<&str>) -> Publisher {
    let client = DgraphClient::new(endpoint, token.map(str::to_string), None).unwrap();
    Publisher::new(client)
}

// =============================================================================
// PUBLISH TESTS
// =============================================================================

#[tokio::test]
async fn test_publish_commits_every_triple() {
    let (endpoint, store) = spawn_store(Store::default()).await;
    let dataset = sample_dataset();

    let summary = publisher(&endpoint, None).publish(&dataset).await.unwrap();

    assert_eq!(summary.triples, 4);
    assert_eq!(summary.uids, 2);
    assert_eq!(summary.start_ts, 10);
    assert_eq!(summary.commit_ts, 11);

    let store = store.lock().unwrap();
    let expected: Vec<String> = dataset
        .triples()
        .iter()
        .map(|t| t.as_str().to_string())
        .collect();
    assert_eq!(store.committed, expected);
    assert!(store.pending.is_empty());
    // Committed transactions are not discarded on the server.
    assert!(store.aborted.is_empty());
    assert_eq!(store.content_types, vec!["application/rdf"]);
    assert_eq!(
        store.commit_bodies,
        vec![json!({"keys": ["k1"], "preds": ["1-Title"]})]
    );
}

#[tokio::test]
async fn test_publish_empty_dataset_sends_nothing() {
    let (endpoint, store) = spawn_store(Store::default()).await;

    let summary = publisher(&endpoint, None)
        .publish(&Dataset::new())
        .await
        .unwrap();

    assert_eq!(summary.triples, 0);
    assert!(store.lock().unwrap().tokens.is_empty());
}

#[tokio::test]
async fn test_rejected_mutation_applies_nothing() {
    let (endpoint, store) = spawn_store(Store {
        reject_mutation: true,
        ..Store::default()
    })
    .await;

    let result = publisher(&endpoint, None).publish(&sample_dataset()).await;

    // The message mentions abort but the error code is not a conflict.
    assert!(matches!(result, Err(PublishError::Server { ref message, .. }) if message.contains("lexing")));
    let store = store.lock().unwrap();
    assert!(store.committed.is_empty());
    assert!(store.pending.is_empty());
}

#[tokio::test]
async fn test_dropped_transaction_is_discarded() {
    let (endpoint, store) = spawn_store(Store::default()).await;
    let client = DgraphClient::new(&endpoint, None, None).unwrap();

    {
        let mut txn = client.new_txn();
        txn.mutate(&mutation_payload(&sample_dataset())).await.unwrap();
    }

    for _ in 0..100 {
        if !store.lock().unwrap().aborted.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let store = store.lock().unwrap();
    assert_eq!(store.aborted, vec![10]);
    assert!(store.pending.is_empty());
    assert!(store.committed.is_empty());
}

#[tokio::test]
async fn test_aborted_commit_is_discarded() {
    let (endpoint, store) = spawn_store(Store {
        abort_on_commit: true,
        ..Store::default()
    })
    .await;

    let result = publisher(&endpoint, None).publish(&sample_dataset()).await;

    assert!(matches!(result, Err(PublishError::Aborted(_))));
    let store = store.lock().unwrap();
    assert!(store.committed.is_empty());
    assert!(store.pending.is_empty());
    assert_eq!(store.aborted, vec![10]);
}

#[tokio::test]
async fn test_access_token_is_sent() {
    let (endpoint, store) = spawn_store(Store {
        required_token: Some("s3cret".to_string()),
        ..Store::default()
    })
    .await;

    publisher(&endpoint, Some("s3cret"))
        .publish(&sample_dataset())
        .await
        .unwrap();

    let store = store.lock().unwrap();
    assert_eq!(store.committed.len(), 4);
    assert!(
        store
            .tokens
            .iter()
            .all(|t| t.as_deref() == Some("s3cret"))
    );
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let (endpoint, store) = spawn_store(Store {
        required_token: Some("s3cret".to_string()),
        ..Store::default()
    })
    .await;

    let result = publisher(&endpoint, None).publish(&sample_dataset()).await;

    assert!(matches!(result, Err(PublishError::Unauthorized(401))));
    assert!(store.lock().unwrap().committed.is_empty());
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = listener.local_addr().unwrap().to_string();
    drop(listener);

    let result = publisher(&endpoint, None).publish(&sample_dataset()).await;

    assert!(matches!(result, Err(PublishError::Transport { .. })));
}

// =============================================================================
// REPUBLISH TESTS
// =============================================================================

#[tokio::test]
async fn test_republish_from_file() {
    let (endpoint, store) = spawn_store(Store::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("triples.rdf");
    let dataset = sample_dataset();
    save(&dataset, &path).unwrap();

    let summary = republish(&path, &publisher(&endpoint, None)).await.unwrap();

    assert_eq!(summary.triples, dataset.len());
    let store = store.lock().unwrap();
    assert_eq!(store.committed.len(), dataset.len());
    assert_eq!(store.committed[0], dataset.triples()[0].as_str());
}

#[tokio::test]
async fn test_republish_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = republish(
        &dir.path().join("absent.rdf"),
        &publisher("127.0.0.1:9", None),
    )
    .await;

    assert!(matches!(result, Err(ForgeError::SerializationIo(_))));
}

#[tokio::test]
async fn test_republish_failure_maps_to_publish_error() {
    let (endpoint, _store) = spawn_store(Store {
        abort_on_commit: true,
        ..Store::default()
    })
    .await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("triples.rdf");
    save(&sample_dataset(), &path).unwrap();

    let result = republish(&path, &publisher(&endpoint, None)).await;

    assert!(matches!(result, Err(ForgeError::Publish(msg)) if msg.contains("aborted")));
}
