//! HTTP-level tests: the router driven against scripted graph sessions.

use std::collections::BTreeMap;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use graphgate_core::{AccessMode, Field, NodeRecord, Record};
use graphgate_graph::testing::ScriptedProvider;
use graphgate_server::{create_router, AppState};

fn app(provider: &ScriptedProvider) -> Router {
    create_router(AppState::new(provider.clone()))
}

fn node(identity: i64, labels: &[&str], props: Value) -> Field {
    let properties: BTreeMap<String, Value> = props
        .as_object()
        .map(|m| m.clone().into_iter().collect())
        .unwrap_or_default();
    Field::Node(NodeRecord {
        identity,
        labels: labels.iter().map(|l| l.to_string()).collect(),
        properties,
    })
}

fn node_row(identity: i64, labels: &[&str], props: Value) -> Record {
    Record::new().with("n", node(identity, labels, props))
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, req).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

// ── Welcome ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_welcome_skips_the_graph() {
    let provider = ScriptedProvider::new();
    let (status, body) = send_json(app(&provider), request("GET", "/welcome", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"code": 200, "msg": "good"}));
    assert!(provider.sessions().is_empty());
}

// ── Reads ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_labels_flattens_label_sets() {
    let provider = ScriptedProvider::new();
    provider.respond(vec![
        Record::new().with("Label", Field::List(vec!["A".into(), "B".into()])),
        Record::new().with("Label", Field::List(vec!["C".into()])),
    ]);

    let (status, body) = send_json(app(&provider), request("GET", "/graph/labels", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"data": [["A", "B"], ["C"]]}));

    let sessions = provider.sessions();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].mode, AccessMode::Read);
    assert_eq!(sessions[0].releases, vec![true]);
}

#[tokio::test]
async fn test_full_graph_returns_triples() {
    let provider = ScriptedProvider::new();
    provider.respond(vec![Record::new()
        .with("n", node(1, &["A"], json!({})))
        .with("relationship", Field::Text("KNOWS".into()))
        .with("m", node(2, &["B"], json!({"x": 1})))]);

    let (status, body) = send_json(app(&provider), request("GET", "/graph/all", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"data": [{
            "origin": {"identity": 1, "labels": ["A"], "properties": {}},
            "relationShip": "KNOWS",
            "join": {"identity": 2, "labels": ["B"], "properties": {"x": 1}}
        }]})
    );
}

#[tokio::test]
async fn test_fetch_by_id_answers_created() {
    let provider = ScriptedProvider::new();
    provider.respond(vec![node_row(5, &["A"], json!({"x": "v"}))]);

    let (status, body) = send_json(app(&provider), request("GET", "/graph/5", None)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"][0]["identity"], json!(5));
    assert_eq!(provider.sessions()[0].mode, AccessMode::Read);
}

#[tokio::test]
async fn test_fetch_unknown_id_is_empty_success() {
    let provider = ScriptedProvider::new();

    let (status, body) = send_json(app(&provider), request("GET", "/graph/999", None)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"data": []}));
}

#[tokio::test]
async fn test_non_integer_id_is_rejected_without_session() {
    let provider = ScriptedProvider::new();

    let (status, body) = send_json(app(&provider), request("GET", "/graph/abc", None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({}));
    assert!(provider.sessions().is_empty());
}

// ── Create ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_returns_node() {
    let provider = ScriptedProvider::new();
    provider.respond(vec![node_row(11, &["A", "B"], json!({"x": "v", "y": 1}))]);

    let (status, body) = send_json(
        app(&provider),
        request("POST", "/graph", Some(json!({"labels": "A, B", "x": "v", "y": 1}))),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body,
        json!({"data": [{"identity": 11, "labels": ["A", "B"], "properties": {"x": "v", "y": 1}}]})
    );

    let sessions = provider.sessions();
    assert_eq!(sessions[0].mode, AccessMode::Write);
    assert_eq!(
        sessions[0].statements,
        vec!["CREATE (n:`A`:`B`) SET n = $props RETURN n"]
    );
    assert_eq!(sessions[0].releases, vec![true]);
}

#[tokio::test]
async fn test_create_without_labels_is_rejected() {
    let provider = ScriptedProvider::new();

    let (status, body) = send_json(
        app(&provider),
        request("POST", "/graph", Some(json!({"x": "v"}))),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({}));
    assert!(provider.sessions().is_empty());
}

#[tokio::test]
async fn test_create_with_unsafe_label_is_rejected() {
    let provider = ScriptedProvider::new();

    let (status, _) = send(
        app(&provider),
        request(
            "POST",
            "/graph",
            Some(json!({"labels": "A`) MATCH (m) DETACH DELETE m //"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(provider.sessions().is_empty());
}

#[tokio::test]
async fn test_create_with_malformed_json_is_rejected() {
    let provider = ScriptedProvider::new();
    let req = Request::builder()
        .method("POST")
        .uri("/graph")
        .header("content-type", "application/json")
        .body(Body::from("{\"labels\": "))
        .unwrap();

    let (status, body) = send_json(app(&provider), req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({}));
}

// ── Update ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_update_with_init_runs_all_steps() {
    let provider = ScriptedProvider::new();
    provider
        .respond(vec![node_row(3, &["A", "B"], json!({"old": 1}))])
        .respond(Vec::new())
        .respond(Vec::new())
        .respond(Vec::new())
        .respond(vec![node_row(3, &["C"], json!({"x": "v"}))]);

    let (status, body) = send_json(
        app(&provider),
        request("PUT", "/graph/3?init=true", Some(json!({"labels": "C", "x": "v"}))),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"data": {"identity": 3, "labels": ["C"], "properties": {"x": "v"}}})
    );

    let sessions = provider.sessions();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].mode, AccessMode::Write);
    assert_eq!(sessions[0].statements.len(), 5);
    assert!(sessions[0].statements[2].contains("SET n = {}"));
    assert_eq!(sessions[0].releases, vec![true]);
}

#[tokio::test]
async fn test_update_without_init_keeps_properties() {
    let provider = ScriptedProvider::new();
    provider
        .respond(vec![node_row(3, &["A"], json!({"keep": 1}))])
        .respond(Vec::new())
        .respond(Vec::new())
        .respond(vec![node_row(3, &["A"], json!({"keep": 1, "x": 2}))]);

    let (status, _) = send_json(
        app(&provider),
        request("PUT", "/graph/3?init=yes", Some(json!({"labels": "A", "x": 2}))),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let statements = &provider.sessions()[0].statements;
    assert_eq!(statements.len(), 4);
    assert!(!statements.iter().any(|s| s.contains("SET n = {}")));
}

#[tokio::test]
async fn test_update_failure_releases_without_success() {
    let provider = ScriptedProvider::new();
    provider
        .respond(vec![node_row(3, &["A"], json!({}))])
        .fail("store went away");

    let (status, body) = send_json(
        app(&provider),
        request("PUT", "/graph/3", Some(json!({"labels": "B"}))),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({}));

    let sessions = provider.sessions();
    assert_eq!(sessions[0].statements.len(), 2);
    assert_eq!(sessions[0].releases, vec![false]);
}

#[tokio::test]
async fn test_update_of_missing_node_is_rejected() {
    let provider = ScriptedProvider::new();

    let (status, body) = send_json(
        app(&provider),
        request("PUT", "/graph/77", Some(json!({"labels": "B"}))),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({}));
    assert_eq!(provider.sessions()[0].releases, vec![false]);
}

#[tokio::test]
async fn test_update_with_malformed_query_is_rejected() {
    let provider = ScriptedProvider::new();

    let (status, body) = send_json(
        app(&provider),
        request("PUT", "/graph/3?init=true&init=false", Some(json!({"labels": "A"}))),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({}));
    assert!(provider.sessions().is_empty());
}

// ── Delete ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_all_has_empty_body() {
    let provider = ScriptedProvider::new();

    let (status, bytes) = send(app(&provider), request("DELETE", "/graph/all", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(bytes.is_empty());

    let sessions = provider.sessions();
    assert_eq!(sessions[0].mode, AccessMode::Write);
    assert_eq!(sessions[0].statements, vec!["MATCH (n) DETACH DELETE n"]);
}

#[tokio::test]
async fn test_delete_by_id_has_empty_body() {
    let provider = ScriptedProvider::new();

    let (status, bytes) = send(app(&provider), request("DELETE", "/graph/8", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(bytes.is_empty());
    assert_eq!(
        provider.sessions()[0].statements,
        vec!["MATCH (n) WHERE id(n) = $id DETACH DELETE n"]
    );
}

// ── Disconnects ──────────────────────────────────────────────────

#[tokio::test]
async fn test_dropped_request_still_releases_session() {
    let provider = ScriptedProvider::new();
    provider.slow_down(Duration::from_millis(200));

    let pending = app(&provider).oneshot(request("DELETE", "/graph/all", None));
    let outcome = tokio::time::timeout(Duration::from_millis(50), pending).await;
    assert!(outcome.is_err(), "request should still be running");

    tokio::time::sleep(Duration::from_millis(400)).await;

    let sessions = provider.sessions();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].statements, vec!["MATCH (n) DETACH DELETE n"]);
    assert_eq!(sessions[0].releases, vec![true]);
}

// ── Store Unavailable ────────────────────────────────────────────

#[tokio::test]
async fn test_unreachable_store_is_generic_failure() {
    let provider = ScriptedProvider::new();
    provider.refuse_sessions();

    for (method, uri) in [
        ("GET", "/graph/labels"),
        ("GET", "/graph/all"),
        ("GET", "/graph/1"),
        ("DELETE", "/graph/all"),
        ("DELETE", "/graph/1"),
    ] {
        let (status, body) = send_json(app(&provider), request(method, uri, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{method} {uri}");
        assert_eq!(body, json!({}), "{method} {uri}");
    }
}
