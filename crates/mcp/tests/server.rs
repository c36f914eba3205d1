use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use codeplane_mcp::AppState;
use codeplane_protocol::Config;
use codeplane_storage::{HashEmbedder, Storage};
use serde_json::{json, Value};
use tower::ServiceExt;

fn make_state() -> Arc<AppState> {
    let repo_root = tempfile::tempdir().unwrap().into_path();
    let storage = Arc::new(Storage::open_in_memory(Arc::new(HashEmbedder::new(16))).unwrap());
    let cache_dir = tempfile::tempdir().unwrap().into_path();
    let edit = codeplane_edit::EditEngine::new(repo_root.clone(), storage.clone(), cache_dir.join("edit_ledger.jsonl")).unwrap();
    Arc::new(AppState::new(repo_root, storage, Config::default(), cache_dir, edit))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), 1_000_000).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let router = codeplane_mcp::router(make_state());
    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_tool_returns_invalid_params_error() {
    let router = codeplane_mcp::router(make_state());
    let req = json!({"id": 1, "method": "does_not_exist", "params": {}});
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/mcp")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&req).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "INVALID_PARAMS");
}

#[tokio::test]
async fn lexical_search_against_an_empty_index_returns_no_hits_inline() {
    let router = codeplane_mcp::router(make_state());
    let req = json!({"id": 1, "method": "lexical_search", "params": {"query": "anything"}});
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/mcp")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&req).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["result"]["envelope"]["delivery"], "inline");
    assert!(body["result"]["envelope"]["result"]["hits"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn refactor_edit_replaces_the_unique_match_and_returns_a_new_hash() {
    let repo_root = tempfile::tempdir().unwrap().into_path();
    let file = repo_root.join("a.txt");
    std::fs::write(&file, "hello world\n").unwrap();
    let expected = codeplane_edit::current_sha256(&repo_root, std::path::Path::new("a.txt")).unwrap();

    let storage = Arc::new(Storage::open_in_memory(Arc::new(HashEmbedder::new(16))).unwrap());
    let cache_dir = tempfile::tempdir().unwrap().into_path();
    let edit = codeplane_edit::EditEngine::new(repo_root.clone(), storage.clone(), cache_dir.join("edit_ledger.jsonl")).unwrap();
    let state = Arc::new(AppState::new(repo_root, storage, Config::default(), cache_dir, edit));

    let router = codeplane_mcp::router(state);
    let req = json!({
        "id": 1,
        "method": "refactor_edit",
        "params": {"path": "a.txt", "old_text": "world", "new_text": "there", "expected_file_sha256": expected},
    });
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/mcp")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&req).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["result"]["envelope"]["result"]["match_kind"], "exact");
    assert_eq!(std::fs::read_to_string(&file).unwrap(), "hello there\n");
}

#[tokio::test]
async fn repo_header_is_set_on_every_response() {
    let router = codeplane_mcp::router(make_state());
    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.headers().contains_key("X-CodePlane-Repo"));
}
