//! HTTP transport and request lifecycle (SPEC §4.8.1): JSON-RPC over HTTP
//! at `/mcp`, plus the sidecar GET endpoints the delivery envelope's fetch
//! hints point at.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use codeplane_edit::EditEngine;
use codeplane_protocol::{CodePlaneError, Config};
use codeplane_storage::Storage;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::cursor;
use crate::envelope::{self, EnvelopeConfig};
use crate::error::McpError;
use crate::gate::{GateRegistry, MINIMUM_JUSTIFICATION_CHARS};
use crate::pattern;
use crate::session::{CallRecord, SessionManager};
use crate::tools::{self, ToolName};

pub struct AppState {
    pub storage: Arc<Storage>,
    pub repo_root: PathBuf,
    pub config: Config,
    pub cache_dir: PathBuf,
    pub edit: EditEngine,
    pub sessions: Mutex<SessionManager>,
    pub gates: Mutex<GateRegistry>,
}

impl AppState {
    pub fn new(repo_root: PathBuf, storage: Arc<Storage>, config: Config, cache_dir: PathBuf, edit: EditEngine) -> Self {
        Self {
            storage,
            repo_root,
            config,
            cache_dir,
            edit,
            sessions: Mutex::new(SessionManager::new()),
            gates: Mutex::new(GateRegistry::new()),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/mcp", post(handle_mcp))
        .route("/health", get(handle_health))
        .route("/status", get(handle_status))
        .route("/sidecar/cache/slice", get(handle_cache_slice))
        .route("/sidecar/cache/list", get(handle_cache_list))
        .route("/sidecar/cache/meta", get(handle_cache_meta))
        .layer(middleware::from_fn_with_state(state.clone(), repo_header_middleware))
        .with_state(state)
}

async fn repo_header_middleware(State(state): State<Arc<AppState>>, request: axum::extract::Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&state.repo_root.display().to_string()) {
        response.headers_mut().insert("X-CodePlane-Repo", value);
    }
    response
}

#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[serde(default)]
    id: Value,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    gate_token: Option<String>,
    #[serde(default)]
    gate_reason: Option<String>,
    #[serde(default)]
    cursor: Option<String>,
    #[serde(flatten)]
    args: Value,
}

fn ok_response(id: Value, result: Value) -> Json<Value> {
    Json(json!({ "jsonrpc": "2.0", "id": id, "result": result }))
}

fn err_response(id: Value, error: CodePlaneError) -> Json<Value> {
    Json(json!({ "jsonrpc": "2.0", "id": id, "error": error }))
}

async fn handle_mcp(State(state): State<Arc<AppState>>, Json(req): Json<JsonRpcRequest>) -> Json<Value> {
    let id = req.id.clone();

    let tool = match ToolName::parse(&req.method) {
        Ok(tool) => tool,
        Err(err) => return err_response(id, err.into_envelope()),
    };

    let call: ToolCall = match serde_json::from_value(req.params) {
        Ok(call) => call,
        Err(err) => return err_response(id, McpError::InvalidParams(err.to_string()).into_envelope()),
    };

    let mut sessions = state.sessions.lock().expect("session lock poisoned");
    let session_id = sessions.resolve(call.session_id.clone());

    if let Some(token) = &call.gate_token {
        let reason = call.gate_reason.clone().unwrap_or_default();
        let mut gates = state.gates.lock().expect("gate lock poisoned");
        if let Err(msg) = gates.validate(tool.as_str(), token, &reason) {
            return err_response(id, McpError::GateRequired(msg).into_envelope());
        }
    } else if let Some(pattern) = sessions.state(&session_id).and_then(pattern::detect) {
        let mut gates = state.gates.lock().expect("gate lock poisoned");
        let token = gates.issue(tool.as_str(), pattern);
        let error = CodePlaneError::new(
            codeplane_protocol::ErrorCode::GateRequired,
            format!("call pattern `{pattern}` detected; confirm before continuing"),
            "retry this call with gate_token and a gate_reason explaining why it's needed",
        )
        .with_context("gate_token", json!(token))
        .with_context("minimum_justification_chars", json!(MINIMUM_JUSTIFICATION_CHARS));
        return err_response(id, error);
    }

    if let Some(cursor_raw) = &call.cursor {
        let decoded = match cursor::decode(cursor_raw) {
            Ok(c) => c,
            Err(err) => return err_response(id, err.into_envelope()),
        };
        let current_epoch = state.storage.current_epoch();
        let query_hash = decoded.query_hash;
        if let Err(err) = cursor::validate(&decoded, current_epoch, tool.as_str(), query_hash) {
            return err_response(id, err.into_envelope());
        }
    }

    let outcome = match tools::dispatch(tool, &state.repo_root, &state.storage, &state.edit, &call.args) {
        Ok(outcome) => outcome,
        Err(err) => return err_response(id, err.into_envelope()),
    };

    sessions.state_mut(&session_id).record(CallRecord { tool, category: tool.category(), empty_result: outcome.empty });
    drop(sessions);

    let envelope = match envelope::wrap(&state.cache_dir, outcome.result, EnvelopeConfig { inline_cap_bytes: state.config.budgets.response_max_bytes }) {
        Ok(envelope) => envelope,
        Err(err) => return err_response(id, err.into_envelope()),
    };

    ok_response(id, json!({ "session_id": session_id, "envelope": envelope }))
}

async fn handle_health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

async fn handle_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "repo_root": state.repo_root.display().to_string(),
            "epoch": state.storage.current_epoch(),
        })),
    )
}

#[derive(Debug, Deserialize)]
struct CacheQuery {
    cache: String,
}

async fn handle_cache_slice(State(state): State<Arc<AppState>>, Query(query): Query<CacheQuery>) -> Response {
    match envelope::read_slice(&state.cache_dir, &query.cache) {
        Ok(value) => Json(value).into_response(),
        Err(err) => (StatusCode::NOT_FOUND, Json(err.into_envelope())).into_response(),
    }
}

async fn handle_cache_list(State(state): State<Arc<AppState>>) -> Response {
    match envelope::list(&state.cache_dir) {
        Ok(ids) => Json(json!({ "cache_ids": ids })).into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, Json(err.into_envelope())).into_response(),
    }
}

async fn handle_cache_meta(State(state): State<Arc<AppState>>, Query(query): Query<CacheQuery>) -> Response {
    match envelope::meta(&state.cache_dir, &query.cache) {
        Ok(value) => Json(value).into_response(),
        Err(err) => (StatusCode::NOT_FOUND, Json(err.into_envelope())).into_response(),
    }
}
