//! MCP tool host (SPEC §4.8): JSON-RPC over HTTP, a two-phase
//! confirmation gate, pagination-cursor validation against the storage
//! layer's epoch, and a size-budgeted delivery envelope that spills large
//! results to a session-scoped disk cache.

mod cursor;
mod envelope;
mod error;
mod gate;
mod pattern;
mod session;
mod server;
mod tools;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use codeplane_edit::EditEngine;
use codeplane_protocol::Config;
use codeplane_storage::Storage;

pub use error::{McpError, Result};
pub use server::{router, AppState};

/// Binds and serves the MCP HTTP transport in the foreground until the
/// process is terminated. This is the only thing `codeplane-cli` calls.
pub async fn serve(addr: SocketAddr, repo_root: PathBuf, storage: Arc<Storage>, config: Config, cache_dir: PathBuf) -> anyhow::Result<()> {
    let ledger_path = cache_dir.parent().unwrap_or(&cache_dir).join("edit_ledger.jsonl");
    let edit = EditEngine::new(repo_root.clone(), storage.clone(), ledger_path)?;
    let state = Arc::new(AppState::new(repo_root, storage, config, cache_dir, edit));
    let app = server::router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "codeplane MCP server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
