//! Standalone MCP server binary. `codeplane-cli` wraps this same
//! `codeplane_mcp::serve` call behind `--port`/`--index-path` flags; this
//! binary exists for running the host directly against the current
//! directory, matching the teacher's habit of shipping a bare server
//! binary alongside its CLI-wrapped one.

use std::net::SocketAddr;
use std::sync::Arc;

use codeplane_storage::{HashEmbedder, Storage};
use tracing_subscriber::EnvFilter;

const EMBED_DIM: usize = 384;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let repo_root = std::env::current_dir()?;
    let config = codeplane_protocol::Config::load(&repo_root);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.logging.level.as_tracing_filter()))
        .with_writer(std::io::stderr)
        .init();

    let index_path = config.index_path(&repo_root);
    let storage = Arc::new(Storage::open(&index_path, Arc::new(HashEmbedder::new(EMBED_DIM)))?);
    let cache_dir = index_path.join("cache");
    let addr: SocketAddr = ([127, 0, 0, 1], config.server.port).into();

    codeplane_mcp::serve(addr, repo_root, storage, config, cache_dir).await
}
