use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use codeplane_storage::{HashEmbedder, Storage};
use tracing_subscriber::EnvFilter;

const EMBED_DIM: usize = 384;

/// Starts the CodePlane MCP server in the foreground against `repo`.
/// There is no daemon supervisor, PID file, or subcommand surface here —
/// process lifecycle is whatever the OS gives a single `tokio::main`.
#[derive(Parser, Debug)]
#[command(name = "codeplane")]
pub struct Args {
    /// Repository root to serve. Defaults to the current directory.
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    /// Overrides the configured port (same as CODEPLANE__SERVER__PORT).
    #[arg(long)]
    pub port: Option<u16>,

    /// Overrides the configured index path (same as CODEPLANE__INDEX__INDEX_PATH).
    #[arg(long)]
    pub index_path: Option<PathBuf>,
}

pub async fn run(args: Args) -> anyhow::Result<()> {
    let repo_root = args.repo.canonicalize().unwrap_or(args.repo);
    let mut config = codeplane_protocol::Config::load(&repo_root);

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(index_path) = args.index_path {
        config.index.index_path = Some(index_path);
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.logging.level.as_tracing_filter()))
        .with_writer(std::io::stderr)
        .init();

    let index_path = config.index_path(&repo_root);
    let storage = Arc::new(Storage::open(&index_path, Arc::new(HashEmbedder::new(EMBED_DIM)))?);
    let cache_dir = index_path.join("cache");
    let addr: SocketAddr = ([127, 0, 0, 1], config.server.port).into();

    tracing::info!(repo = %repo_root.display(), %addr, "starting codeplane");
    codeplane_mcp::serve(addr, repo_root, storage, config, cache_dir).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_and_index_path_flags_override_the_loaded_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = codeplane_protocol::Config::load(dir.path());
        assert_ne!(config.server.port, 9999);

        config.server.port = 9999;
        config.index.index_path = Some(dir.path().join("custom-index"));

        assert_eq!(config.server.port, 9999);
        assert_eq!(config.index.index_path, Some(dir.path().join("custom-index")));
    }

    #[test]
    fn args_default_repo_to_the_current_directory() {
        let args = Args::try_parse_from(["codeplane"]).unwrap();
        assert_eq!(args.repo, PathBuf::from("."));
        assert_eq!(args.port, None);
    }

    #[test]
    fn args_parse_an_explicit_port_and_index_path() {
        let args = Args::try_parse_from(["codeplane", "--port", "9000", "--index-path", "/tmp/idx"]).unwrap();
        assert_eq!(args.port, Some(9000));
        assert_eq!(args.index_path, Some(PathBuf::from("/tmp/idx")));
    }
}
