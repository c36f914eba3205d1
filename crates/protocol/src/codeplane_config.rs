//! Server configuration (SPEC §6): a typed `Config` loaded with precedence
//! env var > `.codeplane/config.yaml` > built-in default. Only covers the
//! fields the rest of the workspace actually parametrizes (port, logging
//! level, index path, debounce window, worker pool size, byte budgets) —
//! the on-disk schema's full surface and CLI-driven generation of
//! `config.yaml` are out of scope.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const SERVER_PORT_ENV: &str = "CODEPLANE__SERVER__PORT";
const LOGGING_LEVEL_ENV: &str = "CODEPLANE__LOGGING__LEVEL";
const INDEX_PATH_ENV: &str = "CODEPLANE__INDEX__INDEX_PATH";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Critical,
}

impl LogLevel {
    fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "DEBUG" => Some(Self::Debug),
            "INFO" => Some(Self::Info),
            "WARN" => Some(Self::Warn),
            "ERROR" => Some(Self::Error),
            "CRITICAL" => Some(Self::Critical),
            _ => None,
        }
    }

    /// `tracing_subscriber::filter::LevelFilter`-compatible string.
    /// CRITICAL has no tracing equivalent, so it maps to ERROR.
    pub fn as_tracing_filter(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error | Self::Critical => "error",
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8751 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: LogLevel::default() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub index_path: Option<PathBuf>,
    pub debounce_ms: u64,
    pub worker_pool_size: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { index_path: None, debounce_ms: 500, worker_pool_size: 4 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Budgets {
    pub response_max_bytes: usize,
    pub max_read_targets: usize,
    pub max_span_lines: usize,
    pub session_ring_buffer_size: usize,
}

impl Default for Budgets {
    fn default() -> Self {
        Self { response_max_bytes: 40_000, max_read_targets: 16, max_span_lines: 500, session_ring_buffer_size: 32 }
    }
}

/// The on-disk shape of `.codeplane/config.yaml` (user-facing) merged with
/// `state.yaml` (auto-generated, holds `index_path`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub index: IndexConfig,
    pub budgets: Budgets,
}

impl Config {
    /// Loads `config.yaml` + `state.yaml` under `repo_root/.codeplane/` if
    /// present, then applies env var overrides. Missing files fall back to
    /// defaults rather than erroring — the on-disk layout is optional.
    pub fn load(repo_root: &Path) -> Self {
        let dir = repo_root.join(".codeplane");
        let mut config = Self::from_yaml_file(&dir.join("config.yaml")).unwrap_or_default();

        if let Some(state) = Self::from_yaml_file(&dir.join("state.yaml")) {
            if state.index.index_path.is_some() {
                config.index.index_path = state.index.index_path;
            }
        }

        config.apply_env_overrides();
        config
    }

    fn from_yaml_file(path: &Path) -> Option<Self> {
        let raw = fs::read_to_string(path).ok()?;
        serde_yaml::from_str(&raw).ok()
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(port) = env::var(SERVER_PORT_ENV) {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(level) = env::var(LOGGING_LEVEL_ENV) {
            if let Some(level) = LogLevel::parse(&level) {
                self.logging.level = level;
            }
        }
        if let Ok(path) = env::var(INDEX_PATH_ENV) {
            self.index.index_path = Some(PathBuf::from(path));
        }
    }

    pub fn index_path(&self, repo_root: &Path) -> PathBuf {
        self.index.index_path.clone().unwrap_or_else(|| repo_root.join(".codeplane"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_budgets() {
        let config = Config::default();
        assert_eq!(config.server.port, 8751);
        assert_eq!(config.budgets.response_max_bytes, 40_000);
    }

    #[test]
    fn env_override_takes_precedence_over_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let codeplane_dir = dir.path().join(".codeplane");
        fs::create_dir_all(&codeplane_dir).unwrap();
        fs::write(codeplane_dir.join("config.yaml"), "server:\n  port: 9000\n").unwrap();

        env::set_var(SERVER_PORT_ENV, "9500");
        let config = Config::load(dir.path());
        env::remove_var(SERVER_PORT_ENV);

        assert_eq!(config.server.port, 9500);
    }

    #[test]
    fn yaml_is_used_when_no_env_override_is_set() {
        let dir = tempfile::tempdir().unwrap();
        let codeplane_dir = dir.path().join(".codeplane");
        fs::create_dir_all(&codeplane_dir).unwrap();
        fs::write(codeplane_dir.join("config.yaml"), "logging:\n  level: DEBUG\n").unwrap();

        env::remove_var(LOGGING_LEVEL_ENV);
        let config = Config::load(dir.path());

        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn missing_on_disk_layout_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path());
        assert_eq!(config.server.port, ServerConfig::default().port);
    }
}
