//! Delivery envelope (SPEC §4.8.4): inline when the JSON fits the budget,
//! otherwise spilled to a session-scoped disk cache file and replaced
//! with a fetch hint. The cache directory lives under the index path and
//! is effectively wiped on restart — a fresh index path (or a fresh
//! `tempfile::TempDir` in tests) starts with nothing in it.

use std::fs;
use std::path::Path;

use serde_json::{json, Value};

use crate::error::Result;

#[derive(Debug, Clone, Copy)]
pub struct EnvelopeConfig {
    pub inline_cap_bytes: usize,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self { inline_cap_bytes: 40_000 }
    }
}

/// Writes `value` to `<cache_dir>/<uuid>.json` and returns the cache id.
fn spill(cache_dir: &Path, value: &Value) -> Result<String> {
    fs::create_dir_all(cache_dir)?;
    let id = uuid::Uuid::new_v4().to_string();
    let path = cache_dir.join(format!("{id}.json"));
    fs::write(&path, serde_json::to_vec(value)?)?;
    Ok(id)
}

/// Wraps a tool result in an inline or resource-delivered envelope,
/// depending on its serialized size against `config.inline_cap_bytes`.
pub fn wrap(cache_dir: &Path, result: Value, config: EnvelopeConfig) -> Result<Value> {
    let bytes = serde_json::to_vec(&result)?;
    if bytes.len() <= config.inline_cap_bytes {
        return Ok(json!({ "delivery": "inline", "result": result }));
    }

    let id = spill(cache_dir, &result)?;
    Ok(json!({
        "delivery": "resource",
        "cache_id": id,
        "hint": format!("fetch via GET /sidecar/cache/slice?cache={id}&path=result, or /sidecar/cache/meta?cache={id} for size"),
    }))
}

pub fn read_slice(cache_dir: &Path, cache_id: &str) -> Result<Value> {
    let path = cache_dir.join(format!("{cache_id}.json"));
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn list(cache_dir: &Path) -> Result<Vec<String>> {
    if !cache_dir.exists() {
        return Ok(Vec::new());
    }
    let mut ids = Vec::new();
    for entry in fs::read_dir(cache_dir)? {
        let entry = entry?;
        if let Some(stem) = entry.path().file_stem().and_then(|s| s.to_str()) {
            ids.push(stem.to_string());
        }
    }
    Ok(ids)
}

pub fn meta(cache_dir: &Path, cache_id: &str) -> Result<Value> {
    let path = cache_dir.join(format!("{cache_id}.json"));
    let metadata = fs::metadata(&path)?;
    Ok(json!({ "cache_id": cache_id, "bytes": metadata.len() }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn small_results_are_delivered_inline() {
        let dir = tempdir().unwrap();
        let result = json!({"a": 1});
        let envelope = wrap(dir.path(), result, EnvelopeConfig::default()).unwrap();
        assert_eq!(envelope["delivery"], "inline");
    }

    #[test]
    fn oversized_results_spill_to_disk_and_round_trip() {
        let dir = tempdir().unwrap();
        let result = json!({"big": "x".repeat(100)});
        let config = EnvelopeConfig { inline_cap_bytes: 10 };
        let envelope = wrap(dir.path(), result.clone(), config).unwrap();
        assert_eq!(envelope["delivery"], "resource");
        let cache_id = envelope["cache_id"].as_str().unwrap();
        let fetched = read_slice(dir.path(), cache_id).unwrap();
        assert_eq!(fetched, result);
        assert!(list(dir.path()).unwrap().contains(&cache_id.to_string()));
        assert_eq!(meta(dir.path(), cache_id).unwrap()["cache_id"], cache_id);
    }
}
