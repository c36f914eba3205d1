//! Filesystem watcher (SPEC §4.4): translates `notify` events into
//! `FileChangeEvent`s and feeds them through a `Debouncer` before the batch
//! pipeline sees them. Falls back to polling `git status` on filesystems
//! that don't support native inode watching.

use std::path::{Path, PathBuf};
use std::sync::mpsc as std_mpsc;
use std::time::Duration;

use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::events::{ChangeKind, Debouncer, FileChangeEvent};
use crate::{IndexerError, Result};

#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub debounce: Duration,
    pub max_batch_wait: Duration,
    pub poll_interval: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            max_batch_wait: Duration::from_secs(3),
            poll_interval: Duration::from_secs(2),
        }
    }
}

/// True when `root` sits on a mount notify can't watch natively (network
/// mounts and overlay/container mounts routinely drop inotify events).
/// Detected by path prefix rather than a syscall probe, matching how the
/// rest of discovery avoids touching platform-specific APIs.
pub fn needs_polling_fallback(root: &Path) -> bool {
    let s = root.to_string_lossy();
    s.starts_with("/mnt/") || s.starts_with("/net/") || s.starts_with("//")
}

/// Spawns a background watcher over `root` and returns a channel of
/// debounced batches of `FileChangeEvent`. Each element of the stream is one
/// batch ready to feed into `Pipeline::run_batch`.
pub fn spawn(root: PathBuf, config: WatcherConfig) -> Result<mpsc::Receiver<Vec<FileChangeEvent>>> {
    let (batch_tx, batch_rx) = mpsc::channel(64);

    if needs_polling_fallback(&root) {
        tokio::spawn(poll_git_status_loop(root, config, batch_tx));
        return Ok(batch_rx);
    }

    let (raw_tx, raw_rx) = std_mpsc::channel::<notify::Result<Event>>();
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = raw_tx.send(res);
        },
        NotifyConfig::default(),
    )
    .map_err(|e| IndexerError::InvalidPath(format!("failed to start watcher: {e}")))?;
    watcher.watch(&root, RecursiveMode::Recursive).map_err(|e| IndexerError::InvalidPath(e.to_string()))?;

    std::thread::spawn(move || {
        let _watcher = watcher;
        let mut debouncer = Debouncer::new(config.debounce);
        loop {
            match raw_rx.recv_timeout(config.max_batch_wait) {
                Ok(Ok(event)) => {
                    for change in translate(event) {
                        debouncer.push(change);
                    }
                }
                Ok(Err(_)) => continue,
                Err(std_mpsc::RecvTimeoutError::Timeout) => {}
                Err(std_mpsc::RecvTimeoutError::Disconnected) => break,
            }
            let ready = debouncer.drain_ready();
            if !ready.is_empty() && batch_tx.blocking_send(ready).is_err() {
                break;
            }
        }
    });

    Ok(batch_rx)
}

fn translate(event: Event) -> Vec<FileChangeEvent> {
    let kind = match event.kind {
        EventKind::Create(_) => ChangeKind::Created,
        EventKind::Modify(_) => ChangeKind::Modified,
        EventKind::Remove(_) => ChangeKind::Deleted,
        _ => return Vec::new(),
    };
    event.paths.into_iter().map(|path| FileChangeEvent { path, kind }).collect()
}

async fn poll_git_status_loop(root: PathBuf, config: WatcherConfig, batch_tx: mpsc::Sender<Vec<FileChangeEvent>>) {
    let mut known_hashes: std::collections::HashMap<PathBuf, u64> = std::collections::HashMap::new();
    loop {
        tokio::time::sleep(config.poll_interval).await;
        let Ok(output) = tokio::process::Command::new("git").arg("status").arg("--porcelain").current_dir(&root).output().await
        else {
            continue;
        };
        let mut changes = Vec::new();
        for line in String::from_utf8_lossy(&output.stdout).lines() {
            let Some(rel) = line.get(3..) else { continue };
            let path = root.join(rel.trim());
            let kind = if path.exists() { ChangeKind::Modified } else { ChangeKind::Deleted };
            changes.push(FileChangeEvent { path: path.clone(), kind });
            known_hashes.insert(path, line.len() as u64);
        }
        if !changes.is_empty() && batch_tx.send(changes).await.is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_mount_prefixes_trigger_polling_fallback() {
        assert!(needs_polling_fallback(Path::new("/mnt/repo")));
        assert!(!needs_polling_fallback(Path::new("/home/user/repo")));
    }
}
