//! File-change events and the coalescing queue that sits between the raw
//! filesystem watcher and the batch pipeline (SPEC §4.4).

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Deleted,
    Renamed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

/// Coalesces events for the same path within `window` to the latest kind
/// (SPEC §4.4 "debounce: events for the same path within the debounce window
/// coalesce to the latest kind").
pub struct Debouncer {
    window: Duration,
    pending: HashMap<PathBuf, (ChangeKind, Instant)>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self { window, pending: HashMap::new() }
    }

    pub fn push(&mut self, event: FileChangeEvent) {
        self.pending.insert(event.path, (event.kind, Instant::now()));
    }

    /// Drain every path whose most recent event is older than `window`,
    /// leaving paths still inside the window queued for the next call.
    pub fn drain_ready(&mut self) -> Vec<FileChangeEvent> {
        let window = self.window;
        let ready: Vec<PathBuf> =
            self.pending.iter().filter(|(_, (_, at))| at.elapsed() >= window).map(|(p, _)| p.clone()).collect();
        ready
            .into_iter()
            .filter_map(|path| self.pending.remove(&path).map(|(kind, _)| FileChangeEvent { path, kind }))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_events_for_one_path_coalesce_to_the_latest_kind() {
        let mut debouncer = Debouncer::new(Duration::from_millis(0));
        debouncer.push(FileChangeEvent { path: "a.rs".into(), kind: ChangeKind::Created });
        debouncer.push(FileChangeEvent { path: "a.rs".into(), kind: ChangeKind::Modified });
        let drained = debouncer.drain_ready();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].kind, ChangeKind::Modified);
    }

    #[test]
    fn events_inside_the_window_are_not_drained_yet() {
        let mut debouncer = Debouncer::new(Duration::from_secs(60));
        debouncer.push(FileChangeEvent { path: "a.rs".into(), kind: ChangeKind::Created });
        assert!(debouncer.drain_ready().is_empty());
        assert!(!debouncer.is_empty());
    }
}
