//! Indexer (SPEC §4.4): the background worker that turns filesystem change
//! events into published storage epochs.
//!
//! ```text
//! notify watcher / git-status poller
//!   │  FileChangeEvent
//!   ▼
//! Debouncer (coalesce per path, SPEC §4.4 debounce window)
//!   │
//!   ▼
//! IgnoreFilter (.cplignore + context excludes)
//!   │
//!   ▼
//! Pipeline::run_batch  -> parse/extract -> storage writes -> resolver -> publish_epoch
//! ```

mod cplignore;
mod error;
pub mod events;
mod pipeline;
mod watcher;

use std::path::PathBuf;
use std::sync::Arc;

use codeplane_protocol::Epoch;
use codeplane_storage::Storage;

pub use cplignore::IgnoreFilter;
pub use error::{IndexerError, Result};
pub use events::{ChangeKind, Debouncer, FileChangeEvent};
pub use pipeline::Pipeline;
pub use watcher::{needs_polling_fallback, WatcherConfig};

/// Owns the watcher task, the ignore filter, and the pipeline for one repo
/// root. `run_forever` drives the loop described in SPEC §4.4; callers that
/// just want to index once (e.g. a CLI `--once` mode or tests) should drive
/// `Pipeline` directly instead.
pub struct ProjectIndexer {
    repo_root: PathBuf,
    storage: Arc<Storage>,
    pipeline: Pipeline,
    ignore_filter: IgnoreFilter,
    config: WatcherConfig,
}

impl ProjectIndexer {
    pub fn new(repo_root: PathBuf, storage: Arc<Storage>) -> Result<Self> {
        let pipeline = Pipeline::new(repo_root.clone(), storage.clone())?;
        let ignore_filter = IgnoreFilter::load(&repo_root, &[])?;
        Ok(Self { repo_root, storage, pipeline, ignore_filter, config: WatcherConfig::default() })
    }

    pub fn with_config(mut self, config: WatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Index the entire repo once, synchronously, as a single batch. Used
    /// for the initial index on startup before the watcher takes over.
    pub fn index_full_repo(&mut self) -> Result<Epoch> {
        self.pipeline.refresh_contexts()?;
        let mut events = Vec::new();
        let walker = ignore::WalkBuilder::new(&self.repo_root).hidden(false).git_ignore(true).build();
        for entry in walker {
            let Ok(entry) = entry else { continue };
            if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
                continue;
            }
            let path = entry.path().to_path_buf();
            let rel = path.strip_prefix(&self.repo_root).unwrap_or(&path).to_string_lossy().replace('\\', "/");
            if self.ignore_filter.is_ignored(&rel) {
                continue;
            }
            events.push(FileChangeEvent { path, kind: ChangeKind::Created });
        }
        self.pipeline.run_batch(&events)
    }

    /// Start the watcher and process batches until the channel closes. Each
    /// incoming batch is filtered through `.cplignore`, then run through the
    /// pipeline; a change to `.cplignore` itself triggers a debounced
    /// reload of both the filter and the context registry.
    pub async fn run_forever(mut self) -> Result<()> {
        let mut batches = watcher::spawn(self.repo_root.clone(), self.config.clone())?;
        while let Some(batch) = batches.recv().await {
            let mut touched_cplignore = false;
            let filtered: Vec<FileChangeEvent> = batch
                .into_iter()
                .filter(|event| {
                    if event.path.file_name().map(|n| n == ".cplignore").unwrap_or(false) {
                        touched_cplignore = true;
                    }
                    let rel = event
                        .path
                        .strip_prefix(&self.repo_root)
                        .unwrap_or(&event.path)
                        .to_string_lossy()
                        .replace('\\', "/");
                    !self.ignore_filter.is_ignored(&rel)
                })
                .collect();

            if touched_cplignore {
                self.ignore_filter.notify_cplignore_changed();
            }
            if self.ignore_filter.apply_pending_reload(&[])? {
                self.pipeline.refresh_contexts()?;
            }

            if !filtered.is_empty() {
                let epoch = self.pipeline.run_batch(&filtered)?;
                tracing::info!(epoch = epoch.id, files = epoch.files_indexed, "published epoch");
            }
        }
        Ok(())
    }

    pub fn storage(&self) -> &Arc<Storage> {
        &self.storage
    }
}
