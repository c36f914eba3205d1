//! Storage layer (SPEC §4.1): one relational store, one lexical full-text
//! index, and two vector stores (def-vector, file-vector), published
//! together under a single epoch counter so readers always see a
//! consistent snapshot.
//!
//! ```text
//! indexer batch
//!     │
//!     ├──> RelationalStore   (files, definitions, references, imports, ...)
//!     ├──> LexicalIndex      (BM25 over file contents)
//!     ├──> DefVectorStore    (N×384, one vector per definition)
//!     └──> FileVectorStore   (M×384, two vectors per file)
//!            │
//!            └──> Storage::publish_epoch()  — swaps all four atomically
//! ```
//!
//! Readers call `current_epoch()` once at query start and never observe a
//! row/vector/document created under a later epoch (SPEC §3, §8).

mod def_uid_bridge;
pub mod embedder;
mod error;
mod hnsw_index;
pub mod lexical;
pub mod relational;
pub mod vector;

use std::path::Path;
use std::sync::{Arc, RwLock};

use codeplane_protocol::Epoch;
use tokio::sync::watch;

pub use def_uid_bridge::RelationalDefLookup;
pub use embedder::{Embedder, HashEmbedder};
pub use error::{Result, StorageError};
pub use lexical::{LexicalHit, LexicalIndex};
pub use relational::RelationalStore;
pub use vector::{DefVectorStore, FileVectorStore};

/// Ties the four stores to one epoch counter. `publish_epoch` is the only
/// writer of `current`; readers subscribe via `watch_epoch` to implement
/// `await_epoch` (SPEC §4.8.3 cursor/epoch wait) without polling.
pub struct Storage {
    pub relational: RwLock<RelationalStore>,
    pub lexical: RwLock<LexicalIndex>,
    pub def_vectors: RwLock<DefVectorStore>,
    pub file_vectors: RwLock<FileVectorStore>,
    epoch_tx: watch::Sender<u64>,
}

impl Storage {
    pub fn open(index_dir: &Path, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let relational = RelationalStore::open(&index_dir.join("index.sqlite3"))?;
        let lexical = LexicalIndex::open_in_dir(&index_dir.join("lexical"))?;
        let current = relational.current_epoch()?;
        let (epoch_tx, _rx) = watch::channel(current);
        Ok(Self {
            relational: RwLock::new(relational),
            lexical: RwLock::new(lexical),
            def_vectors: RwLock::new(DefVectorStore::new(embedder.clone())),
            file_vectors: RwLock::new(FileVectorStore::new(embedder)),
            epoch_tx,
        })
    }

    pub fn open_in_memory(embedder: Arc<dyn Embedder>) -> Result<Self> {
        let relational = RelationalStore::open_in_memory()?;
        let lexical = LexicalIndex::open_in_memory()?;
        let (epoch_tx, _rx) = watch::channel(0);
        Ok(Self {
            relational: RwLock::new(relational),
            lexical: RwLock::new(lexical),
            def_vectors: RwLock::new(DefVectorStore::new(embedder.clone())),
            file_vectors: RwLock::new(FileVectorStore::new(embedder)),
            epoch_tx,
        })
    }

    pub fn current_epoch(&self) -> u64 {
        *self.epoch_tx.borrow()
    }

    /// Commit the lexical index's pending batch, publish a new relational
    /// epoch, and broadcast it to anyone awaiting a cursor's epoch
    /// (SPEC §4.1 step 4, §4.8.3).
    pub fn publish_epoch(&self, publish_time_unix_ms: u64, commit_hash: Option<&str>, files_indexed: u64) -> Result<Epoch> {
        self.lexical.write().unwrap().commit()?;
        let epoch = self.relational.read().unwrap().publish_epoch(publish_time_unix_ms, commit_hash, files_indexed)?;
        let _ = self.epoch_tx.send(epoch.id);
        Ok(epoch)
    }

    /// Resolve once `current_epoch() >= target`, or immediately if already
    /// there. A pagination cursor stamped with an epoch the indexer hasn't
    /// reached yet (SPEC §4.8.3 `CURSOR_STALE` path) awaits here instead of
    /// the caller busy-polling.
    pub async fn await_epoch(&self, target: u64) -> u64 {
        let mut rx = self.epoch_tx.subscribe();
        loop {
            let current = *rx.borrow();
            if current >= target {
                return current;
            }
            if rx.changed().await.is_err() {
                return *rx.borrow();
            }
        }
    }
}
