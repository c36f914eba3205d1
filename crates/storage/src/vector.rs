//! Def-vector and file-vector stores (SPEC §4.1 "def-vector store, N×384"
//! and "file-vector store, M×384, chunk 0/1 per file").

use std::sync::Arc;

use crate::embedder::Embedder;
use crate::error::Result;
use crate::hnsw_index::HnswIndex;

pub struct DefVectorStore {
    index: HnswIndex,
    embedder: Arc<dyn Embedder>,
}

impl DefVectorStore {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        let dim = embedder.dimension();
        Self { index: HnswIndex::new(dim), embedder }
    }

    pub fn upsert(&mut self, def_uid: &str, embedding_text: &str) -> Result<()> {
        let vector = self.embedder.embed(&[embedding_text.to_string()])?.remove(0);
        self.index.add(def_uid, &vector)
    }

    pub fn remove(&mut self, def_uid: &str) {
        self.index.remove(def_uid);
    }

    pub fn search_text(&self, query: &str, k: usize) -> Result<Vec<(String, f32)>> {
        let vector = self.embedder.embed(&[query.to_string()])?.remove(0);
        self.index.search(&vector, k)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// One file gets at most two vectors: chunk 0 (the file's leading doc/
/// header context) and chunk 1 (an aggregate of the file's def bodies),
/// rather than one vector per arbitrary overlap window.
pub struct FileVectorStore {
    index: HnswIndex,
    embedder: Arc<dyn Embedder>,
}

impl FileVectorStore {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        let dim = embedder.dimension();
        Self { index: HnswIndex::new(dim), embedder }
    }

    fn chunk_key(path: &str, chunk: u8) -> String {
        format!("{path}\u{0}{chunk}")
    }

    pub fn upsert_chunk(&mut self, path: &str, chunk: u8, text: &str) -> Result<()> {
        let vector = self.embedder.embed(&[text.to_string()])?.remove(0);
        self.index.add(Self::chunk_key(path, chunk), &vector)
    }

    pub fn remove_file(&mut self, path: &str) {
        self.index.remove(&Self::chunk_key(path, 0));
        self.index.remove(&Self::chunk_key(path, 1));
    }

    pub fn search_text(&self, query: &str, k: usize) -> Result<Vec<(String, f32)>> {
        let vector = self.embedder.embed(&[query.to_string()])?.remove(0);
        self.index.search(&vector, k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::HashEmbedder;

    #[test]
    fn def_vector_store_round_trips_a_query() {
        let mut store = DefVectorStore::new(Arc::new(HashEmbedder::new(32)));
        store.upsert("uid-1", "fn authenticate_user(token: &str) -> bool").unwrap();
        store.upsert("uid-2", "fn add(a: i32, b: i32) -> i32").unwrap();
        let hits = store.search_text("fn authenticate_user(token: &str) -> bool", 1).unwrap();
        assert_eq!(hits[0].0, "uid-1");
    }

    #[test]
    fn file_vector_store_keys_chunks_independently() {
        let mut store = FileVectorStore::new(Arc::new(HashEmbedder::new(16)));
        store.upsert_chunk("src/lib.rs", 0, "module header").unwrap();
        store.upsert_chunk("src/lib.rs", 1, "aggregated defs").unwrap();
        store.remove_file("src/lib.rs");
        assert!(store.search_text("module header", 5).unwrap().is_empty());
    }
}
