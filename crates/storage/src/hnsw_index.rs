use std::collections::HashMap;

use crate::error::{Result, StorageError};

/// Brute-force cosine-similarity vector index keyed by a caller-chosen id
/// (a `def_uid` for the def-vector store, a file path for the file-vector
/// store). SPEC §4.1 doesn't mandate a specific ANN structure — the corpus
/// sizes this targets (single-repo) don't need one; the method name is kept
/// in case a real ANN structure replaces this later without touching call
/// sites.
pub struct HnswIndex {
    dimension: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl HnswIndex {
    pub fn new(dimension: usize) -> Self {
        Self { dimension, vectors: HashMap::new() }
    }

    pub fn add(&mut self, id: impl Into<String>, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(StorageError::InvalidDimension { expected: self.dimension, actual: vector.len() });
        }
        self.vectors.insert(id.into(), vector.to_vec());
        Ok(())
    }

    pub fn remove(&mut self, id: &str) {
        self.vectors.remove(id);
    }

    /// Nearest neighbours by cosine similarity, sorted descending.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(String, f32)>> {
        if query.len() != self.dimension {
            return Err(StorageError::InvalidDimension { expected: self.dimension, actual: query.len() });
        }
        let mut scores: Vec<(String, f32)> =
            self.vectors.iter().map(|(id, vector)| (id.clone(), cosine_similarity(query, vector))).collect();
        scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scores.truncate(k);
        Ok(scores)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_exact_and_close_matches_in_order() {
        let mut index = HnswIndex::new(3);
        index.add("a", &[1.0, 0.0, 0.0]).unwrap();
        index.add("b", &[0.9, 0.1, 0.0]).unwrap();
        index.add("c", &[0.0, 1.0, 0.0]).unwrap();

        let results = index.search(&[1.0, 0.0, 0.0], 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "a");
        assert!((results[0].1 - 1.0).abs() < 1e-6);
        assert_eq!(results[1].0, "b");
    }

    #[test]
    fn dimension_mismatch_is_an_error() {
        let mut index = HnswIndex::new(3);
        assert!(index.add("x", &[1.0, 0.0]).is_err());
        index.add("x", &[1.0, 0.0, 0.0]).unwrap();
        assert!(index.search(&[1.0, 0.0], 1).is_err());
    }

    #[test]
    fn removed_vector_is_not_returned() {
        let mut index = HnswIndex::new(2);
        index.add("a", &[1.0, 0.0]).unwrap();
        index.remove("a");
        assert!(index.search(&[1.0, 0.0], 5).unwrap().is_empty());
    }
}
