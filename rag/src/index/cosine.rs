//! Exact cosine-similarity index.

use parking_lot::RwLock;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};

use crate::error::{RagError, Result};
use crate::types::{Chunk, IndexEntry, SearchResult};

use super::VectorIndex;

/// Computes cosine similarity between two vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0f32, 0.0f32, 0.0f32);
    for (lhs, rhs) in a.iter().zip(b) {
        dot += lhs * rhs;
        norm_a += lhs * lhs;
        norm_b += rhs * rhs;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

struct IndexState {
    /// Entries in insertion order. Order is observable through search tie
    /// breaking, so removals must not reorder.
    entries: Vec<IndexEntry>,
    /// Map from chunk ID to position in `entries`.
    id_to_index: HashMap<String, usize>,
    /// Content hashes present in the index.
    content_hashes: HashSet<u64>,
}

impl IndexState {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            id_to_index: HashMap::new(),
            content_hashes: HashSet::new(),
        }
    }

    fn rebuild_lookups(&mut self) {
        self.id_to_index = self
            .entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (entry.chunk.id.clone(), idx))
            .collect();
        self.content_hashes = self
            .entries
            .iter()
            .map(|entry| entry.chunk.content_hash)
            .collect();
    }
}

/// Exact cosine-similarity index scoring every entry in parallel.
///
/// Suited to corpora of up to hundreds of thousands of vectors; a handful of
/// chunked PDFs is far below that, so no approximate structure is needed.
pub struct CosineIndex {
    dimension: usize,
    state: RwLock<IndexState>,
}

impl std::fmt::Debug for CosineIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("CosineIndex")
            .field("dimension", &self.dimension)
            .field("len", &state.entries.len())
            .finish()
    }
}

impl CosineIndex {
    /// Creates a new index with the specified embedding dimension.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            state: RwLock::new(IndexState::new()),
        }
    }
}

impl VectorIndex for CosineIndex {
    fn insert(&self, chunk: Chunk, embedding: Vec<f32>) -> Result<()> {
        if embedding.len() != self.dimension {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }

        let mut state = self.state.write();
        if let Some(&idx) = state.id_to_index.get(&chunk.id) {
            let old_hash = state.entries[idx].chunk.content_hash;
            state.content_hashes.remove(&old_hash);
            state.content_hashes.insert(chunk.content_hash);
            state.entries[idx] = IndexEntry::new(chunk, embedding);
        } else {
            let idx = state.entries.len();
            state.id_to_index.insert(chunk.id.clone(), idx);
            state.content_hashes.insert(chunk.content_hash);
            state.entries.push(IndexEntry::new(chunk, embedding));
        }
        Ok(())
    }

    fn remove(&self, chunk_id: &str) -> bool {
        let mut state = self.state.write();
        let Some(&idx) = state.id_to_index.get(chunk_id) else {
            return false;
        };
        state.entries.remove(idx);
        state.rebuild_lookups();
        true
    }

    fn search(&self, query: &[f32], top_k: usize, threshold: f32) -> Result<Vec<SearchResult>> {
        if query.len() != self.dimension {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let state = self.state.read();
        if state.entries.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<SearchResult> = state
            .entries
            .par_iter()
            .map(|entry| SearchResult {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(&entry.embedding, query),
            })
            .filter(|result| result.score >= threshold)
            .collect();

        // Stable sort keeps insertion order among equal scores.
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);
        Ok(scored)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    fn clear(&self) {
        let mut state = self.state.write();
        *state = IndexState::new();
    }

    fn entries(&self) -> Vec<IndexEntry> {
        self.state.read().entries.clone()
    }

    fn load(&self, entries: Vec<IndexEntry>) -> Result<()> {
        for entry in &entries {
            if entry.embedding.len() != self.dimension {
                return Err(RagError::DimensionMismatch {
                    expected: self.dimension,
                    actual: entry.embedding.len(),
                });
            }
        }

        let mut state = self.state.write();
        state.entries = entries;
        state.rebuild_lookups();
        Ok(())
    }

    fn contains_hash(&self, hash: u64) -> bool {
        self.state.read().content_hashes.contains(&hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::content_hash;

    fn chunk(id: &str, text: &str) -> Chunk {
        Chunk {
            id: id.into(),
            text: text.into(),
            source_id: "doc".into(),
            index: 0,
            start_word: 0,
            overlap_words: 0,
            metadata: crate::types::Metadata::new(),
            content_hash: content_hash(text),
        }
    }

    #[test]
    fn search_orders_by_score() {
        let index = CosineIndex::new(2);
        index.insert(chunk("a", "a"), vec![1.0, 0.0]).unwrap();
        index.insert(chunk("b", "b"), vec![0.0, 1.0]).unwrap();
        index.insert(chunk("c", "c"), vec![0.7, 0.7]).unwrap();

        let results = index.search(&[1.0, 0.0], 3, 0.0).unwrap();
        assert_eq!(results[0].chunk.id, "a");
        assert_eq!(results[1].chunk.id, "c");
        assert_eq!(results[2].chunk.id, "b");
    }

    #[test]
    fn ties_keep_insertion_order() {
        let index = CosineIndex::new(2);
        index.insert(chunk("first", "x"), vec![1.0, 0.0]).unwrap();
        index.insert(chunk("second", "y"), vec![2.0, 0.0]).unwrap();

        // Cosine similarity ignores magnitude, so both score 1.0.
        let results = index.search(&[1.0, 0.0], 2, 0.0).unwrap();
        assert_eq!(results[0].chunk.id, "first");
        assert_eq!(results[1].chunk.id, "second");
    }

    #[test]
    fn threshold_filters() {
        let index = CosineIndex::new(2);
        index.insert(chunk("hit", "x"), vec![1.0, 0.0]).unwrap();
        index.insert(chunk("miss", "y"), vec![0.0, 1.0]).unwrap();

        let results = index.search(&[1.0, 0.0], 5, 0.5).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.id, "hit");
    }

    #[test]
    fn top_k_caps_results() {
        let index = CosineIndex::new(2);
        for i in 0..10 {
            index
                .insert(chunk(&format!("c{i}"), &format!("t{i}")), vec![1.0, 0.0])
                .unwrap();
        }
        assert_eq!(index.search(&[1.0, 0.0], 3, 0.0).unwrap().len(), 3);
    }

    #[test]
    fn upsert_replaces_by_id() {
        let index = CosineIndex::new(2);
        index.insert(chunk("a", "old"), vec![1.0, 0.0]).unwrap();
        index.insert(chunk("a", "new"), vec![0.0, 1.0]).unwrap();

        assert_eq!(index.len(), 1);
        assert!(index.contains_hash(content_hash("new")));
        assert!(!index.contains_hash(content_hash("old")));
    }

    #[test]
    fn dimension_mismatch_rejected() {
        let index = CosineIndex::new(3);
        let result = index.insert(chunk("a", "a"), vec![1.0, 0.0]);
        assert!(matches!(
            result,
            Err(RagError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn remove_and_clear() {
        let index = CosineIndex::new(2);
        index.insert(chunk("a", "a"), vec![1.0, 0.0]).unwrap();
        index.insert(chunk("b", "b"), vec![0.0, 1.0]).unwrap();

        assert!(index.remove("a"));
        assert!(!index.remove("a"));
        assert_eq!(index.len(), 1);

        index.clear();
        assert!(index.is_empty());
        assert!(!index.contains_hash(content_hash("b")));
    }

    #[test]
    fn load_replaces_entries() {
        let index = CosineIndex::new(2);
        index.insert(chunk("old", "old"), vec![1.0, 0.0]).unwrap();

        let entries = vec![
            IndexEntry::new(chunk("a", "a"), vec![1.0, 0.0]),
            IndexEntry::new(chunk("b", "b"), vec![0.0, 1.0]),
        ];
        index.load(entries).unwrap();

        assert_eq!(index.len(), 2);
        assert!(!index.contains_hash(content_hash("old")));
        assert!(index.contains_hash(content_hash("a")));
    }
}
