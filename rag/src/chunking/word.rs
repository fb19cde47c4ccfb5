//! Word-window chunking with overlap.

use crate::dedup::content_hash;
use crate::error::Result;
use crate::types::{Chunk, Document};

use super::Chunker;

/// Chunks text into fixed-size word windows with configurable overlap.
///
/// The unit is whitespace-delimited words, not characters, so chunk
/// boundaries never split a word. Overlap repeats the tail of the previous
/// window at the head of the next one so context survives the cut.
///
/// Dropping the first `overlap_words` words of every chunk after the first
/// and joining the rest with single spaces reconstructs the cleaned document
/// text exactly.
#[derive(Debug, Clone)]
pub struct WordChunker {
    /// Maximum words per chunk.
    chunk_size: usize,
    /// Words repeated from the previous chunk.
    overlap: usize,
}

impl WordChunker {
    /// Creates a new word chunker.
    ///
    /// # Panics
    /// Panics if `overlap >= chunk_size`.
    #[must_use]
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        assert!(
            overlap < chunk_size,
            "overlap ({overlap}) must be less than chunk_size ({chunk_size})"
        );
        Self {
            chunk_size,
            overlap,
        }
    }

    /// Creates a chunker with default settings (800 words, 150 overlap).
    #[must_use]
    pub fn default_settings() -> Self {
        Self::new(800, 150)
    }
}

impl Default for WordChunker {
    fn default() -> Self {
        Self::default_settings()
    }
}

impl Chunker for WordChunker {
    fn chunk(&self, doc: &Document) -> Result<Vec<Chunk>> {
        let words: Vec<&str> = doc.text.split_whitespace().collect();
        if words.is_empty() {
            return Ok(Vec::new());
        }

        let step = self.chunk_size - self.overlap;
        let mut chunks = Vec::new();
        let mut start = 0;

        loop {
            let end = (start + self.chunk_size).min(words.len());
            let text = words[start..end].join(" ");
            let hash = content_hash(&text);
            let index = chunks.len();

            chunks.push(Chunk {
                id: format!("{}#chunk_{index}", doc.id),
                text,
                source_id: doc.id.clone(),
                index,
                start_word: start,
                overlap_words: if index == 0 { 0 } else { self.overlap },
                metadata: doc.metadata.clone(),
                content_hash: hash,
            });

            if end == words.len() {
                break;
            }
            start += step;
        }

        Ok(chunks)
    }

    fn name(&self) -> &'static str {
        "word_window"
    }
}
