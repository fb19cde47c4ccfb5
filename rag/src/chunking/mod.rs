//! Text chunking strategies.
//!
//! This module provides the [`Chunker`] trait and the word-window
//! implementation used to split documents into indexable chunks.

mod word;

pub use word::WordChunker;

use crate::error::Result;
use crate::types::{Chunk, Document};

/// Trait for text chunking strategies.
///
/// Chunkers split documents into smaller pieces that can be individually
/// embedded and searched.
pub trait Chunker: Send + Sync {
    /// Splits a document into chunks.
    ///
    /// Each chunk carries a unique ID derived from the document ID and its
    /// position within the document.
    fn chunk(&self, doc: &Document) -> Result<Vec<Chunk>>;

    /// Returns the name of this chunking strategy.
    fn name(&self) -> &'static str;
}
