//! Retrieval plumbing for the Aadhaar chat agent.
//!
//! The [`RagStore`] type glues any [`EmbeddingModel`](aadhaar_core::EmbeddingModel)
//! to a cosine-similarity index with redb persistence:
//! - [`RagStore::insert`] / [`RagStore::insert_batch`] – clean, chunk, and
//!   index new documents.
//! - [`RagStore::search`] – embed a question and fetch the best matching
//!   chunks.
//! - [`RagStore::save`] / [`RagStore::load`] – snapshot the index so a corpus
//!   only has to be embedded once.
//!
//! The index keeps everything in memory and scores with a parallel exact
//! scan, which is the right shape for a directory of chunked PDFs.

pub mod chunking;
pub mod cleaning;
pub mod config;
pub mod dedup;
pub mod error;
pub mod index;
pub mod persistence;
pub mod store;
pub mod types;

pub use chunking::{Chunker, WordChunker};
pub use cleaning::{BasicCleaner, Cleaner};
pub use config::{RagConfig, RagConfigBuilder};
pub use error::{RagError, Result};
pub use index::{CosineIndex, VectorIndex};
pub use persistence::{Persistence, RedbPersistence};
pub use store::RagStore;
pub use types::{Chunk, Document, IndexEntry, Metadata, SearchResult};
