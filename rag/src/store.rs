//! Core retrieval store implementation.

use std::sync::Arc;

use aadhaar_core::EmbeddingModel;
use tracing::debug;

use crate::chunking::{Chunker, WordChunker};
use crate::cleaning::{BasicCleaner, Cleaner};
use crate::config::RagConfig;
use crate::error::{RagError, Result};
use crate::index::{CosineIndex, VectorIndex};
use crate::persistence::{Persistence, RedbPersistence};
use crate::types::{Document, SearchResult};

const DB_FILE: &str = "index.redb";

/// The retrieval store that manages cleaning, chunking, indexing, and
/// persistence.
///
/// `RagStore` combines an embedding model with a cosine index to provide
/// semantic search over documents. The redb database under the configured
/// index directory is the single source of truth across runs; deleting that
/// directory forces re-indexing.
pub struct RagStore<M: EmbeddingModel> {
    embedder: Arc<M>,
    index: Arc<CosineIndex>,
    chunker: Arc<dyn Chunker>,
    cleaner: Arc<dyn Cleaner>,
    persistence: Arc<RedbPersistence>,
    config: RagConfig,
}

impl<M: EmbeddingModel> Clone for RagStore<M> {
    fn clone(&self) -> Self {
        Self {
            embedder: Arc::clone(&self.embedder),
            index: Arc::clone(&self.index),
            chunker: Arc::clone(&self.chunker),
            cleaner: Arc::clone(&self.cleaner),
            persistence: Arc::clone(&self.persistence),
            config: self.config.clone(),
        }
    }
}

impl<M: EmbeddingModel> std::fmt::Debug for RagStore<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagStore")
            .field("index", &self.index)
            .field("chunker", &self.chunker.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<M> RagStore<M>
where
    M: EmbeddingModel + Send + Sync + 'static,
{
    /// Opens a store with the given embedding model and configuration.
    ///
    /// Creates the index directory and database file if needed. Uses the
    /// default word chunker and cleaner.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub fn open(embedder: M, config: RagConfig) -> Result<Self> {
        let dimension = embedder.dim();
        let persistence = RedbPersistence::new(config.index_dir.join(DB_FILE))?;
        Ok(Self {
            embedder: Arc::new(embedder),
            index: Arc::new(CosineIndex::new(dimension)),
            chunker: Arc::new(WordChunker::default()),
            cleaner: Arc::new(BasicCleaner),
            persistence: Arc::new(persistence),
            config,
        })
    }

    /// Sets a custom chunker for this store.
    #[must_use]
    pub fn with_chunker(mut self, chunker: impl Chunker + 'static) -> Self {
        self.chunker = Arc::new(chunker);
        self
    }

    /// Sets a custom cleaner for this store.
    #[must_use]
    pub fn with_cleaner(mut self, cleaner: impl Cleaner + 'static) -> Self {
        self.cleaner = Arc::new(cleaner);
        self
    }

    /// Inserts a document into the store.
    ///
    /// The document is cleaned, chunked, deduplicated (if enabled), embedded,
    /// and indexed. Chunk IDs are stable, so re-inserting an unchanged
    /// document replaces entries instead of growing the index.
    ///
    /// # Returns
    /// The number of chunks embedded and indexed (fewer than the total when
    /// deduplication skips repeated content).
    pub async fn insert(&self, document: Document) -> Result<usize> {
        let cleaned = self.cleaner.clean(&document);
        let chunks = self.chunker.chunk(&cleaned)?;
        let mut inserted = 0;

        for chunk in chunks {
            if self.config.deduplication && self.index.contains_hash(chunk.content_hash) {
                continue;
            }

            let embedding = self
                .embedder
                .embed(&chunk.text)
                .await
                .map_err(RagError::Embedding)?;

            self.index.insert(chunk, embedding)?;
            inserted += 1;
        }

        debug!(document = %document.id, chunks = inserted, "indexed");
        Ok(inserted)
    }

    /// Inserts multiple documents, persisting afterwards when `auto_save` is
    /// enabled.
    ///
    /// # Returns
    /// The total number of chunks inserted across all documents.
    pub async fn insert_batch(&self, documents: Vec<Document>) -> Result<usize> {
        let mut total_inserted = 0;
        for doc in documents {
            total_inserted += self.insert(doc).await?;
        }
        if self.config.auto_save {
            self.save()?;
        }
        Ok(total_inserted)
    }

    /// Searches for chunks similar to the query using the configured
    /// `default_top_k`.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        self.search_with_k(query, self.config.default_top_k).await
    }

    /// Searches for chunks similar to the query.
    ///
    /// Results are sorted by descending similarity, filtered by the
    /// configured threshold, and capped at `top_k`.
    ///
    /// # Errors
    /// Returns [`RagError::EmptyStore`] when nothing has been indexed;
    /// callers may treat that as "answer without document context".
    pub async fn search_with_k(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        if self.index.is_empty() {
            return Err(RagError::EmptyStore);
        }

        let embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(RagError::Embedding)?;

        self.index
            .search(&embedding, top_k, self.config.similarity_threshold)
    }

    /// Persists a full snapshot of the index.
    pub fn save(&self) -> Result<()> {
        self.persistence.save(&self.index.entries())
    }

    /// Loads the persisted snapshot into the index, replacing its contents.
    ///
    /// # Returns
    /// The number of entries restored; zero when nothing was persisted.
    pub fn load(&self) -> Result<usize> {
        let entries = self.persistence.load()?;
        let count = entries.len();
        self.index.load(entries)?;
        Ok(count)
    }

    /// Returns the number of indexed chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Clears all in-memory entries from the store.
    pub fn clear(&self) {
        self.index.clear();
    }

    /// Returns a reference to the embedder.
    pub fn embedder(&self) -> &M {
        &self.embedder
    }

    /// Swaps in a new embedder, keeping the index and its database handle.
    ///
    /// Used when a credential is replaced mid-session; reopening the
    /// database is neither needed nor possible while this store holds it.
    pub fn replace_embedder(&mut self, embedder: M) {
        self.embedder = Arc::new(embedder);
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }
}
