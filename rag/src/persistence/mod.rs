//! Persistence backends for the vector index.
//!
//! This module provides the [`Persistence`] trait and the redb-backed
//! implementation used to survive restarts.

mod redb_backend;

pub use redb_backend::RedbPersistence;

use crate::error::Result;
use crate::types::IndexEntry;
use std::path::Path;

/// Trait for persistence backends.
///
/// Persistence backends save and load index entries so that a corpus only
/// has to be embedded once.
pub trait Persistence: Send + Sync {
    /// Saves a full snapshot of index entries to storage.
    fn save(&self, entries: &[IndexEntry]) -> Result<()>;

    /// Loads all index entries from storage.
    ///
    /// Returns an empty vector if no data exists.
    fn load(&self) -> Result<Vec<IndexEntry>>;

    /// Returns the storage path.
    fn path(&self) -> &Path;
}
