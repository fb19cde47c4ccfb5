//! redb-based embedded database persistence.

use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{RagError, Result};
use crate::types::IndexEntry;

use super::Persistence;

const CHUNKS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("chunks");

/// On-disk record: the entry plus its position in the index at save time.
///
/// redb iterates keys lexicographically (`doc#chunk_10` before
/// `doc#chunk_2`), so the position must be stored explicitly to restore
/// insertion order, which search tie breaking depends on.
#[derive(Serialize)]
struct StoredEntryRef<'a> {
    seq: usize,
    entry: &'a IndexEntry,
}

#[derive(Deserialize)]
struct StoredEntry {
    seq: usize,
    entry: IndexEntry,
}

/// Embedded database persistence using redb.
///
/// Entries are keyed by chunk ID with JSON-encoded values carrying their
/// insertion sequence. Saving writes a full snapshot and removes keys that
/// are no longer part of it, so the database always mirrors the in-memory
/// index, order included.
pub struct RedbPersistence {
    path: PathBuf,
    db: Database,
}

impl std::fmt::Debug for RedbPersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbPersistence")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl RedbPersistence {
    /// Creates or opens a redb persistence backend at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or created.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let db = Database::create(&path).map_err(|e| RagError::Database(e.to_string()))?;
        Ok(Self { path, db })
    }
}

impl Persistence for RedbPersistence {
    fn save(&self, entries: &[IndexEntry]) -> Result<()> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| RagError::Database(e.to_string()))?;

        {
            let mut table = write_txn
                .open_table(CHUNKS_TABLE)
                .map_err(|e| RagError::Database(e.to_string()))?;

            let keep: HashSet<&str> = entries.iter().map(|e| e.chunk.id.as_str()).collect();
            let stale: Vec<String> = table
                .iter()
                .map_err(|e| RagError::Database(e.to_string()))?
                .filter_map(|item| item.ok())
                .map(|(key, _)| key.value().to_string())
                .filter(|key| !keep.contains(key.as_str()))
                .collect();
            for key in &stale {
                table
                    .remove(key.as_str())
                    .map_err(|e| RagError::Database(e.to_string()))?;
            }

            for (seq, entry) in entries.iter().enumerate() {
                let serialized = serde_json::to_vec(&StoredEntryRef { seq, entry })
                    .map_err(|e| RagError::Serialization(e.to_string()))?;
                table
                    .insert(entry.chunk.id.as_str(), serialized.as_slice())
                    .map_err(|e| RagError::Database(e.to_string()))?;
            }
        }

        write_txn
            .commit()
            .map_err(|e| RagError::Database(e.to_string()))?;
        Ok(())
    }

    fn load(&self) -> Result<Vec<IndexEntry>> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| RagError::Database(e.to_string()))?;

        let table = match read_txn.open_table(CHUNKS_TABLE) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(RagError::Database(e.to_string())),
        };

        let mut stored = Vec::new();
        for result in table
            .iter()
            .map_err(|e| RagError::Database(e.to_string()))?
        {
            let (_, value) = result.map_err(|e| RagError::Database(e.to_string()))?;
            let entry: StoredEntry = serde_json::from_slice(value.value())
                .map_err(|e| RagError::Serialization(e.to_string()))?;
            stored.push(entry);
        }

        // Undo the lexicographic table order.
        stored.sort_by_key(|entry| entry.seq);
        Ok(stored.into_iter().map(|entry| entry.entry).collect())
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::content_hash;
    use crate::types::Chunk;
    use tempfile::tempdir;

    fn make_entry(id: &str, text: &str) -> IndexEntry {
        let chunk = Chunk {
            id: id.into(),
            text: text.into(),
            source_id: "doc1".into(),
            index: 0,
            start_word: 0,
            overlap_words: 0,
            metadata: crate::types::Metadata::new(),
            content_hash: content_hash(text),
        };
        IndexEntry::new(chunk, vec![1.0, 2.0, 3.0, 4.0])
    }

    #[test]
    fn save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.redb");
        let persistence = RedbPersistence::new(&path).unwrap();

        let entries = vec![make_entry("c1", "hello"), make_entry("c2", "world")];
        persistence.save(&entries).unwrap();

        let loaded = persistence.load().unwrap();
        assert_eq!(loaded.len(), 2);
        let ids: Vec<_> = loaded.iter().map(|e| e.chunk.id.as_str()).collect();
        assert!(ids.contains(&"c1"));
        assert!(ids.contains(&"c2"));
    }

    #[test]
    fn load_empty_db() {
        let dir = tempdir().unwrap();
        let persistence = RedbPersistence::new(dir.path().join("empty.redb")).unwrap();
        assert!(persistence.load().unwrap().is_empty());
    }

    #[test]
    fn snapshot_drops_stale_keys() {
        let dir = tempdir().unwrap();
        let persistence = RedbPersistence::new(dir.path().join("index.redb")).unwrap();

        persistence
            .save(&[make_entry("c1", "hello"), make_entry("c2", "world")])
            .unwrap();
        persistence.save(&[make_entry("c1", "hello")]).unwrap();

        let loaded = persistence.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].chunk.id, "c1");
    }

    #[test]
    fn reload_keeps_insertion_order_for_ties() {
        use crate::index::{CosineIndex, VectorIndex};

        let dir = tempdir().unwrap();
        let persistence = RedbPersistence::new(dir.path().join("index.redb")).unwrap();

        // Lexicographic key order would put chunk_10 first.
        persistence
            .save(&[
                make_entry("doc#chunk_2", "hello"),
                make_entry("doc#chunk_10", "world"),
            ])
            .unwrap();

        let loaded = persistence.load().unwrap();
        let ids: Vec<_> = loaded.iter().map(|e| e.chunk.id.as_str()).collect();
        assert_eq!(ids, ["doc#chunk_2", "doc#chunk_10"]);

        // Identical embeddings tie on score; insertion order must decide.
        let index = CosineIndex::new(4);
        index.load(loaded).unwrap();
        let results = index.search(&[1.0, 2.0, 3.0, 4.0], 2, 0.0).unwrap();
        assert_eq!(results[0].chunk.id, "doc#chunk_2");
        assert_eq!(results[1].chunk.id, "doc#chunk_10");
    }

    #[test]
    fn overwrite_entries() {
        let dir = tempdir().unwrap();
        let persistence = RedbPersistence::new(dir.path().join("index.redb")).unwrap();

        persistence.save(&[make_entry("c1", "hello")]).unwrap();
        persistence.save(&[make_entry("c1", "world")]).unwrap();

        let loaded = persistence.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].chunk.text, "world");
    }
}
