use std::path::Path;

use ahash::AHashMap;
use parking_lot::RwLock;

use crate::embedding::Embedding;
use crate::error::{Error, Result};
use crate::record::{CatalogEntry, ImplantRecord};

/// In-memory catalog of reference implant embeddings.
///
/// Records keep their insertion order, which is the candidate order seen by
/// the ranker. All state sits behind a single `RwLock`, so an upsert is
/// atomic from the perspective of any concurrent reader: `all()` and `get()`
/// take whole-catalog snapshots and never observe a half-written record.
pub struct EmbeddingStore {
    dim: usize,
    inner: RwLock<Inner>,
}

struct Inner {
    records: Vec<ImplantRecord>,
    /// id -> position in `records`
    index: AHashMap<u64, usize>,
    next_id: u64,
}

impl EmbeddingStore {
    /// Create an empty store for embeddings of dimension `dim`.
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidArgument(
                "embedding dimension must be non-zero".to_string(),
            ));
        }
        Ok(Self {
            dim,
            inner: RwLock::new(Inner {
                records: Vec::new(),
                index: AHashMap::new(),
                next_id: 1,
            }),
        })
    }

    /// Load a catalog from in-memory entries.
    ///
    /// Any malformed entry aborts the whole load: a vector of the wrong
    /// length fails with `DimensionMismatch`, a repeated explicit id with
    /// `DuplicateKey`, an empty name with `InvalidArgument`.
    pub fn load(dim: usize, entries: Vec<CatalogEntry>) -> Result<Self> {
        let store = Self::new(dim)?;
        {
            let mut guard = store.inner.write();
            let inner = &mut *guard;
            for entry in entries {
                let record = validate_entry(dim, entry, &mut inner.next_id)?;
                if inner.index.contains_key(&record.id) {
                    return Err(Error::DuplicateKey(record.id));
                }
                inner.index.insert(record.id, inner.records.len());
                inner.records.push(record);
            }
        }
        Ok(store)
    }

    /// Load a catalog from a JSON file containing an array of entries.
    pub fn load_json_file(dim: usize, path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let entries: Vec<CatalogEntry> =
            serde_json::from_str(&raw).map_err(|e| Error::Malformed(e.to_string()))?;
        Self::load(dim, entries)
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().records.is_empty()
    }

    /// Fetch a record by catalog id.
    pub fn get(&self, id: u64) -> Result<ImplantRecord> {
        let inner = self.inner.read();
        inner
            .index
            .get(&id)
            .map(|&pos| inner.records[pos].clone())
            .ok_or(Error::NotFound(id))
    }

    /// Snapshot of all records in insertion order.
    pub fn all(&self) -> Vec<ImplantRecord> {
        self.inner.read().records.clone()
    }

    /// Replace or insert one record, re-validating its dimension.
    ///
    /// A replaced record keeps its position; a new record is appended.
    pub fn upsert(&self, record: ImplantRecord) -> Result<()> {
        if record.embedding.dim() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                actual: record.embedding.dim(),
            });
        }
        if record.name.is_empty() {
            return Err(Error::InvalidArgument(
                "implant name must not be empty".to_string(),
            ));
        }

        let mut guard = self.inner.write();
        let inner = &mut *guard;
        if record.id >= inner.next_id {
            inner.next_id = record.id + 1;
        }
        match inner.index.get(&record.id) {
            Some(&pos) => inner.records[pos] = record,
            None => {
                inner.index.insert(record.id, inner.records.len());
                inner.records.push(record);
            }
        }
        Ok(())
    }
}

fn validate_entry(dim: usize, entry: CatalogEntry, next_id: &mut u64) -> Result<ImplantRecord> {
    if entry.name.is_empty() {
        return Err(Error::InvalidArgument(
            "implant name must not be empty".to_string(),
        ));
    }
    if entry.embedding.len() != dim {
        return Err(Error::DimensionMismatch {
            expected: dim,
            actual: entry.embedding.len(),
        });
    }

    let id = match entry.id {
        Some(id) => {
            if id >= *next_id {
                *next_id = id + 1;
            }
            id
        }
        None => {
            let id = *next_id;
            *next_id += 1;
            id
        }
    };

    Ok(ImplantRecord {
        id,
        name: entry.name,
        manufacturer: entry.manufacturer,
        kind: entry.kind,
        reference_image: entry.reference_image,
        embedding: Embedding::new(entry.embedding),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: Option<u64>, name: &str, embedding: Vec<f32>) -> CatalogEntry {
        CatalogEntry {
            id,
            name: name.to_string(),
            manufacturer: None,
            kind: None,
            reference_image: None,
            embedding,
        }
    }

    #[test]
    fn test_load_assigns_missing_ids() {
        let store = EmbeddingStore::load(
            2,
            vec![
                entry(Some(7), "a", vec![1.0, 0.0]),
                entry(None, "b", vec![0.0, 1.0]),
            ],
        )
        .unwrap();

        assert_eq!(store.len(), 2);
        let records = store.all();
        assert_eq!(records[0].id, 7);
        assert_eq!(records[1].id, 8);
    }

    #[test]
    fn test_load_rejects_mixed_dimensions() {
        let result = EmbeddingStore::load(
            2,
            vec![
                entry(None, "a", vec![1.0, 0.0]),
                entry(None, "b", vec![1.0, 0.0, 0.0]),
            ],
        );
        assert!(matches!(
            result,
            Err(Error::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_load_rejects_duplicate_ids() {
        let result = EmbeddingStore::load(
            2,
            vec![
                entry(Some(1), "a", vec![1.0, 0.0]),
                entry(Some(1), "b", vec![0.0, 1.0]),
            ],
        );
        assert!(matches!(result, Err(Error::DuplicateKey(1))));
    }

    #[test]
    fn test_get_missing_record() {
        let store = EmbeddingStore::new(2).unwrap();
        assert!(matches!(store.get(42), Err(Error::NotFound(42))));
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let store = EmbeddingStore::load(
            2,
            vec![
                entry(Some(1), "a", vec![1.0, 0.0]),
                entry(Some(2), "b", vec![0.0, 1.0]),
            ],
        )
        .unwrap();

        let replacement =
            ImplantRecord::new(1, "a-reembedded", Embedding::new(vec![0.5, 0.5]));
        store.upsert(replacement).unwrap();

        let records = store.all();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[0].name, "a-reembedded");
        assert_eq!(records[1].id, 2);
    }

    #[test]
    fn test_load_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"[
                {"name": "Straumann BLT", "manufacturer": "Straumann", "embedding": [1.0, 0.0]},
                {"name": "Nobel Active", "type": "conical", "embedding": [0.0, 1.0]}
            ]"#,
        )
        .unwrap();

        let store = EmbeddingStore::load_json_file(2, &path).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1).unwrap().name, "Straumann BLT");
        assert_eq!(store.get(2).unwrap().kind.as_deref(), Some("conical"));

        std::fs::write(&path, r#"[{"embedding": [1.0, 0.0]}]"#).unwrap();
        assert!(matches!(
            EmbeddingStore::load_json_file(2, &path),
            Err(Error::Malformed(_))
        ));
    }

    #[test]
    fn test_upsert_rejects_wrong_dimension() {
        let store = EmbeddingStore::new(2).unwrap();
        let record = ImplantRecord::new(1, "a", Embedding::new(vec![1.0, 2.0, 3.0]));
        assert!(matches!(
            store.upsert(record),
            Err(Error::DimensionMismatch { .. })
        ));
    }
}
