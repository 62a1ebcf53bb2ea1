//! JSON-file-backed entry store.
//!
//! The whole collection lives in one pretty-printed JSON file: loaded at
//! open, rewritten after every upsert. Adequate for single-writer batch
//! ingestion, which is the only access pattern this pipeline supports.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::document::{AtomSite, Lattice, StructureDocument};
use crate::error::{BravaisError, Result};

use super::{entry_number, EntryStore, UpsertOutcome};

/// A persistent entry collection backed by a single JSON file.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    documents: Vec<StructureDocument>,
}

impl JsonStore {
    /// Open a store file, creating an empty collection if the file does not
    /// exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let documents = if path.exists() {
            let file = File::open(&path).map_err(|e| {
                BravaisError::Store(format!("Failed to open store '{}': {}", path.display(), e))
            })?;
            let reader = BufReader::new(file);
            serde_json::from_reader(reader).map_err(|e| {
                BravaisError::Store(format!("Failed to parse store '{}': {}", path.display(), e))
            })?
        } else {
            Vec::new()
        };

        Ok(Self { path, documents })
    }

    /// All stored documents, in insertion order.
    pub fn documents(&self) -> &[StructureDocument] {
        &self.documents
    }

    /// Rewrite the collection file.
    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    BravaisError::Store(format!(
                        "Failed to create directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let file = File::create(&self.path).map_err(|e| {
            BravaisError::Store(format!(
                "Failed to create store '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &self.documents).map_err(|e| {
            BravaisError::Store(format!(
                "Failed to write store '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(())
    }
}

impl EntryStore for JsonStore {
    fn max_entry_number(&self) -> Result<Option<u64>> {
        Ok(self
            .documents
            .iter()
            .filter_map(|d| entry_number(&d.entry_id))
            .max())
    }

    fn find_by_structure(
        &self,
        lattice: &Lattice,
        sites: &[AtomSite],
    ) -> Result<Option<StructureDocument>> {
        Ok(self
            .documents
            .iter()
            .find(|d| d.same_structure(lattice, sites))
            .cloned())
    }

    fn upsert_by_structure(&mut self, doc: &StructureDocument) -> Result<UpsertOutcome> {
        let outcome = match self
            .documents
            .iter_mut()
            .find(|d| d.same_structure(&doc.lattice, &doc.sites))
        {
            Some(existing) => {
                *existing = doc.clone();
                UpsertOutcome::Replaced
            }
            None => {
                self.documents.push(doc.clone());
                UpsertOutcome::Inserted
            }
        };

        self.flush()?;
        Ok(outcome)
    }

    fn count(&self) -> Result<usize> {
        Ok(self.documents.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Composition, PropertyBlock};
    use chrono::Utc;
    use tempfile::TempDir;

    fn doc(entry_id: &str, x: f64) -> StructureDocument {
        StructureDocument {
            entry_id: entry_id.to_string(),
            composition: Composition::from_iter([("Fe".to_string(), 1)]),
            structure_label: String::new(),
            created_at: Utc::now(),
            source_hash: String::new(),
            lattice: Lattice([[x, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]),
            sites: vec![AtomSite::new("Fe", [0.0, 0.0, 0.0])],
            properties: PropertyBlock::default(),
        }
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::open(dir.path().join("entries.json")).unwrap();
        assert_eq!(store.count().unwrap(), 0);
        assert_eq!(store.max_entry_number().unwrap(), None);
    }

    #[test]
    fn test_upsert_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("entries.json");

        {
            let mut store = JsonStore::open(&path).unwrap();
            store.upsert_by_structure(&doc("ID-1", 1.0)).unwrap();
            store.upsert_by_structure(&doc("ID-2", 2.0)).unwrap();
        }

        let store = JsonStore::open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 2);
        assert_eq!(store.max_entry_number().unwrap(), Some(2));
    }

    #[test]
    fn test_replace_keeps_single_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("entries.json");

        let mut store = JsonStore::open(&path).unwrap();
        let d = doc("ID-1", 1.0);
        assert_eq!(
            store.upsert_by_structure(&d).unwrap(),
            UpsertOutcome::Inserted
        );
        assert_eq!(
            store.upsert_by_structure(&d).unwrap(),
            UpsertOutcome::Replaced
        );

        let reopened = JsonStore::open(&path).unwrap();
        assert_eq!(reopened.count().unwrap(), 1);
    }

    #[test]
    fn test_corrupt_store_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("entries.json");
        std::fs::write(&path, "not json").unwrap();

        let err = JsonStore::open(&path).unwrap_err();
        assert!(matches!(err, BravaisError::Store(_)));
    }
}
