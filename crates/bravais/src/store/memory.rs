//! In-memory store, used by tests and as the reference semantics.

use crate::document::{AtomSite, Lattice, StructureDocument};
use crate::error::Result;

use super::{entry_number, EntryStore, UpsertOutcome};

/// An in-process entry collection with the same semantics as the persistent
/// stores.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Vec<StructureDocument>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-load documents, e.g. to seed the ID allocator in tests.
    pub fn with_documents(documents: Vec<StructureDocument>) -> Self {
        Self { documents }
    }

    /// All stored documents, in insertion order.
    pub fn documents(&self) -> &[StructureDocument] {
        &self.documents
    }
}

impl EntryStore for MemoryStore {
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
        match self
            .documents
            .iter_mut()
            .find(|d| d.same_structure(&doc.lattice, &doc.sites))
        {
            Some(existing) => {
                *existing = doc.clone();
                Ok(UpsertOutcome::Replaced)
            }
            None => {
                self.documents.push(doc.clone());
                Ok(UpsertOutcome::Inserted)
            }
        }
    }

    fn count(&self) -> Result<usize> {
        Ok(self.documents.len())
    }
}
