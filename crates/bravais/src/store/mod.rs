//! Backing document store: trait, entry-id helpers, and implementations.
//!
//! The pipeline assumes single-writer access for the duration of a run. The
//! structural-match lookup and the upsert are two separate store calls; only
//! the upsert itself is atomic, so concurrent ingestion runs can race. That
//! is out of scope by design, not defended against.

mod json;
mod memory;

pub use json::JsonStore;
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};

use crate::document::{AtomSite, Lattice, StructureDocument};
use crate::error::Result;

/// Whether an upsert inserted a new document or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Inserted,
    Replaced,
}

/// A collection of structure entries keyed by content.
pub trait EntryStore {
    /// Largest numeric suffix among existing `ID-<n>` entry ids, if any.
    fn max_entry_number(&self) -> Result<Option<u64>>;

    /// First document whose lattice and full ordered site list exactly
    /// match the filter.
    fn find_by_structure(
        &self,
        lattice: &Lattice,
        sites: &[AtomSite],
    ) -> Result<Option<StructureDocument>>;

    /// Replace the document matching `doc`'s lattice and sites, or insert
    /// `doc` if absent. A single atomic operation from the store's point of
    /// view.
    fn upsert_by_structure(&mut self, doc: &StructureDocument) -> Result<UpsertOutcome>;

    /// Number of stored documents.
    fn count(&self) -> Result<usize>;
}

/// Numeric suffix of an `ID-<n>` entry id.
pub fn entry_number(entry_id: &str) -> Option<u64> {
    entry_id.strip_prefix("ID-")?.parse().ok()
}

/// Format an entry id from its numeric suffix.
pub fn format_entry_id(number: u64) -> String {
    format!("ID-{number}")
}
