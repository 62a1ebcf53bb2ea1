//! Bravais: structure ingestion and deduplication for crystal-structure
//! entry stores.
//!
//! Bravais walks directories of relaxed-structure output, parses each
//! fixed-layout structure file, correlates it with externally computed
//! properties keyed by chemical formula, and upserts the assembled document
//! into a backing store keyed on structural content rather than identity.
//!
//! # Core Principles
//!
//! - **Content-keyed**: two files describing the same lattice and site list
//!   are the same entry; re-ingestion replaces, never duplicates
//! - **Stable ids**: an `entry_id` names a physical structure forever once
//!   assigned; the allocator resumes across runs
//! - **Batch-resilient**: per-item failures are reported and skipped; only
//!   store failures abort a run
//!
//! # Example
//!
//! ```no_run
//! use bravais::{Ingestor, JsonStore};
//!
//! let mut store = JsonStore::open("entries.json").unwrap();
//! let ingestor = Ingestor::new(vec!["work/batch-07".into()]);
//! let report = ingestor.run(&mut store).unwrap();
//!
//! println!("inserted: {}", report.summary.inserted);
//! println!("replaced: {}", report.summary.replaced);
//! ```

pub mod archive;
pub mod document;
pub mod error;
pub mod formula;
pub mod ingest;
pub mod input;
pub mod properties;
pub mod store;

pub use archive::{ArchiveIssue, ArchiveOutcome};
pub use document::{AtomSite, Composition, Lattice, PropertyBlock, Species, StructureDocument};
pub use error::{BravaisError, Result};
pub use formula::extract_formula;
pub use ingest::{IngestConfig, IngestReport, IngestSummary, Ingestor, ItemOutcome, ItemRecord};
pub use input::{read_structure, ParsedStructure, SourceMetadata};
pub use properties::{PropertyIssue, PropertyRecord, PropertyTable};
pub use store::{entry_number, format_entry_id, EntryStore, JsonStore, MemoryStore, UpsertOutcome};
