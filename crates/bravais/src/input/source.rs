//! Parsed-structure value and metadata about the source file.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{AtomSite, Composition, Lattice};

/// Metadata about the structure file a document was built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// When the file was parsed.
    pub parsed_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has been parsed.
    pub fn new(path: PathBuf, hash: String, size_bytes: u64) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            parsed_at: Utc::now(),
        }
    }
}

/// The decoded content of one structure file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStructure {
    pub lattice: Lattice,
    pub sites: Vec<AtomSite>,
    pub composition: Composition,
}

impl ParsedStructure {
    /// Total number of atoms (equals the sum of the composition counts).
    pub fn atom_count(&self) -> usize {
        self.sites.len()
    }
}
