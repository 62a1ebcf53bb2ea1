//! Resolved settings object loaded from a JSON file.
//!
//! The library takes a fully-resolved `IngestConfig`; this is where the
//! surrounding program resolves it, from a settings file shaped like:
//!
//! ```json
//! {
//!   "store": "entries.json",
//!   "roots": ["work/batch-07"],
//!   "structure_label": "ThB5(P4/mmm)",
//!   "error_log": "unresolved.log"
//! }
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use bravais::IngestConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Path to the entry-store file.
    pub store: PathBuf,
    /// Root directories to scan.
    pub roots: Vec<PathBuf>,
    /// Structure file name inside each candidate directory.
    #[serde(default = "default_structure_file")]
    pub structure_file: String,
    /// Property-table file name inside each root.
    #[serde(default = "default_property_file")]
    pub property_file: String,
    /// Auxiliary artifacts archived alongside each entry.
    #[serde(default = "default_aux_files")]
    pub aux_files: Vec<String>,
    /// Label recorded on every ingested document.
    #[serde(default)]
    pub structure_label: String,
    /// Append-only sink for formula-resolution failures.
    #[serde(default)]
    pub error_log: Option<PathBuf>,
}

fn default_structure_file() -> String {
    "CONTCAR".to_string()
}

fn default_property_file() -> String {
    "merged_properties.txt".to_string()
}

fn default_aux_files() -> Vec<String> {
    vec!["gamma-figsum.png".to_string(), "omega.dat".to_string()]
}

impl Settings {
    /// Load settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| format!("Failed to open settings '{}': {}", path.display(), e))?;
        let settings = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| format!("Failed to parse settings '{}': {}", path.display(), e))?;
        Ok(settings)
    }

    /// The ingestion configuration these settings resolve to.
    pub fn ingest_config(&self) -> IngestConfig {
        IngestConfig {
            roots: self.roots.clone(),
            structure_file: self.structure_file.clone(),
            property_file: self.property_file.clone(),
            aux_files: self.aux_files.clone(),
            structure_label: self.structure_label.clone(),
            error_log: self.error_log.clone(),
        }
    }
}
