//! The ingestion session: extract, parse, correlate, upsert, archive.
//!
//! Strictly single-threaded and sequential. One session owns the in-process
//! ID counter for the whole batch; it is seeded from the store exactly once
//! at run start and incremented only when an upsert genuinely inserts.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::archive::{archive_entry, ArchiveIssue};
use crate::document::StructureDocument;
use crate::error::{BravaisError, Result};
use crate::formula::extract_formula;
use crate::input::read_structure;
use crate::properties::{PropertyIssue, PropertyTable};
use crate::store::{format_entry_id, EntryStore, UpsertOutcome};

/// Fully-resolved settings for one ingestion session. The surrounding
/// program supplies these; the library never reads configuration itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Root directories to scan for candidate entries.
    pub roots: Vec<PathBuf>,
    /// Structure file name inside each candidate directory.
    pub structure_file: String,
    /// Property-table file name inside each root.
    pub property_file: String,
    /// Auxiliary artifacts archived alongside each entry when present.
    pub aux_files: Vec<String>,
    /// Label recorded on every document this session produces.
    pub structure_label: String,
    /// Append-only sink for formula-resolution failures, one path per line.
    pub error_log: Option<PathBuf>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            structure_file: "CONTCAR".to_string(),
            property_file: "merged_properties.txt".to_string(),
            aux_files: vec!["gamma-figsum.png".to_string(), "omega.dat".to_string()],
            structure_label: String::new(),
            error_log: None,
        }
    }
}

/// What happened to one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemOutcome {
    /// New document written under a freshly allocated entry id.
    Inserted,
    /// Structural match found; the matched document's body was replaced and
    /// its entry id kept.
    Replaced,
    /// Structure file missing or malformed.
    SkippedParse,
    /// No qualifying formula, or no property record for it.
    SkippedUnresolved,
}

/// Per-candidate record in the ingest report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRecord {
    pub path: PathBuf,
    pub formula: Option<String>,
    pub entry_id: Option<String>,
    pub outcome: ItemOutcome,
    /// Error text for skipped items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ItemRecord {
    fn skipped(
        path: PathBuf,
        formula: Option<String>,
        outcome: ItemOutcome,
        detail: String,
    ) -> Self {
        Self {
            path,
            formula,
            entry_id: None,
            outcome,
            detail: Some(detail),
        }
    }
}

/// Everything an operator needs to see about one run. Recoverable problems
/// land here; only store failures abort a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestReport {
    pub items: Vec<ItemRecord>,
    pub property_issues: Vec<PropertyIssue>,
    pub archive_issues: Vec<ArchiveIssue>,
    /// Roots whose property table was absent; their lookups all miss.
    pub missing_property_tables: Vec<PathBuf>,
    pub summary: IngestSummary,
}

/// Counts over one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestSummary {
    pub processed: usize,
    pub inserted: usize,
    pub replaced: usize,
    pub skipped: usize,
    pub archive_issues: usize,
}

impl IngestSummary {
    fn from_report(report: &IngestReport) -> Self {
        let mut summary = Self {
            processed: report.items.len(),
            archive_issues: report.archive_issues.len(),
            ..Self::default()
        };
        for item in &report.items {
            match item.outcome {
                ItemOutcome::Inserted => summary.inserted += 1,
                ItemOutcome::Replaced => summary.replaced += 1,
                ItemOutcome::SkippedParse | ItemOutcome::SkippedUnresolved => {
                    summary.skipped += 1
                }
            }
        }
        summary
    }
}

/// The single-writer ingestion engine.
pub struct Ingestor {
    config: IngestConfig,
}

impl Ingestor {
    /// Create a session over the given roots with default file names.
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self::with_config(IngestConfig {
            roots,
            ..IngestConfig::default()
        })
    }

    /// Create a session with custom settings.
    pub fn with_config(config: IngestConfig) -> Self {
        Self { config }
    }

    /// Run the full pipeline over every configured root.
    ///
    /// Per-item failures are recorded and the batch continues; a store
    /// failure aborts immediately, leaving prior writes in place. Re-running
    /// is safe: existing structures are matched by content and replaced
    /// rather than duplicated.
    pub fn run(&self, store: &mut dyn EntryStore) -> Result<IngestReport> {
        // Seeded once per run, never re-queried.
        let mut next_id = match store.max_entry_number()? {
            Some(max) => max + 1,
            None => 1,
        };

        let mut report = IngestReport::default();

        for root in &self.config.roots {
            self.process_root(root, store, &mut next_id, &mut report)?;
        }

        report.summary = IngestSummary::from_report(&report);
        Ok(report)
    }

    fn process_root(
        &self,
        root: &Path,
        store: &mut dyn EntryStore,
        next_id: &mut u64,
        report: &mut IngestReport,
    ) -> Result<()> {
        let property_path = root.join(&self.config.property_file);
        let table = if property_path.exists() {
            let (table, issues) = PropertyTable::load(&property_path)?;
            report.property_issues.extend(issues);
            table
        } else {
            report.missing_property_tables.push(property_path);
            PropertyTable::empty()
        };

        let mut names: Vec<String> = fs::read_dir(root)
            .map_err(|e| BravaisError::Io {
                path: root.to_path_buf(),
                source: e,
            })?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.contains('-'))
            .collect();
        names.sort();

        for name in names {
            self.process_candidate(root, &name, &table, store, next_id, report)?;
        }

        Ok(())
    }

    fn process_candidate(
        &self,
        root: &Path,
        name: &str,
        table: &PropertyTable,
        store: &mut dyn EntryStore,
        next_id: &mut u64,
        report: &mut IngestReport,
    ) -> Result<()> {
        let entry_dir = root.join(name);
        let structure_path = entry_dir.join(&self.config.structure_file);

        let Some(formula) = extract_formula(name) else {
            self.log_unresolved(&structure_path)?;
            let err = BravaisError::FormulaNotResolved {
                path: structure_path.clone(),
            };
            report.items.push(ItemRecord::skipped(
                structure_path,
                None,
                ItemOutcome::SkippedUnresolved,
                err.to_string(),
            ));
            return Ok(());
        };

        let (parsed, source) = match read_structure(&structure_path) {
            Ok(v) => v,
            Err(e) => {
                report.items.push(ItemRecord::skipped(
                    structure_path,
                    Some(formula),
                    ItemOutcome::SkippedParse,
                    e.to_string(),
                ));
                return Ok(());
            }
        };

        let Some(record) = table.get(&formula) else {
            self.log_unresolved(&structure_path)?;
            let err = BravaisError::FormulaNotResolved {
                path: structure_path.clone(),
            };
            report.items.push(ItemRecord::skipped(
                structure_path,
                Some(formula),
                ItemOutcome::SkippedUnresolved,
                err.to_string(),
            ));
            return Ok(());
        };

        let mut doc = StructureDocument {
            entry_id: format_entry_id(*next_id),
            composition: parsed.composition,
            structure_label: self.config.structure_label.clone(),
            created_at: Utc::now(),
            source_hash: source.hash,
            lattice: parsed.lattice,
            sites: parsed.sites,
            properties: record.to_block(),
        };

        // The candidate id is provisional: a structural match keeps its own
        // id and the candidate is discarded.
        if let Some(existing) = store.find_by_structure(&doc.lattice, &doc.sites)? {
            doc.entry_id = existing.entry_id;
        }

        let outcome = store.upsert_by_structure(&doc)?;
        if outcome == UpsertOutcome::Inserted {
            *next_id += 1;
        }

        let aux: Vec<PathBuf> = self
            .config
            .aux_files
            .iter()
            .map(|f| entry_dir.join(f))
            .collect();
        let archive = archive_entry(&doc.entry_id, &structure_path, &formula, &aux);
        report.archive_issues.extend(archive.issues);

        report.items.push(ItemRecord {
            path: structure_path,
            formula: Some(formula),
            entry_id: Some(doc.entry_id),
            outcome: match outcome {
                UpsertOutcome::Inserted => ItemOutcome::Inserted,
                UpsertOutcome::Replaced => ItemOutcome::Replaced,
            },
            detail: None,
        });

        Ok(())
    }

    /// Append one path to the error-log sink, if one is configured.
    fn log_unresolved(&self, path: &Path) -> Result<()> {
        let Some(log_path) = &self.config.error_log else {
            return Ok(());
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .map_err(|e| BravaisError::Io {
                path: log_path.clone(),
                source: e,
            })?;

        writeln!(file, "{}", path.display()).map_err(|e| BravaisError::Io {
            path: log_path.clone(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use tempfile::TempDir;

    const FE2SE: &str = "\
Fe2Se
1.0
3.0 0.0 0.0
0.0 3.0 0.0
0.0 0.0 3.0
Fe Se
2 1
Direct
0.0 0.0 0.0
0.5 0.5 0.5
0.25 0.25 0.25
";

    const PROPERTIES: &str = "\
formula\tformation_e\tE_d\tlambda\timg_nu\tlow_three
Fe2Se\t-0.5\t0.01\t0.8\t0\t[1.0,2.0,3.0]
";

    fn write_candidate(root: &Path, name: &str, structure: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("CONTCAR"), structure).unwrap();
    }

    fn setup_root() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("merged_properties.txt"), PROPERTIES).unwrap();
        write_candidate(dir.path(), "Fe2Se-001", FE2SE);
        dir
    }

    #[test]
    fn test_run_inserts_and_reports() {
        let root = setup_root();
        let mut store = MemoryStore::new();

        let ingestor = Ingestor::new(vec![root.path().to_path_buf()]);
        let report = ingestor.run(&mut store).unwrap();

        assert_eq!(report.summary.processed, 1);
        assert_eq!(report.summary.inserted, 1);
        assert_eq!(report.items[0].entry_id.as_deref(), Some("ID-1"));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_names_without_separator_ignored() {
        let root = setup_root();
        write_candidate(root.path(), "FeSe", FE2SE);
        let mut store = MemoryStore::new();

        let report = Ingestor::new(vec![root.path().to_path_buf()])
            .run(&mut store)
            .unwrap();

        // Only "Fe2Se-001" qualifies; "FeSe" has no separator.
        assert_eq!(report.summary.processed, 1);
    }

    #[test]
    fn test_unresolved_formula_goes_to_error_log() {
        let root = setup_root();
        write_candidate(root.path(), "Unknown2X-003", FE2SE);
        let log = root.path().join("unresolved.log");

        let mut store = MemoryStore::new();
        let ingestor = Ingestor::with_config(IngestConfig {
            roots: vec![root.path().to_path_buf()],
            error_log: Some(log.clone()),
            ..IngestConfig::default()
        });
        let report = ingestor.run(&mut store).unwrap();

        assert_eq!(report.summary.skipped, 1);
        assert_eq!(report.summary.inserted, 1);

        let logged = fs::read_to_string(&log).unwrap();
        assert_eq!(logged.lines().count(), 1);
        assert!(logged.contains("Unknown2X-003"));
    }

    #[test]
    fn test_malformed_structure_skips_item() {
        let root = setup_root();
        write_candidate(root.path(), "NbTi-002", "not a structure\n");
        let mut store = MemoryStore::new();

        // Give NbTi a property row so only the parse can fail.
        fs::write(
            root.path().join("merged_properties.txt"),
            format!("{PROPERTIES}NbTi\t-0.3\t0.0\t0.5\t1\t[0.1,0.2,0.3]\n"),
        )
        .unwrap();

        let report = Ingestor::new(vec![root.path().to_path_buf()])
            .run(&mut store)
            .unwrap();

        let skipped: Vec<_> = report
            .items
            .iter()
            .filter(|i| i.outcome == ItemOutcome::SkippedParse)
            .collect();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].formula.as_deref(), Some("NbTi"));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_counter_seeds_from_existing_max() {
        let root = setup_root();

        let mut store = MemoryStore::new();
        // Seed three documents with gapped ids and distinct structures.
        for (id, x) in [("ID-3", 11.0), ("ID-7", 12.0), ("ID-5", 13.0)] {
            let text = FE2SE.replace("3.0 0.0 0.0", &format!("{x} 0.0 0.0"));
            let parsed = crate::input::parse_structure(&text).unwrap();
            let doc = StructureDocument {
                entry_id: id.to_string(),
                composition: parsed.composition,
                structure_label: String::new(),
                created_at: Utc::now(),
                source_hash: String::new(),
                lattice: parsed.lattice,
                sites: parsed.sites,
                properties: Default::default(),
            };
            store.upsert_by_structure(&doc).unwrap();
        }

        let report = Ingestor::new(vec![root.path().to_path_buf()])
            .run(&mut store)
            .unwrap();

        assert_eq!(report.items[0].entry_id.as_deref(), Some("ID-8"));
    }

    #[test]
    fn test_missing_property_table_skips_all() {
        let dir = TempDir::new().unwrap();
        write_candidate(dir.path(), "Fe2Se-001", FE2SE);
        let mut store = MemoryStore::new();

        let report = Ingestor::new(vec![dir.path().to_path_buf()])
            .run(&mut store)
            .unwrap();

        assert_eq!(report.missing_property_tables.len(), 1);
        assert_eq!(report.summary.skipped, 1);
        assert_eq!(store.count().unwrap(), 0);
    }
}
