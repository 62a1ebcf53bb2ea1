//! Archival side effects: per-entry folders and best-effort file copies.
//!
//! Archival is decoupled from the document write: every copy is an
//! independently fallible step whose failure is recorded and skipped, so a
//! missing auxiliary artifact never fails an otherwise ingested item.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One archival step that could not be completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveIssue {
    pub path: PathBuf,
    pub reason: String,
}

/// The result of archiving one entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveOutcome {
    /// The per-entry directory, named by the resolved entry id.
    pub directory: PathBuf,
    /// Steps that failed; empty means everything was copied.
    pub issues: Vec<ArchiveIssue>,
}

impl ArchiveOutcome {
    /// True when every copy succeeded.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Create a directory named by `entry_id` next to the structure file, copy
/// the structure file into it as `<formula>.vasp`, then copy each auxiliary
/// artifact under its own name. Failures accumulate; nothing is raised.
pub fn archive_entry(
    entry_id: &str,
    structure_path: &Path,
    formula: &str,
    aux_files: &[PathBuf],
) -> ArchiveOutcome {
    let base = structure_path.parent().unwrap_or_else(|| Path::new("."));
    let directory = base.join(entry_id);

    let mut issues = Vec::new();

    if let Err(e) = fs::create_dir_all(&directory) {
        issues.push(ArchiveIssue {
            path: directory.clone(),
            reason: format!("cannot create directory: {e}"),
        });
        return ArchiveOutcome { directory, issues };
    }

    let target = directory.join(format!("{formula}.vasp"));
    if let Err(e) = fs::copy(structure_path, &target) {
        issues.push(ArchiveIssue {
            path: structure_path.to_path_buf(),
            reason: format!("cannot copy structure file: {e}"),
        });
    }

    for aux in aux_files {
        let name = match aux.file_name() {
            Some(name) => name,
            None => {
                issues.push(ArchiveIssue {
                    path: aux.clone(),
                    reason: "no file name".to_string(),
                });
                continue;
            }
        };
        if let Err(e) = fs::copy(aux, directory.join(name)) {
            issues.push(ArchiveIssue {
                path: aux.clone(),
                reason: format!("cannot copy: {e}"),
            });
        }
    }

    ArchiveOutcome { directory, issues }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_archive_copies_structure_and_aux() {
        let dir = TempDir::new().unwrap();
        let structure = dir.path().join("CONTCAR");
        fs::write(&structure, "structure").unwrap();
        let aux = dir.path().join("omega.dat");
        fs::write(&aux, "frequencies").unwrap();

        let outcome = archive_entry("ID-5", &structure, "Fe2Se", &[aux]);

        assert!(outcome.is_clean());
        assert_eq!(outcome.directory, dir.path().join("ID-5"));
        assert_eq!(
            fs::read_to_string(outcome.directory.join("Fe2Se.vasp")).unwrap(),
            "structure"
        );
        assert_eq!(
            fs::read_to_string(outcome.directory.join("omega.dat")).unwrap(),
            "frequencies"
        );
    }

    #[test]
    fn test_missing_aux_is_reported_not_fatal() {
        let dir = TempDir::new().unwrap();
        let structure = dir.path().join("CONTCAR");
        fs::write(&structure, "structure").unwrap();
        let missing = dir.path().join("gamma-figsum.png");

        let outcome = archive_entry("ID-1", &structure, "Fe2Se", &[missing.clone()]);

        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.issues[0].path, missing);
        // The structure copy still happened.
        assert!(outcome.directory.join("Fe2Se.vasp").exists());
    }

    #[test]
    fn test_rearchiving_overwrites() {
        let dir = TempDir::new().unwrap();
        let structure = dir.path().join("CONTCAR");
        fs::write(&structure, "v1").unwrap();

        archive_entry("ID-1", &structure, "Fe2Se", &[]);
        fs::write(&structure, "v2").unwrap();
        let outcome = archive_entry("ID-1", &structure, "Fe2Se", &[]);

        assert!(outcome.is_clean());
        assert_eq!(
            fs::read_to_string(outcome.directory.join("Fe2Se.vasp")).unwrap(),
            "v2"
        );
    }
}
