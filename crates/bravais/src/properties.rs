//! Property-table loading and formula-keyed correlation.
//!
//! The table is tab-separated with one header line. Two row shapes exist in
//! the wild: six-field rows carrying the full property set, and three-field
//! rows carrying only the two energies, with the formula embedded in a
//! dash-separated first field. Later rows for a formula always replace
//! earlier ones wholesale, in file order, even when the later row carries
//! fewer fields.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::document::PropertyBlock;
use crate::error::{BravaisError, Result};

/// Externally computed properties for one formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub formula: String,
    pub formation_energy: Option<f64>,
    pub energy_above_hull: Option<f64>,
    pub lambda_gamma: Option<f64>,
    pub img_number: Option<i64>,
    pub low_three: Option<Vec<f64>>,
}

impl PropertyRecord {
    /// The property block stored on a document built from this record.
    pub fn to_block(&self) -> PropertyBlock {
        PropertyBlock {
            formation_energy: self.formation_energy,
            energy_above_hull: self.energy_above_hull,
            lambda_gamma: self.lambda_gamma,
            img_number: self.img_number,
            low_three: self.low_three.clone(),
        }
    }
}

/// Why a table row was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyIssueKind {
    /// Malformed string-encoded float list.
    LowThreeDecode,
    /// Wrong field count or unparseable numeric field.
    MalformedRow,
}

/// A skipped property-table row, surfaced in the ingest report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyIssue {
    pub kind: PropertyIssueKind,
    /// 1-based line in the table file.
    pub line: u64,
    pub message: String,
}

/// Formula-keyed property records for one run root.
#[derive(Debug, Clone, Default)]
pub struct PropertyTable {
    records: IndexMap<String, PropertyRecord>,
}

impl PropertyTable {
    /// Empty table; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a tab-separated property file. Rows that cannot be decoded are
    /// reported as issues and skipped; the load itself only fails on IO or
    /// CSV-level errors.
    pub fn load(path: impl AsRef<Path>) -> Result<(Self, Vec<PropertyIssue>)> {
        let path = path.as_ref();

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let mut table = Self::default();
        let mut issues = Vec::new();

        for result in reader.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let parts: Vec<&str> = record
                .iter()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();

            if parts.is_empty() {
                continue;
            }

            match Self::decode_row(&parts, line) {
                Ok(Some(rec)) => {
                    // File-order last-write-wins, whole record.
                    table.records.insert(rec.formula.clone(), rec);
                }
                Ok(None) => {}
                Err(e) => {
                    let kind = match &e {
                        BravaisError::LowThreeDecode { .. } => PropertyIssueKind::LowThreeDecode,
                        _ => PropertyIssueKind::MalformedRow,
                    };
                    issues.push(PropertyIssue {
                        kind,
                        line,
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok((table, issues))
    }

    /// Decode one row. `Ok(None)` means the row shape is neither six- nor
    /// three-field and is ignored without comment, matching the upstream
    /// table conventions.
    fn decode_row(parts: &[&str], line: u64) -> Result<Option<PropertyRecord>> {
        if parts.len() >= 6 {
            let formula = parts[0].to_string();
            let low_three = decode_low_three(&formula, parts[5])?;
            return Ok(Some(PropertyRecord {
                formation_energy: Some(parse_float(parts[1], "formation_energy", line)?),
                energy_above_hull: Some(parse_float(parts[2], "energy_above_hull", line)?),
                lambda_gamma: Some(parse_float(parts[3], "lambda_gamma", line)?),
                img_number: Some(parse_int(parts[4], "img_number", line)?),
                low_three: Some(low_three),
                formula,
            }));
        }

        if parts.len() == 3 {
            // Formula is the segment after the first dash of the first field.
            let formula = parts[0]
                .split('-')
                .nth(1)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| BravaisError::Parse {
                    line: line as usize,
                    message: format!("no formula segment in {:?}", parts[0]),
                })?
                .to_string();
            return Ok(Some(PropertyRecord {
                formation_energy: Some(parse_float(parts[1], "formation_energy", line)?),
                energy_above_hull: Some(parse_float(parts[2], "energy_above_hull", line)?),
                lambda_gamma: None,
                img_number: None,
                low_three: None,
                formula,
            }));
        }

        Ok(None)
    }

    /// Look up the record for an exact formula string.
    pub fn get(&self, formula: &str) -> Option<&PropertyRecord> {
        self.records.get(formula)
    }

    /// Number of keyed records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Decode a string-encoded float list (`"[1.0, 2.0,\n 3.0]"`). All
/// whitespace is stripped before decoding, so embedded newlines are fine.
fn decode_low_three(formula: &str, raw: &str) -> Result<Vec<f64>> {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    serde_json::from_str(&cleaned).map_err(|_| BravaisError::LowThreeDecode {
        formula: formula.to_string(),
        raw: raw.to_string(),
    })
}

fn parse_float(token: &str, field: &str, line: u64) -> Result<f64> {
    token.parse().map_err(|_| BravaisError::Parse {
        line: line as usize,
        message: format!("invalid {field} {token:?}"),
    })
}

fn parse_int(token: &str, field: &str, line: u64) -> Result<i64> {
    token.parse().map_err(|_| BravaisError::Parse {
        line: line as usize,
        message: format!("invalid {field} {token:?}"),
    })
}
