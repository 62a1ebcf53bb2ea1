//! Fixed-layout structure-file parser (POSCAR/CONTCAR-style).
//!
//! Layout: line 1 comment, line 2 scale factor (both ignored), lines 3-5
//! lattice vectors, line 6 element symbols, line 7 counts aligned to line 6,
//! line 8 coordinate-system marker (ignored), then `sum(counts)` coordinate
//! lines. Sites come out in file order, each labeled by the element whose
//! cumulative count range covers its index.

use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::document::{AtomSite, Composition, Lattice};
use crate::error::{BravaisError, Result};

use super::source::{ParsedStructure, SourceMetadata};

/// Read and decode a structure file, returning the parsed structure and
/// metadata (SHA-256 digest, size) about the source.
pub fn read_structure(path: impl AsRef<Path>) -> Result<(ParsedStructure, SourceMetadata)> {
    let path = path.as_ref();

    let contents = fs::read(path).map_err(|e| BravaisError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut hasher = Sha256::new();
    hasher.update(&contents);
    let hash = format!("sha256:{:x}", hasher.finalize());

    let text = String::from_utf8_lossy(&contents);
    let structure = parse_structure(&text)?;

    let metadata = SourceMetadata::new(path.to_path_buf(), hash, contents.len() as u64);

    Ok((structure, metadata))
}

/// Decode structure text directly.
pub fn parse_structure(text: &str) -> Result<ParsedStructure> {
    let lines: Vec<&str> = text.lines().collect();

    if lines.len() < 8 {
        return Err(parse_error(
            lines.len(),
            "structure file must have at least 8 lines",
        ));
    }

    // Lines 1-2: comment and scale factor, ignored.

    let mut rows = [[0.0_f64; 3]; 3];
    for (i, row) in rows.iter_mut().enumerate() {
        *row = parse_vector(lines[2 + i], 3 + i)?;
    }
    let lattice = Lattice(rows);

    let elements: Vec<&str> = lines[5].split_whitespace().collect();
    let count_tokens: Vec<&str> = lines[6].split_whitespace().collect();

    if elements.is_empty() {
        return Err(parse_error(6, "no element symbols"));
    }
    if elements.len() != count_tokens.len() {
        return Err(parse_error(
            7,
            format!(
                "{} element symbols but {} counts",
                elements.len(),
                count_tokens.len()
            ),
        ));
    }

    let mut composition = Composition::new();
    let mut counts = Vec::with_capacity(count_tokens.len());
    for (element, token) in elements.iter().zip(&count_tokens) {
        let count: u32 = token
            .parse()
            .map_err(|_| parse_error(7, format!("invalid atom count {token:?}")))?;
        if composition.insert((*element).to_string(), count).is_some() {
            // Duplicate symbols would silently collapse into one composition
            // key, losing counts; refuse the file instead.
            return Err(parse_error(6, format!("duplicate element symbol {element:?}")));
        }
        counts.push(count);
    }

    let total: usize = counts.iter().map(|&c| c as usize).sum();
    if lines.len() < 8 + total {
        return Err(parse_error(
            lines.len(),
            format!("expected {total} coordinate lines, file ended early"),
        ));
    }

    // Line 8: coordinate-system marker, ignored.

    let mut sites = Vec::with_capacity(total);
    let mut index = 8;
    for (element, &count) in elements.iter().zip(&counts) {
        for _ in 0..count {
            let abc = parse_vector(lines[index], index + 1)?;
            sites.push(AtomSite::new(*element, abc));
            index += 1;
        }
    }

    Ok(ParsedStructure {
        lattice,
        sites,
        composition,
    })
}

/// Parse the first three float tokens of a line; extra columns are ignored.
fn parse_vector(line: &str, line_no: usize) -> Result<[f64; 3]> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 3 {
        return Err(parse_error(line_no, "expected three float components"));
    }

    let mut out = [0.0_f64; 3];
    for (slot, token) in out.iter_mut().zip(&parts[..3]) {
        *slot = token
            .parse()
            .map_err(|_| parse_error(line_no, format!("invalid float {token:?}")))?;
    }
    Ok(out)
}

fn parse_error(line: usize, message: impl Into<String>) -> BravaisError {
    BravaisError::Parse {
        line,
        message: message.into(),
    }
}
