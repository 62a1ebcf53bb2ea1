//! Heuristic chemical-formula extraction from path strings.
//!
//! Directory names produced by high-throughput runs embed the formula
//! alongside run counters and tags (`Fe2Se3-relax-ID-12`), so the extractor
//! scans for every maximal substring shaped like a formula and picks the
//! most plausible one rather than trusting any fixed position.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximal runs of `ElementSymbol Digits?` units.
static CANDIDATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:[A-Z][a-z]?[0-9]*)+").expect("valid candidate regex"));

/// A single element symbol with its optional count.
static UNIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z][a-z]?)[0-9]*").expect("valid unit regex"));

/// Whole-span check: the candidate must decompose into units with nothing
/// left over.
static FULL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[A-Z][a-z]?[0-9]*)+$").expect("valid full-span regex"));

/// Extract a candidate chemical formula from an arbitrary path or name.
///
/// All maximal substrings matching `(ElementSymbol Digits?)+` are collected,
/// ordered by length descending (ties keep first occurrence), and the first
/// one naming at least two distinct element symbols wins. Returns `None`
/// when no substring qualifies.
///
/// ```
/// use bravais::formula::extract_formula;
///
/// assert_eq!(extract_formula("Fe2Se3-extra-ID-12"), Some("Fe2Se3".to_string()));
/// assert_eq!(extract_formula("run-007"), None);
/// ```
pub fn extract_formula(input: &str) -> Option<String> {
    let mut candidates: Vec<&str> = CANDIDATE.find_iter(input).map(|m| m.as_str()).collect();

    // Stable sort: equal lengths stay in scan order.
    candidates.sort_by(|a, b| b.len().cmp(&a.len()));

    for candidate in candidates {
        if !FULL.is_match(candidate) {
            continue;
        }

        let distinct: HashSet<&str> = UNIT
            .captures_iter(candidate)
            .filter_map(|cap| cap.get(1).map(|m| m.as_str()))
            .collect();

        if distinct.len() >= 2 {
            return Some(candidate.to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_longest_candidate() {
        assert_eq!(
            extract_formula("Fe2Se3-extra-ID-12"),
            Some("Fe2Se3".to_string())
        );
    }

    #[test]
    fn test_counts_without_digits() {
        assert_eq!(extract_formula("FeSe-relaxed"), Some("FeSe".to_string()));
    }

    #[test]
    fn test_two_letter_symbols() {
        assert_eq!(
            extract_formula("ThB5-phonon-run3"),
            Some("ThB5".to_string())
        );
    }

    #[test]
    fn test_single_element_rejected() {
        assert_eq!(extract_formula("Fe2-run"), None);
        assert_eq!(extract_formula("Fe2Fe3"), None);
    }

    #[test]
    fn test_no_candidate() {
        assert_eq!(extract_formula(""), None);
        assert_eq!(extract_formula("run-007"), None);
        assert_eq!(extract_formula("lowercase-only"), None);
    }

    #[test]
    fn test_tie_breaks_by_first_occurrence() {
        // Both candidates have length 4; the earlier one wins.
        assert_eq!(extract_formula("FeSe-NbTi"), Some("FeSe".to_string()));
    }

    #[test]
    fn test_multi_digit_counts() {
        assert_eq!(
            extract_formula("La10Se14-batch"),
            Some("La10Se14".to_string())
        );
    }
}
