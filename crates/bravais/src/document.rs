//! Stored document model: lattice, sites, property block, entry documents.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered mapping from element symbol to atom count within one unit cell.
pub type Composition = IndexMap<String, u32>;

/// 3x3 matrix of real-valued basis vectors defining the unit cell.
///
/// Equality is exact; two lattices compare equal only when every component
/// matches bit-for-bit, which is what structural deduplication keys on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lattice(pub [[f64; 3]; 3]);

impl Lattice {
    /// The three basis vectors, row-major.
    pub fn matrix(&self) -> &[[f64; 3]; 3] {
        &self.0
    }
}

/// One element occupying a site, with its occupancy fraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub element: String,
    pub occu: f64,
}

/// One atomic position plus element/occupancy metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomSite {
    /// Species occupying this site. This pipeline always emits a single
    /// full-occupancy species per site.
    pub species: Vec<Species>,
    /// Fractional coordinates.
    pub abc: [f64; 3],
    /// Element label.
    pub label: String,
}

impl AtomSite {
    /// Create a fully-occupied site for a single element.
    pub fn new(element: impl Into<String>, abc: [f64; 3]) -> Self {
        let element = element.into();
        Self {
            species: vec![Species {
                element: element.clone(),
                occu: 1.0,
            }],
            abc,
            label: element,
        }
    }
}

/// Externally computed physical properties. Each field is independently
/// present or absent; absent fields serialize as explicit nulls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyBlock {
    pub formation_energy: Option<f64>,
    pub energy_above_hull: Option<f64>,
    pub lambda_gamma: Option<f64>,
    pub img_number: Option<i64>,
    pub low_three: Option<Vec<f64>>,
}

/// A stored structure entry.
///
/// `entry_id` uniquely and permanently names a physical structure once
/// assigned. Two documents describe the *same* structure iff their lattice
/// and full ordered site list are exactly equal; metadata and property
/// differences never distinguish them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureDocument {
    /// Stable external identifier, format `ID-<positive integer>`.
    pub entry_id: String,
    /// Element counts in structure-file order.
    pub composition: Composition,
    /// Label of the prototype structure this entry derives from.
    pub structure_label: String,
    /// When this document was assembled.
    pub created_at: DateTime<Utc>,
    /// SHA-256 digest of the source structure file.
    pub source_hash: String,
    pub lattice: Lattice,
    pub sites: Vec<AtomSite>,
    pub properties: PropertyBlock,
}

impl StructureDocument {
    /// True when `other` describes the same physical structure.
    pub fn same_structure(&self, lattice: &Lattice, sites: &[AtomSite]) -> bool {
        self.lattice == *lattice && self.sites == sites
    }
}
