//! Category taxonomy: keyword sets and energy tiers.
//!
//! The taxonomy is static input data. It is loaded once (from a JSON file or the
//! table embedded in the binary) and shared read-only by the matcher and the
//! energy mapper.
//!
//! # File format
//!
//! ```json
//! {
//!   "categories": [
//!     { "id": "internet_browsers", "keywords": ["chrome", "firefox"] }
//!   ],
//!   "energy_tiers": { "internet_browsers": "middle-energy-level" }
//! }
//! ```
//!
//! `categories` is an array so that matching iterates categories in file order,
//! which decides ties. `energy_tiers` may name ids without keywords.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::EnergyTier;

/// Reference taxonomy compiled into the binary.
pub const BUILTIN_TAXONOMY_JSON: &str = include_str!("../data/taxonomy.json");

/// Errors raised while loading a taxonomy.
#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("Failed to read taxonomy file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid taxonomy JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Duplicate category id: {0}")]
    DuplicateCategory(String),

    #[error("Category {0} has no keywords")]
    NoKeywords(String),

    #[error("Category {0} contains an empty keyword")]
    EmptyKeyword(String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TaxonomyFile {
    categories: Vec<CategoryEntry>,
    #[serde(default)]
    energy_tiers: HashMap<String, EnergyTier>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CategoryEntry {
    id: String,
    keywords: Vec<String>,
}

/// One bucket of the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    id: String,
    keywords: BTreeSet<String>,
}

impl Category {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn keywords(&self) -> &BTreeSet<String> {
        &self.keywords
    }
}

/// Immutable category table plus the category → energy tier table.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    categories: Vec<Category>,
    tiers: HashMap<String, EnergyTier>,
}

impl Taxonomy {
    /// Loads the taxonomy embedded in the binary.
    ///
    /// # Examples
    ///
    /// ```
    /// use appenergy::{EnergyTier, Taxonomy};
    ///
    /// let taxonomy = Taxonomy::builtin().unwrap();
    /// assert_eq!(taxonomy.energy_tier("media_creation"), EnergyTier::High);
    /// ```
    pub fn builtin() -> Result<Self, TaxonomyError> {
        Self::from_json(BUILTIN_TAXONOMY_JSON)
    }

    /// Reads and validates a taxonomy file.
    pub fn from_path(path: &Path) -> Result<Self, TaxonomyError> {
        let content = fs::read_to_string(path).map_err(|source| TaxonomyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let taxonomy = Self::from_json(&content)?;
        debug!(
            path = %path.display(),
            categories = taxonomy.categories.len(),
            "loaded taxonomy file"
        );
        Ok(taxonomy)
    }

    /// Parses and validates a taxonomy document.
    pub fn from_json(json: &str) -> Result<Self, TaxonomyError> {
        let file: TaxonomyFile = serde_json::from_str(json).map_err(TaxonomyError::Parse)?;

        let mut seen = HashSet::new();
        let mut categories = Vec::with_capacity(file.categories.len());
        for entry in file.categories {
            if !seen.insert(entry.id.clone()) {
                return Err(TaxonomyError::DuplicateCategory(entry.id));
            }
            if entry.keywords.is_empty() {
                return Err(TaxonomyError::NoKeywords(entry.id));
            }
            if entry.keywords.iter().any(|k| k.is_empty()) {
                return Err(TaxonomyError::EmptyKeyword(entry.id));
            }

            if !file.energy_tiers.contains_key(&entry.id) {
                debug!(category = %entry.id, "no energy tier entry, using default");
            }

            categories.push(Category {
                id: entry.id,
                keywords: entry.keywords.into_iter().collect(),
            });
        }

        if categories.is_empty() {
            warn!("taxonomy defines no categories; every classification will fail");
        }

        Ok(Self {
            categories,
            tiers: file.energy_tiers,
        })
    }

    /// Categories in matching order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Maps a category id to its energy tier.
    ///
    /// Unknown ids map to [`EnergyTier::default`].
    pub fn energy_tier(&self, category_id: &str) -> EnergyTier {
        self.tiers
            .get(category_id)
            .copied()
            .unwrap_or_default()
    }
}
