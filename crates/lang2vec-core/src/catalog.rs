//! Known-language universes
//!
//! A code can be valid in one store and missing from another. The catalog
//! records which codes exist anywhere, so the resolver can tell a partial
//! gap (fill with sentinels) from an unknown language (fatal).

use lang2vec_io::{EmbeddingTable, FeatureStore};
use std::collections::BTreeSet;

use crate::config::Lang2VecConfig;
use crate::error::Result;
use crate::feature_sets::StoreFile;

/// The URIEL-backed and learned-backed language sets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageCatalog {
    uriel: BTreeSet<String>,
    learned: BTreeSet<String>,
}

impl LanguageCatalog {
    /// Create a catalog from explicit language lists
    pub fn new<U, L>(uriel: U, learned: L) -> Self
    where
        U: IntoIterator<Item = String>,
        L: IntoIterator<Item = String>,
    {
        Self {
            uriel: uriel.into_iter().collect(),
            learned: learned.into_iter().collect(),
        }
    }

    /// Build the catalog from the language axes of the shipped files
    ///
    /// Every three-axis store must be present. The learned table is optional;
    /// without it the learned universe is empty.
    pub fn load(config: &Lang2VecConfig) -> Result<Self> {
        let mut uriel = BTreeSet::new();
        for file in StoreFile::all() {
            let languages = FeatureStore::read_languages(&config.data_path(file.file_name()))?;
            uriel.extend(languages);
        }

        let learned_path = config.learned_path();
        let learned: BTreeSet<String> = if learned_path.exists() {
            EmbeddingTable::read_languages(&learned_path)?
                .into_iter()
                .collect()
        } else {
            tracing::debug!(
                path = %learned_path.display(),
                "learned embedding table not installed"
            );
            BTreeSet::new()
        };

        tracing::debug!(
            uriel = uriel.len(),
            learned = learned.len(),
            "built language catalog"
        );

        Ok(Self { uriel, learned })
    }

    /// Languages present in at least one URIEL store
    pub fn uriel_languages(&self) -> &BTreeSet<String> {
        &self.uriel
    }

    /// Languages present in the learned embedding table
    pub fn learned_languages(&self) -> &BTreeSet<String> {
        &self.learned
    }

    /// Union of both universes
    pub fn all_languages(&self) -> BTreeSet<String> {
        self.uriel.union(&self.learned).cloned().collect()
    }

    /// Check a canonical code against the URIEL universe
    pub fn is_uriel(&self, code: &str) -> bool {
        self.uriel.contains(code)
    }

    /// Check a canonical code against the learned universe
    pub fn is_learned(&self, code: &str) -> bool {
        self.learned.contains(code)
    }

    /// Check whether any universe knows the code
    pub fn is_known(&self, code: &str) -> bool {
        self.is_uriel(code) || self.is_learned(code)
    }
}
