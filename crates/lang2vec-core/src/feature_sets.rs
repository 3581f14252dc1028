//! Feature-set descriptor table
//!
//! Each named feature set is a prefix-delimited slice of one store's feature
//! axis, read from a single source layer. Two synthetic sets sit beside the
//! table: `id` (one-hot identity vectors) and `learned` (external embeddings).

use serde::{Deserialize, Serialize};

use crate::error::{Lang2VecError, Result};

/// Name of the identity (one-hot) feature set
pub const IDENTITY_SET: &str = "id";

/// Name of the learned embedding feature set
pub const LEARNED_SET: &str = "learned";

/// The fixed backing files shipped with the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StoreFile {
    /// Observed typological features (WALS, SSWL, Ethnologue, PHOIBLE)
    Features,
    /// kNN-predicted features
    Predictions,
    /// Averages over sources
    Averages,
    /// Language family membership
    Family,
    /// Geographic coordinates
    Geocoord,
}

impl StoreFile {
    /// All store files
    pub fn all() -> &'static [StoreFile] {
        &[
            StoreFile::Features,
            StoreFile::Predictions,
            StoreFile::Averages,
            StoreFile::Family,
            StoreFile::Geocoord,
        ]
    }

    /// File name inside the data directory
    pub fn file_name(&self) -> &'static str {
        match self {
            StoreFile::Features => "features.npz",
            StoreFile::Predictions => "feature_predictions.npz",
            StoreFile::Averages => "feature_averages.npz",
            StoreFile::Family => "family_features.npz",
            StoreFile::Geocoord => "geocoord_features.npz",
        }
    }
}

/// Where a named feature set lives: (store file, source layer, feature prefix)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeatureSetDescriptor {
    pub name: &'static str,
    pub store: StoreFile,
    pub source: &'static str,
    pub prefix: &'static str,
}

const fn set(
    name: &'static str,
    store: StoreFile,
    source: &'static str,
    prefix: &'static str,
) -> FeatureSetDescriptor {
    FeatureSetDescriptor {
        name,
        store,
        source,
        prefix,
    }
}

/// Table-backed feature sets, in canonical listing order
pub const FEATURE_SETS: &[FeatureSetDescriptor] = &[
    set("syntax_wals", StoreFile::Features, "WALS", "S_"),
    set("phonology_wals", StoreFile::Features, "WALS", "P_"),
    set("syntax_sswl", StoreFile::Features, "SSWL", "S_"),
    set("syntax_ethnologue", StoreFile::Features, "ETHNO", "S_"),
    set("phonology_ethnologue", StoreFile::Features, "ETHNO", "P_"),
    set("inventory_ethnologue", StoreFile::Features, "ETHNO", "INV_"),
    set("inventory_phoible_aa", StoreFile::Features, "PHOIBLE_AA", "INV_"),
    set("inventory_phoible_gm", StoreFile::Features, "PHOIBLE_GM", "INV_"),
    set("inventory_phoible_saphon", StoreFile::Features, "PHOIBLE_SAPHON", "INV_"),
    set("inventory_phoible_spa", StoreFile::Features, "PHOIBLE_SPA", "INV_"),
    set("inventory_phoible_ph", StoreFile::Features, "PHOIBLE_PH", "INV_"),
    set("inventory_phoible_ra", StoreFile::Features, "PHOIBLE_RA", "INV_"),
    set("inventory_phoible_upsid", StoreFile::Features, "PHOIBLE_UPSID", "INV_"),
    set("syntax_knn", StoreFile::Predictions, "predicted", "S_"),
    set("phonology_knn", StoreFile::Predictions, "predicted", "P_"),
    set("inventory_knn", StoreFile::Predictions, "predicted", "INV_"),
    set("syntax_average", StoreFile::Averages, "avg", "S_"),
    set("phonology_average", StoreFile::Averages, "avg", "P_"),
    set("inventory_average", StoreFile::Averages, "avg", "INV_"),
    set("fam", StoreFile::Family, "FAM", ""),
    set("geo", StoreFile::Geocoord, "GEOCOORDS", ""),
];

/// Look up a table-backed feature set
pub fn descriptor(name: &str) -> Option<&'static FeatureSetDescriptor> {
    FEATURE_SETS.iter().find(|d| d.name == name)
}

/// Every feature-set name: the table in order, then `id` and `learned`
pub fn available_feature_sets() -> Vec<&'static str> {
    FEATURE_SETS
        .iter()
        .map(|d| d.name)
        .chain([IDENTITY_SET, LEARNED_SET])
        .collect()
}

/// Check whether a name is a known feature set (table-backed or synthetic)
pub fn is_known_feature_set(name: &str) -> bool {
    FeatureSetKind::from_name(name).is_ok()
}

/// A feature-set token classified once, before any store is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureSetKind {
    /// One-hot vectors over the family store's language axis
    Identity,
    /// Externally learned embeddings
    Learned,
    /// A (store, source, prefix) slice from the descriptor table
    TableBacked(&'static FeatureSetDescriptor),
}

impl FeatureSetKind {
    /// Classify a feature-set token
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            IDENTITY_SET => Ok(FeatureSetKind::Identity),
            LEARNED_SET => Ok(FeatureSetKind::Learned),
            _ => descriptor(name)
                .map(FeatureSetKind::TableBacked)
                .ok_or_else(|| Lang2VecError::invalid_feature_set(name)),
        }
    }

    /// Token name
    pub fn name(&self) -> &'static str {
        match self {
            FeatureSetKind::Identity => IDENTITY_SET,
            FeatureSetKind::Learned => LEARNED_SET,
            FeatureSetKind::TableBacked(d) => d.name,
        }
    }

    /// Store file read by this set, if it is a three-axis store
    pub fn store_file(&self) -> Option<StoreFile> {
        match self {
            FeatureSetKind::Identity => Some(StoreFile::Family),
            FeatureSetKind::Learned => None,
            FeatureSetKind::TableBacked(d) => Some(d.store),
        }
    }
}
