//! Three-axis feature stores
//!
//! A feature store holds a tensor indexed by (language, feature, source)
//! together with the three index axes that name each position. Cell values
//! are 0.0 / 1.0 for binary features, -1.0 for "unknown", or a continuous
//! score for averaged and geographic stores.

use crate::reader::{open_archive, store_name, ArrayArchive, StoreError, StoreResult};
use ndarray::{Array2, Array3, Axis, Ix3};
use std::collections::HashMap;
use std::path::Path;

/// Archive member holding the language axis
pub const LANGUAGES_KEY: &str = "langs";
/// Archive member holding the feature axis
pub const FEATURES_KEY: &str = "feats";
/// Archive member holding the source axis
pub const SOURCES_KEY: &str = "sources";
/// Archive member holding the value tensor
pub const DATA_KEY: &str = "data";

/// An immutable snapshot of one backing store
#[derive(Debug, Clone)]
pub struct FeatureStore {
    name: String,
    languages: Vec<String>,
    features: Vec<String>,
    sources: Vec<String>,
    language_positions: HashMap<String, usize>,
    data: Array3<f64>,
}

impl FeatureStore {
    /// Load a store from a backing file
    pub fn load(path: &Path) -> StoreResult<Self> {
        let mut archive = open_archive(path)?;
        let store = Self::from_archive(store_name(path), archive.as_mut())?;

        tracing::info!(
            store = %store.name,
            languages = store.languages.len(),
            features = store.features.len(),
            sources = store.sources.len(),
            "loaded feature store"
        );

        Ok(store)
    }

    /// Read the four store members from an open archive
    pub fn from_archive(
        name: impl Into<String>,
        archive: &mut dyn ArrayArchive,
    ) -> StoreResult<Self> {
        let languages = archive.read_strings(LANGUAGES_KEY)?;
        let features = archive.read_strings(FEATURES_KEY)?;
        let sources = archive.read_strings(SOURCES_KEY)?;

        let data = archive
            .read_numeric(DATA_KEY)?
            .into_dimensionality::<Ix3>()
            .map_err(|e| StoreError::ShapeMismatch {
                name: DATA_KEY.to_string(),
                expected: "3-D (langs, feats, sources)".to_string(),
                actual: e.to_string(),
            })?;

        Self::from_parts(name, languages, features, sources, data)
    }

    /// Build a store from in-memory axes and data
    ///
    /// The data tensor must have shape (languages, features, sources).
    pub fn from_parts(
        name: impl Into<String>,
        languages: Vec<String>,
        features: Vec<String>,
        sources: Vec<String>,
        data: Array3<f64>,
    ) -> StoreResult<Self> {
        let expected = (languages.len(), features.len(), sources.len());
        if data.dim() != expected {
            return Err(StoreError::ShapeMismatch {
                name: DATA_KEY.to_string(),
                expected: format!("{:?}", expected),
                actual: format!("{:?}", data.dim()),
            });
        }

        // First occurrence wins for duplicated codes
        let mut language_positions = HashMap::with_capacity(languages.len());
        for (i, code) in languages.iter().enumerate() {
            language_positions.entry(code.clone()).or_insert(i);
        }

        Ok(Self {
            name: name.into(),
            languages,
            features,
            sources,
            language_positions,
            data,
        })
    }

    /// Read only the language axis of a backing file
    pub fn read_languages(path: &Path) -> StoreResult<Vec<String>> {
        let mut archive = open_archive(path)?;
        archive.read_strings(LANGUAGES_KEY)
    }

    /// Store name (the backing file name)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Language axis, in store order
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    /// Feature axis, in store order
    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Source axis, in store order
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Tensor shape as (languages, features, sources)
    pub fn shape(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Check whether a canonical code is on the language axis
    pub fn contains_language(&self, code: &str) -> bool {
        self.language_positions.contains_key(code)
    }

    /// Position of a language on the language axis
    pub fn language_index(&self, code: &str) -> StoreResult<usize> {
        self.language_positions
            .get(code)
            .copied()
            .ok_or_else(|| StoreError::LanguageNotFound {
                store: self.name.clone(),
                code: code.to_string(),
            })
    }

    /// Positions of every feature whose name starts with `prefix`, in store order
    ///
    /// An empty prefix selects the whole feature axis.
    pub fn feature_indices(&self, prefix: &str) -> Vec<usize> {
        self.features
            .iter()
            .enumerate()
            .filter(|(_, f)| f.starts_with(prefix))
            .map(|(i, _)| i)
            .collect()
    }

    /// Feature names at the given positions
    pub fn feature_names(&self, indices: &[usize]) -> Vec<String> {
        indices
            .iter()
            .filter_map(|&i| self.features.get(i).cloned())
            .collect()
    }

    /// Position of a named source layer
    pub fn source_index(&self, name: &str) -> StoreResult<usize> {
        self.sources
            .iter()
            .position(|s| s == name)
            .ok_or_else(|| StoreError::SourceNotFound {
                store: self.name.clone(),
                source_name: name.to_string(),
            })
    }

    /// Cross-product selection of languages x features in one source layer
    ///
    /// Returns a matrix of shape (lang_indices.len(), feature_indices.len()).
    pub fn slice(
        &self,
        lang_indices: &[usize],
        feature_indices: &[usize],
        source_index: usize,
    ) -> StoreResult<Array2<f64>> {
        let (num_langs, num_feats, num_sources) = self.data.dim();
        check_bounds("source", &[source_index], num_sources)?;
        check_bounds("language", lang_indices, num_langs)?;
        check_bounds("feature", feature_indices, num_feats)?;

        if lang_indices.is_empty() || feature_indices.is_empty() {
            return Ok(Array2::zeros((lang_indices.len(), feature_indices.len())));
        }

        Ok(self
            .data
            .index_axis(Axis(2), source_index)
            .select(Axis(0), lang_indices)
            .select(Axis(1), feature_indices))
    }
}

fn check_bounds(axis: &'static str, indices: &[usize], size: usize) -> StoreResult<()> {
    match indices.iter().find(|&&i| i >= size) {
        Some(&index) => Err(StoreError::OutOfBounds { axis, index, size }),
        None => Ok(()),
    }
}
