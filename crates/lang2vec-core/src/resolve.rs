//! Per-language row resolution for single feature sets
//!
//! A [`Resolver`] lives for one query. It opens each backing file at most
//! once, resolves every requested set into a [`NamedSet`] with one row per
//! input language, and collects a [`CoverageWarning`] for every row that had
//! to be filled with the missing-value sentinel.

use lang2vec_io::{EmbeddingTable, FeatureStore, StoreError};
use ndarray::Array2;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::catalog::LanguageCatalog;
use crate::codes::CodeNormalizer;
use crate::config::Lang2VecConfig;
use crate::error::{Lang2VecError, Result};
use crate::feature_sets::{FeatureSetDescriptor, FeatureSetKind, StoreFile, LEARNED_SET};

/// Stored value meaning "no data for this language/feature"
pub const MISSING_VALUE: f64 = -1.0;

/// Feature names plus a (languages x features) value matrix
#[derive(Debug, Clone, PartialEq)]
pub struct NamedSet {
    label: String,
    names: Vec<String>,
    values: Array2<f64>,
}

impl NamedSet {
    /// Create a named set
    ///
    /// `names` must have one entry per column of `values`.
    pub fn new(label: impl Into<String>, names: Vec<String>, values: Array2<f64>) -> Self {
        debug_assert_eq!(names.len(), values.ncols());
        Self {
            label: label.into(),
            names,
            values,
        }
    }

    /// Set expression this matrix was built from
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Feature names, in column order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Number of features (columns)
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Number of languages (rows)
    pub fn num_languages(&self) -> usize {
        self.values.nrows()
    }

    pub fn into_parts(self) -> (String, Vec<String>, Array2<f64>) {
        (self.label, self.names, self.values)
    }

    pub(crate) fn values_mut(&mut self) -> &mut Array2<f64> {
        &mut self.values
    }

    pub(crate) fn set_label(&mut self, label: String) {
        self.label = label;
    }
}

/// A language that was filled with sentinels for one feature set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageWarning {
    /// Language code as the caller wrote it
    pub language: String,
    /// Canonical code after alias normalization
    pub code: String,
    pub feature_set: String,
    /// Backing file that lacked the language
    pub store: String,
}

impl fmt::Display for CoverageWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Language '{}' ({}) has no entry in {} for feature set '{}'; values set to {}",
            self.language, self.code, self.store, self.feature_set, MISSING_VALUE
        )
    }
}

/// Outcome of looking one language up in one store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLookup {
    /// Row index in the backing store
    Found(usize),
    /// Absent here but known elsewhere; the row is all sentinels
    SentinelFilled,
}

/// Resolves feature sets for one query
pub struct Resolver<'a> {
    config: &'a Lang2VecConfig,
    normalizer: &'a CodeNormalizer,
    catalog: &'a LanguageCatalog,
    stores: HashMap<StoreFile, Rc<FeatureStore>>,
    learned: Option<Rc<EmbeddingTable>>,
    warnings: Vec<CoverageWarning>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        config: &'a Lang2VecConfig,
        normalizer: &'a CodeNormalizer,
        catalog: &'a LanguageCatalog,
    ) -> Self {
        Self {
            config,
            normalizer,
            catalog,
            stores: HashMap::new(),
            learned: None,
            warnings: Vec::new(),
        }
    }

    /// Resolve a feature set by name
    pub fn resolve_name(&mut self, languages: &[String], name: &str) -> Result<NamedSet> {
        let kind = FeatureSetKind::from_name(name)?;
        self.resolve(languages, kind)
    }

    /// Resolve one classified feature set for every language, in input order
    pub fn resolve(&mut self, languages: &[String], kind: FeatureSetKind) -> Result<NamedSet> {
        tracing::debug!(
            feature_set = kind.name(),
            languages = languages.len(),
            "resolving feature set"
        );

        match kind {
            FeatureSetKind::Identity => self.resolve_identity(languages),
            FeatureSetKind::Learned => self.resolve_learned(languages),
            FeatureSetKind::TableBacked(descriptor) => self.resolve_table(languages, descriptor),
        }
    }

    /// Warnings collected so far
    pub fn warnings(&self) -> &[CoverageWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<CoverageWarning> {
        self.warnings
    }

    fn resolve_table(
        &mut self,
        languages: &[String],
        descriptor: &'static FeatureSetDescriptor,
    ) -> Result<NamedSet> {
        let store = self.store(descriptor.store)?;
        let feature_indices = store.feature_indices(descriptor.prefix);
        let names = store.feature_names(&feature_indices);
        let source_index = store.source_index(descriptor.source)?;

        let normalizer = self.normalizer;
        let mut lookups = Vec::with_capacity(languages.len());
        for input in languages {
            let code = normalizer.normalize(input);
            let position = store.language_index(code).ok();
            lookups.push(self.classify(input, code, position, descriptor.name, store.name())?);
        }

        let found: Vec<usize> = lookups
            .iter()
            .filter_map(|lookup| match lookup {
                RowLookup::Found(i) => Some(*i),
                RowLookup::SentinelFilled => None,
            })
            .collect();
        let slice = store.slice(&found, &feature_indices, source_index)?;

        let mut values = Array2::from_elem((languages.len(), names.len()), MISSING_VALUE);
        let mut next = 0;
        for (row, lookup) in lookups.iter().enumerate() {
            if let RowLookup::Found(_) = lookup {
                values.row_mut(row).assign(&slice.row(next));
                next += 1;
            }
        }

        Ok(NamedSet::new(descriptor.name, names, values))
    }

    /// One-hot vectors over the family store's language axis
    ///
    /// Every language must be in the family store; nothing is sentinel-filled.
    fn resolve_identity(&mut self, languages: &[String]) -> Result<NamedSet> {
        let store = self.store(StoreFile::Family)?;
        let names: Vec<String> = store
            .languages()
            .iter()
            .map(|code| format!("ID_{}", code.to_uppercase()))
            .collect();

        let mut values = Array2::zeros((languages.len(), names.len()));
        for (row, input) in languages.iter().enumerate() {
            let code = self.normalizer.normalize(input);
            let column = store
                .language_index(code)
                .map_err(|_| Lang2VecError::language_not_found(code))?;
            values[[row, column]] = 1.0;
        }

        Ok(NamedSet::new(FeatureSetKind::Identity.name(), names, values))
    }

    fn resolve_learned(&mut self, languages: &[String]) -> Result<NamedSet> {
        let table = self.learned_table()?;
        let dimension = table.dimension();
        if dimension != self.config.learned_dimension {
            return Err(StoreError::ShapeMismatch {
                name: table.name().to_string(),
                expected: format!("{} columns", self.config.learned_dimension),
                actual: format!("{} columns", dimension),
            }
            .into());
        }

        let names: Vec<String> = (0..dimension).map(|i| format!("LEARNED_{:03}", i)).collect();
        let mut values = Array2::from_elem((languages.len(), dimension), MISSING_VALUE);

        let normalizer = self.normalizer;
        for (row, input) in languages.iter().enumerate() {
            let code = normalizer.normalize(input);
            // The table may hold either the canonical code or the raw one
            let position = table.position(code).or_else(|| table.position(input));
            if let RowLookup::Found(i) =
                self.classify(input, code, position, LEARNED_SET, table.name())?
            {
                if let Some(vector) = table.row_at(i) {
                    values.row_mut(row).assign(&vector);
                }
            }
        }

        Ok(NamedSet::new(LEARNED_SET, names, values))
    }

    /// Decide between a real row, a sentinel row and a fatal lookup
    fn classify(
        &mut self,
        input: &str,
        code: &str,
        position: Option<usize>,
        feature_set: &str,
        store: &str,
    ) -> Result<RowLookup> {
        if let Some(index) = position {
            return Ok(RowLookup::Found(index));
        }

        if !self.catalog.is_known(code) {
            return Err(Lang2VecError::language_not_found(code));
        }

        let warning = CoverageWarning {
            language: input.to_string(),
            code: code.to_string(),
            feature_set: feature_set.to_string(),
            store: store.to_string(),
        };
        tracing::warn!("{}", warning);
        self.warnings.push(warning);

        Ok(RowLookup::SentinelFilled)
    }

    fn store(&mut self, file: StoreFile) -> Result<Rc<FeatureStore>> {
        if let Some(store) = self.stores.get(&file) {
            return Ok(Rc::clone(store));
        }

        let store = Rc::new(FeatureStore::load(&self.config.data_path(file.file_name()))?);
        self.stores.insert(file, Rc::clone(&store));
        Ok(store)
    }

    fn learned_table(&mut self) -> Result<Rc<EmbeddingTable>> {
        if let Some(table) = &self.learned {
            return Ok(Rc::clone(table));
        }

        let table = Rc::new(EmbeddingTable::load(&self.config.learned_path())?);
        self.learned = Some(Rc::clone(&table));
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_named_set_accessors() {
        let set = NamedSet::new(
            "geo",
            vec!["GC_LAT".to_string(), "GC_LON".to_string()],
            array![[0.5, 0.25], [-1.0, -1.0], [0.0, 1.0]],
        );
        assert_eq!(set.len(), 2);
        assert_eq!(set.num_languages(), 3);
        assert_eq!(set.label(), "geo");

        let (label, names, values) = set.into_parts();
        assert_eq!(label, "geo");
        assert_eq!(names[1], "GC_LON");
        assert_eq!(values[[1, 0]], MISSING_VALUE);
    }

    #[test]
    fn test_classify_unknown_language_is_fatal() {
        let config = Lang2VecConfig::default();
        let normalizer = CodeNormalizer::builtin();
        let catalog = LanguageCatalog::new(vec!["jpn".to_string()], Vec::new());
        let mut resolver = Resolver::new(&config, &normalizer, &catalog);

        let lookup = resolver.classify("jpn", "jpn", None, "syntax_wals", "features.npz");
        assert_eq!(lookup.unwrap(), RowLookup::SentinelFilled);
        assert_eq!(resolver.warnings().len(), 1);
        assert!(resolver.warnings()[0].to_string().contains("features.npz"));

        let lookup = resolver.classify("xyz", "xyz", None, "syntax_wals", "features.npz");
        assert!(matches!(
            lookup,
            Err(Lang2VecError::LanguageNotFound { ref code }) if code == "xyz"
        ));

        let lookup = resolver.classify("eng", "eng", Some(4), "syntax_wals", "features.npz");
        assert_eq!(lookup.unwrap(), RowLookup::Found(4));
        assert_eq!(resolver.into_warnings().len(), 1);
    }

    #[test]
    fn test_missing_store_fails() {
        let config = Lang2VecConfig::with_data_dir("/nonexistent/lang2vec");
        let normalizer = CodeNormalizer::builtin();
        let catalog = LanguageCatalog::default();
        let mut resolver = Resolver::new(&config, &normalizer, &catalog);

        let result = resolver.resolve_name(&["eng".to_string()], "fam");
        assert!(matches!(result, Err(Lang2VecError::StoreLoad(_))));
    }
}
