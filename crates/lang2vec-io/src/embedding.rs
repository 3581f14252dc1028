//! Flat language -> vector tables
//!
//! Used for the externally learned language embeddings, which live outside
//! the three-axis stores. Stored as an archive with a `langs` axis and a
//! 2-D `data` matrix of shape (languages, dimension).

use crate::reader::{open_archive, store_name, ArrayArchive, StoreError, StoreResult};
use crate::store::{DATA_KEY, LANGUAGES_KEY};
use ndarray::{Array2, ArrayView1, Ix2};
use std::collections::HashMap;
use std::path::Path;

/// An immutable table of one vector per language
#[derive(Debug, Clone)]
pub struct EmbeddingTable {
    name: String,
    languages: Vec<String>,
    positions: HashMap<String, usize>,
    data: Array2<f64>,
}

impl EmbeddingTable {
    /// Load a table from a backing file
    pub fn load(path: &Path) -> StoreResult<Self> {
        let mut archive = open_archive(path)?;
        let table = Self::from_archive(store_name(path), archive.as_mut())?;

        tracing::info!(
            table = %table.name,
            languages = table.languages.len(),
            dimension = table.dimension(),
            "loaded embedding table"
        );

        Ok(table)
    }

    /// Read the table members from an open archive
    pub fn from_archive(
        name: impl Into<String>,
        archive: &mut dyn ArrayArchive,
    ) -> StoreResult<Self> {
        let languages = archive.read_strings(LANGUAGES_KEY)?;
        let data = archive
            .read_numeric(DATA_KEY)?
            .into_dimensionality::<Ix2>()
            .map_err(|e| StoreError::ShapeMismatch {
                name: DATA_KEY.to_string(),
                expected: "2-D (langs, dimension)".to_string(),
                actual: e.to_string(),
            })?;

        Self::from_parts(name, languages, data)
    }

    /// Build a table from in-memory rows
    pub fn from_parts(
        name: impl Into<String>,
        languages: Vec<String>,
        data: Array2<f64>,
    ) -> StoreResult<Self> {
        if data.nrows() != languages.len() {
            return Err(StoreError::ShapeMismatch {
                name: DATA_KEY.to_string(),
                expected: format!("{} rows", languages.len()),
                actual: format!("{} rows", data.nrows()),
            });
        }

        let mut positions = HashMap::with_capacity(languages.len());
        for (i, code) in languages.iter().enumerate() {
            positions.entry(code.clone()).or_insert(i);
        }

        Ok(Self {
            name: name.into(),
            languages,
            positions,
            data,
        })
    }

    /// Read only the language keys of a backing file
    pub fn read_languages(path: &Path) -> StoreResult<Vec<String>> {
        let mut archive = open_archive(path)?;
        archive.read_strings(LANGUAGES_KEY)
    }

    /// Table name (the backing file name)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Language keys, in table order
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    /// Length of every vector in the table
    pub fn dimension(&self) -> usize {
        self.data.ncols()
    }

    /// Check whether a code has a vector
    pub fn contains(&self, code: &str) -> bool {
        self.positions.contains_key(code)
    }

    /// Row position of a code
    pub fn position(&self, code: &str) -> Option<usize> {
        self.positions.get(code).copied()
    }

    /// Vector at a row position
    pub fn row_at(&self, index: usize) -> Option<ArrayView1<'_, f64>> {
        (index < self.data.nrows()).then(|| self.data.row(index))
    }

    /// Vector for a code, if present
    pub fn row(&self, code: &str) -> Option<ArrayView1<'_, f64>> {
        self.position(code).and_then(|i| self.row_at(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample_table() -> EmbeddingTable {
        EmbeddingTable::from_parts(
            "learned.npz",
            vec!["deu".to_string(), "lrn".to_string()],
            array![[0.1, 0.2, 0.3], [-0.5, 0.0, 0.5]],
        )
        .unwrap()
    }

    #[test]
    fn test_row_lookup() {
        let table = sample_table();
        assert_eq!(table.dimension(), 3);
        assert!(table.contains("lrn"));
        let row = table.row("lrn").unwrap();
        assert_eq!(row.to_vec(), vec![-0.5, 0.0, 0.5]);
        assert!(table.row("eng").is_none());
        assert_eq!(table.position("deu"), Some(0));
        assert!(table.row_at(2).is_none());
    }

    #[test]
    fn test_row_count_must_match() {
        let result = EmbeddingTable::from_parts(
            "learned.npz",
            vec!["deu".to_string()],
            Array2::zeros((2, 4)),
        );
        assert!(matches!(result, Err(StoreError::ShapeMismatch { .. })));
    }
}
