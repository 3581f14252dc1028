//! Archive reader trait and common types
//!
//! The `ArrayArchive` trait provides a uniform interface for reading the
//! named arrays inside a backing file.

use ndarray::ArrayD;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while reading backing stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to open file: {0}")]
    OpenFailed(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Array '{name}' not found in {archive}")]
    ArrayNotFound { archive: String, name: String },

    #[error("Shape mismatch for '{name}': expected {expected}, got {actual}")]
    ShapeMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("Language '{code}' not found in {store}")]
    LanguageNotFound { store: String, code: String },

    #[error("Source '{source_name}' not found in {store}")]
    SourceNotFound { store: String, source_name: String },

    #[error("Out of bounds on {axis} axis: index {index}, size {size}")]
    OutOfBounds {
        axis: &'static str,
        index: usize,
        size: usize,
    },

    #[error("I/O error: {0}")]
    Io(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for reading named arrays from a backing file
///
/// Readers take `&mut self` because archive members are decompressed on
/// demand from a single underlying file handle.
pub trait ArrayArchive: Send {
    /// Names of the arrays stored in the archive
    fn array_names(&self) -> Vec<String>;

    /// Read a one-dimensional string array (an index axis)
    fn read_strings(&mut self, name: &str) -> StoreResult<Vec<String>>;

    /// Read a numeric array of any rank, widened to f64
    fn read_numeric(&mut self, name: &str) -> StoreResult<ArrayD<f64>>;

    /// Get the file path (if applicable)
    fn path(&self) -> Option<&str> {
        None
    }

    /// Get the format name
    fn format_name(&self) -> &'static str;

    /// Check whether the archive holds an array with this name
    fn contains(&self, name: &str) -> bool {
        self.array_names().iter().any(|n| n == name)
    }
}

/// A boxed archive for dynamic dispatch
pub type BoxedArchive = Box<dyn ArrayArchive>;

/// Open a backing file and return an appropriate archive reader
///
/// The format is auto-detected from the file extension.
pub fn open_archive(path: &Path) -> StoreResult<BoxedArchive> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        #[cfg(feature = "npz")]
        "npz" => {
            use crate::npz_reader::NpzReader;
            Ok(Box::new(NpzReader::open(path)?))
        }

        _ => Err(StoreError::InvalidFormat(format!(
            "Unknown file extension: {} ({})",
            extension,
            path.display()
        ))),
    }
}

/// List supported file extensions
pub fn supported_extensions() -> Vec<&'static str> {
    let mut extensions = Vec::new();

    #[cfg(feature = "npz")]
    extensions.push("npz");

    extensions
}

/// Human-readable name for a store, taken from its file name
pub(crate) fn store_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
