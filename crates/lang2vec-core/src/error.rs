//! Error types for lang2vec-core
//!
//! Every fatal condition aborts the whole query; there is no partial result.
//! Partial coverage (a language missing from one store but known elsewhere)
//! is not an error, see [`crate::resolve::CoverageWarning`].

use lang2vec_io::StoreError;
use thiserror::Error;

/// Main error type for lang2vec operations
#[derive(Error, Debug)]
pub enum Lang2VecError {
    /// Unknown feature-set token
    #[error(
        "Invalid feature set '{name}'. Use available_feature_sets() to see the available feature sets"
    )]
    InvalidFeatureSet { name: String },

    /// Languages or feature sets given as something other than a string or list of strings
    #[error("Improper type {found} for {argument}: requires string or list of strings")]
    InvalidInputType {
        argument: &'static str,
        found: String,
    },

    /// Union operands resolved to feature vectors of different length
    #[error(
        "Cannot perform elementwise union on feature sets of different size: \
         '{left}' has {left_len} features, '{right}' has {right_len}"
    )]
    UnionArity {
        left: String,
        left_len: usize,
        right: String,
        right_len: usize,
    },

    /// Language code unknown to every language universe
    #[error(
        "Language '{code}' not found. Use available_languages() to see a list of supported languages"
    )]
    LanguageNotFound { code: String },

    /// Backing store missing or malformed
    #[error("Failed to load store: {0}")]
    StoreLoad(#[from] StoreError),

    /// Alias table could not be parsed
    #[error("Invalid alias table {path}: {message}")]
    InvalidAliasTable { path: String, message: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Result matrix assembly failed
    #[error("Matrix shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Result type alias for lang2vec operations
pub type Result<T> = std::result::Result<T, Lang2VecError>;

impl Lang2VecError {
    /// Shorthand for an unknown feature-set token
    pub fn invalid_feature_set(name: impl Into<String>) -> Self {
        Lang2VecError::InvalidFeatureSet { name: name.into() }
    }

    /// Shorthand for an unresolvable language
    pub fn language_not_found(code: impl Into<String>) -> Self {
        Lang2VecError::LanguageNotFound { code: code.into() }
    }
}
