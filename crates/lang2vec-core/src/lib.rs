//! lang2vec-core - Language vectors from the URIEL typological knowledge base
//!
//! Given language codes and a feature-set expression, returns one vector
//! per language built from precomputed typological, phonological, family,
//! geographic and learned features.
//!
//! # Key Components
//!
//! - **CodeNormalizer**: 2-letter alias to canonical 3-letter code mapping
//! - **FeatureSetKind**: the descriptor table plus the synthetic `id` and `learned` sets
//! - **Resolver**: per-query lookup of one feature set, with sentinel filling
//! - **Algebra**: `|` union (elementwise max) and `+` concatenation
//! - **Lang2Vec**: the query façade, with minimal-column masking and output formatting
//!
//! # Feature-Set Specs
//!
//! `+` binds loosest and concatenates; `|` unions sets of equal length:
//!
//! - `fam`: language family membership
//! - `syntax_wals|syntax_sswl`: WALS and SSWL syntax, merged
//! - `syntax_knn+phonology_knn+inventory_knn`: predicted features, stacked

pub mod algebra;
pub mod catalog;
pub mod codes;
pub mod config;
pub mod error;
pub mod feature_sets;
pub mod query;
pub mod resolve;
pub mod spec;

pub use algebra::{concatenate, evaluate, union, union_pair};
pub use catalog::LanguageCatalog;
pub use codes::CodeNormalizer;
pub use config::{Lang2VecConfig, DATA_DIR_ENV};
pub use error::{Lang2VecError, Result};
pub use feature_sets::*;
pub use query::*;
pub use resolve::{CoverageWarning, NamedSet, Resolver, RowLookup, MISSING_VALUE};
pub use spec::{fs_concatenation, fs_union, parse_feature_sets, CompiledSpec, FeatureSetSpec, UnionSegment};
