//! lang2vec-io - Archive access for the URIEL feature database
//!
//! This crate reads the precomputed, read-only backing files that lang2vec
//! queries run against:
//!
//! - **Feature stores**: 3-axis tensors indexed by (language, feature, source)
//! - **Embedding tables**: flat language -> vector tables (learned embeddings)
//!
//! # Design
//!
//! Backing files are accessed through the `ArrayArchive` trait, which exposes
//! named arrays. `open_archive` picks an implementation from the file
//! extension. Only NumPy `.npz` archives are currently supported.
//!
//! Nothing here writes back to disk, and nothing is cached: every `load`
//! reads the file again.

pub mod embedding;
pub mod reader;
pub mod store;

#[cfg(feature = "npz")]
pub mod npz_reader;

pub use embedding::*;
pub use reader::*;
pub use store::*;
