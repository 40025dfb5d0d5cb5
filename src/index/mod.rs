// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Index strategies over the HNSW and IVF engines.
//!
//! Every variant takes an [`EmbeddingMatrix`], validates its build and query
//! hyperparameters up front, and forwards the work to the engine. Labels in
//! query results are row positions in the order vectors were added.

pub mod factory;
pub mod file;
pub mod flat;
pub mod general;
pub mod hnsw;
pub mod ivf_flat;

use crate::core::matrix::EmbeddingMatrix;
use crate::core::types::{Metric, SearchResult};
use crate::hnsw::HNSWError;
use crate::ivf::IVFError;
use std::path::Path;
use thiserror::Error;

pub use self::factory::{create_flat_index, create_hnsw_index, create_ivf_flat_index, load_index};
pub use self::flat::FlatIndex;
pub use self::general::GeneralIndex;
pub use self::hnsw::HnswIndex;
pub use self::ivf_flat::IvfFlatIndex;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Unsupported hyperparameter: {0}")]
    UnsupportedHyperparameter(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Cannot build an index from embeddings without columns")]
    EmptyEmbeddings,

    #[error("Unsupported index type '{0}': querying is not implemented")]
    UnsupportedIndex(String),

    #[error("Index file format error: {0}")]
    Format(String),

    #[error("Index I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HNSW error: {0}")]
    Hnsw(#[from] HNSWError),

    #[error("IVF error: {0}")]
    Ivf(#[from] IVFError),
}

/// Kind tag stored in index files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Flat,
    IvfFlat,
    Hnsw,
}

impl IndexKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexKind::Flat => "IndexFlat",
            IndexKind::IvfFlat => "IndexIVFFlat",
            IndexKind::Hnsw => "IndexHNSWFlat",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        [IndexKind::Flat, IndexKind::IvfFlat, IndexKind::Hnsw]
            .into_iter()
            .find(|kind| kind.as_str() == tag)
    }
}

/// Behaviour shared by every index variant.
pub trait SearchIndex {
    /// Type tag written to the index file.
    fn kind(&self) -> &str;

    fn metric(&self) -> Metric;

    fn dimension(&self) -> usize;

    /// Number of indexed vectors.
    fn ntotal(&self) -> usize;

    /// Appends rows; their labels continue from the current `ntotal`.
    fn add(&mut self, embeddings: &EmbeddingMatrix) -> Result<(), IndexError>;

    /// Returns up to `k` neighbors per query row, best first.
    fn query(&self, xq: &EmbeddingMatrix, k: usize) -> Result<Vec<Vec<SearchResult>>, IndexError>;

    fn save_index(&self, output_path: &Path) -> Result<(), IndexError>;
}

pub(crate) fn validate_k(k: usize) -> Result<(), IndexError> {
    if k < 1 {
        return Err(IndexError::UnsupportedHyperparameter(
            "k cannot be less than 1".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_dimension(expected: usize, actual: usize) -> Result<(), IndexError> {
    if expected != actual {
        return Err(IndexError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

pub(crate) fn validate_query(
    index: &dyn SearchIndex,
    xq: &EmbeddingMatrix,
    k: usize,
) -> Result<(), IndexError> {
    validate_k(k)?;
    if !xq.is_empty() {
        validate_dimension(index.dimension(), xq.dim())?;
    }
    Ok(())
}

/// Optional per-query tuning. Fields that do not apply to an index variant
/// are ignored with a warning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub nprobe: Option<usize>,
    pub ef_search: Option<usize>,
}

/// An index of any kind, as returned by [`load_index`].
#[derive(Debug)]
pub enum AnyIndex {
    Flat(FlatIndex),
    IvfFlat(IvfFlatIndex),
    Hnsw(HnswIndex),
    General(GeneralIndex),
}

impl AnyIndex {
    fn inner(&self) -> &dyn SearchIndex {
        match self {
            AnyIndex::Flat(index) => index,
            AnyIndex::IvfFlat(index) => index,
            AnyIndex::Hnsw(index) => index,
            AnyIndex::General(index) => index,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn SearchIndex {
        match self {
            AnyIndex::Flat(index) => index,
            AnyIndex::IvfFlat(index) => index,
            AnyIndex::Hnsw(index) => index,
            AnyIndex::General(index) => index,
        }
    }

    /// Queries with variant-specific tuning applied where it makes sense.
    pub fn query_with_params(
        &mut self,
        xq: &EmbeddingMatrix,
        k: usize,
        params: QueryParams,
    ) -> Result<Vec<Vec<SearchResult>>, IndexError> {
        match self {
            AnyIndex::IvfFlat(index) => {
                if params.ef_search.is_some() {
                    tracing::warn!("efSearch has no effect on an IVF index");
                }
                index.query_with(xq, k, params.nprobe)
            }
            AnyIndex::Hnsw(index) => {
                if params.nprobe.is_some() {
                    tracing::warn!("nprobe has no effect on an HNSW index");
                }
                index.query_with(xq, k, params.ef_search)
            }
            other => {
                if params != QueryParams::default() {
                    tracing::warn!("query parameters ignored for {}", other.kind());
                }
                other.query(xq, k)
            }
        }
    }
}

impl SearchIndex for AnyIndex {
    fn kind(&self) -> &str {
        self.inner().kind()
    }

    fn metric(&self) -> Metric {
        self.inner().metric()
    }

    fn dimension(&self) -> usize {
        self.inner().dimension()
    }

    fn ntotal(&self) -> usize {
        self.inner().ntotal()
    }

    fn add(&mut self, embeddings: &EmbeddingMatrix) -> Result<(), IndexError> {
        self.inner_mut().add(embeddings)
    }

    fn query(&self, xq: &EmbeddingMatrix, k: usize) -> Result<Vec<Vec<SearchResult>>, IndexError> {
        self.inner().query(xq, k)
    }

    fn save_index(&self, output_path: &Path) -> Result<(), IndexError> {
        self.inner().save_index(output_path)
    }
}
