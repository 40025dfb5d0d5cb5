// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use crate::core::matrix::EmbeddingMatrix;
use crate::core::types::{Metric, SearchResult};
use crate::hnsw::{HNSWConfig, HNSWIndex};
use crate::index::file::IndexFile;
use crate::index::{validate_dimension, validate_query, IndexError, IndexKind, SearchIndex};
use std::path::Path;
use tracing::info;

pub const DEFAULT_M: usize = 64;
pub const DEFAULT_EF_CONSTRUCTION: usize = 64;
pub const DEFAULT_EF_SEARCH: usize = 16;

/// HNSW graph index storing full vectors.
#[derive(Debug, Clone)]
pub struct HnswIndex {
    inner: HNSWIndex,
}

impl HnswIndex {
    pub fn new(
        embeddings: &EmbeddingMatrix,
        m: Option<usize>,
        ef_construction: Option<usize>,
        metric: Metric,
    ) -> Result<Self, IndexError> {
        Self::with_seed(embeddings, m, ef_construction, metric, None)
    }

    /// Like [`HnswIndex::new`] with a fixed level-assignment seed.
    pub fn with_seed(
        embeddings: &EmbeddingMatrix,
        m: Option<usize>,
        ef_construction: Option<usize>,
        metric: Metric,
        seed: Option<u64>,
    ) -> Result<Self, IndexError> {
        let m = m.unwrap_or(DEFAULT_M);
        let ef_construction = ef_construction.unwrap_or(DEFAULT_EF_CONSTRUCTION);
        if m < 1 {
            return Err(IndexError::UnsupportedHyperparameter(
                "M cannot be less than 1".to_string(),
            ));
        }
        if ef_construction < 1 {
            return Err(IndexError::UnsupportedHyperparameter(
                "efConstruction cannot be less than 1".to_string(),
            ));
        }
        if embeddings.dim() == 0 {
            return Err(IndexError::EmptyEmbeddings);
        }

        let config = HNSWConfig {
            max_connections: m,
            ef_construction,
            ef_search: DEFAULT_EF_SEARCH,
            seed,
        };
        let mut inner = HNSWIndex::new(embeddings.dim(), metric, config)?;
        inner.batch_insert(embeddings)?;

        let stats = inner.get_graph_stats();
        info!(
            "Built HNSW graph: {} nodes, {} layers, avg degree {:.1}",
            stats.total_nodes,
            stats.max_layer + 1,
            stats.avg_degree
        );
        Ok(Self { inner })
    }

    pub(crate) fn from_file(file: IndexFile) -> Result<Self, IndexError> {
        Ok(Self {
            inner: file.unwrap_payload()?,
        })
    }

    pub fn m(&self) -> usize {
        self.inner.config().max_connections
    }

    pub fn ef_construction(&self) -> usize {
        self.inner.config().ef_construction
    }

    pub fn ef_search(&self) -> usize {
        self.inner.config().ef_search
    }

    pub fn engine(&self) -> &HNSWIndex {
        &self.inner
    }

    /// Queries after optionally setting the search beam width. The new value
    /// stays in effect for later queries.
    pub fn query_with(
        &mut self,
        xq: &EmbeddingMatrix,
        k: usize,
        ef_search: Option<usize>,
    ) -> Result<Vec<Vec<SearchResult>>, IndexError> {
        if let Some(ef_search) = ef_search {
            if ef_search < 1 {
                return Err(IndexError::UnsupportedHyperparameter(
                    "efSearch cannot be less than 1".to_string(),
                ));
            }
            self.inner.set_ef_search(ef_search);
        }
        self.query(xq, k)
    }
}

impl SearchIndex for HnswIndex {
    fn kind(&self) -> &str {
        IndexKind::Hnsw.as_str()
    }

    fn metric(&self) -> Metric {
        self.inner.metric()
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn ntotal(&self) -> usize {
        self.inner.node_count()
    }

    fn add(&mut self, embeddings: &EmbeddingMatrix) -> Result<(), IndexError> {
        if embeddings.is_empty() {
            return Ok(());
        }
        validate_dimension(self.dimension(), embeddings.dim())?;
        self.inner.batch_insert(embeddings)?;
        Ok(())
    }

    fn query(&self, xq: &EmbeddingMatrix, k: usize) -> Result<Vec<Vec<SearchResult>>, IndexError> {
        validate_query(self, xq, k)?;
        xq.iter_rows()
            .map(|q| self.inner.search(q, k).map_err(IndexError::from))
            .collect()
    }

    fn save_index(&self, output_path: &Path) -> Result<(), IndexError> {
        IndexFile::wrap(self.kind(), &self.inner)?.write(output_path)
    }
}
