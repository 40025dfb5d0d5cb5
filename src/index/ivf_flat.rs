// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use crate::core::matrix::EmbeddingMatrix;
use crate::core::types::{Metric, SearchResult};
use crate::index::file::IndexFile;
use crate::index::{validate_dimension, validate_query, IndexError, IndexKind, SearchIndex};
use crate::ivf::{IVFConfig, IVFIndex};
use std::path::Path;
use tracing::info;

/// Inverted-file index storing full vectors in each list.
#[derive(Debug, Clone)]
pub struct IvfFlatIndex {
    inner: IVFIndex,
}

impl IvfFlatIndex {
    /// Default cluster count for `n` documents: `max(1, floor(sqrt(n / 2)))`.
    pub fn default_nlist(n: usize) -> usize {
        ((n as f64 / 2.0).sqrt() as usize).max(1)
    }

    pub fn new(
        embeddings: &EmbeddingMatrix,
        nlist: Option<usize>,
        metric: Metric,
    ) -> Result<Self, IndexError> {
        Self::with_seed(embeddings, nlist, metric, None)
    }

    /// Like [`IvfFlatIndex::new`] with a fixed k-means seed.
    pub fn with_seed(
        embeddings: &EmbeddingMatrix,
        nlist: Option<usize>,
        metric: Metric,
        seed: Option<u64>,
    ) -> Result<Self, IndexError> {
        let n = embeddings.rows();
        let nlist = nlist.unwrap_or_else(|| Self::default_nlist(n));
        if nlist < 1 {
            return Err(IndexError::UnsupportedHyperparameter(
                "nlist cannot be less than 1".to_string(),
            ));
        }
        if nlist > n {
            return Err(IndexError::UnsupportedHyperparameter(format!(
                "nlist value of {} is larger than the number of documents in the index",
                nlist
            )));
        }
        if embeddings.dim() == 0 {
            return Err(IndexError::EmptyEmbeddings);
        }

        let config = IVFConfig {
            n_clusters: nlist,
            n_probe: 1,
            seed,
            ..IVFConfig::default()
        };
        let mut inner = IVFIndex::new(embeddings.dim(), metric, config)?;
        let trained = inner.train(embeddings)?;
        info!(
            "Trained IVF quantizer: {} clusters, {} iterations, error {:.4} -> {:.4}",
            nlist, trained.iterations, trained.initial_error, trained.final_error
        );

        inner.batch_insert(embeddings)?;
        Ok(Self { inner })
    }

    pub(crate) fn from_file(file: IndexFile) -> Result<Self, IndexError> {
        Ok(Self {
            inner: file.unwrap_payload()?,
        })
    }

    pub fn nlist(&self) -> usize {
        self.inner.n_clusters()
    }

    pub fn nprobe(&self) -> usize {
        self.inner.config().n_probe
    }

    pub fn engine(&self) -> &IVFIndex {
        &self.inner
    }

    /// Queries after optionally setting the number of probed clusters. The
    /// new value stays in effect for later queries.
    pub fn query_with(
        &mut self,
        xq: &EmbeddingMatrix,
        k: usize,
        nprobe: Option<usize>,
    ) -> Result<Vec<Vec<SearchResult>>, IndexError> {
        if let Some(nprobe) = nprobe {
            if !(1..=self.nlist()).contains(&nprobe) {
                return Err(IndexError::UnsupportedHyperparameter(format!(
                    "nprobe must be between 1 and {}",
                    self.nlist()
                )));
            }
            self.inner.set_n_probe(nprobe);
        }
        self.query(xq, k)
    }
}

impl SearchIndex for IvfFlatIndex {
    fn kind(&self) -> &str {
        IndexKind::IvfFlat.as_str()
    }

    fn metric(&self) -> Metric {
        self.inner.metric()
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn ntotal(&self) -> usize {
        self.inner.total_vectors()
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
