// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use crate::core::matrix::EmbeddingMatrix;
use crate::core::types::{Metric, SearchResult};
use crate::core::vector_ops::{closest_k, into_results};
use crate::index::file::IndexFile;
use crate::index::{validate_dimension, validate_query, IndexError, IndexKind, SearchIndex};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Exact search by scanning every stored vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatIndex {
    metric: Metric,
    dimension: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    pub fn new(embeddings: &EmbeddingMatrix, metric: Metric) -> Result<Self, IndexError> {
        if embeddings.dim() == 0 {
            return Err(IndexError::EmptyEmbeddings);
        }

        let mut index = Self {
            metric,
            dimension: embeddings.dim(),
            data: Vec::new(),
        };
        index.add(embeddings)?;
        Ok(index)
    }

    pub(crate) fn from_file(file: IndexFile) -> Result<Self, IndexError> {
        file.unwrap_payload()
    }

    fn search_one(&self, query: &[f32], k: usize) -> Vec<SearchResult> {
        let candidates = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(i, v)| (i as i64, self.metric.distance(query, v)))
            .collect();
        into_results(closest_k(candidates, k), self.metric)
    }
}

impl SearchIndex for FlatIndex {
    fn kind(&self) -> &str {
        IndexKind::Flat.as_str()
    }

    fn metric(&self) -> Metric {
        self.metric
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn ntotal(&self) -> usize {
        self.data.len() / self.dimension
    }

    fn add(&mut self, embeddings: &EmbeddingMatrix) -> Result<(), IndexError> {
        if embeddings.is_empty() {
            return Ok(());
        }
        validate_dimension(self.dimension, embeddings.dim())?;
        self.data.extend_from_slice(embeddings.as_slice());
        Ok(())
    }

    fn query(&self, xq: &EmbeddingMatrix, k: usize) -> Result<Vec<Vec<SearchResult>>, IndexError> {
        validate_query(self, xq, k)?;
        Ok(xq.iter_rows().map(|q| self.search_one(q, k)).collect())
    }

    fn save_index(&self, output_path: &Path) -> Result<(), IndexError> {
        IndexFile::wrap(self.kind(), self)?.write(output_path)
    }
}
