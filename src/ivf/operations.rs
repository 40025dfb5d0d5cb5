// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use crate::core::matrix::EmbeddingMatrix;
use crate::core::types::Label;
use crate::ivf::core::{ClusterId, IVFError, IVFIndex};
use std::ops::Range;
use tracing::debug;

// Statistics structures
#[derive(Debug, Clone)]
pub struct ClusterStats {
    pub n_clusters: usize,
    pub total_vectors: usize,
    pub avg_cluster_size: f32,
    pub max_cluster_size: usize,
    pub empty_clusters: usize,
}

impl IVFIndex {
    pub fn batch_insert(&mut self, matrix: &EmbeddingMatrix) -> Result<Range<Label>, IVFError> {
        let start = self.total_vectors() as Label;
        for row in matrix.iter_rows() {
            self.insert(row)?;
        }
        let end = self.total_vectors() as Label;

        debug!(
            "IVF batch insert: {} vectors into {} clusters",
            end - start,
            self.n_clusters()
        );
        Ok(start..end)
    }

    pub fn get_cluster_stats(&self) -> ClusterStats {
        let sizes: Vec<usize> = (0..self.n_clusters())
            .map(|i| self.get_cluster_size(ClusterId(i)))
            .collect();

        ClusterStats {
            n_clusters: sizes.len(),
            total_vectors: self.total_vectors(),
            avg_cluster_size: if sizes.is_empty() {
                0.0
            } else {
                self.total_vectors() as f32 / sizes.len() as f32
            },
            max_cluster_size: sizes.iter().copied().max().unwrap_or(0),
            empty_clusters: sizes.iter().filter(|&&s| s == 0).count(),
        }
    }
}
