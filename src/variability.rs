// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use crate::core::matrix::EmbeddingMatrix;
use crate::core::vector_ops::dot_product;
use serde::Serialize;

/// Spread statistics over a set of document embeddings.
#[derive(Debug, Clone)]
pub struct DatasetVariability {
    embedding: EmbeddingMatrix,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VariabilityReport {
    pub documents: usize,
    pub dimension: usize,
    pub variance: f32,
    pub cosine_similarity_avg: f32,
}

impl DatasetVariability {
    /// Wraps `embedding`, scaling each row to unit length when `normalize`
    /// is set.
    pub fn new(mut embedding: EmbeddingMatrix, normalize: bool) -> Self {
        if normalize {
            embedding.normalize_rows();
        }
        Self { embedding }
    }

    pub fn embedding(&self) -> &EmbeddingMatrix {
        &self.embedding
    }

    /// Sum over dimensions of the population variance of each column.
    pub fn variance(&self) -> f32 {
        let n = self.embedding.rows();
        if n == 0 {
            return 0.0;
        }

        let mean = self.embedding.mean_row();
        let mut sum_sq = vec![0.0f64; mean.len()];
        for row in self.embedding.iter_rows() {
            for ((acc, &x), &m) in sum_sq.iter_mut().zip(row).zip(&mean) {
                let d = x as f64 - m as f64;
                *acc += d * d;
            }
        }

        (sum_sq.iter().sum::<f64>() / n as f64) as f32
    }

    /// Mean dot product between each row and the mean row. For normalized
    /// rows this is the average cosine similarity to the centroid direction
    /// scaled by the centroid's length.
    pub fn cosine_similarity_avg(&self) -> f32 {
        let n = self.embedding.rows();
        if n == 0 {
            return 0.0;
        }

        let mean = self.embedding.mean_row();
        let total: f64 = self
            .embedding
            .iter_rows()
            .map(|row| dot_product(row, &mean) as f64)
            .sum();

        (total / n as f64) as f32
    }

    pub fn report(&self) -> VariabilityReport {
        VariabilityReport {
            documents: self.embedding.rows(),
            dimension: self.embedding.dim(),
            variance: self.variance(),
            cosine_similarity_avg: self.cosine_similarity_avg(),
        }
    }
}
