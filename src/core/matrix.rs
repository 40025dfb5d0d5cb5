// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use crate::core::vector_ops::{l2_norm, normalize_in_place};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("Embedding rows must not be empty")]
    ZeroDimension,

    #[error("Inconsistent row length at row {row}: expected {expected}, got {actual}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Failed to read embeddings: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse embeddings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Dense row-major matrix of embeddings, one row per document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingMatrix {
    rows: usize,
    dim: usize,
    data: Vec<f32>,
}

impl EmbeddingMatrix {
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self, MatrixError> {
        let dim = rows.first().map(|r| r.len()).unwrap_or(0);
        if !rows.is_empty() && dim == 0 {
            return Err(MatrixError::ZeroDimension);
        }

        let mut data = Vec::with_capacity(rows.len() * dim);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != dim {
                return Err(MatrixError::RaggedRow {
                    row: i,
                    expected: dim,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }

        Ok(Self {
            rows: rows.len(),
            dim,
            data,
        })
    }

    /// Builds a matrix from a flat row-major buffer.
    pub fn from_flat(dim: usize, data: Vec<f32>) -> Result<Self, MatrixError> {
        if dim == 0 {
            return Err(MatrixError::ZeroDimension);
        }
        if data.len() % dim != 0 {
            return Err(MatrixError::RaggedRow {
                row: data.len() / dim,
                expected: dim,
                actual: data.len() % dim,
            });
        }
        Ok(Self {
            rows: data.len() / dim,
            dim,
            data,
        })
    }

    /// Loads a JSON array of arrays, e.g. `[[0.1, 0.2], [0.3, 0.4]]`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, MatrixError> {
        let reader = BufReader::new(File::open(path)?);
        let rows: Vec<Vec<f32>> = serde_json::from_reader(reader)?;
        Self::from_rows(rows)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        // chunks_exact panics on zero, and an empty matrix has no rows anyway
        self.data.chunks_exact(self.dim.max(1))
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        self.iter_rows().map(|r| r.to_vec()).collect()
    }

    pub fn row_norms(&self) -> Vec<f32> {
        self.iter_rows().map(l2_norm).collect()
    }

    /// Scales every row to unit L2 norm. All-zero rows stay zero.
    pub fn normalize_rows(&mut self) {
        if self.dim == 0 {
            return;
        }
        for row in self.data.chunks_exact_mut(self.dim) {
            normalize_in_place(row);
        }
    }

    pub fn normalized(mut self) -> Self {
        self.normalize_rows();
        self
    }

    /// Column-wise mean.
    pub fn mean_row(&self) -> Vec<f32> {
        let mut mean = vec![0.0f64; self.dim];
        for row in self.iter_rows() {
            for (m, &x) in mean.iter_mut().zip(row) {
                *m += x as f64;
            }
        }
        let n = self.rows.max(1) as f64;
        mean.into_iter().map(|m| (m / n) as f32).collect()
    }
}
