// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

pub mod matrix;
pub mod types;
pub mod vector_ops;

pub use matrix::{EmbeddingMatrix, MatrixError};
pub use types::{Label, Metric, SearchResult, UnknownMetric};
