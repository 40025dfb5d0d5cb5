// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

pub mod chunking;
pub mod config;
pub mod core;
pub mod hnsw;
pub mod index;
pub mod ivf;
pub mod variability;

pub use crate::core::{EmbeddingMatrix, Metric, SearchResult};
pub use crate::index::{AnyIndex, IndexError, SearchIndex};
pub use crate::variability::DatasetVariability;
