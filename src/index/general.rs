// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use crate::core::matrix::EmbeddingMatrix;
use crate::core::types::{Metric, SearchResult};
use crate::index::file::IndexFile;
use crate::index::{IndexError, SearchIndex};
use std::path::Path;

/// A loaded index whose kind has no dedicated wrapper. It can be saved back
/// unchanged, but not queried or extended.
#[derive(Debug, Clone)]
pub struct GeneralIndex {
    file: IndexFile,
}

impl GeneralIndex {
    pub(crate) fn from_file(file: IndexFile) -> Self {
        Self { file }
    }
}

impl SearchIndex for GeneralIndex {
    fn kind(&self) -> &str {
        &self.file.kind
    }

    fn metric(&self) -> Metric {
        Metric::default()
    }

    fn dimension(&self) -> usize {
        0
    }

    fn ntotal(&self) -> usize {
        0
    }

    fn add(&mut self, _embeddings: &EmbeddingMatrix) -> Result<(), IndexError> {
        Err(IndexError::UnsupportedIndex(self.file.kind.clone()))
    }

    fn query(&self, _xq: &EmbeddingMatrix, _k: usize) -> Result<Vec<Vec<SearchResult>>, IndexError> {
        Err(IndexError::UnsupportedIndex(self.file.kind.clone()))
    }

    fn save_index(&self, output_path: &Path) -> Result<(), IndexError> {
        self.file.write(output_path)
    }
}
