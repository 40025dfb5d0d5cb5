// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use crate::core::matrix::EmbeddingMatrix;
use crate::core::types::Label;
use crate::hnsw::core::{HNSWError, HNSWIndex};
use std::ops::Range;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct GraphStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub avg_degree: f32,
    pub max_layer: usize,
}

impl HNSWIndex {
    /// Inserts every row of `matrix`, returning the range of assigned labels.
    pub fn batch_insert(&mut self, matrix: &EmbeddingMatrix) -> Result<Range<Label>, HNSWError> {
        let start = self.node_count() as Label;
        for row in matrix.iter_rows() {
            self.insert(row.to_vec())?;
        }
        let end = self.node_count() as Label;

        debug!(
            "HNSW batch insert: {} vectors, {} layers",
            end - start,
            self.get_max_level() + 1
        );
        Ok(start..end)
    }

    pub fn get_graph_stats(&self) -> GraphStats {
        let total_nodes = self.node_count();
        let total_edges: usize = (0..total_nodes)
            .filter_map(|id| self.get_node(id))
            .map(|node| (0..=node.level()).map(|l| node.neighbors(l).len()).sum::<usize>())
            .sum();

        GraphStats {
            total_nodes,
            total_edges,
            avg_degree: if total_nodes > 0 {
                total_edges as f32 / total_nodes as f32
            } else {
                0.0
            },
            max_layer: self.get_max_level(),
        }
    }
}
